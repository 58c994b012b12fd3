pub mod feed;
pub mod index;
