// src/main.rs
mod aggregate;
mod community;
mod config;
mod handlers;
mod models;
mod roster;
mod status;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::info;

use crate::community::HttpCommunityClient;
use crate::config::Config;
use crate::status::StatusClient;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger only once at the start
    env_logger::init_from_env(Env::default().default_filter_or("debug"));

    dotenv::dotenv().ok();

    // Load configuration
    let config = Config::from_env();

    // Get bind address and port from environment or use defaults
    let bind_address = std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "80".to_string());
    let bind = format!("{}:{}", bind_address, port);

    // Upstream clients are built once and shared read-only across every
    // connection's ticks.
    let community = web::Data::new(HttpCommunityClient::new(
        config.community_api_url.clone(),
        config.community_token.clone(),
    ));
    let status = web::Data::new(StatusClient::new(&config));
    let config = web::Data::new(config);

    info!("Starting server on {}", bind);
    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .app_data(config.clone())
            .app_data(community.clone())
            .app_data(status.clone())
            .route("/", web::get().to(handlers::index::index))
            .route("/ws", web::get().to(handlers::feed::feed))
    })
        .bind(&bind)?
        .run().await
}
