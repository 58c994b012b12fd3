// src/handlers/index.rs
use actix_web::{Error, HttpResponse};

pub async fn index() -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().content_type("application/json").body("{\"status\": \"ok\"}"))
}
