use actix_web::{get, web, HttpResponse};
use serde::Serialize;

use crate::{db::PlantNetStore, error::Result};

#[get("/")]
pub async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Hello from plantNet Server..")
}

#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub storage: String,
}

#[get("/health")]
pub async fn health_check(store: web::Data<dyn PlantNetStore>) -> Result<HttpResponse> {
    let (mut response, status) = match store.ping().await {
        Ok(()) => (HttpResponse::Ok(), "healthy"),
        Err(err) => {
            log::error!("Health check failed: {}", err);
            (HttpResponse::ServiceUnavailable(), "unavailable")
        }
    };

    Ok(response.json(HealthCheckResponse {
        status: status.to_string(),
        storage: store.backend().to_string(),
    }))
}
