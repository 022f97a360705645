use actix_cors::Cors;
use actix_web::{http::header, middleware as actix_middleware, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;

use crate::auth_token::AuthTokenService;
use crate::config::AppConfig;
use crate::db::PlantNetStore;
use crate::state::AppState;

fn cors(config: &AppConfig) -> Cors {
    config
        .cors_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
        .supports_credentials()
        .max_age(3600)
}

/// Serves the API until shutdown. The store is closed on every exit path,
/// including a failed bind.
pub async fn serve(
    store: Arc<dyn PlantNetStore>,
    tokens: AuthTokenService,
    config: AppConfig,
) -> anyhow::Result<()> {
    let state = AppState::new(store.clone(), tokens, config.clone());
    let result = run_http(state, config).await;

    store.close().await;
    result
}

async fn run_http(state: AppState, config: AppConfig) -> anyhow::Result<()> {
    let bind = (config.host.clone(), config.port);
    let port = config.port;

    let server = HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(actix_middleware::Logger::default())
            .wrap(actix_middleware::Compress::default())
            .wrap(cors(&config))
            .configure(|cfg| state.configure(cfg))
    })
    .bind(bind)
    .context("Failed to bind HTTP listener")?;

    log::info!("plantNet is running on port {}", port);

    server
        .run()
        .await
        .context("HTTP server terminated with an error")
}
