use actix_web::web;
use std::sync::Arc;

use crate::{auth_token::AuthTokenService, config::AppConfig, db::PlantNetStore, handlers};

/// Shared handles registered as app data on every worker.
#[derive(Clone)]
pub struct AppState {
    pub store: web::Data<dyn PlantNetStore>,
    pub tokens: web::Data<AuthTokenService>,
    pub config: web::Data<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn PlantNetStore>, tokens: AuthTokenService, config: AppConfig) -> Self {
        Self {
            store: web::Data::from(store),
            tokens: web::Data::new(tokens),
            config: web::Data::new(config),
        }
    }

    /// Registers shared state and all routes on an `App`.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.store.clone())
            .app_data(self.tokens.clone())
            .app_data(self.config.clone());
        handlers::configure(cfg);
    }
}
