use anyhow::Context;
use std::sync::Arc;

use plantnet::auth_token::AuthTokenService;
use plantnet::config::{AppConfig, StorageBackend};
use plantnet::db::{MemoryStore, MongoStore, PlantNetStore};

async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn PlantNetStore>> {
    match config.storage {
        StorageBackend::Mongo => {
            log::info!("Connecting to MongoDB database '{}'...", config.database_name);
            let store = MongoStore::connect(&config.mongodb_uri, &config.database_name)
                .await
                .context("Failed to connect to MongoDB")?;

            store.ping().await.context("MongoDB did not answer ping")?;
            log::info!("Pinged your deployment. You successfully connected to MongoDB!");

            log::info!("Initializing database indexes...");
            store
                .init_indexes()
                .await
                .context("Failed to initialize database indexes")?;

            Ok(Arc::new(store))
        }
        StorageBackend::Memory => {
            log::warn!("Using in-memory storage; data is lost on shutdown");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (for development)
    // Try loading from current directory first, then from server/ directory
    if dotenvy::dotenv().is_err() {
        dotenvy::from_filename("server/.env").ok();
    }

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    log::info!("Starting plantNet server...");

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    log::info!(
        "Environment: {} (storage: {:?})",
        config.environment,
        config.storage
    );

    let tokens = AuthTokenService::new(
        config.access_token_secret.clone().into_bytes(),
        config.token_ttl(),
    )
    .context("ACCESS_TOKEN_SECRET must be set to at least 32 bytes")?;

    let store = open_store(&config).await?;
    plantnet::server::serve(store, tokens, config).await
}
