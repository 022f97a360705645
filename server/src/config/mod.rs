use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{PlantNetError, Result};

const DEFAULT_CORS_ORIGINS: &[&str] = &["http://localhost:5173", "http://localhost:5174"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Mongo,
    Memory,
}

impl StorageBackend {
    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StorageBackend::Mongo),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(PlantNetError::Config(format!(
                "unknown storage backend '{other}' (expected 'mongo' or 'memory')"
            ))),
        }
    }
}

/// Runtime settings. Values come from an optional TOML file first, then
/// environment variables override them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongodb_uri: String,
    pub database_name: String,
    pub access_token_secret: String,
    pub token_ttl_days: u64,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub storage: StorageBackend,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            database_name: "plantNet".to_string(),
            access_token_secret: String::new(),
            token_ttl_days: 365,
            environment: "development".to_string(),
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
            storage: StorageBackend::Mongo,
        }
    }
}

impl AppConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PlantNetError::Config(format!("Failed to read config file: {}", e))
        })?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| PlantNetError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Builds the config from `CONFIG_PATH` (if set) and the process
    /// environment.
    pub fn from_env() -> Result<Self> {
        let base = match std::env::var("CONFIG_PATH") {
            Ok(path) => Self::load_from_file(path)?,
            Err(_) => Self::default(),
        };
        base.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.port = port
                .parse()
                .map_err(|_| PlantNetError::Config(format!("invalid PORT '{port}'")))?;
        }

        if let Some(uri) = lookup("MONGODB_URI") {
            self.mongodb_uri = uri;
        } else if let (Some(user), Some(pass)) = (lookup("DB_USER"), lookup("DB_PASS")) {
            let cluster = lookup("DB_CLUSTER").unwrap_or_else(|| "cluster0.rwhf0.mongodb.net".to_string());
            self.mongodb_uri = format!(
                "mongodb+srv://{user}:{pass}@{cluster}/?retryWrites=true&w=majority&appName=Cluster0"
            );
        }

        if let Some(name) = lookup("DATABASE_NAME") {
            self.database_name = name;
        }
        if let Some(secret) = lookup("ACCESS_TOKEN_SECRET") {
            self.access_token_secret = secret;
        }
        if let Some(days) = lookup("TOKEN_TTL_DAYS") {
            self.token_ttl_days = days
                .parse()
                .map_err(|_| PlantNetError::Config(format!("invalid TOKEN_TTL_DAYS '{days}'")))?;
        }
        if let Some(env) = lookup("APP_ENV").or_else(|| lookup("NODE_ENV")) {
            self.environment = env;
        }
        if let Some(origins) = lookup("CORS_ORIGINS") {
            self.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(storage) = lookup("STORAGE_BACKEND") {
            self.storage = StorageBackend::parse(&storage)?;
        }

        Ok(self)
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_days.saturating_mul(24 * 60 * 60))
    }
}
