#![allow(dead_code)]

use actix_web::cookie::Cookie;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use plantnet::auth_token::{now_secs, AuthTokenService, SessionIdentity};
use plantnet::config::{AppConfig, StorageBackend};
use plantnet::db::MemoryStore;
use plantnet::middleware::TOKEN_COOKIE;
use plantnet::AppState;

pub const SECRET: &[u8] = b"plantnet-test-secret-0123456789abcdef";

pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub tokens: AuthTokenService,
    pub state: AppState,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let tokens = AuthTokenService::new(SECRET.to_vec(), Duration::from_secs(3600))
            .expect("valid token service");
        let config = AppConfig {
            storage: StorageBackend::Memory,
            ..AppConfig::default()
        };
        let state = AppState::new(store.clone(), tokens.clone(), config);

        Self {
            store,
            tokens,
            state,
        }
    }

    pub fn token_for(&self, email: &str) -> String {
        let identity: SessionIdentity =
            serde_json::from_value(json!({ "email": email })).expect("identity");
        self.tokens
            .issue(identity, now_secs())
            .expect("issue token")
    }

    pub fn session_cookie(&self, email: &str) -> Cookie<'static> {
        Cookie::new(TOKEN_COOKIE, self.token_for(email))
    }
}

pub fn plant_payload(name: &str, quantity: i64) -> Value {
    json!({
        "name": name,
        "category": "Indoor",
        "image": format!("https://img.plantnet.dev/{}.png", name.to_lowercase()),
        "price": 18.5,
        "quantity": quantity,
        "description": "Thrives in indirect light",
        "seller": {
            "name": "Grower",
            "email": "grower@plantnet.dev"
        }
    })
}

pub fn order_payload(email: &str, plant_id: &str) -> Value {
    json!({
        "customer": { "email": email, "name": "Ivy" },
        "plantId": plant_id,
        "quantity": 1,
        "price": 18.5,
        "status": "Pending",
        "seller": "grower@plantnet.dev",
        "address": "12 Fern Street"
    })
}
