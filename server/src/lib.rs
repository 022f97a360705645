// Library exports for testing and reuse

pub mod auth_token;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod server;
pub mod state;

pub use state::AppState;
