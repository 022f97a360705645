use plantnet::config::{AppConfig, StorageBackend};
use serial_test::serial;

const SAMPLE_CONFIG: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/config/plantnet.toml");

const ENV_KEYS: &[&str] = &[
    "CONFIG_PATH",
    "PORT",
    "MONGODB_URI",
    "DB_USER",
    "DB_PASS",
    "ACCESS_TOKEN_SECRET",
    "NODE_ENV",
    "APP_ENV",
    "STORAGE_BACKEND",
];

fn clear_env() {
    for key in ENV_KEYS {
        std::env::remove_var(key);
    }
}

#[test]
fn test_load_sample_config() {
    let config = AppConfig::load_from_file(SAMPLE_CONFIG).expect("Failed to load config");

    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 5000);
    assert_eq!(config.database_name, "plantNet");
    assert_eq!(config.storage, StorageBackend::Mongo);
    assert!(!config.is_production());
}

#[test]
fn test_invalid_config_path() {
    let result = AppConfig::load_from_file("nonexistent/config.toml");
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_from_env_reads_process_environment() {
    clear_env();
    std::env::set_var("PORT", "7070");
    std::env::set_var("ACCESS_TOKEN_SECRET", "0123456789abcdef0123456789abcdef");
    std::env::set_var("NODE_ENV", "production");
    std::env::set_var("STORAGE_BACKEND", "memory");

    let config = AppConfig::from_env().expect("config from env");
    clear_env();

    assert_eq!(config.port, 7070);
    assert_eq!(config.access_token_secret.len(), 32);
    assert!(config.is_production());
    assert_eq!(config.storage, StorageBackend::Memory);
}

#[test]
#[serial]
fn test_from_env_layers_over_config_file() {
    clear_env();
    std::env::set_var("CONFIG_PATH", SAMPLE_CONFIG);
    std::env::set_var("PORT", "9090");

    let config = AppConfig::from_env().expect("config from file and env");
    clear_env();

    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 9090);
}

#[test]
#[serial]
fn test_app_env_takes_precedence_over_node_env() {
    clear_env();
    std::env::set_var("NODE_ENV", "production");
    std::env::set_var("APP_ENV", "staging");

    let config = AppConfig::from_env().expect("config from env");
    clear_env();

    assert_eq!(config.environment, "staging");
    assert!(!config.is_production());
}
