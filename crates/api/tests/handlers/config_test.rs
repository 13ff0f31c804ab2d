use std::collections::HashMap;

use pretty_assertions::assert_eq;
use scoutplan_api::config::ApiConfig;
use tracing::Level;

fn config_from(pairs: &[(&str, &str)]) -> eyre::Result<ApiConfig> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    ApiConfig::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn test_defaults() {
    let config = config_from(&[("DATABASE_URL", "postgres://localhost/scoutplan")]).unwrap();

    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.port, 3000);
    assert_eq!(config.database_max_connections, 5);
    assert_eq!(config.log_level, Level::INFO);
    assert_eq!(config.cors_origins, None);
    assert_eq!(config.request_timeout, 30);
    assert_eq!(config.session_ttl_hours, 168);
    assert_eq!(config.cache_max_capacity, 1000);
    assert_eq!(config.cache_ttl_seconds, 300);
    assert_eq!(config.server_addr(), "0.0.0.0:3000");
}

#[test]
fn test_overrides() {
    let config = config_from(&[
        ("DATABASE_URL", "postgres://localhost/scoutplan"),
        ("API_HOST", "127.0.0.1"),
        ("API_PORT", "8080"),
        ("LOG_LEVEL", "DEBUG"),
        ("API_CORS_ORIGINS", "http://localhost:5173, https://plan.example.org,"),
        ("SESSION_TTL_HOURS", "12"),
    ])
    .unwrap();

    assert_eq!(config.server_addr(), "127.0.0.1:8080");
    assert_eq!(config.log_level, Level::DEBUG);
    assert_eq!(
        config.cors_origins,
        Some(vec![
            "http://localhost:5173".to_string(),
            "https://plan.example.org".to_string(),
        ])
    );
    assert_eq!(config.session_ttl_hours, 12);
}

#[test]
fn test_database_url_is_required() {
    let err = config_from(&[]).unwrap_err();
    assert!(err.to_string().contains("DATABASE_URL"));
}

#[test]
fn test_invalid_number_is_rejected() {
    let err = config_from(&[
        ("DATABASE_URL", "postgres://localhost/scoutplan"),
        ("API_PORT", "eighty"),
    ])
    .unwrap_err();
    assert!(err.to_string().contains("API_PORT"));
}

#[test]
fn test_unknown_log_level_falls_back_to_info() {
    let config = config_from(&[
        ("DATABASE_URL", "postgres://localhost/scoutplan"),
        ("LOG_LEVEL", "verbose"),
    ])
    .unwrap();
    assert_eq!(config.log_level, Level::INFO);
}
