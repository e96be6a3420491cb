//! Tests for config module

use pokegraph::config::Config;
use serial_test::serial;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

const ENV_KEYS: &[&str] = &[
    "POKEGRAPH_RATE_LIMIT",
    "POKEGRAPH_STORE_URL",
    "FUSEKI_URL",
    "POKEGRAPH_DATASET",
    "POKEGRAPH_LINK_SAME_AS",
    "POKEGRAPH_DEADLINE",
    "POKEGRAPH_LOG_FORMAT",
];

fn clear_env() {
    for key in ENV_KEYS {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_config_file_exists() {
    let config_path = Path::new("config.toml");
    assert!(
        config_path.exists(),
        "config.toml should exist in project root"
    );
}

#[test]
#[serial]
fn test_shipped_config_loads() {
    clear_env();
    let config = Config::load(Some(Path::new("config.toml"))).unwrap();

    assert_eq!(config.store.dataset, "Pokemon");
    assert_eq!(config.store_data_url(), "http://localhost:3030/Pokemon/data");
    assert_eq!(config.source.excluded_titles, vec!["Pokémon (species)".to_string()]);
    assert!(!config.graph.link_same_as);
    assert_eq!(config.run_deadline(), None);
    assert_eq!(config.request_timeout(), Duration::from_secs(30));
}

#[test]
#[serial]
fn test_partial_file_keeps_defaults() {
    clear_env();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[store]\ndataset = \"Kanto\"\n\n[run]\ndeadline_secs = 120").unwrap();

    let config = Config::load(Some(file.path())).unwrap();

    assert_eq!(config.store.dataset, "Kanto");
    assert_eq!(config.store.url, "http://localhost:3030");
    assert_eq!(config.run_deadline(), Some(Duration::from_secs(120)));
    assert_eq!(config.http.max_retries, 2);
}

#[test]
#[serial]
fn test_env_overrides_file() {
    clear_env();
    std::env::set_var("POKEGRAPH_STORE_URL", "http://fuseki:3030/");
    std::env::set_var("POKEGRAPH_DATASET", "Johto");
    std::env::set_var("POKEGRAPH_LINK_SAME_AS", "true");

    let config = Config::load(Some(Path::new("config.toml"))).unwrap();
    clear_env();

    assert_eq!(config.store_data_url(), "http://fuseki:3030/Johto/data");
    assert!(config.graph.link_same_as);
}

#[test]
#[serial]
fn test_fuseki_url_fallback() {
    clear_env();
    std::env::set_var("FUSEKI_URL", "http://triplestore:3030");

    let config = Config::from_env().unwrap();
    clear_env();

    assert_eq!(config.store.url, "http://triplestore:3030");
}

#[test]
#[serial]
fn test_invalid_env_value_rejected() {
    clear_env();
    std::env::set_var("POKEGRAPH_RATE_LIMIT", "0");

    let result = Config::load(None);
    clear_env();

    assert!(result.is_err());
}

#[test]
#[serial]
fn test_invalid_log_format_rejected() {
    clear_env();
    std::env::set_var("POKEGRAPH_LOG_FORMAT", "xml");

    let result = Config::load(None);
    clear_env();

    let message = format!("{:#}", result.unwrap_err());
    assert!(message.contains("logging.format"));
}

#[test]
#[serial]
fn test_missing_file_has_context() {
    clear_env();
    let err = Config::from_file(Path::new("/nonexistent/pokegraph.toml")).unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
#[serial]
fn test_malformed_file_has_context() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[store\nurl = ").unwrap();

    let err = Config::from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse TOML config file"));
}
