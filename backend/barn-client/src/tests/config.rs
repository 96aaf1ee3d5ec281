use crate::DEFAULT_SERVER_ADDRESS;
use crate::config::{
    CONFIG_DIR_ENV, ClientConfig, Credentials, PASSWORD_ENV, SubscriptionPolicy,
    resolve_config_dir,
};
use crate::error::config::ConfigError;

use std::env;
use std::fs;

use serial_test::serial;
use tempfile::tempdir;

/// **VALUE**: Verifies that a missing config file yields defaults.
///
/// **WHY THIS MATTERS**: First launch has no file; the client must still start.
///
/// **BUG THIS CATCHES**: Would catch a missing file being reported as a read error.
#[test]
#[serial]
fn given_empty_directory_when_loading_then_returns_defaults() {
    // GIVEN
    let dir = tempdir().unwrap();

    // WHEN
    let config = ClientConfig::load(dir.path()).unwrap();

    // THEN
    assert_eq!(config.version, 1);
    assert_eq!(config.deployment, "jsonbarn");
    assert_eq!(config.server.address, DEFAULT_SERVER_ADDRESS);
    assert_eq!(config.server.address, "ws://127.0.0.1:8080/ws");
    assert_eq!(config.sender.retry_interval_ms, 10);
    assert_eq!(config.subscriptions.on_disconnect, SubscriptionPolicy::Clear);
}

/// **VALUE**: Verifies that saved configuration loads back, minus the password.
///
/// **WHY THIS MATTERS**: Passwords must never land in a plain JSON file.
///
/// **BUG THIS CATCHES**: Would catch `skip_serializing` being dropped from the password.
#[test]
#[serial]
fn given_config_with_password_when_saved_and_loaded_then_password_is_not_persisted() {
    // GIVEN
    let dir = tempdir().unwrap();
    let mut config = ClientConfig::for_deployment("ecureuil");
    config.subscriptions.on_disconnect = SubscriptionPolicy::Replay;
    config.watch_buckets = vec!["orders".to_string()];
    config.credentials = Some(Credentials {
        username: "bob".to_string(),
        password: Some("hunter2".into()),
    });

    // WHEN
    config.save(dir.path()).unwrap();
    let raw = fs::read_to_string(dir.path().join("config.json")).unwrap();
    let loaded = ClientConfig::load(dir.path()).unwrap();

    // THEN
    assert!(!raw.contains("hunter2"), "password leaked: {raw}");
    assert!(!dir.path().join("config.json.tmp").exists());
    assert_eq!(loaded.deployment, "ecureuil");
    assert_eq!(loaded.subscriptions.on_disconnect, SubscriptionPolicy::Replay);
    assert_eq!(loaded.watch_buckets, vec!["orders".to_string()]);
    let credentials = loaded.credentials.unwrap();
    assert_eq!(credentials.username, "bob");
    assert!(credentials.password.is_none());
}

/// **VALUE**: Verifies that a corrupt file is an error, not silently replaced by defaults.
///
/// **WHY THIS MATTERS**: Falling back would point the client at the wrong server.
///
/// **BUG THIS CATCHES**: Would catch parse errors being swallowed.
#[test]
#[serial]
fn given_corrupt_file_when_loading_then_returns_parse_error() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.json"), "{ nope").unwrap();

    let result = ClientConfig::load(dir.path());

    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

/// **VALUE**: Verifies the validation rules.
///
/// **WHY THIS MATTERS**: Bad values fail at startup instead of as confusing runtime errors.
///
/// **BUG THIS CATCHES**: Would catch any single rule being dropped.
#[test]
fn given_invalid_values_when_validating_then_each_is_rejected() {
    let mut http_address = ClientConfig::default();
    http_address.server.address = "http://127.0.0.1:8080/ws".to_string();

    let mut zero_interval = ClientConfig::default();
    zero_interval.sender.retry_interval_ms = 0;

    let mut short_budget = ClientConfig::default();
    short_budget.sender.retry_interval_ms = 100;
    short_budget.sender.max_retry_elapsed_ms = 50;

    let mut future_version = ClientConfig::default();
    future_version.version = 2;

    let mut blank_deployment = ClientConfig::default();
    blank_deployment.deployment = " ".to_string();

    let mut empty_bucket = ClientConfig::default();
    empty_bucket.watch_buckets = vec![String::new()];

    for config in [
        http_address,
        zero_interval,
        short_budget,
        future_version,
        blank_deployment,
        empty_bucket,
    ] {
        assert!(
            matches!(config.validate(), Err(ConfigError::ValidationError { .. })),
            "accepted {config:?}"
        );
    }
    assert!(ClientConfig::default().validate().is_ok());
}

/// **VALUE**: Verifies that the password can come from the environment.
///
/// **WHY THIS MATTERS**: Saved configs carry no password, so unattended runs need another source.
///
/// **BUG THIS CATCHES**: Would catch the environment override not being applied on load.
#[test]
#[serial]
fn given_password_env_when_loading_credentials_then_password_is_set() {
    // GIVEN
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("config.json"),
        r#"{"credentials": {"username": "bob"}}"#,
    )
    .unwrap();
    unsafe { env::set_var(PASSWORD_ENV, "from-env") };

    // WHEN
    let loaded = ClientConfig::load(dir.path());
    unsafe { env::remove_var(PASSWORD_ENV) };

    // THEN
    let credentials = loaded.unwrap().credentials.unwrap();
    assert_eq!(credentials.password.unwrap().expose(), "from-env");
}

/// **VALUE**: Verifies the directory override.
///
/// **WHY THIS MATTERS**: Tests and containers point the client at a private directory.
///
/// **BUG THIS CATCHES**: Would catch the environment variable being ignored.
#[test]
#[serial]
fn given_config_dir_env_when_resolving_then_uses_it() {
    let dir = tempdir().unwrap();
    unsafe { env::set_var(CONFIG_DIR_ENV, dir.path()) };

    let resolved = resolve_config_dir();
    unsafe { env::remove_var(CONFIG_DIR_ENV) };

    assert_eq!(resolved.unwrap(), dir.path());
}
