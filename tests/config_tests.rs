// Integration tests for configuration loading and validation

mod common;

use grid_signal_engine::{Config, ConfigError, GridManager, LogFormat, OscillatorKind, Signal};
use serial_test::serial;
use std::fs;
use tempfile::TempDir;

const OVERRIDE_KEYS: [&str; 3] = ["GRID_STRATEGY_GRIDS", "GRID_STRATEGY_OSCILLATOR", "GRID_FEED_INTERVAL_SECONDS"];

fn clear_overrides() {
    for key in OVERRIDE_KEYS {
        std::env::remove_var(key);
    }
}

#[test]
fn test_config_serialization_deserialization() {
    let config = Config::default();

    let toml_string = toml::to_string(&config).expect("Failed to serialize config");
    assert!(toml_string.contains("[strategy]"));
    assert!(toml_string.contains("SOL/USD"));

    let deserialized: Config = toml::from_str(&toml_string).expect("Failed to deserialize config");
    assert_eq!(deserialized.strategy.period, config.strategy.period);
    assert_eq!(deserialized.feed.trading_pair, config.feed.trading_pair);
    assert_eq!(deserialized.logging.format, LogFormat::Text);
}

#[test]
#[serial]
fn test_config_file_round_trip() {
    clear_overrides();
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");

    let mut config = Config::default();
    config.strategy.period = 14;
    config.strategy.oscillator = "rsi".to_string();
    config.to_file(&config_path).expect("Failed to write config");

    let loaded = Config::from_file(&config_path).expect("Failed to load config");
    assert_eq!(loaded.strategy.period, 14);
    assert_eq!(loaded.strategy.to_settings().unwrap().oscillator, OscillatorKind::ClassicRsi);
}

#[test]
#[serial]
fn test_partial_file_uses_defaults() {
    clear_overrides();
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("partial.toml");
    fs::write(
        &config_path,
        r#"
[strategy]
grids = 20
direction = "up"

[feed]

[execution]

[logging]
format = "json"
"#,
    )
    .unwrap();

    let config = Config::from_file(&config_path).unwrap();
    assert_eq!(config.strategy.grids, 20);
    assert_eq!(config.strategy.period, 7);
    assert_eq!(config.strategy.no_trade_zone, "35-65");
    assert_eq!(config.feed.interval_seconds, 60);
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
#[serial]
fn test_load_or_create_writes_defaults() {
    clear_overrides();
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("fresh.toml");

    let created = Config::load_or_create(&config_path).unwrap();
    assert!(config_path.exists());

    let reloaded = Config::load_or_create(&config_path).unwrap();
    assert_eq!(created.strategy.grids, reloaded.strategy.grids);
    assert_eq!(created.execution.quote_currency, reloaded.execution.quote_currency);
}

#[test]
#[serial]
fn test_environment_overrides_file_values() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    Config::default().to_file(&config_path).unwrap();

    std::env::set_var("GRID_STRATEGY_GRIDS", "4");
    std::env::set_var("GRID_STRATEGY_OSCILLATOR", "RSI");
    std::env::set_var("GRID_FEED_INTERVAL_SECONDS", "5");
    let loaded = Config::from_file(&config_path);
    clear_overrides();

    let loaded = loaded.unwrap();
    assert_eq!(loaded.strategy.grids, 4);
    assert_eq!(loaded.feed.interval_seconds, 5);
    assert_eq!(loaded.strategy.to_settings().unwrap().oscillator, OscillatorKind::ClassicRsi);
}

#[test]
#[serial]
fn test_invalid_environment_override_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    Config::default().to_file(&config_path).unwrap();

    std::env::set_var("GRID_STRATEGY_OSCILLATOR", "macd");
    let result = Config::from_file(&config_path);
    clear_overrides();

    assert!(matches!(result, Err(ConfigError::Validation(_))));
}

#[test]
fn test_missing_file_reports_read_error() {
    let temp_dir = TempDir::new().unwrap();
    let result = Config::from_file(temp_dir.path().join("nope.toml"));
    assert!(matches!(result, Err(ConfigError::FileRead(_))));
}

#[test]
fn test_malformed_file_reports_parse_error() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("broken.toml");
    fs::write(&config_path, "[strategy\nperiod = ").unwrap();

    assert!(matches!(Config::from_file(&config_path), Err(ConfigError::Parse(_))));
}

#[test]
fn test_invalid_strategy_values() {
    let cases: [(&str, fn(&mut Config)); 5] = [
        ("zero period", |c| c.strategy.period = 0),
        ("zero grids", |c| c.strategy.grids = 0),
        ("bad zone", |c| c.strategy.no_trade_zone = "20-80".to_string()),
        ("bad aggression", |c| c.strategy.aggression = "extreme".to_string()),
        ("same currencies", |c| c.execution.quote_currency = c.execution.base_currency.clone()),
    ];

    for (name, mutate) in cases {
        let mut config = Config::default();
        mutate(&mut config);
        assert!(config.validate().is_err(), "{} should fail validation", name);
    }
}

#[test]
fn test_strategy_strings_are_case_insensitive() {
    let mut config = Config::default();
    config.strategy.direction = "DOWN".to_string();
    config.strategy.no_trade_zone = "N/A".to_string();
    config.strategy.aggression = "Med".to_string();
    config.strategy.oscillator = "Rsx".to_string();

    let settings = config.strategy.to_settings().unwrap();
    let mut manager = GridManager::new(settings).unwrap();
    assert_eq!(manager.process(10.0).unwrap(), Signal::DoNothing);
}
