// Configuration management for the grid signal engine

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::core::types::GridSettings;

/// Prefix for environment variable overrides, e.g. `GRID_STRATEGY_PERIOD`
pub const ENV_PREFIX: &str = "GRID_";

/// Strategy inputs as written in the config file; parsed once into
/// [`GridSettings`] before the engine sees them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    #[serde(default = "default_period")]
    pub period: usize,
    #[serde(default = "default_grids")]
    pub grids: usize,
    #[serde(default = "default_direction")]
    pub direction: String,       // up | down | neutral
    #[serde(default = "default_no_trade_zone")]
    pub no_trade_zone: String,   // n/a | 45-55 | 40-60 | 35-65 | 30-70
    #[serde(default = "default_aggression")]
    pub aggression: String,      // low | med | high
    #[serde(default = "default_oscillator")]
    pub oscillator: String,      // rsi | rsx
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    #[serde(default = "default_trading_pair")]
    pub trading_pair: String,
    #[serde(default = "default_interval")]
    pub interval_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    #[serde(default = "default_quote_currency")]
    pub quote_currency: String,
    #[serde(default = "default_buy_order_size")]
    pub buy_order_size: f64,
    #[serde(default = "default_sell_order_size")]
    pub sell_order_size: f64,
    #[serde(default = "default_true")]
    pub dry_run: bool,
    #[serde(default = "default_commitment_timeout")]
    pub commitment_timeout_seconds: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries_tx_monitor: u32,
    #[serde(default = "default_retry_delay")]
    pub retry_delay_seconds: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,  // Human readable console output
    Json,  // One JSON object per event, for log collectors
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

// Default value functions
fn default_period() -> usize { 7 }
fn default_grids() -> usize { 10 }
fn default_direction() -> String { "neutral".to_string() }
fn default_no_trade_zone() -> String { "35-65".to_string() }
fn default_aggression() -> String { "low".to_string() }
fn default_oscillator() -> String { "rsx".to_string() }
fn default_ws_url() -> String { "wss://ws.kraken.com".to_string() }
fn default_trading_pair() -> String { "SOL/USD".to_string() }
fn default_interval() -> u64 { 60 }
fn default_base_currency() -> String { "USD".to_string() }
fn default_quote_currency() -> String { "SOL".to_string() }
fn default_buy_order_size() -> f64 { 10.0 }
fn default_sell_order_size() -> f64 { 0.05 }
fn default_true() -> bool { true }
fn default_commitment_timeout() -> u64 { 120 }
fn default_max_retries() -> u32 { 10 }
fn default_retry_delay() -> u64 { 5 }
fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> LogFormat { LogFormat::Text }

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            period: default_period(),
            grids: default_grids(),
            direction: default_direction(),
            no_trade_zone: default_no_trade_zone(),
            aggression: default_aggression(),
            oscillator: default_oscillator(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            ws_url: default_ws_url(),
            trading_pair: default_trading_pair(),
            interval_seconds: default_interval(),
        }
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            base_currency: default_base_currency(),
            quote_currency: default_quote_currency(),
            buy_order_size: default_buy_order_size(),
            sell_order_size: default_sell_order_size(),
            dry_run: true,
            commitment_timeout_seconds: default_commitment_timeout(),
            max_retries_tx_monitor: default_max_retries(),
            retry_delay_seconds: default_retry_delay(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strategy: StrategyConfig::default(),
            feed: FeedConfig::default(),
            execution: ExecutionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl StrategyConfig {
    /// Parse the textual inputs into typed settings and validate them
    pub fn to_settings(&self) -> Result<GridSettings, ConfigError> {
        let settings = GridSettings {
            period: self.period,
            grids: self.grids,
            bias: self.direction.parse()?,
            no_trade_zone: self.no_trade_zone.parse()?,
            aggression: self.aggression.parse()?,
            oscillator: self.oscillator.parse()?,
        };
        settings.validate()?;
        Ok(settings)
    }
}

impl Config {
    /// Load configuration from a TOML file, apply `GRID_*` environment
    /// overrides, then validate
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileRead(format!("{}: {}", path.as_ref().display(), e)))?;

        let mut config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        fs::write(path, content)
            .map_err(|e| ConfigError::FileWrite(e.to_string()))?;

        Ok(())
    }

    /// Load configuration from file, or create default if file doesn't exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            let config = Self::default();
            config.to_file(&path)?;
            info!("📁 Created default config file: {}", path.as_ref().display());
            Ok(config)
        }
    }

    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup; keys are `GRID_<SECTION>_<FIELD>`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            let key = format!("{}{}", ENV_PREFIX, name);
            lookup(&key).map(|value| {
                debug!("Config override from {}", key);
                (key, value)
            })
        };

        if let Some((key, v)) = get("STRATEGY_PERIOD") { self.strategy.period = parse_number(&key, &v)?; }
        if let Some((key, v)) = get("STRATEGY_GRIDS") { self.strategy.grids = parse_number(&key, &v)?; }
        if let Some((_, v)) = get("STRATEGY_DIRECTION") { self.strategy.direction = v; }
        if let Some((_, v)) = get("STRATEGY_NO_TRADE_ZONE") { self.strategy.no_trade_zone = v; }
        if let Some((_, v)) = get("STRATEGY_AGGRESSION") { self.strategy.aggression = v; }
        if let Some((_, v)) = get("STRATEGY_OSCILLATOR") { self.strategy.oscillator = v; }

        if let Some((_, v)) = get("FEED_WS_URL") { self.feed.ws_url = v; }
        if let Some((_, v)) = get("FEED_TRADING_PAIR") { self.feed.trading_pair = v; }
        if let Some((key, v)) = get("FEED_INTERVAL_SECONDS") { self.feed.interval_seconds = parse_number(&key, &v)?; }

        if let Some((_, v)) = get("EXECUTION_BASE_CURRENCY") { self.execution.base_currency = v; }
        if let Some((_, v)) = get("EXECUTION_QUOTE_CURRENCY") { self.execution.quote_currency = v; }
        if let Some((key, v)) = get("EXECUTION_BUY_ORDER_SIZE") { self.execution.buy_order_size = parse_number(&key, &v)?; }
        if let Some((key, v)) = get("EXECUTION_SELL_ORDER_SIZE") { self.execution.sell_order_size = parse_number(&key, &v)?; }
        if let Some((key, v)) = get("EXECUTION_DRY_RUN") { self.execution.dry_run = parse_number(&key, &v)?; }
        if let Some((key, v)) = get("EXECUTION_COMMITMENT_TIMEOUT_SECONDS") {
            self.execution.commitment_timeout_seconds = parse_number(&key, &v)?;
        }
        if let Some((key, v)) = get("EXECUTION_MAX_RETRIES_TX_MONITOR") {
            self.execution.max_retries_tx_monitor = parse_number(&key, &v)?;
        }
        if let Some((key, v)) = get("EXECUTION_RETRY_DELAY_SECONDS") {
            self.execution.retry_delay_seconds = parse_number(&key, &v)?;
        }

        if let Some((_, v)) = get("LOGGING_LEVEL") { self.logging.level = v; }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.strategy.to_settings()?;

        if self.feed.interval_seconds == 0 {
            return Err(ConfigError::Validation("interval_seconds must be greater than 0".to_string()));
        }

        if self.feed.trading_pair.trim().is_empty() {
            return Err(ConfigError::Validation("trading_pair must not be empty".to_string()));
        }

        if self.execution.base_currency == self.execution.quote_currency {
            return Err(ConfigError::Validation(
                "base_currency and quote_currency must differ".to_string()
            ));
        }

        if self.execution.buy_order_size <= 0.0 || self.execution.sell_order_size <= 0.0 {
            return Err(ConfigError::Validation("order sizes must be positive".to_string()));
        }

        if self.execution.max_retries_tx_monitor == 0 {
            return Err(ConfigError::Validation("max_retries_tx_monitor must be greater than 0".to_string()));
        }

        if self.execution.commitment_timeout_seconds == 0 {
            return Err(ConfigError::Validation("commitment_timeout_seconds must be greater than 0".to_string()));
        }

        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Validation(format!("{} has invalid value '{}'", key, value)))
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(String),

    #[error("Failed to write config file: {0}")]
    FileWrite(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Failed to serialize config: {0}")]
    Serialize(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}
