// Common types used by the signal engine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::ConfigError;

/// Discrete trading signal, exactly one per processed sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "SELL")]
    Sell,
    #[serde(rename = "DO_NOTHING")]
    DoNothing,
}

impl Signal {
    /// +1 for Buy, -1 for Sell, 0 otherwise
    pub fn direction(self) -> i8 {
        match self {
            Signal::Buy => 1,
            Signal::Sell => -1,
            Signal::DoNothing => 0,
        }
    }

    pub fn is_trade(self) -> bool {
        self != Signal::DoNothing
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
            Signal::DoNothing => write!(f, "DO_NOTHING"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketBias {
    Up,      // Suppress sells near the signal line
    Down,    // Suppress buys near the signal line
    Neutral,
}

impl FromStr for MarketBias {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(MarketBias::Up),
            "down" => Ok(MarketBias::Down),
            "neutral" => Ok(MarketBias::Neutral),
            other => Err(ConfigError::Validation(format!(
                "unknown market direction '{}' (expected up, down or neutral)",
                other
            ))),
        }
    }
}

/// Symmetric band around 50 in which signals are suppressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoTradeZone {
    Off,
    Band45To55,
    Band40To60,
    Band35To65,
    Band30To70,
}

impl NoTradeZone {
    /// Half-width of the band in oscillator points
    pub fn half_width(self) -> f64 {
        match self {
            NoTradeZone::Off => 0.0,
            NoTradeZone::Band45To55 => 5.0,
            NoTradeZone::Band40To60 => 10.0,
            NoTradeZone::Band35To65 => 15.0,
            NoTradeZone::Band30To70 => 20.0,
        }
    }

    /// True when `value` lies strictly inside the band
    pub fn contains(self, value: f64) -> bool {
        let width = self.half_width();
        value > 50.0 - width && value < 50.0 + width
    }
}

impl FromStr for NoTradeZone {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "n/a" | "none" | "off" => Ok(NoTradeZone::Off),
            "45-55" => Ok(NoTradeZone::Band45To55),
            "40-60" => Ok(NoTradeZone::Band40To60),
            "35-65" => Ok(NoTradeZone::Band35To65),
            "30-70" => Ok(NoTradeZone::Band30To70),
            other => Err(ConfigError::Validation(format!(
                "unknown no-trade zone '{}' (expected n/a, 45-55, 40-60, 35-65 or 30-70)",
                other
            ))),
        }
    }
}

/// How close to the previous signal line a new signal may fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Aggression {
    Low,
    Medium,
    High,
}

impl Aggression {
    pub fn level(self) -> usize {
        match self {
            Aggression::Low => 0,
            Aggression::Medium => 1,
            Aggression::High => 2,
        }
    }
}

impl FromStr for Aggression {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Aggression::Low),
            "med" | "medium" => Ok(Aggression::Medium),
            "high" => Ok(Aggression::High),
            other => Err(ConfigError::Validation(format!(
                "unknown aggression level '{}' (expected low, med or high)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OscillatorKind {
    ClassicRsi,
    Rsx,
}

impl FromStr for OscillatorKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rsi" => Ok(OscillatorKind::ClassicRsi),
            "rsx" => Ok(OscillatorKind::Rsx),
            other => Err(ConfigError::Validation(format!(
                "unknown oscillator type '{}' (expected rsi or rsx)",
                other
            ))),
        }
    }
}

/// Typed, validated parameters for one running strategy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSettings {
    pub period: usize,
    pub grids: usize,
    pub bias: MarketBias,
    pub no_trade_zone: NoTradeZone,
    pub aggression: Aggression,
    pub oscillator: OscillatorKind,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            period: 7,
            grids: 10,
            bias: MarketBias::Neutral,
            no_trade_zone: NoTradeZone::Band35To65,
            aggression: Aggression::Low,
            oscillator: OscillatorKind::Rsx,
        }
    }
}

impl GridSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.period == 0 {
            return Err(ConfigError::Validation("period must be greater than 0".to_string()));
        }

        if self.grids == 0 {
            return Err(ConfigError::Validation("grids must be greater than 0".to_string()));
        }

        Ok(())
    }

    /// Grid spacing in oscillator points
    pub fn grid_interval(&self) -> f64 {
        100.0 / self.grids as f64
    }
}
