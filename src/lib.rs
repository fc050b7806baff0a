// Grid Signal Engine Library
//
// RSI/RSX grid-crossing signal generation with a paper-trading driver

pub mod core;
pub mod clients;
pub mod config;
pub mod error;       // Unified error handling
pub mod logging;     // Tracing subscriber setup
pub mod execution;
pub mod trader;

// Re-export core engine types
pub use core::{
    Aggression, GridLadder, GridManager, GridSettings, GridSnapshot, MarketBias, NoTradeZone,
    OscillatorKind, Signal, SignalDecision,
};

// Re-export error types
pub use error::{EngineError, EngineResult};

// Re-export configuration
pub use config::{Config, ConfigError, ExecutionConfig, FeedConfig, LogFormat, LoggingConfig, StrategyConfig};

// Re-export feeds, execution and the driver loop
pub use clients::{KrakenTickerFeed, PriceSource, ReplayFeed};
pub use execution::{swap_for_signal, CommitmentSource, CommitmentStage, MonitorOutcome, PaperExecutor, PaperFill, SwapExecutor, SwapRequest, TxMonitor};
pub use trader::{SessionSummary, Trader};
