// Core signal engine: pure, synchronous, no I/O beyond tracing

pub mod types;
pub mod grid_ladder;
pub mod rsi;
pub mod rsx;
pub mod indicator;
pub mod crossing;
pub mod filters;
pub mod grid_manager;

// Re-export commonly used types
pub use types::{Aggression, GridSettings, MarketBias, NoTradeZone, OscillatorKind, Signal};
pub use grid_ladder::GridLadder;
pub use indicator::Oscillator;
pub use crossing::{Crossings, Reading};
pub use filters::{FilterPipeline, FilterTrace, SignalFlags};
pub use grid_manager::{GridManager, GridSnapshot, SignalDecision};
