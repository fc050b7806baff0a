// Price feeds that drive the signal engine

pub mod kraken_ws;
pub mod replay;

use crate::error::EngineResult;

// Re-export client types
pub use kraken_ws::{handle_kraken_event, parse_kraken_ticker, KrakenTickerFeed, TickerUpdate};
pub use replay::ReplayFeed;

/// Source of periodic price samples. `Ok(None)` means the feed has ended.
#[allow(async_fn_in_trait)]
pub trait PriceSource {
    async fn next_price(&mut self) -> EngineResult<Option<f64>>;
}
