// Turning signals into swaps and following them to finality

pub mod monitor;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::info;

use crate::config::ExecutionConfig;
use crate::core::types::Signal;
use crate::error::EngineResult;

pub use monitor::{MonitorOutcome, TxMonitor};

/// A request to swap `amount` of `input` into `output`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapRequest {
    pub input: String,
    pub output: String,
    pub amount: f64,
}

impl fmt::Display for SwapRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.amount, self.input, self.output)
    }
}

/// Buy spends the base currency on the quote currency, Sell goes the other
/// way, DoNothing produces no swap.
pub fn swap_for_signal(signal: Signal, config: &ExecutionConfig) -> Option<SwapRequest> {
    match signal {
        Signal::Buy => Some(SwapRequest {
            input: config.base_currency.clone(),
            output: config.quote_currency.clone(),
            amount: config.buy_order_size,
        }),
        Signal::Sell => Some(SwapRequest {
            input: config.quote_currency.clone(),
            output: config.base_currency.clone(),
            amount: config.sell_order_size,
        }),
        Signal::DoNothing => None,
    }
}

/// Commitment levels a submitted transaction passes through, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitmentStage {
    Processed,
    Confirmed,
    Finalized,
}

impl CommitmentStage {
    pub const ALL: [CommitmentStage; 3] = [
        CommitmentStage::Processed,
        CommitmentStage::Confirmed,
        CommitmentStage::Finalized,
    ];
}

/// Submits swaps and returns a transaction id
#[allow(async_fn_in_trait)]
pub trait SwapExecutor {
    async fn submit(&self, request: &SwapRequest) -> EngineResult<String>;
}

/// Answers whether a transaction has reached a commitment stage.
/// `Ok(false)` means "not yet" (or the transaction reported an
/// instruction error); both cost a monitor attempt.
pub trait CommitmentSource {
    fn check(&self, tx_id: &str, stage: CommitmentStage) -> impl Future<Output = EngineResult<bool>> + Send;
}

/// A swap accepted by the paper executor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaperFill {
    pub tx_id: String,
    pub request: SwapRequest,
    pub submitted_at: DateTime<Utc>,
}

/// Dry-run executor: logs swaps and hands out sequential ids that are
/// immediately final
#[derive(Debug, Default)]
pub struct PaperExecutor {
    next_id: AtomicU64,
    submitted: Mutex<Vec<PaperFill>>,
}

impl PaperExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submitted(&self) -> Vec<PaperFill> {
        self.submitted
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl SwapExecutor for PaperExecutor {
    async fn submit(&self, request: &SwapRequest) -> EngineResult<String> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let tx_id = format!("paper-{:06}", id);

        self.submitted
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(PaperFill {
                tx_id: tx_id.clone(),
                request: request.clone(),
                submitted_at: Utc::now(),
            });

        info!("🧪 Paper swap {}: {}", tx_id, request);
        Ok(tx_id)
    }
}

impl CommitmentSource for PaperExecutor {
    fn check(&self, _tx_id: &str, _stage: CommitmentStage) -> impl Future<Output = EngineResult<bool>> + Send {
        async { Ok(true) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_direction_follows_signal() {
        let config = ExecutionConfig::default();

        let buy = swap_for_signal(Signal::Buy, &config).unwrap();
        assert_eq!(buy.input, config.base_currency);
        assert_eq!(buy.output, config.quote_currency);
        assert_eq!(buy.amount, config.buy_order_size);

        let sell = swap_for_signal(Signal::Sell, &config).unwrap();
        assert_eq!(sell.input, config.quote_currency);
        assert_eq!(sell.output, config.base_currency);
        assert_eq!(sell.amount, config.sell_order_size);

        assert!(swap_for_signal(Signal::DoNothing, &config).is_none());
    }

    #[tokio::test]
    async fn test_paper_executor_ids_and_log() {
        let executor = PaperExecutor::new();
        let request = swap_for_signal(Signal::Buy, &ExecutionConfig::default()).unwrap();

        assert_eq!(executor.submit(&request).await.unwrap(), "paper-000001");
        assert_eq!(executor.submit(&request).await.unwrap(), "paper-000002");
        let fills = executor.submitted();
        assert_eq!(fills.len(), 2);
        assert_eq!(fills[1].tx_id, "paper-000002");
        assert!(fills[0].submitted_at <= fills[1].submitted_at);
        assert!(executor.check("paper-000001", CommitmentStage::Finalized).await.unwrap());
    }
}
