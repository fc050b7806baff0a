// Polling loop: price feed -> grid manager -> swap -> detached monitor

use futures_util::FutureExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::clients::PriceSource;
use crate::config::ExecutionConfig;
use crate::core::{GridManager, Signal};
use crate::error::{EngineError, EngineResult};
use crate::execution::{swap_for_signal, CommitmentSource, MonitorOutcome, SwapExecutor, TxMonitor};

/// Counters for one trading session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub samples: u64,
    pub buys: u64,
    pub sells: u64,
    pub feed_errors: u64,
    pub swap_errors: u64,
    pub finalized: u64,
    pub unconfirmed: u64,
}

impl SessionSummary {
    fn record_outcome(&mut self, outcome: MonitorOutcome) {
        match outcome {
            MonitorOutcome::Finalized { .. } => self.finalized += 1,
            MonitorOutcome::RetriesExhausted { .. } | MonitorOutcome::TimedOut { .. } => self.unconfirmed += 1,
        }
    }
}

pub struct Trader<F, X> {
    feed: F,
    manager: GridManager,
    executor: Arc<X>,
    monitor: TxMonitor<X>,
    execution: ExecutionConfig,
    interval: Duration,
    monitors: Vec<JoinHandle<MonitorOutcome>>,
    summary: SessionSummary,
}

impl<F, X> Trader<F, X>
where
    F: PriceSource,
    X: SwapExecutor + CommitmentSource + Send + Sync + 'static,
{
    pub fn new(feed: F, manager: GridManager, executor: Arc<X>, execution: ExecutionConfig, interval: Duration) -> Self {
        let monitor = TxMonitor::from_config(Arc::clone(&executor), &execution);
        Self {
            feed,
            manager,
            executor,
            monitor,
            execution,
            interval,
            monitors: Vec::new(),
            summary: SessionSummary::default(),
        }
    }

    /// Run until the feed ends or `max_samples` samples were processed.
    /// Retryable feed and swap failures are logged and the loop moves on to
    /// the next interval; a feed that closes ends the session. Counters are
    /// kept on the trader, so they survive the future being dropped.
    pub async fn run(&mut self, max_samples: Option<u64>) -> EngineResult<SessionSummary> {
        loop {
            self.reap_monitors();

            if max_samples.is_some_and(|limit| self.summary.samples >= limit) {
                info!("🏁 Sample limit reached ({})", self.summary.samples);
                break;
            }

            // Sleep first so every `continue` still honours the interval
            sleep(self.interval).await;

            let price = match self.feed.next_price().await {
                Ok(Some(price)) => price,
                Ok(None) | Err(EngineError::FeedClosed) => {
                    info!("📭 Price feed ended");
                    break;
                }
                Err(e) => {
                    error!("❌ Failed to get price [{}]: {}", e.category(), e);
                    self.summary.feed_errors += 1;
                    if !e.is_retryable() {
                        return Err(e);
                    }
                    continue;
                }
            };
            info!("💰 Price: {:.4}", price);

            let signal = self.manager.process(price)?;
            self.summary.samples += 1;
            info!("{} signal received", signal);

            let Some(request) = swap_for_signal(signal, &self.execution) else {
                info!("No action taken this interval");
                continue;
            };

            match self.executor.submit(&request).await {
                Ok(tx_id) => {
                    match signal {
                        Signal::Buy => self.summary.buys += 1,
                        Signal::Sell => self.summary.sells += 1,
                        Signal::DoNothing => {}
                    }
                    info!("📤 Submitted swap {} ({})", tx_id, request);
                    self.monitors.push(self.monitor.spawn(tx_id));
                }
                Err(e) => {
                    warn!("⚠️ Failed to submit swap {}: {}", request, e);
                    self.summary.swap_errors += 1;
                }
            }
        }

        Ok(self.summary.clone())
    }

    /// Fold finished monitors into the summary and forget their handles
    fn reap_monitors(&mut self) {
        let mut running = Vec::with_capacity(self.monitors.len());
        for mut handle in self.monitors.drain(..) {
            if !handle.is_finished() {
                running.push(handle);
                continue;
            }
            match (&mut handle).now_or_never() {
                Some(Ok(outcome)) => self.summary.record_outcome(outcome),
                Some(Err(e)) => warn!("⚠️ Monitor task failed: {}", e),
                None => running.push(handle),
            }
        }
        self.monitors = running;
    }

    /// Wait for every monitor still running; used when shutting down a
    /// session. Returns the final counters.
    pub async fn drain_monitors(&mut self) -> SessionSummary {
        for handle in std::mem::take(&mut self.monitors) {
            match handle.await {
                Ok(outcome) => self.summary.record_outcome(outcome),
                Err(e) => warn!("⚠️ Monitor task failed: {}", e),
            }
        }
        self.summary.clone()
    }

    /// Monitors spawned but not yet reaped
    pub fn pending_monitors(&self) -> usize {
        self.monitors.len()
    }

    pub fn summary(&self) -> &SessionSummary {
        &self.summary
    }

    pub fn manager(&self) -> &GridManager {
        &self.manager
    }
}
