// Follows a submitted transaction through its commitment stages

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout_at, Instant};
use tracing::{debug, error, info, warn};

use crate::config::ExecutionConfig;
use crate::error::{EngineError, EngineResult};
use crate::execution::{CommitmentSource, CommitmentStage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorOutcome {
    Finalized { attempts: u32 },
    RetriesExhausted { stage: CommitmentStage },
    TimedOut { stage: CommitmentStage },
}

impl MonitorOutcome {
    pub fn into_result(self, tx_id: &str, max_retries: u32) -> EngineResult<u32> {
        match self {
            MonitorOutcome::Finalized { attempts } => Ok(attempts),
            MonitorOutcome::RetriesExhausted { .. } => {
                Err(EngineError::RetriesExhausted(tx_id.to_string(), max_retries))
            }
            MonitorOutcome::TimedOut { .. } => Err(EngineError::MonitorTimeout(tx_id.to_string())),
        }
    }
}

pub struct TxMonitor<C> {
    source: Arc<C>,
    retry_delay: Duration,
    timeout: Duration,
    max_retries: u32,
}

impl<C> Clone for TxMonitor<C> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            retry_delay: self.retry_delay,
            timeout: self.timeout,
            max_retries: self.max_retries,
        }
    }
}

impl<C: CommitmentSource> TxMonitor<C> {
    pub fn new(source: Arc<C>, retry_delay: Duration, timeout: Duration, max_retries: u32) -> Self {
        Self {
            source,
            retry_delay,
            timeout,
            max_retries,
        }
    }

    pub fn from_config(source: Arc<C>, config: &ExecutionConfig) -> Self {
        Self::new(
            source,
            Duration::from_secs(config.retry_delay_seconds),
            Duration::from_secs(config.commitment_timeout_seconds),
            config.max_retries_tx_monitor,
        )
    }

    /// Wait before every attempt, advance one stage per successful check,
    /// and give up after `max_retries` attempts or when the overall timeout
    /// passes.
    pub async fn watch(&self, tx_id: &str) -> MonitorOutcome {
        let deadline = Instant::now() + self.timeout;
        let mut stages = CommitmentStage::ALL.iter().copied().peekable();

        for attempt in 1..=self.max_retries {
            let Some(&stage) = stages.peek() else {
                break;
            };

            if timeout_at(deadline, sleep(self.retry_delay)).await.is_err() {
                return MonitorOutcome::TimedOut { stage };
            }

            match timeout_at(deadline, self.source.check(tx_id, stage)).await {
                Err(_) => return MonitorOutcome::TimedOut { stage },
                Ok(Err(e)) => {
                    debug!("Commitment check for {} at {:?} failed (attempt {}/{}): {}", tx_id, stage, attempt, self.max_retries, e);
                }
                Ok(Ok(false)) => {
                    debug!("{} not yet {:?} (attempt {}/{})", tx_id, stage, attempt, self.max_retries);
                }
                Ok(Ok(true)) => {
                    debug!("{} reached {:?}", tx_id, stage);
                    stages.next();
                    if stages.peek().is_none() {
                        return MonitorOutcome::Finalized { attempts: attempt };
                    }
                }
            }
        }

        MonitorOutcome::RetriesExhausted {
            stage: stages.peek().copied().unwrap_or(CommitmentStage::Finalized),
        }
    }
}

impl<C> TxMonitor<C>
where
    C: CommitmentSource + Send + Sync + 'static,
{
    /// Watch in a detached task; the outcome is logged and also returned
    /// through the handle
    pub fn spawn(&self, tx_id: String) -> JoinHandle<MonitorOutcome> {
        let monitor = self.clone();
        tokio::spawn(async move {
            let outcome = monitor.watch(&tx_id).await;
            match outcome {
                MonitorOutcome::Finalized { attempts } => {
                    info!("✅ Commitment status is finalized for transaction {} ({} checks)", tx_id, attempts);
                }
                MonitorOutcome::RetriesExhausted { stage } => {
                    error!(
                        "❌ Could not confirm {:?} for {} after {} retries",
                        stage, tx_id, monitor.max_retries
                    );
                }
                MonitorOutcome::TimedOut { stage } => {
                    warn!("⏰ Monitoring {} timed out waiting for {:?}", tx_id, stage);
                }
            }
            outcome
        })
    }
}
