//! Per-message status polling: one task per successfully sent message,
//! converging on a terminal delivery state.

use std::sync::Arc;

use crate::config::StatusCheckConfig;
use crate::domain::{DeliveryStatus, MessageId, Outcome, UnixTimestamp};
use crate::engine::ledger::ResultLedger;
use crate::provider::StatusFetcher;

/// State machine for one message: Scheduled → Polling → Terminal.
///
/// Waits an initial delay (the provider needs time to ingest the message),
/// then checks on a fixed interval until the provider reports a terminal
/// status or the attempt budget runs out. Each observed status is written to
/// the ledger row for this message id; fetch failures are retried on the next
/// tick. Pollers for different messages run independently.
pub struct StatusPoller {
    message_id: MessageId,
    fetcher: Arc<dyn StatusFetcher>,
    ledger: ResultLedger,
    config: StatusCheckConfig,
}

impl StatusPoller {
    pub fn new(
        message_id: MessageId,
        fetcher: Arc<dyn StatusFetcher>,
        ledger: ResultLedger,
        config: StatusCheckConfig,
    ) -> Self {
        Self {
            message_id,
            fetcher,
            ledger,
            config,
        }
    }

    /// Drive the poller to its terminal state.
    pub async fn run(self) {
        tokio::time::sleep(self.config.initial_delay).await;

        let mut attempts_used: u32 = 0;
        let mut last_observed: Option<DeliveryStatus> = None;

        loop {
            attempts_used += 1;
            match self.fetcher.fetch(&self.message_id).await {
                Ok(status) => {
                    self.record(&status);
                    if status.is_terminal() {
                        tracing::debug!(
                            id = %self.message_id,
                            status = %status,
                            attempts = attempts_used,
                            "message reached terminal status"
                        );
                        return;
                    }
                    last_observed = Some(status);
                }
                Err(err) => {
                    // Not-found and transient errors alike: retry next tick.
                    tracing::debug!(
                        id = %self.message_id,
                        attempt = attempts_used,
                        error = %err,
                        "status check failed"
                    );
                }
            }

            if attempts_used >= self.config.max_attempts {
                self.resolve_timeout(last_observed.as_ref(), attempts_used);
                return;
            }
            tokio::time::sleep(self.config.check_interval).await;
        }
    }

    /// Write an observed status into this message's ledger row.
    fn record(&self, status: &DeliveryStatus) {
        let updated = self.ledger.update_by_id(&self.message_id, |row| {
            row.final_status = Some(status.clone());
            row.last_checked_at = Some(UnixTimestamp::now());
            match status {
                DeliveryStatus::Delivered => row.outcome = Outcome::Success,
                DeliveryStatus::Undelivered
                | DeliveryStatus::Failed
                | DeliveryStatus::Canceled => row.outcome = Outcome::Failure,
                _ => {}
            }
        });
        if !updated {
            // A newer batch replaced the ledger; nothing left to report to.
            tracing::debug!(id = %self.message_id, "ledger row gone, dropping update");
        }
    }

    /// Attempt budget exhausted without a provider terminal: classify as
    /// `sent_timeout` when the carrier had accepted the message, `timeout`
    /// otherwise. Both count as failures.
    fn resolve_timeout(&self, last_observed: Option<&DeliveryStatus>, attempts_used: u32) {
        let final_status = if last_observed == Some(&DeliveryStatus::Sent) {
            DeliveryStatus::SentTimeout
        } else {
            DeliveryStatus::Timeout
        };
        tracing::warn!(
            id = %self.message_id,
            attempts = attempts_used,
            status = %final_status,
            "giving up on status polling"
        );
        self.ledger.update_by_id(&self.message_id, |row| {
            row.final_status = Some(final_status.clone());
            row.last_checked_at = Some(UnixTimestamp::now());
            row.outcome = Outcome::Failure;
        });
    }
}
