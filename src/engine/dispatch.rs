//! Batch orchestration: the paced send loop and poller supervision.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::task::JoinSet;

use crate::config::DispatchConfig;
use crate::domain::{Batch, MessageBody, Outcome, ValidationError};
use crate::engine::ledger::{DispatchResult, ResultLedger};
use crate::engine::poller::StatusPoller;
use crate::provider::{MessageSender, SendError, StatusFetcher};

#[derive(Debug, Clone)]
/// Caller identity threaded into every result row.
pub struct DispatchContext {
    pub submitted_by: String,
}

impl DispatchContext {
    pub fn new(submitted_by: impl Into<String>) -> Self {
        Self {
            submitted_by: submitted_by.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
/// Reasons a dispatch is rejected before any send occurs.
pub enum DispatchError {
    /// Another batch is still in its send loop. The in-flight ledger is left
    /// untouched; the caller should retry later.
    #[error("a batch is already being dispatched")]
    Busy,

    /// The message exceeds the segment threshold and the confirmation hook
    /// declined the cost.
    #[error("dispatch declined: message uses {segments} segments")]
    ConfirmationDeclined { segments: usize },

    /// Invalid batch or message input.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Clears the busy flag when the send loop ends, on every exit path.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drives one batch at a time: validates preconditions, sends strictly
/// sequentially with inter-request pacing, and spawns a [`StatusPoller`] for
/// every accepted message.
///
/// `dispatch` returns as soon as the send loop completes; the ledger keeps
/// converging asynchronously while pollers run. [`BatchDispatcher::join_pollers`]
/// awaits full settlement for callers that need it (tests, shutdown paths).
pub struct BatchDispatcher {
    sender: Arc<dyn MessageSender>,
    fetcher: Arc<dyn StatusFetcher>,
    config: DispatchConfig,
    context: DispatchContext,
    ledger: ResultLedger,
    busy: Arc<AtomicBool>,
    pollers: Arc<tokio::sync::Mutex<JoinSet<()>>>,
}

impl BatchDispatcher {
    pub fn new(
        sender: Arc<dyn MessageSender>,
        fetcher: Arc<dyn StatusFetcher>,
        config: DispatchConfig,
        context: DispatchContext,
    ) -> Self {
        Self {
            sender,
            fetcher,
            config,
            context,
            ledger: ResultLedger::new(),
            busy: Arc::new(AtomicBool::new(false)),
            pollers: Arc::new(tokio::sync::Mutex::new(JoinSet::new())),
        }
    }

    /// Handle to the live ledger for counters and summaries.
    pub fn ledger(&self) -> ResultLedger {
        self.ledger.clone()
    }

    /// Whether a send loop is currently running.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// The active configuration.
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Send `message` to every number in `batch`, in order.
    ///
    /// `confirm` is invoked once when the segment count exceeds the
    /// configured threshold; returning `false` aborts before any send.
    ///
    /// Per-number failures are recorded in the ledger and never abort the
    /// rest of the batch. Returns when the send loop completes; pollers for
    /// accepted messages keep updating the ledger afterwards.
    pub async fn dispatch(
        &self,
        batch: &Batch,
        message: &MessageBody,
        confirm: impl Fn(usize) -> bool,
    ) -> Result<(), DispatchError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(DispatchError::Busy);
        }
        let _guard = BusyGuard(Arc::clone(&self.busy));

        let segments = message.segments(self.config.max_segment_length);
        if segments > self.config.segment_confirmation_threshold && !confirm(segments) {
            return Err(DispatchError::ConfirmationDeclined { segments });
        }

        self.ledger.clear();
        let preview = message.preview();

        tracing::info!(recipients = batch.len(), segments, "starting batch dispatch");

        for (index, number) in batch.numbers().iter().enumerate() {
            self.ledger.append(DispatchResult::pending(
                number.clone(),
                segments,
                preview.clone(),
                self.context.submitted_by.clone(),
            ));

            match self.sender.send(number, message).await {
                Ok(receipt) => {
                    tracing::debug!(
                        number = %number,
                        id = %receipt.message_id,
                        status = %receipt.initial_status,
                        "message accepted"
                    );
                    self.ledger.update_by_number(number, |row| {
                        row.provider_message_id = Some(receipt.message_id.clone());
                        row.initial_status = Some(receipt.initial_status.clone());
                    });

                    let poller = StatusPoller::new(
                        receipt.message_id,
                        Arc::clone(&self.fetcher),
                        self.ledger.clone(),
                        self.config.status_check.clone(),
                    );
                    self.pollers.lock().await.spawn(poller.run());
                }
                Err(err) => {
                    tracing::warn!(number = %number, error = %err, "send failed");
                    let error_text = match err {
                        SendError::Provider { message } => message,
                        transport @ SendError::Transport(_) => transport.to_string(),
                    };
                    self.ledger.update_by_number(number, |row| {
                        row.outcome = Outcome::Failure;
                        row.error = Some(error_text);
                    });
                }
            }

            if index + 1 < batch.len() {
                tokio::time::sleep(self.config.delay_between_requests).await;
            }
        }

        tracing::info!(tally = ?self.ledger.tally(), "send loop complete");
        Ok(())
    }

    /// Await every spawned poller. Production callers normally do not block
    /// on this; it exists for tests and orderly shutdown.
    pub async fn join_pollers(&self) {
        let mut pollers = self.pollers.lock().await;
        while let Some(result) = pollers.join_next().await {
            if let Err(err) = result {
                tracing::warn!(error = %err, "poller task failed");
            }
        }
    }
}
