//! Reporting: final tallies and export records read from the ledger.

use std::time::Duration;

use serde::Serialize;

use crate::engine::{DispatchResult, ResultLedger};

/// How long to let pollers settle before reading a final summary.
pub const DEFAULT_SUMMARY_GRACE: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
/// Final counts for a batch.
///
/// Pollers may still be running when this is read; messages they have not
/// resolved show up as `pending` rather than being hidden.
pub struct Summary {
    pub delivered: usize,
    pub failed: usize,
    pub pending: usize,
}

impl Summary {
    /// Count outcomes as they stand right now.
    pub fn of(ledger: &ResultLedger) -> Self {
        let tally = ledger.tally();
        Self {
            delivered: tally.success,
            failed: tally.failure,
            pending: tally.pending,
        }
    }

    /// Wait out the grace period, then count. Intended for use right after
    /// the send loop completes, giving in-flight pollers time to converge.
    pub async fn settle(ledger: &ResultLedger, grace: Duration) -> Self {
        tokio::time::sleep(grace).await;
        Self::of(ledger)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// One export record per dispatched number, for the external export
/// collaborator (CSV formatting and download are out of scope here).
pub struct ExportRow {
    pub number: String,
    pub final_outcome_label: &'static str,
    pub provider_message_id: Option<String>,
    pub message_preview: String,
    pub segment_count: usize,
    pub error: Option<String>,
    pub timestamp: u64,
    pub submitted_by: String,
}

impl ExportRow {
    /// Flatten one ledger row into its export shape.
    pub fn from_result(result: &DispatchResult) -> Self {
        Self {
            number: result.number.as_str().to_owned(),
            final_outcome_label: result.outcome.label(),
            provider_message_id: result
                .provider_message_id
                .as_ref()
                .map(|id| id.as_str().to_owned()),
            message_preview: result.message_preview.clone(),
            segment_count: result.segment_count,
            error: result.error.clone(),
            timestamp: result.timestamp.value(),
            submitted_by: result.submitted_by.clone(),
        }
    }

    /// Export rows for the whole ledger, in send order.
    pub fn collect(ledger: &ResultLedger) -> Vec<Self> {
        ledger.snapshot().iter().map(Self::from_result).collect()
    }
}
