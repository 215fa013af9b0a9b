//! In-memory ledger of per-recipient outcomes for the current batch.

use std::sync::{Arc, Mutex};

use crate::domain::{DeliveryStatus, MessageId, Outcome, PhoneNumber, UnixTimestamp};

#[derive(Debug, Clone, PartialEq, Eq)]
/// One row per attempted recipient.
///
/// Created as a pending placeholder when the send loop reaches the number,
/// then mutated in place by the send loop and by the poller for that message.
pub struct DispatchResult {
    pub number: PhoneNumber,
    pub outcome: Outcome,
    pub provider_message_id: Option<MessageId>,
    pub initial_status: Option<DeliveryStatus>,
    pub final_status: Option<DeliveryStatus>,
    pub error: Option<String>,
    pub timestamp: UnixTimestamp,
    pub last_checked_at: Option<UnixTimestamp>,
    pub segment_count: usize,
    pub message_preview: String,
    pub submitted_by: String,
}

impl DispatchResult {
    /// Placeholder row appended before the send attempt.
    pub fn pending(
        number: PhoneNumber,
        segment_count: usize,
        message_preview: String,
        submitted_by: String,
    ) -> Self {
        Self {
            number,
            outcome: Outcome::Pending,
            provider_message_id: None,
            initial_status: None,
            final_status: None,
            error: None,
            timestamp: UnixTimestamp::now(),
            last_checked_at: None,
            segment_count,
            message_preview,
            submitted_by,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Point-in-time counts over the ledger.
///
/// An estimate of a converging process: pending rows are still being polled.
pub struct Tally {
    pub success: usize,
    pub failure: usize,
    pub pending: usize,
    pub total: usize,
}

#[derive(Clone, Default)]
/// Concurrency-safe collection of [`DispatchResult`] rows.
///
/// Shared between the send loop and all active pollers. Mutations are
/// row-level atomic under one mutex; a resolved outcome never reverts to
/// pending or flips, even if a mutator tries (the prior outcome is restored).
///
/// The ledger is ephemeral: cleared at the start of each batch, lost on
/// process exit.
pub struct ResultLedger {
    inner: Arc<Mutex<Vec<DispatchResult>>>,
}

impl ResultLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all rows. Called when a new batch starts.
    pub fn clear(&self) {
        self.inner.lock().expect("ledger lock poisoned").clear();
    }

    /// Append a row at the end, preserving send order.
    pub fn append(&self, row: DispatchResult) {
        self.inner.lock().expect("ledger lock poisoned").push(row);
    }

    /// Mutate the row carrying the given provider message id.
    ///
    /// Returns `false` when no row matches (e.g. the ledger was cleared by a
    /// later batch while this poller was still running).
    pub fn update_by_id(
        &self,
        id: &MessageId,
        mutate: impl FnOnce(&mut DispatchResult),
    ) -> bool {
        let mut rows = self.inner.lock().expect("ledger lock poisoned");
        let Some(row) = rows
            .iter_mut()
            .find(|row| row.provider_message_id.as_ref() == Some(id))
        else {
            return false;
        };
        apply_monotonic(row, mutate);
        true
    }

    /// Mutate the most recent row for the given number.
    ///
    /// The last matching row is the current attempt when the batch contains
    /// duplicate numbers.
    pub fn update_by_number(
        &self,
        number: &PhoneNumber,
        mutate: impl FnOnce(&mut DispatchResult),
    ) -> bool {
        let mut rows = self.inner.lock().expect("ledger lock poisoned");
        let Some(row) = rows.iter_mut().rev().find(|row| &row.number == number) else {
            return false;
        };
        apply_monotonic(row, mutate);
        true
    }

    /// Copy of all rows in send order.
    pub fn snapshot(&self) -> Vec<DispatchResult> {
        self.inner.lock().expect("ledger lock poisoned").clone()
    }

    /// Count outcomes at this instant.
    pub fn tally(&self) -> Tally {
        let rows = self.inner.lock().expect("ledger lock poisoned");
        let mut tally = Tally {
            total: rows.len(),
            ..Tally::default()
        };
        for row in rows.iter() {
            match row.outcome {
                Outcome::Pending => tally.pending += 1,
                Outcome::Success => tally.success += 1,
                Outcome::Failure => tally.failure += 1,
            }
        }
        tally
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("ledger lock poisoned").len()
    }

    /// Whether the ledger has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Run the mutator, then restore the prior outcome if it was already
/// resolved. Resolution happens exactly once.
fn apply_monotonic(row: &mut DispatchResult, mutate: impl FnOnce(&mut DispatchResult)) {
    let prior = row.outcome;
    mutate(row);
    if prior.is_resolved() && row.outcome != prior {
        row.outcome = prior;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(raw: &str) -> PhoneNumber {
        PhoneNumber::new(raw, "+502").unwrap()
    }

    fn pending_row(raw: &str) -> DispatchResult {
        DispatchResult::pending(number(raw), 1, "hola".to_owned(), "tester".to_owned())
    }

    #[test]
    fn append_and_snapshot_preserve_order() {
        let ledger = ResultLedger::new();
        ledger.append(pending_row("+50211111111"));
        ledger.append(pending_row("+50222222222"));

        let rows = ledger.snapshot();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].number.as_str(), "+50211111111");
        assert_eq!(rows[1].number.as_str(), "+50222222222");
        assert!(rows.iter().all(|row| row.outcome == Outcome::Pending));
    }

    #[test]
    fn update_by_id_targets_the_matching_row() {
        let ledger = ResultLedger::new();
        let mut row = pending_row("+50211111111");
        row.provider_message_id = Some(MessageId::new("SM1").unwrap());
        ledger.append(row);
        ledger.append(pending_row("+50222222222"));

        let id = MessageId::new("SM1").unwrap();
        let updated = ledger.update_by_id(&id, |row| {
            row.final_status = Some(DeliveryStatus::Delivered);
            row.outcome = Outcome::Success;
        });
        assert!(updated);

        let rows = ledger.snapshot();
        assert_eq!(rows[0].outcome, Outcome::Success);
        assert_eq!(rows[1].outcome, Outcome::Pending);

        let missing = MessageId::new("SM404").unwrap();
        assert!(!ledger.update_by_id(&missing, |_| {}));
    }

    #[test]
    fn update_by_number_targets_the_most_recent_duplicate() {
        let ledger = ResultLedger::new();
        ledger.append(pending_row("+50211111111"));
        ledger.append(pending_row("+50211111111"));

        ledger.update_by_number(&number("+50211111111"), |row| {
            row.outcome = Outcome::Failure;
        });

        let rows = ledger.snapshot();
        assert_eq!(rows[0].outcome, Outcome::Pending);
        assert_eq!(rows[1].outcome, Outcome::Failure);
    }

    #[test]
    fn resolved_outcome_never_reverts_or_flips() {
        let ledger = ResultLedger::new();
        ledger.append(pending_row("+50211111111"));
        let num = number("+50211111111");

        ledger.update_by_number(&num, |row| row.outcome = Outcome::Success);

        ledger.update_by_number(&num, |row| row.outcome = Outcome::Pending);
        assert_eq!(ledger.snapshot()[0].outcome, Outcome::Success);

        ledger.update_by_number(&num, |row| row.outcome = Outcome::Failure);
        assert_eq!(ledger.snapshot()[0].outcome, Outcome::Success);
    }

    #[test]
    fn non_outcome_fields_stay_mutable_after_resolution() {
        let ledger = ResultLedger::new();
        let mut row = pending_row("+50211111111");
        row.provider_message_id = Some(MessageId::new("SM1").unwrap());
        ledger.append(row);

        let id = MessageId::new("SM1").unwrap();
        ledger.update_by_id(&id, |row| row.outcome = Outcome::Failure);
        ledger.update_by_id(&id, |row| {
            row.last_checked_at = Some(UnixTimestamp::new(42));
        });

        let rows = ledger.snapshot();
        assert_eq!(rows[0].outcome, Outcome::Failure);
        assert_eq!(rows[0].last_checked_at, Some(UnixTimestamp::new(42)));
    }

    #[test]
    fn tally_counts_each_outcome() {
        let ledger = ResultLedger::new();
        ledger.append(pending_row("+50211111111"));
        ledger.append(pending_row("+50222222222"));
        ledger.append(pending_row("+50233333333"));

        ledger.update_by_number(&number("+50211111111"), |row| {
            row.outcome = Outcome::Success;
        });
        ledger.update_by_number(&number("+50222222222"), |row| {
            row.outcome = Outcome::Failure;
        });

        assert_eq!(
            ledger.tally(),
            Tally {
                success: 1,
                failure: 1,
                pending: 1,
                total: 3,
            }
        );
    }

    #[test]
    fn clear_resets_for_the_next_batch() {
        let ledger = ResultLedger::new();
        ledger.append(pending_row("+50211111111"));
        assert!(!ledger.is_empty());

        ledger.clear();
        assert!(ledger.is_empty());
        assert_eq!(ledger.tally(), Tally::default());
    }

    #[test]
    fn concurrent_row_updates_do_not_corrupt_the_ledger() {
        let ledger = ResultLedger::new();
        for i in 0..8 {
            let mut row = pending_row(&format!("+502{i:08}"));
            row.provider_message_id = Some(MessageId::new(format!("SM{i}")).unwrap());
            ledger.append(row);
        }

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let ledger = ledger.clone();
                std::thread::spawn(move || {
                    let id = MessageId::new(format!("SM{i}")).unwrap();
                    for _ in 0..100 {
                        ledger.update_by_id(&id, |row| {
                            row.last_checked_at = Some(UnixTimestamp::new(i));
                        });
                    }
                    ledger.update_by_id(&id, |row| row.outcome = Outcome::Success);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let tally = ledger.tally();
        assert_eq!(tally.success, 8);
        assert_eq!(tally.total, 8);
        assert_eq!(tally.pending, 0);
    }
}
