//! Engine layer: the send loop, per-message pollers, and the shared ledger.

mod dispatch;
mod ledger;
mod poller;

pub use dispatch::{BatchDispatcher, DispatchContext, DispatchError};
pub use ledger::{DispatchResult, ResultLedger, Tally};
pub use poller::StatusPoller;
