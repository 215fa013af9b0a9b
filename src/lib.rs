//! Batch SMS dispatch engine with asynchronous delivery-status tracking.
//!
//! Given a list of phone numbers and one message, [`BatchDispatcher`] sends
//! them strictly one at a time with inter-request pacing, records a ledger
//! row per recipient, and spawns a [`StatusPoller`] for every accepted
//! message that keeps checking the provider until the message reaches a
//! terminal delivery state (or the attempt budget runs out). The
//! [`ResultLedger`] stays consistent while pollers resolve out of order, and
//! [`Summary`] reads the converged counts.
//!
//! The engine talks to the provider only through the [`MessageSender`] and
//! [`StatusFetcher`] traits; [`HttpProvider`] implements both against a
//! Twilio-style REST API.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use smsbatch::{
//!     Batch, BatchDispatcher, Credentials, DispatchConfig, DispatchContext, HttpProvider,
//!     MessageBody, Summary, parse_phone_numbers,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = Arc::new(HttpProvider::new(Credentials::new("AC...", "token")?)?);
//!     let config = DispatchConfig::default();
//!
//!     let numbers = parse_phone_numbers(
//!         "+50212345678\n+50287654321",
//!         &config.country_prefix,
//!         config.max_numbers_per_batch,
//!     );
//!     let batch = Batch::new(numbers, config.max_numbers_per_batch)?;
//!     let message = MessageBody::new("Hola")?;
//!
//!     let dispatcher = BatchDispatcher::new(
//!         provider.clone(),
//!         provider,
//!         config,
//!         DispatchContext::new("ops@example.org"),
//!     );
//!     dispatcher.dispatch(&batch, &message, |_segments| true).await?;
//!
//!     dispatcher.join_pollers().await;
//!     let summary = Summary::of(&dispatcher.ledger());
//!     println!("delivered: {}, failed: {}", summary.delivered, summary.failed);
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod config;
pub mod domain;
pub mod engine;
pub mod provider;
pub mod report;
mod transport;

pub use config::{DispatchConfig, StatusCheckConfig};
pub use domain::{
    Batch, DeliveryStatus, MessageBody, MessageId, Outcome, PhoneNumber, UnixTimestamp,
    ValidationError, parse_phone_numbers, segment_count,
};
pub use engine::{
    BatchDispatcher, DispatchContext, DispatchError, DispatchResult, ResultLedger, StatusPoller,
    Tally,
};
pub use provider::{
    Credentials, FetchError, HttpProvider, HttpProviderBuilder, HttpProviderError, MessageSender,
    SendError, SendReceipt, StatusFetcher,
};
pub use report::{DEFAULT_SUMMARY_GRACE, ExportRow, Summary};
