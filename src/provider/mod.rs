//! Provider layer: collaborator contracts the engine depends on, plus the
//! HTTP implementation.
//!
//! The engine only ever talks to [`MessageSender`] and [`StatusFetcher`];
//! tests substitute in-memory fakes, production wires up [`HttpProvider`].

mod http;

pub use http::{Credentials, HttpProvider, HttpProviderBuilder, HttpProviderError};

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;

use crate::domain::{DeliveryStatus, MessageBody, MessageId, PhoneNumber};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of a successful send: the provider's message id and the status it
/// reported at acceptance time (typically `queued`).
pub struct SendReceipt {
    pub message_id: MessageId,
    pub initial_status: DeliveryStatus,
}

#[derive(Debug, thiserror::Error)]
/// A send that did not produce a usable receipt.
///
/// Both variants resolve the recipient's ledger row to an immediate failure;
/// neither aborts the rest of the batch.
pub enum SendError {
    /// The provider rejected the message (bad number format, unapproved
    /// sender, fixed-line destination, etc).
    #[error("provider rejected the send: {message}")]
    Provider { message: String },

    /// Network-level failure reaching the provider (DNS, TLS, timeouts, etc).
    #[error("connection error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),
}

#[derive(Debug, thiserror::Error)]
/// A status check that did not return a status.
///
/// The poller treats both variants identically: log and retry on the next
/// tick until the attempt budget runs out.
pub enum FetchError {
    /// The provider does not know the message id.
    #[error("message not found: {id}")]
    NotFound { id: MessageId },

    /// Network-level failure reaching the provider.
    #[error("connection error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),
}

/// Sends one message to one recipient.
pub trait MessageSender: Send + Sync {
    fn send<'a>(
        &'a self,
        number: &'a PhoneNumber,
        body: &'a MessageBody,
    ) -> BoxFuture<'a, Result<SendReceipt, SendError>>;
}

/// Fetches the current delivery status of a previously sent message.
pub trait StatusFetcher: Send + Sync {
    fn fetch<'a>(&'a self, id: &'a MessageId) -> BoxFuture<'a, Result<DeliveryStatus, FetchError>>;
}
