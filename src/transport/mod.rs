//! Transport layer: wire-format details for the provider's REST surface.

mod message_status;
mod send_message;

pub use message_status::decode_status_json_response;
pub use send_message::{decode_provider_error, decode_send_json_response, encode_send_form};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response is missing a usable message id")]
    MissingMessageId,
}
