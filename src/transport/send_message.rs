use serde::Deserialize;

use super::TransportError;
use crate::domain::{DeliveryStatus, MessageBody, MessageId, PhoneNumber};
use crate::provider::SendReceipt;

#[derive(Debug, Clone, Deserialize)]
struct SendJsonResponse {
    sid: String,
    status: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorJsonBody {
    message: String,
    #[serde(default)]
    code: Option<i64>,
}

/// Form parameters for the message-create call.
pub fn encode_send_form(
    number: &PhoneNumber,
    body: &MessageBody,
    sender_id: &str,
) -> Vec<(String, String)> {
    vec![
        ("To".to_owned(), number.as_str().to_owned()),
        ("From".to_owned(), sender_id.to_owned()),
        ("Body".to_owned(), body.as_str().to_owned()),
    ]
}

/// Decode a successful message-create response into a [`SendReceipt`].
pub fn decode_send_json_response(json: &str) -> Result<SendReceipt, TransportError> {
    let parsed: SendJsonResponse = serde_json::from_str(json)?;
    let message_id =
        MessageId::new(parsed.sid).map_err(|_| TransportError::MissingMessageId)?;
    Ok(SendReceipt {
        message_id,
        initial_status: DeliveryStatus::from_provider(&parsed.status),
    })
}

/// Extract the human-readable message from a provider error body, if the body
/// is one. Returns `None` for anything that does not parse as an error
/// payload, letting the caller fall back to the raw body.
pub fn decode_provider_error(json: &str) -> Option<String> {
    let parsed: ErrorJsonBody = serde_json::from_str(json).ok()?;
    Some(match parsed.code {
        Some(code) => format!("{} (code {code})", parsed.message),
        None => parsed.message,
    })
}
