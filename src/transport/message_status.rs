use serde::Deserialize;

use super::TransportError;
use crate::domain::DeliveryStatus;

#[derive(Debug, Clone, Deserialize)]
struct StatusJsonResponse {
    status: String,
}

/// Decode a message-fetch response into the reported delivery status.
pub fn decode_status_json_response(json: &str) -> Result<DeliveryStatus, TransportError> {
    let parsed: StatusJsonResponse = serde_json::from_str(json)?;
    Ok(DeliveryStatus::from_provider(&parsed.status))
}
