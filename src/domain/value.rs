use crate::domain::validation::ValidationError;

use phonenumber::country;

/// Number of characters kept in a message preview before truncation.
const PREVIEW_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Destination phone number for one outbound message.
///
/// Invariant: non-empty after stripping all whitespace, and the stripped form
/// starts with the required country prefix. The stripped form is what gets
/// stored and sent to the provider.
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Field name used in export records and provider forms.
    pub const FIELD: &'static str = "number";

    /// Create a validated phone number.
    ///
    /// All whitespace is removed first; the result must start with
    /// `required_prefix` (e.g. `+502`).
    pub fn new(
        value: impl Into<String>,
        required_prefix: &str,
    ) -> Result<Self, ValidationError> {
        let value = value.into();
        let stripped: String = value.chars().filter(|c| !c.is_whitespace()).collect();
        if stripped.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        if !stripped.starts_with(required_prefix) {
            return Err(ValidationError::MissingCountryPrefix {
                prefix: required_prefix.to_owned(),
                input: stripped,
            });
        }
        Ok(Self(stripped))
    }

    /// Parse with full E.164 normalization via the `phonenumber` crate, then
    /// apply the same prefix rule.
    ///
    /// This is opt-in for callers that accept loosely formatted input;
    /// [`PhoneNumber::new`] only strips whitespace.
    pub fn parse_e164(
        default_region: Option<country::Id>,
        input: impl Into<String>,
        required_prefix: &str,
    ) -> Result<Self, ValidationError> {
        let input = input.into();
        let raw = input.trim().to_owned();
        if raw.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }

        let parsed = phonenumber::parse(default_region, &raw)
            .map_err(|_| ValidationError::InvalidPhoneNumber { input: raw.clone() })?;

        let e164 = phonenumber::format(&parsed)
            .mode(phonenumber::Mode::E164)
            .to_string();

        Self::new(e164, required_prefix)
    }

    /// The stripped, validated number as sent to the provider.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Provider-assigned message identifier returned by a successful send.
///
/// Invariant: non-empty after trimming.
pub struct MessageId(String);

impl MessageId {
    /// Field name used in export records and provider responses.
    pub const FIELD: &'static str = "message_id";

    /// Create a validated [`MessageId`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Segment count for the given text: `ceil(chars / max_segment_len)`.
///
/// Empty text is zero segments. A segment is the provider's per-message
/// billing unit; multi-segment messages cost proportionally more.
pub fn segment_count(text: &str, max_segment_len: usize) -> usize {
    text.chars().count().div_ceil(max_segment_len.max(1))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Outbound message text.
///
/// Invariant: non-empty after trimming. The original value (including
/// whitespace) is preserved.
pub struct MessageBody(String);

impl MessageBody {
    /// Field name used in export records and provider forms.
    pub const FIELD: &'static str = "body";

    /// Create validated message text.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the message text as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Segment count at the given per-segment length.
    pub fn segments(&self, max_segment_len: usize) -> usize {
        segment_count(&self.0, max_segment_len)
    }

    /// Short preview for result rows and exports: the first 50 characters,
    /// with `...` appended when the text was truncated.
    pub fn preview(&self) -> String {
        let mut preview: String = self.0.chars().take(PREVIEW_CHARS).collect();
        if self.0.chars().count() > PREVIEW_CHARS {
            preview.push_str("...");
        }
        preview
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Unix timestamp in seconds.
///
/// Used for result-row instants (`timestamp`, `last_checked_at`).
pub struct UnixTimestamp(u64);

impl UnixTimestamp {
    /// Create a timestamp value (no range validation is performed).
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Current wall-clock time.
    pub fn now() -> Self {
        let secs = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self(secs)
    }

    /// Get the underlying timestamp in seconds.
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
/// Delivery status of one message, as reported by the provider.
///
/// Unknown provider strings are preserved as [`DeliveryStatus::Other`].
/// `SentTimeout` and `Timeout` are synthetic: they are produced by this crate
/// when the poll-attempt budget runs out, never by the provider.
pub enum DeliveryStatus {
    Queued,
    Sending,
    Sent,
    Delivered,
    Undelivered,
    Failed,
    Canceled,
    SentTimeout,
    Timeout,
    Other(String),
}

impl DeliveryStatus {
    /// Map a provider status string to a variant. Matching is case-sensitive;
    /// anything unrecognized is preserved as [`DeliveryStatus::Other`].
    pub fn from_provider(value: &str) -> Self {
        match value {
            "queued" => Self::Queued,
            "sending" => Self::Sending,
            "sent" => Self::Sent,
            "delivered" => Self::Delivered,
            "undelivered" => Self::Undelivered,
            "failed" => Self::Failed,
            "canceled" => Self::Canceled,
            other => Self::Other(other.to_owned()),
        }
    }

    /// The wire representation of this status.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => "queued",
            Self::Sending => "sending",
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Undelivered => "undelivered",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
            Self::SentTimeout => "sent_timeout",
            Self::Timeout => "timeout",
            Self::Other(value) => value,
        }
    }

    /// Whether no further state change is expected for this status.
    ///
    /// Covers the provider terminals (`delivered`, `undelivered`, `failed`,
    /// `canceled`) and both synthetic timeout statuses.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Delivered
                | Self::Undelivered
                | Self::Failed
                | Self::Canceled
                | Self::SentTimeout
                | Self::Timeout
        )
    }

    /// Human-readable description for presentation callers.
    pub fn describe(&self) -> &str {
        match self {
            Self::Queued => "waiting in the send queue",
            Self::Sending => "being handed to the carrier",
            Self::Sent => "accepted by the carrier",
            Self::Delivered => "delivered to the device",
            Self::Undelivered => "not delivered: number inactive or unreachable",
            Self::Failed => "failed: carrier or network error",
            Self::Canceled => "canceled before delivery",
            Self::SentTimeout => "not delivered: no confirmation after repeated checks",
            Self::Timeout => "final status could not be verified",
            Self::Other(_) => "unrecognized provider status",
        }
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
/// Per-number outcome of a dispatch.
///
/// Starts `Pending` and resolves to `Success` or `Failure` exactly once; the
/// ledger enforces that a resolved outcome never reverts.
pub enum Outcome {
    #[default]
    Pending,
    Success,
    Failure,
}

impl Outcome {
    /// Whether this outcome has left the `Pending` state.
    pub fn is_resolved(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Label used in export records.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Success => "DELIVERED",
            Self::Failure => "FAILED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_number_strips_whitespace_and_requires_prefix() {
        let number = PhoneNumber::new(" +502 1234 5678 ", "+502").unwrap();
        assert_eq!(number.as_str(), "+50212345678");

        assert!(matches!(
            PhoneNumber::new("+50312345678", "+502"),
            Err(ValidationError::MissingCountryPrefix { .. })
        ));
        assert!(matches!(
            PhoneNumber::new("   ", "+502"),
            Err(ValidationError::Empty { .. })
        ));
    }

    #[test]
    fn phone_number_parse_e164_normalizes_before_prefix_check() {
        let number = PhoneNumber::parse_e164(None, "+502 1234-5678", "+502").unwrap();
        assert_eq!(number.as_str(), "+50212345678");

        assert!(PhoneNumber::parse_e164(None, "not-a-number", "+502").is_err());
        assert!(matches!(
            PhoneNumber::parse_e164(None, "+79251234567", "+502"),
            Err(ValidationError::MissingCountryPrefix { .. })
        ));
    }

    #[test]
    fn message_id_trims_and_rejects_empty() {
        let id = MessageId::new(" SM123 ").unwrap();
        assert_eq!(id.as_str(), "SM123");
        assert!(MessageId::new("  ").is_err());
    }

    #[test]
    fn segment_count_is_ceil_of_chars_over_max() {
        assert_eq!(segment_count("", 160), 0);
        assert_eq!(segment_count("hola", 160), 1);
        assert_eq!(segment_count(&"x".repeat(160), 160), 1);
        assert_eq!(segment_count(&"x".repeat(161), 160), 2);
        assert_eq!(segment_count(&"x".repeat(481), 160), 4);
    }

    #[test]
    fn message_body_preview_truncates_past_fifty_chars() {
        let short = MessageBody::new("hola").unwrap();
        assert_eq!(short.preview(), "hola");

        let long = MessageBody::new("y".repeat(60)).unwrap();
        assert_eq!(long.preview(), format!("{}...", "y".repeat(50)));
    }

    #[test]
    fn message_body_rejects_blank_text() {
        assert!(MessageBody::new("   ").is_err());
        let body = MessageBody::new(" hi ").unwrap();
        assert_eq!(body.as_str(), " hi ");
    }

    #[test]
    fn delivery_status_round_trips_known_values() {
        for raw in [
            "queued",
            "sending",
            "sent",
            "delivered",
            "undelivered",
            "failed",
            "canceled",
        ] {
            assert_eq!(DeliveryStatus::from_provider(raw).as_str(), raw);
        }

        let unknown = DeliveryStatus::from_provider("scheduled");
        assert_eq!(unknown, DeliveryStatus::Other("scheduled".to_owned()));
        assert!(!unknown.is_terminal());
    }

    #[test]
    fn delivery_status_matching_is_case_sensitive() {
        assert_eq!(
            DeliveryStatus::from_provider("Delivered"),
            DeliveryStatus::Other("Delivered".to_owned())
        );
    }

    #[test]
    fn terminal_statuses_include_synthetic_timeouts() {
        assert!(DeliveryStatus::Delivered.is_terminal());
        assert!(DeliveryStatus::Undelivered.is_terminal());
        assert!(DeliveryStatus::Failed.is_terminal());
        assert!(DeliveryStatus::Canceled.is_terminal());
        assert!(DeliveryStatus::SentTimeout.is_terminal());
        assert!(DeliveryStatus::Timeout.is_terminal());

        assert!(!DeliveryStatus::Queued.is_terminal());
        assert!(!DeliveryStatus::Sending.is_terminal());
        assert!(!DeliveryStatus::Sent.is_terminal());
    }

    #[test]
    fn outcome_labels_and_resolution() {
        assert_eq!(Outcome::Pending.label(), "PENDING");
        assert_eq!(Outcome::Success.label(), "DELIVERED");
        assert_eq!(Outcome::Failure.label(), "FAILED");
        assert!(!Outcome::Pending.is_resolved());
        assert!(Outcome::Success.is_resolved());
        assert!(Outcome::Failure.is_resolved());
    }
}
