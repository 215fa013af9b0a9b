use crate::domain::validation::ValidationError;
use crate::domain::value::PhoneNumber;

/// Parse free-text input into candidate phone numbers.
///
/// One number per line: lines are trimmed, blank lines dropped, and any line
/// whose whitespace-stripped form does not start with `required_prefix` is
/// discarded. The result is truncated to `max` entries. Input order is
/// preserved and duplicates are kept; an empty result is not an error
/// (callers check before building a [`Batch`]).
pub fn parse_phone_numbers(input: &str, required_prefix: &str, max: usize) -> Vec<PhoneNumber> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| PhoneNumber::new(line, required_prefix).ok())
        .take(max)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Ordered, bounded list of recipients for one dispatch.
///
/// Invariant: non-empty and at most the configured maximum. Construction
/// never silently truncates; oversized input is rejected (truncation is the
/// parser's job, signalled by its `max` argument).
pub struct Batch {
    numbers: Vec<PhoneNumber>,
}

impl Batch {
    /// Create a validated batch.
    pub fn new(numbers: Vec<PhoneNumber>, max: usize) -> Result<Self, ValidationError> {
        if numbers.is_empty() {
            return Err(ValidationError::Empty {
                field: PhoneNumber::FIELD,
            });
        }
        if numbers.len() > max {
            return Err(ValidationError::TooManyRecipients {
                max,
                actual: numbers.len(),
            });
        }
        Ok(Self { numbers })
    }

    /// The recipients in input order.
    pub fn numbers(&self) -> &[PhoneNumber] {
        &self.numbers
    }

    /// Number of recipients. Always at least one.
    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    /// Kept for API symmetry; a constructed batch is never empty.
    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }
}
