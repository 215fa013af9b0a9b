//! Domain layer: strong types with validation and invariants (no I/O).

mod batch;
mod validation;
mod value;

pub use batch::{Batch, parse_phone_numbers};
pub use validation::ValidationError;
pub use value::{
    DeliveryStatus, MessageBody, MessageId, Outcome, PhoneNumber, UnixTimestamp, segment_count,
};
