//! Domain layer: strong types with validation and invariants (no I/O).

mod validation;
mod value;

pub use validation::InputFormatError;
pub use value::{CarrierVerdict, DatasetKey, NormalizedNumber, RawInput, Telco};
