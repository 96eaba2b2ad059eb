//! Detection engine: normalization, key mapping and prefix resolution.
//!
//! Everything here is synchronous and side-effect free apart from logging.

mod mapper;
mod normalizer;
mod resolver;

pub use mapper::CountryKeyMapper;
pub use normalizer::{
    CapabilityError, LibPhoneNumber, ParseError, ParsedPhone, PhoneCapability, PhoneNormalizer,
};
pub use resolver::{CarrierResolver, LookupDiagnostic, Resolution};
