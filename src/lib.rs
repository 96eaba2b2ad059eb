//! Offline mobile carrier detection from phone numbers.
//!
//! A number is normalized through a swappable phone-parsing capability (the
//! `phonenumber` crate by default), its region is mapped onto a country table, and
//! the domestic form of the number is matched against static carrier prefixes. No
//! network lookup is involved, so ported numbers may resolve to their original
//! carrier.
//!
//! The crate is layered like this: a domain layer of validated types, a dataset
//! layer for the bundled prefix tables, a pure detection engine, and a client layer
//! that composes them and debounces interactive input.
//!
//! ```rust,no_run
//! use telcoprefix::{CarrierDetector, Telco};
//!
//! fn main() -> Result<(), telcoprefix::DetectError> {
//!     let detector = CarrierDetector::new()?;
//!     let verdict = detector.detect("+2348031234567")?;
//!     assert_eq!(verdict.telco, Telco::Carrier("MTN".to_owned()));
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod dataset;
pub mod domain;
pub mod engine;

pub use client::{
    CarrierDetector, CarrierDetectorBuilder, DetectError, InputPipeline, PipelineConfig,
    PipelineState,
};
pub use dataset::{CarrierEntry, CountryTable, DatasetError, PrefixTable};
pub use domain::{CarrierVerdict, DatasetKey, InputFormatError, NormalizedNumber, RawInput, Telco};
pub use engine::{
    CarrierResolver, CountryKeyMapper, LibPhoneNumber, LookupDiagnostic, ParseError, ParsedPhone,
    PhoneCapability, PhoneNormalizer, Resolution,
};
