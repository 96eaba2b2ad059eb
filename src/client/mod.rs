//! Client layer: composes the engine into verdicts and drives debounced input.

use std::sync::Arc;

use crate::dataset::{DatasetError, PrefixTable};
use crate::domain::{CarrierVerdict, InputFormatError, RawInput};
use crate::engine::{
    CarrierResolver, CountryKeyMapper, LibPhoneNumber, ParseError, PhoneCapability,
    PhoneNormalizer, Resolution,
};

mod pipeline;

pub use pipeline::{InputPipeline, PipelineConfig, PipelineState};

/// Message shown for any normalization failure.
const INVALID_NUMBER_MESSAGE: &str = "enter a valid number with country code";

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`CarrierDetector`].
///
/// Carrier lookup never fails on its own: a missing or broken table degrades the
/// verdict to [`crate::Telco::Unknown`] instead.
pub enum DetectError {
    /// The raw text was rejected before normalization.
    #[error("invalid input: {0}")]
    Input(#[from] InputFormatError),

    /// The number could not be normalized.
    #[error("{0}")]
    Parse(#[from] ParseError),

    /// The prefix dataset could not be loaded.
    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),

    /// An [`InputPipeline`] was created outside of a Tokio runtime.
    #[error("no tokio runtime available: {0}")]
    Runtime(#[from] tokio::runtime::TryCurrentError),
}

impl DetectError {
    /// Text suitable for showing next to the input field.
    pub fn user_message(&self) -> String {
        match self {
            Self::Input(err) => err.to_string(),
            Self::Parse(_) => INVALID_NUMBER_MESSAGE.to_owned(),
            Self::Dataset(_) => "carrier data is unavailable".to_owned(),
            Self::Runtime(_) => "carrier lookup is unavailable".to_owned(),
        }
    }
}

#[derive(Clone)]
/// Builder for [`CarrierDetector`].
///
/// Defaults: bundled dataset, `phonenumber`-backed parsing, the standard key
/// mapping, no fallback region and a 20 character input limit.
pub struct CarrierDetectorBuilder {
    table: Option<Arc<PrefixTable>>,
    capability: Arc<dyn PhoneCapability>,
    mapper: CountryKeyMapper,
    fallback_region: Option<String>,
    max_input_len: usize,
}

impl CarrierDetectorBuilder {
    pub fn new() -> Self {
        Self {
            table: None,
            capability: Arc::new(LibPhoneNumber),
            mapper: CountryKeyMapper::default(),
            fallback_region: None,
            max_input_len: RawInput::MAX_LEN,
        }
    }

    /// Use a preloaded dataset instead of the bundled one.
    pub fn prefix_table(mut self, table: Arc<PrefixTable>) -> Self {
        self.table = Some(table);
        self
    }

    /// Swap the phone parsing/validation capability.
    pub fn capability(mut self, capability: Arc<dyn PhoneCapability>) -> Self {
        self.capability = capability;
        self
    }

    pub fn key_mapper(mut self, mapper: CountryKeyMapper) -> Self {
        self.mapper = mapper;
        self
    }

    /// ISO region assumed when the caller gives no usable country hint.
    pub fn fallback_region(mut self, region: impl Into<String>) -> Self {
        self.fallback_region = Some(region.into());
        self
    }

    pub fn max_input_len(mut self, max_input_len: usize) -> Self {
        self.max_input_len = max_input_len;
        self
    }

    /// Build a [`CarrierDetector`], decoding the bundled dataset if none was given.
    pub fn build(self) -> Result<CarrierDetector, DetectError> {
        let table = match self.table {
            Some(table) => table,
            None => Arc::new(PrefixTable::builtin()?),
        };

        Ok(CarrierDetector {
            normalizer: PhoneNormalizer::new(self.capability)
                .with_fallback_region(self.fallback_region),
            resolver: CarrierResolver::new(table).with_mapper(self.mapper),
            max_input_len: self.max_input_len,
        })
    }
}

impl Default for CarrierDetectorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
/// Offline carrier detector.
///
/// Validates the raw text, normalizes it, then resolves the carrier from the
/// prefix tables. Cheap to clone; the dataset is shared.
pub struct CarrierDetector {
    normalizer: PhoneNormalizer,
    resolver: CarrierResolver,
    max_input_len: usize,
}

impl CarrierDetector {
    /// Detector over the bundled dataset with default settings.
    ///
    /// For more customization, use [`CarrierDetector::builder`].
    pub fn new() -> Result<Self, DetectError> {
        CarrierDetectorBuilder::new().build()
    }

    pub fn builder() -> CarrierDetectorBuilder {
        CarrierDetectorBuilder::new()
    }

    pub fn normalizer(&self) -> &PhoneNormalizer {
        &self.normalizer
    }

    pub fn resolver(&self) -> &CarrierResolver {
        &self.resolver
    }

    pub fn max_input_len(&self) -> usize {
        self.max_input_len
    }

    /// Check `raw` against the input boundary rules.
    pub fn validate(&self, raw: &str) -> Result<RawInput, InputFormatError> {
        RawInput::with_max_len(raw, self.max_input_len)
    }

    /// Validate and resolve `raw` into a verdict.
    ///
    /// Errors:
    /// - [`DetectError::Input`] for disallowed characters or overlong input (nothing
    ///   else runs),
    /// - [`DetectError::Parse`] when the number cannot be normalized.
    pub fn detect(&self, raw: &str) -> Result<CarrierVerdict, DetectError> {
        self.detect_with_hint(raw, None)
    }

    /// Like [`CarrierDetector::detect`], with a region hint for ambiguous numbers.
    pub fn detect_with_hint(
        &self,
        raw: &str,
        country_hint: Option<&str>,
    ) -> Result<CarrierVerdict, DetectError> {
        let input = self.validate(raw)?;
        Ok(self.detect_input(&input, country_hint)?)
    }

    /// Resolve already validated input.
    pub fn detect_input(
        &self,
        input: &RawInput,
        country_hint: Option<&str>,
    ) -> Result<CarrierVerdict, ParseError> {
        let normalized = self.normalizer.normalize(input.as_str(), country_hint)?;
        let Resolution { telco, note, .. } =
            self.resolver.resolve_detailed(input.as_str(), &normalized);

        Ok(CarrierVerdict {
            country: normalized.iso_country().map(str::to_owned),
            number: normalized.e164().to_owned(),
            is_possible: normalized.is_possible(),
            is_valid: normalized.is_valid(),
            telco,
            note,
        })
    }
}
