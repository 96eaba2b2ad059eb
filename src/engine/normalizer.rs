use std::error::Error as StdError;
use std::sync::Arc;

use phonenumber::country;
use phonenumber::metadata::{DATABASE, Descriptors, Metadata};

use crate::domain::NormalizedNumber;

const MAX_CALLING_CODE_LEN: usize = 3;

pub type CapabilityError = Box<dyn StdError + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
/// What a [`PhoneCapability`] reports for a parsed number.
pub struct ParsedPhone {
    /// ISO 3166-1 alpha-2 region, if the number belongs to exactly one.
    pub iso_country: Option<String>,
    /// Calling code digits without `+`.
    pub calling_code: Option<String>,
    pub e164: String,
    pub is_possible: bool,
    pub is_valid: bool,
}

/// External E.164-aware parser and validator.
///
/// `Ok(None)` and `Err(_)` both mean "no usable result".
pub trait PhoneCapability: Send + Sync {
    fn parse(
        &self,
        raw: &str,
        region: Option<&str>,
    ) -> Result<Option<ParsedPhone>, CapabilityError>;
}

#[derive(Debug, Clone, Copy, Default)]
/// [`PhoneCapability`] backed by the `phonenumber` crate.
pub struct LibPhoneNumber;

impl PhoneCapability for LibPhoneNumber {
    fn parse(
        &self,
        raw: &str,
        region: Option<&str>,
    ) -> Result<Option<ParsedPhone>, CapabilityError> {
        let region = region.and_then(|code| match code.parse::<country::Id>() {
            Ok(id) => Some(id),
            Err(_) => {
                log::warn!("ignoring unknown region code: {code}");
                None
            }
        });

        let parsed = phonenumber::parse(region, raw)?;

        let code = parsed.country().code();
        let calling_code = (code != 0).then(|| code.to_string());
        let e164 = phonenumber::format(&parsed)
            .mode(phonenumber::Mode::E164)
            .to_string();
        let is_valid = phonenumber::is_valid(&parsed);
        let iso_country = parsed.country().id().map(|id| format!("{id:?}"));
        let national_len = parsed.national().to_string().len();
        let is_possible =
            is_valid || possible_lengths(iso_country.as_deref(), code).contains(&national_len);

        Ok(Some(ParsedPhone {
            iso_country,
            calling_code,
            e164,
            is_possible,
            is_valid,
        }))
    }
}

/// National number lengths the metadata allows for the region, or for every
/// region sharing the calling code when no single region resolved.
///
/// Local-only lengths are not included. Empty when the code has no metadata.
fn possible_lengths(iso_country: Option<&str>, calling_code: u16) -> Vec<usize> {
    let regions: Vec<&Metadata> = match iso_country.and_then(|id| DATABASE.by_id(id)) {
        Some(metadata) => vec![metadata],
        None => DATABASE.by_code(&calling_code).unwrap_or_default(),
    };

    let mut lengths: Vec<usize> = regions
        .into_iter()
        .flat_map(|metadata| descriptor_lengths(metadata.descriptors()))
        .collect();
    lengths.sort_unstable();
    lengths.dedup();
    lengths
}

fn descriptor_lengths(descriptors: &Descriptors) -> Vec<usize> {
    let typed = [
        descriptors.fixed_line(),
        descriptors.mobile(),
        descriptors.toll_free(),
        descriptors.premium_rate(),
        descriptors.shared_cost(),
        descriptors.personal_number(),
        descriptors.voip(),
        descriptors.pager(),
        descriptors.uan(),
        descriptors.voicemail(),
    ];

    std::iter::once(descriptors.general())
        .chain(typed.into_iter().flatten())
        .flat_map(|descriptor| descriptor.possible_length().iter())
        .map(|&len| usize::from(len))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
/// Normalization failures. Both are recoverable and mean "no verdict".
pub enum ParseError {
    /// The capability returned nothing or failed.
    #[error("phone number could not be parsed: {input:?}")]
    Unparseable {
        input: String,
        reason: Option<String>,
    },

    /// The capability returned a result without a usable calling code.
    #[error("parsed phone number has no usable calling code: {input:?}")]
    Malformed { input: String },
}

#[derive(Clone)]
/// Turns raw text into a [`NormalizedNumber`] through a [`PhoneCapability`].
pub struct PhoneNormalizer {
    capability: Arc<dyn PhoneCapability>,
    fallback_region: Option<String>,
}

impl PhoneNormalizer {
    pub fn new(capability: Arc<dyn PhoneCapability>) -> Self {
        Self {
            capability,
            fallback_region: None,
        }
    }

    /// Region used when the caller gives no usable hint.
    pub fn with_fallback_region(mut self, region: Option<String>) -> Self {
        self.fallback_region = region.as_deref().and_then(usable_region);
        self
    }

    pub fn fallback_region(&self) -> Option<&str> {
        self.fallback_region.as_deref()
    }

    /// Parse and validate `raw`.
    ///
    /// `country_hint` disambiguates numbers whose calling code is shared between
    /// regions (NANP) or that are typed in domestic format.
    pub fn normalize(
        &self,
        raw: &str,
        country_hint: Option<&str>,
    ) -> Result<NormalizedNumber, ParseError> {
        let region = country_hint
            .and_then(usable_region)
            .or_else(|| self.fallback_region.clone());

        let parsed = match self.capability.parse(raw, region.as_deref()) {
            Ok(Some(parsed)) => parsed,
            Ok(None) => {
                log::debug!("no parse result for {raw:?}");
                return Err(ParseError::Unparseable {
                    input: raw.to_owned(),
                    reason: None,
                });
            }
            Err(err) => {
                log::debug!("parsing {raw:?} failed: {err}");
                return Err(ParseError::Unparseable {
                    input: raw.to_owned(),
                    reason: Some(err.to_string()),
                });
            }
        };

        let calling_code = match parsed.calling_code {
            Some(code)
                if (1..=MAX_CALLING_CODE_LEN).contains(&code.len())
                    && code.bytes().all(|b| b.is_ascii_digit()) =>
            {
                code
            }
            other => {
                log::debug!("parse result for {raw:?} has unusable calling code {other:?}");
                return Err(ParseError::Malformed {
                    input: raw.to_owned(),
                });
            }
        };

        Ok(NormalizedNumber::new(
            parsed.iso_country,
            calling_code,
            parsed.e164,
            parsed.is_possible,
            parsed.is_valid,
        ))
    }
}

impl Default for PhoneNormalizer {
    fn default() -> Self {
        Self::new(Arc::new(LibPhoneNumber))
    }
}

fn usable_region(code: &str) -> Option<String> {
    let code = code.trim();
    (code.len() == 2 && code.bytes().all(|b| b.is_ascii_alphabetic()))
        .then(|| code.to_ascii_uppercase())
}
