use std::fmt;

use serde::{Serialize, Serializer};

use crate::domain::validation::InputFormatError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Text typed by the user, restricted at the boundary.
///
/// Invariant: only ASCII digits, whitespace and `+`; at most `max_len` characters.
/// The value is kept as typed (no trimming) since spaces are legal separators.
pub struct RawInput(String);

impl RawInput {
    /// Default maximum length accepted at the input boundary.
    pub const MAX_LEN: usize = 20;

    /// Validate `value` against the character set and [`RawInput::MAX_LEN`].
    pub fn new(value: impl Into<String>) -> Result<Self, InputFormatError> {
        Self::with_max_len(value, Self::MAX_LEN)
    }

    /// Validate `value` against the character set and a custom maximum length.
    pub fn with_max_len(value: impl Into<String>, max_len: usize) -> Result<Self, InputFormatError> {
        let value = value.into();
        if let Some((position, ch)) = value.chars().enumerate().find(|(_, ch)| !is_allowed(*ch)) {
            return Err(InputFormatError::DisallowedCharacter { ch, position });
        }
        let actual = value.chars().count();
        if actual > max_len {
            return Err(InputFormatError::TooLong {
                max: max_len,
                actual,
            });
        }
        Ok(Self(value))
    }

    /// Borrow the input as typed.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` when the input holds nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

fn is_allowed(ch: char) -> bool {
    ch == '+' || ch.is_ascii_digit() || ch.is_whitespace()
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Structured, validated representation of a phone number.
///
/// Only the normalizer builds these; downstream code reads them.
pub struct NormalizedNumber {
    iso_country: Option<String>,
    calling_code: String,
    e164: String,
    is_possible: bool,
    is_valid: bool,
}

impl NormalizedNumber {
    pub(crate) fn new(
        iso_country: Option<String>,
        calling_code: String,
        e164: String,
        is_possible: bool,
        is_valid: bool,
    ) -> Self {
        Self {
            iso_country,
            calling_code,
            e164,
            is_possible,
            is_valid,
        }
    }

    /// ISO 3166-1 alpha-2 region, when the number maps to exactly one.
    pub fn iso_country(&self) -> Option<&str> {
        self.iso_country.as_deref()
    }

    /// Country calling code as 1-3 digits, without `+`.
    pub fn calling_code(&self) -> &str {
        &self.calling_code
    }

    pub fn e164(&self) -> &str {
        &self.e164
    }

    pub fn is_possible(&self) -> bool {
        self.is_possible
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Name of a country table in the prefix dataset (`"Nigeria"`, `"UK"`).
pub struct DatasetKey(String);

impl DatasetKey {
    /// Placeholder for North American numbers with no single ISO region.
    pub const NANP: &'static str = "NANP";
    /// Key used when no region could be derived at all.
    pub const UNKNOWN_REGION: &'static str = "ZZ";

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn nanp() -> Self {
        Self::new(Self::NANP)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Outcome of carrier resolution.
///
/// [`Telco::Unknown`] means "lookup not available" and must not be rendered as a carrier.
pub enum Telco {
    Carrier(String),
    Unknown,
}

impl Telco {
    /// Wire label for [`Telco::Unknown`].
    pub const UNKNOWN_LABEL: &'static str = "Unknown";

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Carrier name, if one was resolved.
    pub fn carrier(&self) -> Option<&str> {
        match self {
            Self::Carrier(name) => Some(name),
            Self::Unknown => None,
        }
    }

    pub fn as_str(&self) -> &str {
        self.carrier().unwrap_or(Self::UNKNOWN_LABEL)
    }
}

impl fmt::Display for Telco {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Telco {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Record handed to the presentation layer.
///
/// `is_possible`/`is_valid` come from number validation alone; a valid number may
/// still carry [`Telco::Unknown`].
pub struct CarrierVerdict {
    /// ISO region of the number (`"NG"`), absent for non-geographic numbers.
    ///
    /// Serialized as `null` when absent. Presentation shows that as the
    /// `"Unknown"` label; see [`CarrierVerdict::country_label`].
    pub country: Option<String>,
    /// E.164 form of the number.
    pub number: String,
    pub is_possible: bool,
    pub is_valid: bool,
    pub telco: Telco,
    /// Disclaimer attached to the country's prefix table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl CarrierVerdict {
    /// Country as displayed: the ISO region, or `"Unknown"` when there is none.
    pub fn country_label(&self) -> &str {
        self.country.as_deref().unwrap_or(Telco::UNKNOWN_LABEL)
    }
}
