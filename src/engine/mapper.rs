use std::collections::BTreeMap;

use crate::domain::{DatasetKey, NormalizedNumber};

const NANP_CALLING_CODE: &str = "1";

/// ISO codes whose dataset label differs from the code itself.
const DEFAULT_KEYS: &[(&str, &str)] = &[
    ("NG", "Nigeria"),
    ("KE", "Kenya"),
    ("GH", "Ghana"),
    ("US", "USA"),
    ("GB", "UK"),
    ("ZA", "SouthAfrica"),
    ("UG", "Uganda"),
    ("ZM", "Zambia"),
    ("TZ", "Tanzania"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
/// Projects an ISO 3166-1 alpha-2 code onto a prefix-table key.
///
/// Codes without an entry pass through unchanged; whether a table exists for them
/// is the resolver's concern.
pub struct CountryKeyMapper {
    keys: BTreeMap<String, String>,
}

impl CountryKeyMapper {
    /// Mapper with no explicit entries (pure identity).
    pub fn empty() -> Self {
        Self {
            keys: BTreeMap::new(),
        }
    }

    /// Add or replace an entry.
    pub fn with_entry(mut self, iso: impl Into<String>, key: impl Into<String>) -> Self {
        self.keys
            .insert(iso.into().to_ascii_uppercase(), key.into());
        self
    }

    pub fn to_dataset_key(&self, iso_country: Option<&str>, calling_code: &str) -> DatasetKey {
        match iso_country {
            Some(iso) => match self.keys.get(&iso.to_ascii_uppercase()) {
                Some(key) => DatasetKey::new(key.as_str()),
                None => DatasetKey::new(iso),
            },
            None if calling_code == NANP_CALLING_CODE => DatasetKey::nanp(),
            None => DatasetKey::new(DatasetKey::UNKNOWN_REGION),
        }
    }

    pub fn key_for(&self, number: &NormalizedNumber) -> DatasetKey {
        self.to_dataset_key(number.iso_country(), number.calling_code())
    }
}

impl Default for CountryKeyMapper {
    fn default() -> Self {
        DEFAULT_KEYS
            .iter()
            .fold(Self::empty(), |mapper, (iso, key)| mapper.with_entry(*iso, *key))
    }
}
