//! Dataset layer: the static per-country carrier prefix tables.
//!
//! The dataset is an ordered JSON object of country label to an ordered object of
//! carrier name to prefix list. Each country may carry one `"Note"` disclaimer that
//! never takes part in matching. Order of carriers and of prefixes is kept exactly as
//! written, because the first match wins during resolution.

use std::collections::BTreeMap;

use crate::domain::DatasetKey;

mod decode;

/// Reserved per-country key holding a human-readable disclaimer.
pub const NOTE_KEY: &str = "Note";

/// Table that [`DatasetKey::NANP`] resolves to.
const NANP_TABLE: &str = "USA";

const BUILTIN_JSON: &str = include_str!("telcos.json");

#[derive(Debug, thiserror::Error)]
/// Errors raised while loading a prefix dataset.
pub enum DatasetError {
    #[error("invalid dataset JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("dataset must be a JSON object of countries, found {found}")]
    NotAnObject { found: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One entry of a country table, classified at load time.
pub enum CarrierEntry {
    /// Carrier with its ordered list of domestic prefixes.
    WellFormed {
        carrier: String,
        prefixes: Vec<String>,
    },
    /// Entry whose value is not a list of digit strings; skipped when matching.
    Malformed { carrier: String, reason: String },
    /// The reserved disclaimer.
    Note(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountryTable {
    WellFormed(Vec<CarrierEntry>),
    Malformed { reason: String },
}

impl CountryTable {
    /// Entries in dataset order, or `None` for a malformed table.
    pub fn entries(&self) -> Option<&[CarrierEntry]> {
        match self {
            Self::WellFormed(entries) => Some(entries),
            Self::Malformed { .. } => None,
        }
    }

    pub fn note(&self) -> Option<&str> {
        self.entries()?.iter().find_map(|entry| match entry {
            CarrierEntry::Note(text) => Some(text.as_str()),
            _ => None,
        })
    }

    /// Names of well-formed carriers, in dataset order.
    pub fn carriers(&self) -> impl Iterator<Item = &str> {
        self.entries()
            .unwrap_or_default()
            .iter()
            .filter_map(|entry| match entry {
                CarrierEntry::WellFormed { carrier, .. } => Some(carrier.as_str()),
                _ => None,
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable carrier prefix dataset, keyed by [`DatasetKey`].
///
/// Load it once and share it (e.g. behind an `Arc`); nothing mutates it afterwards.
pub struct PrefixTable {
    countries: BTreeMap<DatasetKey, CountryTable>,
}

impl PrefixTable {
    /// Decode the dataset bundled with the crate.
    pub fn builtin() -> Result<Self, DatasetError> {
        Self::from_json_str(BUILTIN_JSON)
    }

    /// Decode a dataset in the bundled format.
    ///
    /// Malformed countries and entries are kept (and reported during resolution);
    /// only a document that is not a JSON object is rejected.
    pub fn from_json_str(json: &str) -> Result<Self, DatasetError> {
        let countries = decode::decode_prefix_table(json)?;
        log::debug!("loaded prefix dataset with {} countries", countries.len());
        Ok(Self { countries })
    }

    /// Look up a country table. [`DatasetKey::NANP`] is an alias for the USA table.
    pub fn get(&self, key: &DatasetKey) -> Option<&CountryTable> {
        if key.as_str() == DatasetKey::NANP {
            return self.countries.get(&DatasetKey::new(NANP_TABLE));
        }
        self.countries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &DatasetKey> {
        self.countries.keys()
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_dataset_decodes_without_malformed_entries() {
        let table = PrefixTable::builtin().unwrap();
        assert_eq!(table.len(), 9);
        for key in table.keys() {
            let country = table.get(key).unwrap();
            let entries = country.entries().unwrap();
            assert!(
                !entries
                    .iter()
                    .any(|entry| matches!(entry, CarrierEntry::Malformed { .. })),
                "malformed entry in {key}"
            );
            assert!(country.note().is_some(), "missing note for {key}");
        }
    }

    #[test]
    fn builtin_ghana_lists_mtn_before_airteltigo() {
        let table = PrefixTable::builtin().unwrap();
        let ghana = table.get(&DatasetKey::new("Ghana")).unwrap();
        assert_eq!(
            ghana.carriers().collect::<Vec<_>>(),
            ["MTN", "Vodafone", "AirtelTigo"]
        );
    }

    #[test]
    fn nanp_resolves_to_usa_table() {
        let table = PrefixTable::builtin().unwrap();
        let usa = table.get(&DatasetKey::new("USA")).unwrap();
        assert_eq!(table.get(&DatasetKey::nanp()), Some(usa));
        assert_eq!(usa.carriers().count(), 0);
    }

    #[test]
    fn unknown_key_is_absent() {
        let table = PrefixTable::builtin().unwrap();
        assert!(table.get(&DatasetKey::new("FR")).is_none());
    }

    #[test]
    fn malformed_table_has_no_carriers_or_note() {
        let table = PrefixTable::from_json_str(r#"{ "X": "oops" }"#).unwrap();
        let country = table.get(&DatasetKey::new("X")).unwrap();
        assert_eq!(country.carriers().count(), 0);
        assert_eq!(country.note(), None);
    }
}
