use std::fmt;
use std::sync::Arc;

use crate::dataset::{CarrierEntry, CountryTable, PrefixTable};
use crate::domain::{DatasetKey, NormalizedNumber, Telco};
use crate::engine::mapper::CountryKeyMapper;

/// Trunk prefix substituted for the calling code when re-localizing.
const TRUNK_PREFIX: &str = "0";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Why a lookup degraded. Recorded and logged, never raised.
pub enum LookupDiagnostic {
    /// The calling code is not a prefix of the typed digits (usually partial input).
    CallingCodeMisaligned {
        calling_code: String,
        cleaned: String,
    },
    MissingTable {
        key: DatasetKey,
    },
    MalformedTable {
        key: DatasetKey,
        reason: String,
    },
    MalformedEntry {
        key: DatasetKey,
        carrier: String,
        reason: String,
    },
    NoMatchingPrefix {
        key: DatasetKey,
        local: String,
    },
}

impl fmt::Display for LookupDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CallingCodeMisaligned {
                calling_code,
                cleaned,
            } => write!(
                f,
                "calling code {calling_code} does not prefix {cleaned}; matching digits as typed"
            ),
            Self::MissingTable { key } => write!(f, "no prefix table for {key}"),
            Self::MalformedTable { key, reason } => {
                write!(f, "prefix table for {key} is malformed: {reason}")
            }
            Self::MalformedEntry {
                key,
                carrier,
                reason,
            } => write!(f, "skipping malformed entry {key}/{carrier}: {reason}"),
            Self::NoMatchingPrefix { key, local } => {
                write!(f, "no prefix in {key} matches {local}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Full outcome of a resolution, for callers that want more than the telco.
pub struct Resolution {
    pub telco: Telco,
    pub key: DatasetKey,
    /// Domestic-format digits the prefixes were matched against.
    pub local_number: String,
    /// Disclaimer of the matched country table, if any.
    pub note: Option<String>,
    pub diagnostics: Vec<LookupDiagnostic>,
}

#[derive(Debug, Clone)]
/// Deterministic prefix matcher over an injected [`PrefixTable`].
///
/// Overlapping prefixes are not disambiguated: the first carrier in table order,
/// then the first matching prefix in its list, wins.
pub struct CarrierResolver {
    table: Arc<PrefixTable>,
    mapper: CountryKeyMapper,
}

impl CarrierResolver {
    pub fn new(table: Arc<PrefixTable>) -> Self {
        Self {
            table,
            mapper: CountryKeyMapper::default(),
        }
    }

    pub fn with_mapper(mut self, mapper: CountryKeyMapper) -> Self {
        self.mapper = mapper;
        self
    }

    pub fn table(&self) -> &PrefixTable {
        &self.table
    }

    pub fn mapper(&self) -> &CountryKeyMapper {
        &self.mapper
    }

    pub fn resolve(&self, raw: &str, normalized: &NormalizedNumber) -> Telco {
        self.resolve_detailed(raw, normalized).telco
    }

    pub fn resolve_detailed(&self, raw: &str, normalized: &NormalizedNumber) -> Resolution {
        let mut diagnostics = Vec::new();

        let cleaned: String = raw.chars().filter(char::is_ascii_digit).collect();
        let calling_code = normalized.calling_code();
        let local_number = if cleaned.starts_with(calling_code) {
            format!("{TRUNK_PREFIX}{}", &cleaned[calling_code.len()..])
        } else {
            diagnostics.push(LookupDiagnostic::CallingCodeMisaligned {
                calling_code: calling_code.to_owned(),
                cleaned: cleaned.clone(),
            });
            cleaned
        };

        let key = self.mapper.key_for(normalized);
        let (telco, note) = match self.table.get(&key) {
            None => {
                diagnostics.push(LookupDiagnostic::MissingTable { key: key.clone() });
                (Telco::Unknown, None)
            }
            Some(table) => match table {
                CountryTable::Malformed { reason } => {
                    diagnostics.push(LookupDiagnostic::MalformedTable {
                        key: key.clone(),
                        reason: reason.clone(),
                    });
                    (Telco::Unknown, None)
                }
                CountryTable::WellFormed(entries) => {
                    let telco = match_prefix(&key, entries, &local_number, &mut diagnostics);
                    (telco, table.note().map(str::to_owned))
                }
            },
        };

        for diagnostic in &diagnostics {
            match diagnostic {
                LookupDiagnostic::MalformedTable { .. } | LookupDiagnostic::MalformedEntry { .. } => {
                    log::warn!("{diagnostic}")
                }
                _ => log::debug!("{diagnostic}"),
            }
        }

        Resolution {
            telco,
            key,
            local_number,
            note,
            diagnostics,
        }
    }
}

fn match_prefix(
    key: &DatasetKey,
    entries: &[CarrierEntry],
    local: &str,
    diagnostics: &mut Vec<LookupDiagnostic>,
) -> Telco {
    for entry in entries {
        match entry {
            CarrierEntry::WellFormed { carrier, prefixes } => {
                if prefixes.iter().any(|prefix| local.starts_with(prefix.as_str())) {
                    return Telco::Carrier(carrier.clone());
                }
            }
            CarrierEntry::Malformed { carrier, reason } => {
                diagnostics.push(LookupDiagnostic::MalformedEntry {
                    key: key.clone(),
                    carrier: carrier.clone(),
                    reason: reason.clone(),
                });
            }
            CarrierEntry::Note(_) => {}
        }
    }

    diagnostics.push(LookupDiagnostic::NoMatchingPrefix {
        key: key.clone(),
        local: local.to_owned(),
    });
    Telco::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(iso: Option<&str>, code: &str, e164: &str) -> NormalizedNumber {
        NormalizedNumber::new(
            iso.map(str::to_owned),
            code.to_owned(),
            e164.to_owned(),
            true,
            true,
        )
    }

    fn builtin() -> CarrierResolver {
        CarrierResolver::new(Arc::new(PrefixTable::builtin().unwrap()))
    }

    fn custom(json: &str) -> CarrierResolver {
        CarrierResolver::new(Arc::new(PrefixTable::from_json_str(json).unwrap()))
            .with_mapper(CountryKeyMapper::empty().with_entry("XX", "Test"))
    }

    fn carrier(name: &str) -> Telco {
        Telco::Carrier(name.to_owned())
    }

    #[test]
    fn nigerian_number_relocalizes_and_matches_mtn() {
        let resolution = builtin().resolve_detailed(
            "+2348031234567",
            &number(Some("NG"), "234", "+2348031234567"),
        );
        assert_eq!(resolution.local_number, "08031234567");
        assert_eq!(resolution.key.as_str(), "Nigeria");
        assert_eq!(resolution.telco, carrier("MTN"));
        assert!(resolution.diagnostics.is_empty());
        assert!(resolution.note.unwrap().contains("2013"));
    }

    #[test]
    fn kenyan_number_matches_safaricom() {
        let telco = builtin().resolve(
            "+254701234567",
            &number(Some("KE"), "254", "+254701234567"),
        );
        assert_eq!(telco, carrier("Safaricom"));
    }

    #[test]
    fn overlapping_prefix_goes_to_first_listed_carrier() {
        let resolver = builtin();
        let ghana = number(Some("GH"), "233", "+233571234567");
        assert_eq!(resolver.resolve("+233571234567", &ghana), carrier("MTN"));

        // 0901 is listed under both Airtel and 9Mobile.
        let nigeria = number(Some("NG"), "234", "+2349011234567");
        assert_eq!(resolver.resolve("+2349011234567", &nigeria), carrier("Airtel"));
    }

    #[test]
    fn prefixes_are_matched_literally_without_length_normalization() {
        let resolver = custom(r#"{ "Test": { "Long": ["0803"], "Short": ["080"] } }"#);
        let n = number(Some("XX"), "9", "+9803");
        assert_eq!(resolver.resolve("98031", &n), carrier("Long"));
        assert_eq!(resolver.resolve("98051", &n), carrier("Short"));
    }

    #[test]
    fn spaces_and_plus_are_stripped_before_matching() {
        let telco = builtin().resolve(
            "+234 803 123 4567",
            &number(Some("NG"), "234", "+2348031234567"),
        );
        assert_eq!(telco, carrier("MTN"));
    }

    #[test]
    fn misaligned_calling_code_matches_digits_as_typed() {
        let resolution = builtin().resolve_detailed(
            "08031234567",
            &number(Some("NG"), "234", "+2348031234567"),
        );
        assert_eq!(resolution.local_number, "08031234567");
        assert_eq!(resolution.telco, carrier("MTN"));
        assert_eq!(
            resolution.diagnostics,
            vec![LookupDiagnostic::CallingCodeMisaligned {
                calling_code: "234".to_owned(),
                cleaned: "08031234567".to_owned(),
            }]
        );
    }

    #[test]
    fn country_without_table_is_unknown() {
        let resolution =
            builtin().resolve_detailed("+33612345678", &number(Some("FR"), "33", "+33612345678"));
        assert_eq!(resolution.telco, Telco::Unknown);
        assert_eq!(resolution.note, None);
        assert_eq!(
            resolution.diagnostics,
            vec![LookupDiagnostic::MissingTable {
                key: DatasetKey::new("FR")
            }]
        );
    }

    #[test]
    fn nanp_without_region_uses_usa_table_and_stays_unknown() {
        let resolution =
            builtin().resolve_detailed("+12015550123", &number(None, "1", "+12015550123"));
        assert_eq!(resolution.key, DatasetKey::nanp());
        assert_eq!(resolution.telco, Telco::Unknown);
        assert!(resolution.note.is_some());
        assert!(matches!(
            resolution.diagnostics.as_slice(),
            [LookupDiagnostic::NoMatchingPrefix { .. }]
        ));
    }

    #[test]
    fn exhausted_table_is_unknown() {
        let telco = builtin().resolve(
            "+2341111234567",
            &number(Some("NG"), "234", "+2341111234567"),
        );
        assert_eq!(telco, Telco::Unknown);
    }

    #[test]
    fn malformed_table_is_unknown() {
        let resolution = custom(r#"{ "Test": ["0803"] }"#)
            .resolve_detailed("9803", &number(Some("XX"), "9", "+9803"));
        assert_eq!(resolution.telco, Telco::Unknown);
        assert!(matches!(
            resolution.diagnostics.as_slice(),
            [LookupDiagnostic::MalformedTable { .. }]
        ));
    }

    #[test]
    fn malformed_entry_is_skipped_with_diagnostic() {
        let resolver = custom(
            r#"{ "Test": { "Broken": "0803", "Note": "disclaimer", "Good": ["0803"] } }"#,
        );
        let resolution = resolver.resolve_detailed("98031", &number(Some("XX"), "9", "+98031"));
        assert_eq!(resolution.telco, carrier("Good"));
        assert_eq!(resolution.note.as_deref(), Some("disclaimer"));
        assert_eq!(
            resolution.diagnostics,
            vec![LookupDiagnostic::MalformedEntry {
                key: DatasetKey::new("Test"),
                carrier: "Broken".to_owned(),
                reason: "expected a list of prefixes, found a string".to_owned(),
            }]
        );
    }

    #[test]
    fn resolution_is_idempotent() {
        let resolver = builtin();
        let n = number(Some("GH"), "233", "+233241234567");
        let first = resolver.resolve_detailed("+233241234567", &n);
        let second = resolver.resolve_detailed("+233241234567", &n);
        assert_eq!(first, second);
        assert_eq!(first.telco, carrier("MTN"));
    }
}
