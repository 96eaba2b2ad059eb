use std::collections::BTreeMap;

use serde_json::Value;

use crate::dataset::{CarrierEntry, CountryTable, DatasetError, NOTE_KEY};
use crate::domain::DatasetKey;

pub fn decode_prefix_table(json: &str) -> Result<BTreeMap<DatasetKey, CountryTable>, DatasetError> {
    let value: Value = serde_json::from_str(json)?;
    let countries = match value {
        Value::Object(countries) => countries,
        other => {
            return Err(DatasetError::NotAnObject {
                found: kind(&other),
            });
        }
    };

    Ok(countries
        .into_iter()
        .map(|(name, table)| (DatasetKey::new(name), decode_country(table)))
        .collect())
}

fn decode_country(value: Value) -> CountryTable {
    match value {
        // `preserve_order` keeps the map in source order, which the resolver relies on.
        Value::Object(entries) => CountryTable::WellFormed(
            entries
                .into_iter()
                .map(|(name, entry)| decode_entry(name, entry))
                .collect(),
        ),
        other => CountryTable::Malformed {
            reason: format!("expected an object of carriers, found {}", kind(&other)),
        },
    }
}

fn decode_entry(name: String, value: Value) -> CarrierEntry {
    match value {
        Value::String(text) if name == NOTE_KEY => CarrierEntry::Note(text),
        Value::Array(items) if name != NOTE_KEY => match decode_prefixes(items) {
            Ok(prefixes) => CarrierEntry::WellFormed {
                carrier: name,
                prefixes,
            },
            Err(reason) => CarrierEntry::Malformed {
                carrier: name,
                reason,
            },
        },
        other => {
            let expected = if name == NOTE_KEY {
                "a disclaimer string"
            } else {
                "a list of prefixes"
            };
            CarrierEntry::Malformed {
                carrier: name,
                reason: format!("expected {expected}, found {}", kind(&other)),
            }
        }
    }
}

fn decode_prefixes(items: Vec<Value>) -> Result<Vec<String>, String> {
    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| match item {
            Value::String(prefix)
                if !prefix.is_empty() && prefix.bytes().all(|b| b.is_ascii_digit()) =>
            {
                Ok(prefix)
            }
            other => Err(format!("prefix #{idx} is not a digit string: {other}")),
        })
        .collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_one(json: &str) -> CountryTable {
        let mut tables = decode_prefix_table(json).unwrap();
        assert_eq!(tables.len(), 1);
        tables.pop_first().unwrap().1
    }

    #[test]
    fn keeps_carrier_and_prefix_order() {
        let table = decode_one(r#"{ "X": { "Zed": ["09", "01"], "Alpha": ["05"] } }"#);
        assert_eq!(
            table.entries().unwrap(),
            &[
                CarrierEntry::WellFormed {
                    carrier: "Zed".to_owned(),
                    prefixes: vec!["09".to_owned(), "01".to_owned()],
                },
                CarrierEntry::WellFormed {
                    carrier: "Alpha".to_owned(),
                    prefixes: vec!["05".to_owned()],
                },
            ]
        );
    }

    #[test]
    fn note_string_becomes_metadata() {
        let table = decode_one(r#"{ "X": { "A": ["01"], "Note": "ported numbers" } }"#);
        assert_eq!(table.note(), Some("ported numbers"));
        assert!(matches!(
            table.entries().unwrap()[1],
            CarrierEntry::Note(ref text) if text == "ported numbers"
        ));
    }

    #[test]
    fn non_list_carrier_is_malformed() {
        let table = decode_one(r#"{ "X": { "A": "0803", "B": 42 } }"#);
        let entries = table.entries().unwrap();
        assert!(matches!(
            &entries[0],
            CarrierEntry::Malformed { carrier, reason }
                if carrier == "A" && reason == "expected a list of prefixes, found a string"
        ));
        assert!(matches!(&entries[1], CarrierEntry::Malformed { carrier, .. } if carrier == "B"));
    }

    #[test]
    fn non_digit_prefix_makes_entry_malformed() {
        let table = decode_one(r#"{ "X": { "A": ["080", "08a"], "B": ["07", 7] } }"#);
        let entries = table.entries().unwrap();
        assert!(matches!(
            &entries[0],
            CarrierEntry::Malformed { reason, .. } if reason.starts_with("prefix #1")
        ));
        assert!(matches!(&entries[1], CarrierEntry::Malformed { .. }));
    }

    #[test]
    fn note_key_never_becomes_a_carrier() {
        let table = decode_one(r#"{ "X": { "Note": ["0803"] } }"#);
        assert!(matches!(
            &table.entries().unwrap()[0],
            CarrierEntry::Malformed { carrier, .. } if carrier == NOTE_KEY
        ));
        assert_eq!(table.note(), None);
    }

    #[test]
    fn country_that_is_not_an_object_is_malformed() {
        let table = decode_one(r#"{ "X": ["0803"] }"#);
        assert!(matches!(table, CountryTable::Malformed { .. }));
        assert!(table.entries().is_none());
    }

    #[test]
    fn top_level_must_be_an_object() {
        assert!(matches!(
            decode_prefix_table("[]"),
            Err(DatasetError::NotAnObject { found: "a list" })
        ));
        assert!(matches!(
            decode_prefix_table("{ nope"),
            Err(DatasetError::Json(_))
        ));
    }
}
