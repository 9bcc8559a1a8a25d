//! Records being ranked and their ranked counterparts.
//!
//! A record is an ordered attribute list. The subject is a named, required
//! field; every other attribute rides along untouched and is never consulted
//! by the sort.

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default name of the rank column prepended on export.
pub const DEFAULT_RANK_COLUMN: &str = "rank";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("record must have at least one attribute (the subject)")]
    Empty,
}

/// One named value in a record.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: Value,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Value rendered for display or tabular export.
    ///
    /// Strings are emitted without quotes; null becomes an empty cell.
    pub fn display_value(&self) -> String {
        display_value(&self.value)
    }
}

pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// An item being ranked.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    subject: Attribute,
    amplifying: Vec<Attribute>,
}

impl Record {
    pub fn new(subject: Attribute, amplifying: Vec<Attribute>) -> Self {
        Self {
            subject,
            amplifying,
        }
    }

    /// Record with only a subject attribute.
    pub fn subject_only(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(Attribute::new(name, value), Vec::new())
    }

    /// Build from attributes in order; the first becomes the subject.
    pub fn from_attributes(attributes: Vec<Attribute>) -> Result<Self, RecordError> {
        let mut iter = attributes.into_iter();
        let subject = iter.next().ok_or(RecordError::Empty)?;
        Ok(Self {
            subject,
            amplifying: iter.collect(),
        })
    }

    pub fn subject(&self) -> &Attribute {
        &self.subject
    }

    pub fn amplifying(&self) -> &[Attribute] {
        &self.amplifying
    }

    /// All attributes, subject first, in original order.
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        std::iter::once(&self.subject).chain(self.amplifying.iter())
    }

    pub fn len(&self) -> usize {
        1 + self.amplifying.len()
    }

    /// Always false; a record cannot exist without its subject.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Look up an attribute value by name (first match wins).
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes()
            .find(|a| a.name == name)
            .map(|a| &a.value)
    }
}

impl TryFrom<Map<String, Value>> for Record {
    type Error = RecordError;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        Record::from_attributes(
            map.into_iter()
                .map(|(name, value)| Attribute { name, value })
                .collect(),
        )
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for attr in self.attributes() {
            map.serialize_entry(&attr.name, &attr.value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        Record::try_from(map).map_err(de::Error::custom)
    }
}

/// A record with its 1-based position in the final order.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedRecord {
    pub rank: usize,
    pub record: Record,
}

impl RankedRecord {
    /// Ordered map with the rank column first, then the record's attributes.
    pub fn to_map(&self, rank_column: &str) -> Map<String, Value> {
        let mut map = Map::with_capacity(self.record.len() + 1);
        map.insert(rank_column.to_string(), Value::from(self.rank));
        for attr in self.record.attributes() {
            // A record column with the rank column's name must not displace the rank.
            if attr.name == rank_column {
                continue;
            }
            map.entry(attr.name.clone())
                .or_insert_with(|| attr.value.clone());
        }
        map
    }
}

impl Serialize for RankedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_map(DEFAULT_RANK_COLUMN).serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_attributes_keeps_first_as_subject() {
        let record = Record::from_attributes(vec![
            Attribute::new("Movie Title", "Chamber of Secrets"),
            Attribute::new("Release Year", 2002),
        ])
        .unwrap();
        assert_eq!(record.subject().name, "Movie Title");
        assert_eq!(record.amplifying().len(), 1);
        assert_eq!(record.get("Release Year"), Some(&Value::from(2002)));
    }

    #[test]
    fn from_attributes_rejects_empty() {
        assert_eq!(Record::from_attributes(vec![]), Err(RecordError::Empty));
    }

    #[test]
    fn deserialize_preserves_column_order() {
        let raw = r#"{"Title": "Prisoner of Azkaban", "Year": 2004, "Minutes": 142}"#;
        let record: Record = serde_json::from_str(raw).unwrap();
        let names: Vec<&str> = record.attributes().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Title", "Year", "Minutes"]);
        assert_eq!(record.subject().display_value(), "Prisoner of Azkaban");
    }

    #[test]
    fn deserialize_rejects_empty_object() {
        assert!(serde_json::from_str::<Record>("{}").is_err());
    }

    #[test]
    fn ranked_record_serializes_rank_first() {
        let ranked = RankedRecord {
            rank: 2,
            record: Record::new(
                Attribute::new("Title", "X"),
                vec![Attribute::new("Note", "y")],
            ),
        };
        let json = serde_json::to_string(&ranked).unwrap();
        assert_eq!(json, r#"{"rank":2,"Title":"X","Note":"y"}"#);
    }

    #[test]
    fn to_map_uses_custom_rank_column() {
        let ranked = RankedRecord {
            rank: 1,
            record: Record::subject_only("Title", "X"),
        };
        let map = ranked.to_map("Mob Rank");
        let keys: Vec<&String> = map.keys().collect();
        assert_eq!(keys, vec!["Mob Rank", "Title"]);
    }

    #[test]
    fn rank_named_column_is_dropped_not_duplicated() {
        let ranked = RankedRecord {
            rank: 1,
            record: Record::new(
                Attribute::new("rank", "orig"),
                vec![Attribute::new("t", "x")],
            ),
        };
        let json = serde_json::to_string(&ranked).unwrap();
        assert_eq!(json, r#"{"rank":1,"t":"x"}"#);

        let map = ranked.to_map("t");
        assert_eq!(
            serde_json::to_string(&map).unwrap(),
            r#"{"t":1,"rank":"orig"}"#
        );
    }
}
