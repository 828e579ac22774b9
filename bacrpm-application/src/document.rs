//! Flat named result document

use bacrpm_core::datatypes::ApplicationValue;
use indexmap::IndexMap;
use serde::ser::{Serialize, Serializer};
use std::fmt;

/// A property value reduced to what the result document can carry
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedValue {
    Null,
    Bool(bool),
    UnsignedInt(u64),
    SignedInt(i64),
    Real32(f32),
    Real64(f64),
    Enumerated(u32),
    /// Display form of every other value
    Opaque(String),
}

impl From<&ApplicationValue> for DecodedValue {
    fn from(value: &ApplicationValue) -> Self {
        match value {
            ApplicationValue::Null => DecodedValue::Null,
            ApplicationValue::Boolean(b) => DecodedValue::Bool(*b),
            ApplicationValue::Unsigned(u) => DecodedValue::UnsignedInt(*u),
            ApplicationValue::Signed(i) => DecodedValue::SignedInt(*i),
            ApplicationValue::Real(f) => DecodedValue::Real32(*f),
            ApplicationValue::Double(f) => DecodedValue::Real64(*f),
            ApplicationValue::Enumerated(e) => DecodedValue::Enumerated(*e),
            other => DecodedValue::Opaque(other.to_string()),
        }
    }
}

impl Serialize for DecodedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DecodedValue::Null => serializer.serialize_unit(),
            DecodedValue::Bool(b) => serializer.serialize_bool(*b),
            DecodedValue::UnsignedInt(u) => serializer.serialize_u64(*u),
            DecodedValue::SignedInt(i) => serializer.serialize_i64(*i),
            DecodedValue::Real32(f) => serializer.serialize_f32(*f),
            DecodedValue::Real64(f) => serializer.serialize_f64(*f),
            DecodedValue::Enumerated(e) => serializer.serialize_u32(*e),
            DecodedValue::Opaque(text) => serializer.serialize_str(text),
        }
    }
}

impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedValue::Null => f.write_str("null"),
            DecodedValue::Bool(b) => write!(f, "{}", b),
            DecodedValue::UnsignedInt(u) => write!(f, "{}", u),
            DecodedValue::SignedInt(i) => write!(f, "{}", i),
            DecodedValue::Real32(v) => write!(f, "{}", v),
            DecodedValue::Real64(v) => write!(f, "{}", v),
            DecodedValue::Enumerated(e) => write!(f, "{}", e),
            DecodedValue::Opaque(text) => f.write_str(text),
        }
    }
}

/// Value of one document field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Single(DecodedValue),
    Array(Vec<DecodedValue>),
}

impl FieldValue {
    /// One value stays scalar; none or several become an array
    pub fn from_values(mut values: Vec<DecodedValue>) -> Self {
        if values.len() == 1 {
            if let Some(value) = values.pop() {
                return FieldValue::Single(value);
            }
        }
        FieldValue::Array(values)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Single(value) => value.serialize(serializer),
            FieldValue::Array(values) => values.serialize(serializer),
        }
    }
}

/// Ordered mapping of field names to values
///
/// A repeated field keeps its first position and takes the latest value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultDocument {
    fields: IndexMap<String, FieldValue>,
}

impl ResultDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: String, value: FieldValue) {
        if let Some(previous) = self.fields.insert(name, value) {
            log::debug!("Field value {:?} replaced", previous);
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for ResultDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bacrpm_core::datatypes::Date;

    #[test]
    fn test_tag_mapping() {
        assert_eq!(DecodedValue::from(&ApplicationValue::Real(21.5)), DecodedValue::Real32(21.5));
        assert_eq!(DecodedValue::from(&ApplicationValue::Enumerated(1)), DecodedValue::Enumerated(1));
        assert_eq!(DecodedValue::from(&ApplicationValue::Null), DecodedValue::Null);
        assert_eq!(
            DecodedValue::from(&ApplicationValue::CharacterString("Lobby".to_string())),
            DecodedValue::Opaque("\"Lobby\"".to_string())
        );
        let date = Date::new(Some(2011), 1, 24, 1).unwrap();
        assert_eq!(
            DecodedValue::from(&ApplicationValue::Date(date)),
            DecodedValue::Opaque("Monday, January 24, 2011".to_string())
        );
    }

    #[test]
    fn test_field_value_shape() {
        assert_eq!(
            FieldValue::from_values(vec![DecodedValue::Bool(true)]),
            FieldValue::Single(DecodedValue::Bool(true))
        );
        assert_eq!(FieldValue::from_values(vec![]), FieldValue::Array(vec![]));
        match FieldValue::from_values(vec![DecodedValue::Null, DecodedValue::Null]) {
            FieldValue::Array(values) => assert_eq!(values.len(), 2),
            other => panic!("unexpected shape {:?}", other),
        }
    }

    #[test]
    fn test_serialize_document() {
        let mut document = ResultDocument::new();
        document.insert("b".to_string(), FieldValue::Single(DecodedValue::Real32(21.5)));
        document.insert("a".to_string(), FieldValue::Single(DecodedValue::Null));
        document.insert(
            "c".to_string(),
            FieldValue::Array(vec![DecodedValue::SignedInt(-1), DecodedValue::Opaque("x".to_string())]),
        );
        document.insert("b".to_string(), FieldValue::Single(DecodedValue::Bool(false)));

        let json = serde_json::to_string(&document).unwrap();
        assert_eq!(json, r#"{"b":false,"a":null,"c":[-1,"x"]}"#);
    }

    #[test]
    fn test_serialize_real32_is_not_widened() {
        let json = serde_json::to_string(&DecodedValue::Real32(0.1)).unwrap();
        assert_eq!(json, "0.1");
    }
}
