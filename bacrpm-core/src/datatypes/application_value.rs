//! Application-tagged values for the BACnet application layer

use crate::datatypes::bit_string::BitString;
use crate::datatypes::date::Date;
use crate::datatypes::time::Time;
use crate::error::{BacnetError, BacnetResult};
use crate::object_id::ObjectReference;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Application tag numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApplicationTag {
    Null = 0,
    Boolean = 1,
    UnsignedInt = 2,
    SignedInt = 3,
    Real = 4,
    Double = 5,
    OctetString = 6,
    CharacterString = 7,
    BitString = 8,
    Enumerated = 9,
    Date = 10,
    Time = 11,
    ObjectId = 12,
}

impl ApplicationTag {
    pub fn from_u8(value: u8) -> BacnetResult<Self> {
        Ok(match value {
            0 => ApplicationTag::Null,
            1 => ApplicationTag::Boolean,
            2 => ApplicationTag::UnsignedInt,
            3 => ApplicationTag::SignedInt,
            4 => ApplicationTag::Real,
            5 => ApplicationTag::Double,
            6 => ApplicationTag::OctetString,
            7 => ApplicationTag::CharacterString,
            8 => ApplicationTag::BitString,
            9 => ApplicationTag::Enumerated,
            10 => ApplicationTag::Date,
            11 => ApplicationTag::Time,
            12 => ApplicationTag::ObjectId,
            other => {
                return Err(BacnetError::Decoding(format!(
                    "Reserved application tag {}",
                    other
                )));
            }
        })
    }

    pub fn to_u8(self) -> u8 {
        self as u8
    }
}

/// A single application-tagged value as decoded from a reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ApplicationValue {
    Null,
    Boolean(bool),
    Unsigned(u64),
    Signed(i64),
    Real(f32),
    Double(f64),
    OctetString(Vec<u8>),
    CharacterString(String),
    BitString(BitString),
    Enumerated(u32),
    Date(Date),
    Time(Time),
    ObjectId(ObjectReference),
}

impl ApplicationValue {
    /// Get the application tag of this value
    pub fn tag(&self) -> ApplicationTag {
        match self {
            ApplicationValue::Null => ApplicationTag::Null,
            ApplicationValue::Boolean(_) => ApplicationTag::Boolean,
            ApplicationValue::Unsigned(_) => ApplicationTag::UnsignedInt,
            ApplicationValue::Signed(_) => ApplicationTag::SignedInt,
            ApplicationValue::Real(_) => ApplicationTag::Real,
            ApplicationValue::Double(_) => ApplicationTag::Double,
            ApplicationValue::OctetString(_) => ApplicationTag::OctetString,
            ApplicationValue::CharacterString(_) => ApplicationTag::CharacterString,
            ApplicationValue::BitString(_) => ApplicationTag::BitString,
            ApplicationValue::Enumerated(_) => ApplicationTag::Enumerated,
            ApplicationValue::Date(_) => ApplicationTag::Date,
            ApplicationValue::Time(_) => ApplicationTag::Time,
            ApplicationValue::ObjectId(_) => ApplicationTag::ObjectId,
        }
    }
}

impl fmt::Display for ApplicationValue {
    /// Generic display formatter used for values without a native JSON form
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplicationValue::Null => f.write_str("Null"),
            ApplicationValue::Boolean(true) => f.write_str("TRUE"),
            ApplicationValue::Boolean(false) => f.write_str("FALSE"),
            ApplicationValue::Unsigned(value) => write!(f, "{}", value),
            ApplicationValue::Signed(value) => write!(f, "{}", value),
            ApplicationValue::Real(value) => write!(f, "{:.6}", value),
            ApplicationValue::Double(value) => write!(f, "{:.6}", value),
            ApplicationValue::OctetString(bytes) => {
                for byte in bytes {
                    write!(f, "{:02X}", byte)?;
                }
                Ok(())
            }
            ApplicationValue::CharacterString(text) => write!(f, "\"{}\"", text),
            ApplicationValue::BitString(bits) => write!(f, "{}", bits),
            ApplicationValue::Enumerated(value) => write!(f, "{}", value),
            ApplicationValue::Date(date) => write!(f, "{}", date),
            ApplicationValue::Time(time) => write!(f, "{}", time),
            ApplicationValue::ObjectId(object) => write!(f, "{}", object),
        }
    }
}
