//! Property identifiers and read specifications

use crate::object_id::ObjectReference;
use crate::text;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Property identifiers at or above this value are vendor specific and
/// never have a label
pub const PROPRIETARY_PROPERTY_MIN: u32 = 512;

/// BACnet property identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PropertyId(u32);

impl PropertyId {
    pub const DESCRIPTION: PropertyId = PropertyId(28);
    pub const OBJECT_IDENTIFIER: PropertyId = PropertyId(75);
    pub const OBJECT_LIST: PropertyId = PropertyId(76);
    pub const OBJECT_NAME: PropertyId = PropertyId(77);
    pub const PRESENT_VALUE: PropertyId = PropertyId(85);
    pub const PRIORITY_ARRAY: PropertyId = PropertyId(87);
    pub const STATUS_FLAGS: PropertyId = PropertyId(111);
    pub const UNITS: PropertyId = PropertyId(117);

    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> u32 {
        self.0
    }

    /// Standard hyphenated label, e.g. `present-value`
    ///
    /// `None` for proprietary identifiers and for numbers the label table
    /// does not know.
    pub fn label(&self) -> Option<&'static str> {
        if self.0 >= PROPRIETARY_PROPERTY_MIN {
            return None;
        }
        text::property_name(self.0)
    }
}

impl From<u32> for PropertyId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label() {
            Some(label) => f.write_str(label),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Array index of a property read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ArrayIndex {
    /// Whole property value
    #[default]
    All,
    /// Single array element (index 0 is the array length)
    Element(u32),
}

impl ArrayIndex {
    /// Wire value used by the protocol for "whole array"
    pub const ALL_SENTINEL: u32 = u32::MAX;

    pub fn is_all(&self) -> bool {
        matches!(self, ArrayIndex::All)
    }

    pub fn element(&self) -> Option<u32> {
        match self {
            ArrayIndex::All => None,
            ArrayIndex::Element(index) => Some(*index),
        }
    }
}

impl From<u32> for ArrayIndex {
    fn from(value: u32) -> Self {
        if value == Self::ALL_SENTINEL {
            ArrayIndex::All
        } else {
            ArrayIndex::Element(value)
        }
    }
}

/// One (object, property, index) read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertySpec {
    pub object: ObjectReference,
    pub property_id: PropertyId,
    pub array_index: ArrayIndex,
}

impl PropertySpec {
    pub fn new(object: ObjectReference, property_id: PropertyId, array_index: ArrayIndex) -> Self {
        Self {
            object,
            property_id,
            array_index,
        }
    }

    /// Present value, whole value
    pub fn present_value(object: ObjectReference) -> Self {
        Self::new(object, PropertyId::PRESENT_VALUE, ArrayIndex::All)
    }
}
