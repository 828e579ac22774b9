use crate::error::{BacnetError, BacnetResult};
use crate::text;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest object instance number a BACnet object identifier can carry
///
/// The value itself (0x3FFFFF) is the wildcard instance; it is a valid
/// object instance but never a valid target device instance.
pub const MAX_INSTANCE: u32 = 0x3F_FFFF;

/// Exclusive upper bound of the object type field (10 bits)
pub const MAX_OBJECT_TYPE: u32 = 1024;

/// BACnet object type
///
/// Kept as a raw number because rows may carry proprietary or not yet
/// standardized types; use [`ObjectType::label`] for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectType(u32);

impl ObjectType {
    pub const ANALOG_INPUT: ObjectType = ObjectType(0);
    pub const ANALOG_OUTPUT: ObjectType = ObjectType(1);
    pub const ANALOG_VALUE: ObjectType = ObjectType(2);
    pub const BINARY_INPUT: ObjectType = ObjectType(3);
    pub const BINARY_OUTPUT: ObjectType = ObjectType(4);
    pub const BINARY_VALUE: ObjectType = ObjectType(5);
    pub const DEVICE: ObjectType = ObjectType(8);
    pub const MULTI_STATE_INPUT: ObjectType = ObjectType(13);
    pub const MULTI_STATE_VALUE: ObjectType = ObjectType(19);

    /// Create an object type from its numeric value
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the numeric value
    pub const fn value(&self) -> u32 {
        self.0
    }

    /// Check whether the type fits the 10-bit object type field
    pub const fn is_valid(&self) -> bool {
        self.0 < MAX_OBJECT_TYPE
    }

    /// Human-readable label, e.g. `analog-input`
    ///
    /// Types without a standard name are labelled `proprietary-N` (128 and
    /// above) or `reserved-N`.
    pub fn label(&self) -> String {
        match text::object_type_name(self.0) {
            Some(name) => name.to_string(),
            None if self.0 >= 128 => format!("proprietary-{}", self.0),
            None => format!("reserved-{}", self.0),
        }
    }
}

impl From<u32> for ObjectType {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Identifies one object inside a remote device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectReference {
    pub object_type: ObjectType,
    pub instance: u32,
}

impl ObjectReference {
    /// Create a new object reference without validating it
    ///
    /// Rows are accepted as-is; bounds are checked with [`ObjectReference::validate`]
    /// when the reference is used to build a request.
    pub fn new(object_type: ObjectType, instance: u32) -> Self {
        Self {
            object_type,
            instance,
        }
    }

    /// Check the type and instance bounds
    ///
    /// # Errors
    /// Returns `InvalidData` naming the first field that is out of range
    pub fn validate(&self) -> BacnetResult<()> {
        if !self.object_type.is_valid() {
            return Err(BacnetError::InvalidData(format!(
                "type={} - must be less than {}",
                self.object_type.value(),
                MAX_OBJECT_TYPE
            )));
        }
        if self.instance > MAX_INSTANCE {
            return Err(BacnetError::InvalidData(format!(
                "address={} - it must be less than {}",
                self.instance,
                MAX_INSTANCE + 1
            )));
        }
        Ok(())
    }

    /// Pack into the 32-bit wire form (type in the upper 10 bits)
    pub fn to_packed(&self) -> BacnetResult<u32> {
        self.validate()?;
        Ok((self.object_type.value() << 22) | self.instance)
    }

    /// Unpack from the 32-bit wire form
    pub fn from_packed(value: u32) -> Self {
        Self {
            object_type: ObjectType(value >> 22),
            instance: value & MAX_INSTANCE,
        }
    }
}

impl fmt::Display for ObjectReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.object_type, self.instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_round_trip() {
        let object = ObjectReference::new(ObjectType::ANALOG_INPUT, 5);
        assert_eq!(object.to_packed().unwrap(), 5);

        let device = ObjectReference::new(ObjectType::DEVICE, 1234);
        let packed = device.to_packed().unwrap();
        assert_eq!(packed, 0x0200_04D2);
        assert_eq!(ObjectReference::from_packed(packed), device);
    }

    #[test]
    fn test_validate_bounds() {
        assert!(ObjectReference::new(ObjectType::new(1023), MAX_INSTANCE).validate().is_ok());
        assert!(ObjectReference::new(ObjectType::new(1024), 1).validate().is_err());
        assert!(ObjectReference::new(ObjectType::ANALOG_VALUE, MAX_INSTANCE + 1).validate().is_err());
    }

    #[test]
    fn test_labels() {
        assert_eq!(ObjectType::ANALOG_INPUT.label(), "analog-input");
        assert_eq!(ObjectType::new(600).label(), "proprietary-600");
        assert_eq!(ObjectType::new(100).label(), "reserved-100");
        let object = ObjectReference::new(ObjectType::BINARY_VALUE, 7);
        assert_eq!(object.to_string(), "(binary-value, 7)");
    }
}
