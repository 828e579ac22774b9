//! Decoded ReadPropertyMultiple results

use crate::datatypes::application_value::ApplicationValue;
use crate::object_id::ObjectReference;
use crate::property::{ArrayIndex, PropertyId, PropertySpec};
use crate::text;
use std::fmt;

/// Error class and code pair, as carried by Error PDUs and access errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode {
    pub class: u32,
    pub code: u32,
}

impl ErrorCode {
    pub fn new(class: u32, code: u32) -> Self {
        Self { class, code }
    }
}

impl fmt::Display for ErrorCode {
    /// `property: unknown-property`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}",
            text::name_or_number(text::error_class_name(self.class), self.class),
            text::name_or_number(text::error_code_name(self.code), self.code)
        )
    }
}

/// Outcome of reading one property
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyOutcome {
    /// Value sequence in wire order; one element for scalar properties
    Values(Vec<ApplicationValue>),
    /// The device refused or could not read the property
    AccessError(ErrorCode),
}

/// One property entry inside a read access result
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyResult {
    pub property_id: PropertyId,
    pub array_index: ArrayIndex,
    pub outcome: PropertyOutcome,
}

impl PropertyResult {
    pub fn values(property_id: PropertyId, array_index: ArrayIndex, values: Vec<ApplicationValue>) -> Self {
        Self {
            property_id,
            array_index,
            outcome: PropertyOutcome::Values(values),
        }
    }

    pub fn access_error(property_id: PropertyId, array_index: ArrayIndex, error: ErrorCode) -> Self {
        Self {
            property_id,
            array_index,
            outcome: PropertyOutcome::AccessError(error),
        }
    }
}

/// All property results for one object
#[derive(Debug, Clone, PartialEq)]
pub struct ReadAccessResult {
    pub object: ObjectReference,
    pub results: Vec<PropertyResult>,
}

impl ReadAccessResult {
    pub fn new(object: ObjectReference, results: Vec<PropertyResult>) -> Self {
        Self { object, results }
    }
}

/// Properties requested for one object in a ReadPropertyMultiple request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadAccessSpec {
    pub object: ObjectReference,
    pub properties: Vec<PropertySpec>,
}

impl ReadAccessSpec {
    pub fn new(object: ObjectReference, properties: Vec<PropertySpec>) -> Self {
        Self { object, properties }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::new(1, 31).to_string(), "object: unknown-object");
        assert_eq!(ErrorCode::new(2, 32).to_string(), "property: unknown-property");
        assert_eq!(ErrorCode::new(99, 999).to_string(), "99: 999");
    }
}
