//! Turning decoded ReadPropertyMultiple results into the named document

use crate::document::{DecodedValue, FieldValue, ResultDocument};
use crate::xref::CrossReferenceTable;
use bacrpm_core::datatypes::{PropertyOutcome, ReadAccessResult};
use bacrpm_core::{ArrayIndex, ObjectReference, PropertyId};

/// Names reply entries using the cross-reference table
pub struct ResponseTranscoder<'t> {
    table: &'t CrossReferenceTable,
}

impl<'t> ResponseTranscoder<'t> {
    pub fn new(table: &'t CrossReferenceTable) -> Self {
        Self { table }
    }

    /// Field name for one property of one object
    ///
    /// - named object, present value: `name`
    /// - named object, other property: `name_<property>`
    /// - unnamed object: `<type>_<instance>_<property>`
    ///
    /// A single array element gets `[index]` appended.
    pub fn field_name(&self, object: &ObjectReference, property_id: PropertyId, array_index: ArrayIndex) -> String {
        let mut field = match self.table.lookup_by_instance(object.instance) {
            Some(name) if property_id == PropertyId::PRESENT_VALUE => name.to_string(),
            Some(name) => format!("{}_{}", name, property_id),
            None => format!("{}_{}_{}", object.object_type, object.instance, property_id),
        };
        if let ArrayIndex::Element(index) = array_index {
            field.push_str(&format!("[{}]", index));
        }
        field
    }

    /// Consume decoded results into a new document
    pub fn transcode(&self, results: Vec<ReadAccessResult>) -> ResultDocument {
        let mut document = ResultDocument::new();
        self.transcode_into(results, &mut document);
        document
    }

    /// Consume decoded results into an existing document
    ///
    /// Access errors are reported and produce no field.
    pub fn transcode_into(&self, results: Vec<ReadAccessResult>, document: &mut ResultDocument) {
        for result in results {
            if self.table.lookup_by_instance(result.object.instance).is_none() {
                log::debug!("No name for {}, using a generated field name", result.object);
            }
            for property in result.results {
                match property.outcome {
                    PropertyOutcome::Values(values) => {
                        let field = self.field_name(&result.object, property.property_id, property.array_index);
                        let values = values.iter().map(DecodedValue::from).collect();
                        document.insert(field, FieldValue::from_values(values));
                    }
                    PropertyOutcome::AccessError(error) => {
                        log::error!("BACnet Error: {}", error);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bacrpm_core::datatypes::{ApplicationValue, ErrorCode, PropertyResult};
    use bacrpm_core::ObjectType;

    fn analog_input(instance: u32) -> ObjectReference {
        ObjectReference::new(ObjectType::ANALOG_INPUT, instance)
    }

    fn single(
        object: ObjectReference,
        property_id: PropertyId,
        array_index: ArrayIndex,
        values: Vec<ApplicationValue>,
    ) -> ReadAccessResult {
        ReadAccessResult::new(object, vec![PropertyResult::values(property_id, array_index, values)])
    }

    #[test]
    fn test_named_present_value() {
        let mut table = CrossReferenceTable::new();
        table.ingest("TempRoom1", 0, 5);
        let transcoder = ResponseTranscoder::new(&table);

        let document = transcoder.transcode(vec![single(
            analog_input(5),
            PropertyId::PRESENT_VALUE,
            ArrayIndex::All,
            vec![ApplicationValue::Real(21.5)],
        )]);
        assert_eq!(document.len(), 1);
        assert_eq!(
            document.get("TempRoom1"),
            Some(&FieldValue::Single(DecodedValue::Real32(21.5)))
        );
        assert_eq!(serde_json::to_string(&document).unwrap(), r#"{"TempRoom1":21.5}"#);
    }

    #[test]
    fn test_unnamed_object_field() {
        let table = CrossReferenceTable::new();
        let transcoder = ResponseTranscoder::new(&table);
        assert_eq!(
            transcoder.field_name(&analog_input(9), PropertyId::DESCRIPTION, ArrayIndex::All),
            "analog-input_9_description"
        );
        assert_eq!(
            transcoder.field_name(&analog_input(9), PropertyId::new(600), ArrayIndex::All),
            "analog-input_9_600"
        );
    }

    #[test]
    fn test_named_other_property_and_index() {
        let mut table = CrossReferenceTable::new();
        table.ingest("Valve", 1, 2);
        let transcoder = ResponseTranscoder::new(&table);
        let object = ObjectReference::new(ObjectType::ANALOG_OUTPUT, 2);
        assert_eq!(
            transcoder.field_name(&object, PropertyId::PRIORITY_ARRAY, ArrayIndex::Element(8)),
            "Valve_priority-array[8]"
        );
        assert_eq!(
            transcoder.field_name(&object, PropertyId::PRESENT_VALUE, ArrayIndex::Element(0)),
            "Valve[0]"
        );
        assert_eq!(
            transcoder.field_name(&object, PropertyId::new(1000), ArrayIndex::All),
            "Valve_1000"
        );
    }

    #[test]
    fn test_value_sequence_becomes_array() {
        let table = CrossReferenceTable::new();
        let transcoder = ResponseTranscoder::new(&table);
        let document = transcoder.transcode(vec![single(
            ObjectReference::new(ObjectType::DEVICE, 1),
            PropertyId::OBJECT_LIST,
            ArrayIndex::All,
            vec![
                ApplicationValue::Unsigned(1),
                ApplicationValue::Unsigned(2),
                ApplicationValue::Unsigned(3),
            ],
        )]);
        assert_eq!(
            document.get("device_1_object-list"),
            Some(&FieldValue::Array(vec![
                DecodedValue::UnsignedInt(1),
                DecodedValue::UnsignedInt(2),
                DecodedValue::UnsignedInt(3),
            ]))
        );
    }

    #[test]
    fn test_access_error_produces_no_field() {
        let table = CrossReferenceTable::new();
        let transcoder = ResponseTranscoder::new(&table);
        let document = transcoder.transcode(vec![ReadAccessResult::new(
            analog_input(1),
            vec![
                PropertyResult::access_error(PropertyId::DESCRIPTION, ArrayIndex::All, ErrorCode::new(2, 32)),
                PropertyResult::values(PropertyId::UNITS, ArrayIndex::All, vec![ApplicationValue::Enumerated(62)]),
            ],
        )]);
        assert_eq!(document.len(), 1);
        assert!(document.get("analog-input_1_units").is_some());
    }

    #[test]
    fn test_collision_last_value_wins() {
        let mut table = CrossReferenceTable::new();
        table.ingest("Shared", 0, 4);
        let transcoder = ResponseTranscoder::new(&table);
        // two objects of different types share instance 4 and so the name
        let document = transcoder.transcode(vec![
            single(analog_input(4), PropertyId::PRESENT_VALUE, ArrayIndex::All, vec![ApplicationValue::Real(1.0)]),
            single(
                ObjectReference::new(ObjectType::BINARY_INPUT, 4),
                PropertyId::PRESENT_VALUE,
                ArrayIndex::All,
                vec![ApplicationValue::Enumerated(1)],
            ),
        ]);
        assert_eq!(document.len(), 1);
        assert_eq!(document.get("Shared"), Some(&FieldValue::Single(DecodedValue::Enumerated(1))));
    }
}
