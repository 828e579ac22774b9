//! ReadPropertyMultiple service (clause 15.7)
//!
//! Request:
//! ```text
//! [0] objectIdentifier
//! [1] { [0] propertyIdentifier [1] propertyArrayIndex OPTIONAL }...
//! ```
//!
//! Acknowledgement, one entry per object:
//! ```text
//! [0] objectIdentifier
//! [1] { [2] propertyIdentifier [3] propertyArrayIndex OPTIONAL
//!       [4] { value... } | [5] { errorClass errorCode } }...
//! ```

use crate::error::{BacnetError, BacnetResult};
use crate::tag::{TagClass, TagDecoder, TagEncoder, TagKind};
use bacrpm_core::datatypes::{
    ApplicationValue, ErrorCode, PropertyResult, ReadAccessResult, ReadAccessSpec,
};
use bacrpm_core::{ArrayIndex, PropertyId};

/// Encode the service request for the given objects and properties
pub fn encode_request(specs: &[ReadAccessSpec]) -> BacnetResult<Vec<u8>> {
    if specs.is_empty() {
        return Err(BacnetError::Encoding("No objects to read".to_string()));
    }
    let mut encoder = TagEncoder::new();
    for spec in specs {
        encoder.encode_context_object_id(0, &spec.object)?;
        encoder.encode_opening_tag(1);
        for property in &spec.properties {
            encoder.encode_context_enumerated(0, property.property_id.value());
            if let ArrayIndex::Element(index) = property.array_index {
                encoder.encode_context_unsigned(1, index as u64);
            }
        }
        encoder.encode_closing_tag(1);
    }
    Ok(encoder.to_vec())
}

/// Decode a complete acknowledgement into per-object results
///
/// # Errors
/// Any structural problem makes the whole acknowledgement unusable.
pub fn decode_ack(data: &[u8]) -> BacnetResult<Vec<ReadAccessResult>> {
    if data.is_empty() {
        return Err(BacnetError::Decoding("Empty ReadPropertyMultiple acknowledgement".to_string()));
    }
    let mut decoder = TagDecoder::new(data);
    let mut results = Vec::new();
    while !decoder.is_empty() {
        let object = decoder.decode_context_object_id(0)?;
        decoder.expect_opening(1)?;
        let mut properties = Vec::new();
        while !decoder.next_is_closing(1) {
            properties.push(decode_property_result(&mut decoder)?);
        }
        decoder.expect_closing(1)?;
        results.push(ReadAccessResult::new(object, properties));
    }
    Ok(results)
}

fn decode_property_result(decoder: &mut TagDecoder<'_>) -> BacnetResult<PropertyResult> {
    let property_id = PropertyId::new(decoder.decode_context_enumerated(2)?);
    let array_index = if decoder.next_is_context(3) {
        let index = decoder.decode_context_unsigned(3)?;
        let index = u32::try_from(index)
            .map_err(|_| BacnetError::Decoding(format!("Array index {} out of range", index)))?;
        ArrayIndex::from(index)
    } else {
        ArrayIndex::All
    };

    if decoder.next_is_opening(4) {
        decoder.expect_opening(4)?;
        let values = decode_values(decoder, 4)?;
        Ok(PropertyResult::values(property_id, array_index, values))
    } else if decoder.next_is_opening(5) {
        decoder.expect_opening(5)?;
        let class = decoder.decode_application_enumerated()?;
        let code = decoder.decode_application_enumerated()?;
        decoder.expect_closing(5)?;
        Ok(PropertyResult::access_error(property_id, array_index, ErrorCode::new(class, code)))
    } else {
        Err(BacnetError::Decoding(format!(
            "Property {} has neither a value nor an access error",
            property_id
        )))
    }
}

/// Collect the values up to the closing tag, consuming it
///
/// Constructed values are flattened into their primitive elements and
/// context-tagged primitives are kept as raw octets.
fn decode_values(decoder: &mut TagDecoder<'_>, closing: u8) -> BacnetResult<Vec<ApplicationValue>> {
    let mut values = Vec::new();
    let mut depth = 0usize;
    loop {
        let tag = decoder.decode_tag()?;
        match (tag.class, tag.kind) {
            (_, TagKind::Closing) if depth == 0 => {
                if tag.number != closing {
                    return Err(BacnetError::Decoding(format!(
                        "Expected closing tag {}, found closing tag {}",
                        closing, tag.number
                    )));
                }
                return Ok(values);
            }
            (_, TagKind::Closing) => depth -= 1,
            (_, TagKind::Opening) => depth += 1,
            (TagClass::Application, TagKind::Length(_)) => {
                values.push(decoder.decode_application_content(&tag)?)
            }
            (TagClass::Context, TagKind::Length(length)) => {
                let octets = decoder.read_bytes(length as usize)?;
                values.push(ApplicationValue::OctetString(octets.to_vec()));
            }
        }
    }
}
