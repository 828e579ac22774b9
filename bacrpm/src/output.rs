//! JSON sink for the result document

use bacrpm_application::ResultDocument;
use bacrpm_core::{BacnetError, BacnetResult};
use std::io::Write;

/// Write the document as pretty-printed JSON followed by a newline
pub fn write_document<W: Write>(mut writer: W, document: &ResultDocument) -> BacnetResult<()> {
    serde_json::to_writer_pretty(&mut writer, document)
        .map_err(|e| BacnetError::Encoding(format!("Failed to write JSON: {}", e)))?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bacrpm_application::{DecodedValue, FieldValue};

    #[test]
    fn test_write_document() {
        let mut document = ResultDocument::new();
        document.insert("TempRoom1".to_string(), FieldValue::Single(DecodedValue::Real32(21.5)));
        document.insert(
            "Schedule".to_string(),
            FieldValue::Array(vec![DecodedValue::UnsignedInt(1), DecodedValue::Null]),
        );

        let mut out = Vec::new();
        write_document(&mut out, &document).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("}\n"));

        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["TempRoom1"], serde_json::json!(21.5));
        assert_eq!(parsed["Schedule"], serde_json::json!([1, null]));
        // order follows insertion
        let keys: Vec<_> = parsed.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["TempRoom1", "Schedule"]);
    }
}
