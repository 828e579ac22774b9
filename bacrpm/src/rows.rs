//! CSV row source for the cross-reference table
//!
//! The first line names the columns. Only `name`, `type_value` and
//! `address` are used; other columns are ignored and may appear in any
//! order.

use crate::cli::parse_integer;
use bacrpm_application::CrossReferenceTable;
use bacrpm_core::{BacnetError, BacnetResult};
use std::fs::File;
use std::io;
use std::path::Path;

/// One object described by the data file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRow {
    pub name: String,
    pub object_type: u32,
    pub instance: u32,
}

#[derive(Debug, Clone, Copy)]
struct Columns {
    name: usize,
    type_value: usize,
    address: usize,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> BacnetResult<Self> {
        let find = |label: &str| headers.iter().position(|header| header == label);
        let name = find("name")
            .ok_or_else(|| BacnetError::Configuration("CSV must have a name field".to_string()))?;
        let type_value = find("type_value").ok_or_else(|| {
            BacnetError::Configuration("CSV must have a type_value field".to_string())
        })?;
        let address = find("address").ok_or_else(|| {
            BacnetError::Configuration("CSV must have an address field".to_string())
        })?;
        Ok(Self {
            name,
            type_value,
            address,
        })
    }
}

/// Read all object rows
///
/// Rows with a missing or unparsable field are skipped with a warning.
pub fn read_rows<R: io::Read>(reader: R) -> BacnetResult<Vec<ObjectRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| BacnetError::Configuration(format!("Error while parsing file: {}", e)))?;
    let columns = Columns::from_headers(headers)?;

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Error while parsing file: {}", e);
                continue;
            }
        };
        match parse_row(&record, columns) {
            Ok(row) => rows.push(row),
            // header is line 1
            Err(e) => log::warn!("Skipping row {}: {}", line + 2, e),
        }
    }
    Ok(rows)
}

fn parse_row(record: &csv::StringRecord, columns: Columns) -> Result<ObjectRow, String> {
    let field = |index: usize, label: &str| {
        record
            .get(index)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| format!("{} not defined", label))
    };
    let unsigned = |index: usize, label: &str| -> Result<u32, String> {
        let value = parse_integer(field(index, label)?)?;
        u32::try_from(value).map_err(|_| format!("{}={} is out of range", label, value))
    };
    Ok(ObjectRow {
        name: field(columns.name, "name")?.to_string(),
        object_type: unsigned(columns.type_value, "type")?,
        instance: unsigned(columns.address, "address")?,
    })
}

/// Build the cross-reference table from a data file
pub fn load_table(path: &Path) -> BacnetResult<CrossReferenceTable> {
    let file = File::open(path).map_err(|e| {
        BacnetError::Configuration(format!("Failed to open {}: {}", path.display(), e))
    })?;
    let rows = read_rows(file)?;
    log::debug!("Read {} objects from {}", rows.len(), path.display());

    let mut table = CrossReferenceTable::new();
    for row in &rows {
        table.ingest(&row.name, row.object_type, row.instance);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bacrpm_core::{ObjectReference, ObjectType};
    use std::io::Write;

    #[test]
    fn test_read_rows_any_column_order() {
        let data = "address,units,name,type_value\n5,degC,TempRoom1,0\n0x10,,Fan,4\n";
        let rows = read_rows(data.as_bytes()).unwrap();
        assert_eq!(
            rows,
            vec![
                ObjectRow {
                    name: "TempRoom1".to_string(),
                    object_type: 0,
                    instance: 5,
                },
                ObjectRow {
                    name: "Fan".to_string(),
                    object_type: 4,
                    instance: 16,
                },
            ]
        );
    }

    #[test]
    fn test_missing_header_field() {
        let err = read_rows("name,address\nA,1\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("CSV must have a type_value field"));

        let err = read_rows("type_value,address\n0,1\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("CSV must have a name field"));

        let err = read_rows("name,type_value\nA,0\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("CSV must have an address field"));
    }

    #[test]
    fn test_bad_rows_are_skipped() {
        let data = "name,type_value,address\nGood,0,1\nBad,zero,2\nShort,1\nNegative,0,-4\n";
        let rows = read_rows(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Good");
    }

    #[test]
    fn test_load_table() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name,type_value,address").unwrap();
        writeln!(file, "TempRoom1,0,5").unwrap();
        writeln!(file, "TempRoom1,2,6").unwrap();
        file.flush().unwrap();

        let table = load_table(file.path()).unwrap();
        assert_eq!(
            table.lookup_by_name("TempRoom1"),
            Some(ObjectReference::new(ObjectType::ANALOG_VALUE, 6))
        );
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_table(&dir.path().join("absent.csv")).unwrap_err();
        assert!(err.to_string().contains("Failed to open"));
    }
}
