//! Building the ReadPropertyMultiple request from point names

use crate::error::{BacnetError, BacnetResult};
use crate::xref::CrossReferenceTable;
use bacrpm_core::datatypes::ReadAccessSpec;
use bacrpm_core::{ObjectReference, PropertySpec, MAX_INSTANCE, MAX_OBJECT_TYPE};
use std::fmt;

/// A requested name that did not make it into the batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameResolutionMiss {
    /// No row carries this name
    NotDefined { name: String, source: String },
    /// The row's object type does not fit the object identifier
    ObjectTypeOutOfRange { name: String, object_type: u32 },
    /// The row's instance does not fit the object identifier
    InstanceOutOfRange { name: String, instance: u32 },
}

impl NameResolutionMiss {
    pub fn name(&self) -> &str {
        match self {
            Self::NotDefined { name, .. }
            | Self::ObjectTypeOutOfRange { name, .. }
            | Self::InstanceOutOfRange { name, .. } => name,
        }
    }
}

impl fmt::Display for NameResolutionMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotDefined { name, source } => {
                write!(f, "Error: object {} not defined in {}", name, source)
            }
            Self::ObjectTypeOutOfRange { name, object_type } => write!(
                f,
                "Error: object {} type={} - must be less than {}",
                name, object_type, MAX_OBJECT_TYPE
            ),
            Self::InstanceOutOfRange { name, instance } => write!(
                f,
                "Error: object {} address={} - it must be less than {}",
                name,
                instance,
                MAX_INSTANCE + 1
            ),
        }
    }
}

/// Ordered list of objects to read, one entry per distinct object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBatch {
    entries: Vec<ReadAccessSpec>,
}

impl RequestBatch {
    pub fn entries(&self) -> &[ReadAccessSpec] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Requested objects in request order
    pub fn objects(&self) -> impl Iterator<Item = &ObjectReference> + '_ {
        self.entries.iter().map(|entry| &entry.object)
    }
}

/// Resolves requested names against the table and collects the batch
///
/// The builder holds the only mutable borrow of the table: every resolved
/// name is written back as the reverse name of its instance, so replies
/// are labelled with the name the user asked for.
pub struct RequestSetBuilder<'t> {
    table: &'t mut CrossReferenceTable,
    source: String,
    entries: Vec<ReadAccessSpec>,
    misses: Vec<NameResolutionMiss>,
}

impl<'t> RequestSetBuilder<'t> {
    /// Create a builder; `source` names the row source in diagnostics
    pub fn new(table: &'t mut CrossReferenceTable, source: impl Into<String>) -> Self {
        Self {
            table,
            source: source.into(),
            entries: Vec::new(),
            misses: Vec::new(),
        }
    }

    /// Resolve one name and add its present value to the batch
    ///
    /// A miss is logged and remembered but never aborts the batch.
    pub fn request(&mut self, name: &str) -> Result<ObjectReference, NameResolutionMiss> {
        match self.resolve(name) {
            Ok(object) => {
                self.table.assign_instance_name(object.instance, name);
                if !self.entries.iter().any(|entry| entry.object == object) {
                    self.entries
                        .push(ReadAccessSpec::new(object, vec![PropertySpec::present_value(object)]));
                }
                log::debug!("Requesting {} as {}", name, object);
                Ok(object)
            }
            Err(miss) => {
                log::warn!("{}", miss);
                self.misses.push(miss.clone());
                Err(miss)
            }
        }
    }

    /// Resolve every name in order
    pub fn request_all<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            // misses are recorded by request()
            let _ = self.request(name.as_ref());
        }
    }

    pub fn misses(&self) -> &[NameResolutionMiss] {
        &self.misses
    }

    /// Finish the batch
    ///
    /// # Errors
    /// Returns `Configuration` when no name resolved
    pub fn build(self) -> BacnetResult<RequestBatch> {
        if self.entries.is_empty() {
            return Err(BacnetError::Configuration(
                "No object for performing the request".to_string(),
            ));
        }
        Ok(RequestBatch {
            entries: self.entries,
        })
    }

    fn resolve(&self, name: &str) -> Result<ObjectReference, NameResolutionMiss> {
        let object = self
            .table
            .lookup_by_name(name)
            .ok_or_else(|| NameResolutionMiss::NotDefined {
                name: name.to_string(),
                source: self.source.clone(),
            })?;
        if !object.object_type.is_valid() {
            return Err(NameResolutionMiss::ObjectTypeOutOfRange {
                name: name.to_string(),
                object_type: object.object_type.value(),
            });
        }
        if object.instance > MAX_INSTANCE {
            return Err(NameResolutionMiss::InstanceOutOfRange {
                name: name.to_string(),
                instance: object.instance,
            });
        }
        Ok(object)
    }
}
