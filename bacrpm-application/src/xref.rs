//! Name to object cross-reference
//!
//! The table maps point names to object references and raw instance numbers
//! back to names. It is filled from the row source before the request is
//! built and only read afterwards.

use bacrpm_core::{ObjectReference, ObjectType};
use std::collections::HashMap;

/// Longest stored name, in bytes
pub const MAX_NAME_LEN: usize = 255;

/// Bidirectional name ⇄ object mapping
#[derive(Debug, Clone, Default)]
pub struct CrossReferenceTable {
    by_name: HashMap<String, ObjectReference>,
    /// Keyed by instance alone, so objects of different types sharing an
    /// instance share one entry
    by_instance: HashMap<u32, String>,
}

impl CrossReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a row
    ///
    /// Bounds are not checked here. Names longer than [`MAX_NAME_LEN`] are
    /// truncated.
    pub fn ingest(&mut self, name: &str, object_type: u32, instance: u32) {
        let name = truncate_name(name);
        let object = ObjectReference::new(ObjectType::new(object_type), instance);
        self.by_name.insert(name.to_string(), object);
        self.by_instance.insert(instance, name.to_string());
    }

    pub fn lookup_by_name(&self, name: &str) -> Option<ObjectReference> {
        self.by_name.get(name).copied()
    }

    pub fn lookup_by_instance(&self, instance: u32) -> Option<&str> {
        self.by_instance.get(&instance).map(String::as_str)
    }

    /// Point the reverse entry of `instance` at a requested name
    pub(crate) fn assign_instance_name(&mut self, instance: u32, name: &str) {
        self.by_instance.insert(instance, truncate_name(name).to_string());
    }

    /// Number of distinct names
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

fn truncate_name(name: &str) -> &str {
    if name.len() <= MAX_NAME_LEN {
        return name;
    }
    let mut end = MAX_NAME_LEN;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name[..end]
}
