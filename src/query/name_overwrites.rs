//! Administrator-configured schema name overwrites
//!
//! Overwrites are collected in a [`SchemaNameOverwritesBuilder`] and frozen into
//! an immutable [`SchemaNameOverwrites`] snapshot. One snapshot may be installed
//! process-wide; the query engine consults it whenever it qualifies an object.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;

use crate::error::SqlAnywhereError;
use crate::util::strip_object_name_chars;

/// Key that overwrites every schema name
pub const WILDCARD_KEY: &str = "*";

static GLOBAL_OVERWRITES: OnceCell<Arc<SchemaNameOverwrites>> = OnceCell::new();
static EMPTY_OVERWRITES: Lazy<Arc<SchemaNameOverwrites>> =
    Lazy::new(|| Arc::new(SchemaNameOverwrites::default()));

/// Splits `schema.procedure` where either part may be bracket-quoted
static PROC_NAME_PARTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<schema>\[[\w\. \$@#]+\]|\w+)\.(?P<proc>\[[\w\. \$@#]+\]|\w+)$")
        .expect("procedure name pattern is valid")
});

/// Mutable collection phase
#[derive(Debug, Default)]
pub struct SchemaNameOverwritesBuilder {
    entries: HashMap<String, String>,
}

impl SchemaNameOverwritesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an overwrite. The first definition of a key wins; returns false
    /// when the key was already defined.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if self.entries.contains_key(&key) {
            log::warn!("Duplicate schema name overwrite for '{}' ignored", key);
            return false;
        }
        self.entries.insert(key, value.into());
        true
    }

    pub fn freeze(self) -> SchemaNameOverwrites {
        SchemaNameOverwrites {
            entries: self.entries,
        }
    }
}

/// Frozen overwrite table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaNameOverwrites {
    entries: HashMap<String, String>,
}

impl SchemaNameOverwrites {
    pub fn builder() -> SchemaNameOverwritesBuilder {
        SchemaNameOverwritesBuilder::new()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Wildcard replacement if configured, else the exact match for the
    /// unquoted name, else `current_name` unchanged.
    pub fn get_new_schema_name(&self, current_name: &str) -> String {
        if let Some(value) = self.entries.get(WILDCARD_KEY) {
            return value.clone();
        }
        if self.entries.is_empty() {
            return current_name.to_string();
        }
        let to_match = strip_object_name_chars(current_name);
        match self.entries.get(&to_match) {
            Some(value) => value.clone(),
            None => current_name.to_string(),
        }
    }

    /// Rewrite the schema part of a `schema.procedure` name. Names without a
    /// recognizable schema part are returned as-is.
    pub fn get_new_stored_procedure_name(&self, current_name: &str) -> String {
        match split_procedure_name(current_name) {
            Some((schema, proc_name)) => {
                format!("{}.{}", self.get_new_schema_name(schema), proc_name)
            }
            None => current_name.to_string(),
        }
    }
}

/// Split a qualified procedure name into (schema, procedure), keeping quoting
pub fn split_procedure_name(name: &str) -> Option<(&str, &str)> {
    let caps = PROC_NAME_PARTS.captures(name)?;
    let schema = caps.name("schema")?.as_str();
    let proc_name = caps.name("proc")?.as_str();
    Some((schema, proc_name))
}

/// Install the process-wide overwrite snapshot. Only the first install succeeds.
pub fn install_schema_overwrites(overwrites: SchemaNameOverwrites) -> Result<(), SqlAnywhereError> {
    log::debug!("Installing {} schema name overwrite(s)", overwrites.len());
    GLOBAL_OVERWRITES
        .set(Arc::new(overwrites))
        .map_err(|_| SqlAnywhereError::OverwritesAlreadyInstalled)
}

/// The installed snapshot, or an empty table when none was installed
pub fn global_schema_overwrites() -> Arc<SchemaNameOverwrites> {
    GLOBAL_OVERWRITES
        .get()
        .cloned()
        .unwrap_or_else(|| Arc::clone(&EMPTY_OVERWRITES))
}
