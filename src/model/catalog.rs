//! Catalog graph root: catalog → schemas → elements

use std::fmt;

use super::{Sequence, StoredProcedure, Table, View};

/// The complete retrieved catalog
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub name: String,
    /// Schemas in retrieval order
    pub schemas: Vec<Schema>,
}

impl Catalog {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schemas: Vec::new(),
        }
    }

    pub fn add_schema(&mut self, schema: Schema) {
        self.schemas.push(schema);
    }

    pub fn find_schema(&self, owner: &str) -> Option<&Schema> {
        self.schemas
            .iter()
            .find(|s| s.owner.eq_ignore_ascii_case(owner))
    }

    pub fn find_schema_mut(&mut self, owner: &str) -> Option<&mut Schema> {
        self.schemas
            .iter_mut()
            .find(|s| s.owner.eq_ignore_ascii_case(owner))
    }

    pub fn table_count(&self) -> usize {
        self.schemas.iter().map(|s| s.tables.len()).sum()
    }

    /// All diagnostics recorded across every schema
    pub fn diagnostics(&self) -> impl Iterator<Item = &RetrievalDiagnostic> {
        self.schemas.iter().flat_map(|s| s.diagnostics.iter())
    }
}

/// A schema, named after its owner
#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub owner: String,
    pub tables: Vec<Table>,
    pub views: Vec<View>,
    pub stored_procedures: Vec<StoredProcedure>,
    pub sequences: Vec<Sequence>,
    /// Objects that were dropped during retrieval and why
    pub diagnostics: Vec<RetrievalDiagnostic>,
}

impl Schema {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            ..Default::default()
        }
    }

    pub fn find_table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    pub fn find_table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables
            .iter_mut()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    pub fn find_view(&self, name: &str) -> Option<&View> {
        self.views.iter().find(|v| v.name.eq_ignore_ascii_case(name))
    }

    pub fn find_stored_procedure(&self, name: &str) -> Option<&StoredProcedure> {
        self.stored_procedures
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn record_diagnostic(&mut self, diagnostic: RetrievalDiagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

/// Why an object was left out of the catalog graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalDiagnostic {
    /// Full name of the dropped element
    pub element: String,
    /// Retrieval step that failed, e.g. "retrieving table fields"
    pub operation: String,
    pub message: String,
}

impl fmt::Display for RetrievalDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} dropped while {}: {}",
            self.element, self.operation, self.message
        )
    }
}
