//! Catalog element types: tables, views, stored procedures and their parts

use crate::command::ParameterDirection;
use crate::types::TypeDefinition;

/// Reference to a schema-scoped element, e.g. `[dbo].[Customer]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRef {
    pub schema: String,
    pub name: String,
}

impl ElementRef {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// Get the full name (e.g., [dbo].[Customer])
    pub fn full_name(&self) -> String {
        format!("[{}].[{}]", self.schema, self.name)
    }
}

/// Name of an element plus its catalog remark, as listed before retrieval
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ElementName {
    pub name: String,
    pub description: String,
}

impl ElementName {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
        }
    }

    pub fn with_description(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Table element
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub name: String,
    pub description: String,
    /// Columns in catalog order; ordinals are 1..N
    pub fields: Vec<TableField>,
    pub unique_constraints: Vec<UniqueConstraint>,
    pub foreign_key_constraints: Vec<ForeignKeyConstraint>,
}

impl Table {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    /// Case-insensitive field lookup
    pub fn find_field(&self, name: &str) -> Option<&TableField> {
        self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }

    pub fn find_field_mut(&mut self, name: &str) -> Option<&mut TableField> {
        self.fields
            .iter_mut()
            .find(|f| f.name.eq_ignore_ascii_case(name))
    }

    pub fn primary_key_fields(&self) -> impl Iterator<Item = &TableField> {
        self.fields.iter().filter(|f| f.is_primary_key)
    }

    pub fn identity_field(&self) -> Option<&TableField> {
        self.fields.iter().find(|f| f.is_identity)
    }
}

/// Table column
#[derive(Debug, Clone, PartialEq)]
pub struct TableField {
    pub name: String,
    pub type_definition: TypeDefinition,
    pub description: String,
    /// 1-based position in the table
    pub ordinal_position: usize,
    pub is_nullable: bool,
    pub is_identity: bool,
    pub is_computed: bool,
    pub default_value: Option<String>,
    pub is_primary_key: bool,
    pub is_timestamp: bool,
}

/// Unique constraint backed by a unique index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueConstraint {
    pub name: String,
    /// Field names, in index column order. Never empty.
    pub fields: Vec<String>,
}

/// Foreign key constraint owned by the child table
///
/// `foreign_key_fields[i]` references `primary_key_fields[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyConstraint {
    pub name: String,
    pub primary_key_table: ElementRef,
    pub foreign_key_fields: Vec<String>,
    pub primary_key_fields: Vec<String>,
}

impl ForeignKeyConstraint {
    /// Column pairs as (child column, parent column)
    pub fn field_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.foreign_key_fields
            .iter()
            .zip(self.primary_key_fields.iter())
            .map(|(fk, pk)| (fk.as_str(), pk.as_str()))
    }
}

/// View element
#[derive(Debug, Clone, Default)]
pub struct View {
    pub name: String,
    pub description: String,
    pub fields: Vec<ViewField>,
}

impl View {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            fields: Vec::new(),
        }
    }

    pub fn find_field(&self, name: &str) -> Option<&ViewField> {
        self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }
}

/// View column
#[derive(Debug, Clone, PartialEq)]
pub struct ViewField {
    pub name: String,
    pub type_definition: TypeDefinition,
    pub description: String,
    pub ordinal_position: usize,
    pub is_nullable: bool,
}

/// Stored procedure element
#[derive(Debug, Clone, Default)]
pub struct StoredProcedure {
    pub name: String,
    pub description: String,
    /// Parameters ordered by catalog parameter id
    pub parameters: Vec<ProcedureParameter>,
}

impl StoredProcedure {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    pub fn find_parameter(&self, name: &str) -> Option<&ProcedureParameter> {
        self.parameters
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

/// Stored procedure parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureParameter {
    pub name: String,
    pub type_definition: TypeDefinition,
    pub description: String,
    pub ordinal_position: usize,
    pub direction: ParameterDirection,
}

/// Sequence element. SQL Anywhere only exposes system sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    pub name: String,
}
