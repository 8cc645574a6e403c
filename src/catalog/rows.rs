//! Typed catalog rows
//!
//! Every result set the retriever reads is mapped into one of these structs at
//! the query boundary. A failed mapping is a `CatalogDataError`, which the
//! retriever treats as a per-object failure.

use crate::command::ParameterDirection;
use crate::error::CatalogDataError;
use crate::model::{ProcedureParameter, TableField, ViewField};
use crate::types::{AsaDbType, TypeDefinition};

use super::Row;

/// Catalog flag columns hold 'Y' or 'N'
fn flag(value: Option<String>) -> bool {
    value.as_deref() == Some("Y")
}

/// A `systabcol` row joined with its domain and remark
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRow {
    pub column_name: String,
    pub domain_name: String,
    pub width: i32,
    pub precision: Option<i32>,
    pub scale: Option<i32>,
    pub default: Option<String>,
    pub max_identity: Option<i64>,
    pub column_type: Option<String>,
    pub nulls: Option<String>,
    pub remarks: Option<String>,
}

impl TryFrom<&Row> for FieldRow {
    type Error = CatalogDataError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        let column_name: String = row.get("column_name")?;
        if column_name.is_empty() {
            return Err(CatalogDataError::Inconsistent {
                message: "column without a name".to_string(),
            });
        }
        Ok(Self {
            column_name,
            domain_name: row.get("domain_name")?,
            width: row.get("width")?,
            precision: row.get("precision")?,
            scale: row.get("scale")?,
            default: row.get("default")?,
            max_identity: row.get("max_identity")?,
            column_type: row.get("column_type")?,
            nulls: row.get("nulls")?,
            remarks: row.get("remarks")?,
        })
    }
}

impl FieldRow {
    pub fn type_definition(&self) -> TypeDefinition {
        TypeDefinition::from_catalog(&self.domain_name, self.width, self.precision, self.scale)
    }

    pub fn is_identity(&self) -> bool {
        self.default.as_deref() == Some("autoincrement") || self.max_identity.unwrap_or(0) > 0
    }

    pub fn into_table_field(self, ordinal_position: usize) -> TableField {
        let type_definition = self.type_definition();
        let is_identity = self.is_identity();
        TableField {
            is_computed: self.column_type.as_deref() == Some("C"),
            is_nullable: flag(self.nulls),
            is_timestamp: type_definition.db_type == AsaDbType::TimeStamp,
            is_identity,
            is_primary_key: false,
            default_value: self.default,
            description: self.remarks.unwrap_or_default(),
            name: self.column_name,
            ordinal_position,
            type_definition,
        }
    }

    pub fn into_view_field(self, ordinal_position: usize) -> ViewField {
        let type_definition = self.type_definition();
        ViewField {
            is_nullable: flag(self.nulls),
            description: self.remarks.unwrap_or_default(),
            name: self.column_name,
            ordinal_position,
            type_definition,
        }
    }
}

/// A row returned by `sp_pkeys`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryKeyRow {
    pub column_name: String,
}

impl TryFrom<&Row> for PrimaryKeyRow {
    type Error = CatalogDataError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Self {
            column_name: row.get("column_name")?,
        })
    }
}

/// One column of a unique index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueIndexRow {
    pub index_name: String,
    pub column_name: String,
}

impl TryFrom<&Row> for UniqueIndexRow {
    type Error = CatalogDataError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Self {
            index_name: row.get("index_name")?,
            column_name: row.get("column_name")?,
        })
    }
}

/// Parameter type of a procedure's return value
pub const RETURN_VALUE_PARM_TYPE: i32 = 4;

/// A `sysprocparm` row joined with its domain
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureParameterRow {
    pub parm_name: String,
    pub parm_type: i32,
    pub parm_id: i32,
    pub parm_mode_in: Option<String>,
    pub parm_mode_out: Option<String>,
    pub domain_name: String,
    pub width: i32,
    pub precision: Option<i32>,
    pub scale: Option<i32>,
    pub remarks: Option<String>,
}

impl TryFrom<&Row> for ProcedureParameterRow {
    type Error = CatalogDataError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Self {
            parm_name: row.get("parm_name")?,
            parm_type: row.get("parm_type")?,
            parm_id: row.get("parm_id")?,
            parm_mode_in: row.get("parm_mode_in")?,
            parm_mode_out: row.get("parm_mode_out")?,
            domain_name: row.get("domain_name")?,
            width: row.get("width")?,
            precision: row.get("precision")?,
            scale: row.get("scale")?,
            remarks: row.get("remarks")?,
        })
    }
}

impl ProcedureParameterRow {
    /// Normal parameters (0) and return values (4); result-set columns are skipped
    pub fn is_parameter(&self) -> bool {
        matches!(self.parm_type, 0 | RETURN_VALUE_PARM_TYPE)
    }

    pub fn direction(&self) -> ParameterDirection {
        if self.parm_type == RETURN_VALUE_PARM_TYPE {
            return ParameterDirection::ReturnValue;
        }
        let input = self.parm_mode_in.as_deref() == Some("Y");
        let output = self.parm_mode_out.as_deref() == Some("Y");
        match (input, output) {
            (true, true) => ParameterDirection::InputOutput,
            (true, false) => ParameterDirection::Input,
            (false, _) => ParameterDirection::Output,
        }
    }

    pub fn into_parameter(self) -> Result<ProcedureParameter, CatalogDataError> {
        let ordinal_position =
            usize::try_from(self.parm_id).map_err(|_| CatalogDataError::Inconsistent {
                message: format!("parameter '{}' has id {}", self.parm_name, self.parm_id),
            })?;
        let direction = self.direction();
        Ok(ProcedureParameter {
            type_definition: TypeDefinition::from_catalog(
                &self.domain_name,
                self.width,
                self.precision,
                self.scale,
            ),
            description: self.remarks.unwrap_or_default(),
            name: self.parm_name,
            ordinal_position,
            direction,
        })
    }
}

/// One column pair of a foreign key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyRow {
    pub fk_schema: String,
    pub fk_table_name: String,
    pub fk_column_name: String,
    pub pk_schema: String,
    pub pk_table_name: String,
    pub pk_column_name: String,
    pub fk_name: Option<String>,
}

impl TryFrom<&Row> for ForeignKeyRow {
    type Error = CatalogDataError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Self {
            fk_schema: row.get("FK_SCHEMA")?,
            fk_table_name: row.get("FK_TABLE_NAME")?,
            fk_column_name: row.get("FK_COLUMN_NAME")?,
            pk_schema: row.get("PK_SCHEMA")?,
            pk_table_name: row.get("PK_TABLE_NAME")?,
            pk_column_name: row.get("PK_COLUMN_NAME")?,
            fk_name: row.get("FK_NAME")?,
        })
    }
}

/// Name + remark of a table, view or procedure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementNameRow {
    pub element_name: String,
    pub remarks: Option<String>,
}

impl TryFrom<&Row> for ElementNameRow {
    type Error = CatalogDataError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Self {
            element_name: row.get("ElementName")?,
            remarks: row.get("remarks")?,
        })
    }
}
