//! Per-schema retrieval of tables, views and stored procedures
//!
//! Each element kind is read over its own connection. The metadata commands
//! are prepared once and re-bound for every element. A data error discards
//! the affected element only; execution errors abort the retrieval.

use std::collections::HashSet;

use crate::command::{Command, Parameter};
use crate::error::{CatalogDataError, SqlAnywhereError};
use crate::model::{
    ElementName, RetrievalDiagnostic, Schema, StoredProcedure, Table, UniqueConstraint, View,
};

use super::queries;
use super::rows::{FieldRow, PrimaryKeyRow, ProcedureParameterRow, UniqueIndexRow};
use super::{ConnectionFactory, ConnectionGuard, RowSet};

const TABLE_NAME_PARAMETER: &str = "@table_name";
const TABLE_OWNER_PARAMETER: &str = "@table_owner";
const PROCEDURE_NAME_PARAMETER: &str = "@procedure_name";

/// Fills one schema of the catalog graph
pub struct SchemaRetriever<'a> {
    factory: &'a dyn ConnectionFactory,
}

impl<'a> SchemaRetriever<'a> {
    pub fn new(factory: &'a dyn ConnectionFactory) -> Self {
        Self { factory }
    }

    /// Retrieve fields, primary keys and unique constraints of the named tables
    pub fn retrieve_tables(
        &self,
        schema: &mut Schema,
        names: &[ElementName],
    ) -> Result<(), SqlAnywhereError> {
        if names.is_empty() {
            return Ok(());
        }
        let owner = schema.owner.clone();
        let mut connection = ConnectionGuard::open(self.factory, "retrieving table metadata")?;

        let mut field_command = Command::text(queries::fields(&owner))
            .with_parameter(Parameter::input(TABLE_NAME_PARAMETER, ""));
        let mut pk_command = Command::stored_procedure(queries::PRIMARY_KEY_PROCEDURE)
            .with_parameter(Parameter::input(TABLE_NAME_PARAMETER, ""))
            .with_parameter(Parameter::input(TABLE_OWNER_PARAMETER, owner.as_str()));
        let mut uc_command = Command::text(queries::unique_constraints(&owner))
            .with_parameter(Parameter::input(TABLE_NAME_PARAMETER, ""));

        connection.prepare(&field_command)?;
        connection.prepare(&pk_command)?;
        connection.prepare(&uc_command)?;

        for name in names {
            field_command.bind(TABLE_NAME_PARAMETER, name.name.as_str());
            let field_rows = connection.execute(&field_command)?;
            pk_command.bind(TABLE_NAME_PARAMETER, name.name.as_str());
            let pk_rows = connection.execute(&pk_command)?;
            uc_command.bind(TABLE_NAME_PARAMETER, name.name.as_str());
            let uc_rows = connection.execute(&uc_command)?;

            match build_table(name, &field_rows, &pk_rows, &uc_rows) {
                Ok(table) => schema.tables.push(table),
                Err(e) => discard(schema, "Table", &name.name, "populating table fields", e),
            }
        }
        log::debug!(
            "Retrieved {} of {} table(s) in schema '{}'",
            schema.tables.len(),
            names.len(),
            owner
        );
        Ok(())
    }

    /// Retrieve the fields of the named views
    pub fn retrieve_views(
        &self,
        schema: &mut Schema,
        names: &[ElementName],
    ) -> Result<(), SqlAnywhereError> {
        if names.is_empty() {
            return Ok(());
        }
        let owner = schema.owner.clone();
        let mut connection = ConnectionGuard::open(self.factory, "retrieving view metadata")?;

        let mut field_command = Command::text(queries::fields(&owner))
            .with_parameter(Parameter::input(TABLE_NAME_PARAMETER, ""));
        connection.prepare(&field_command)?;

        for name in names {
            field_command.bind(TABLE_NAME_PARAMETER, name.name.as_str());
            let field_rows = connection.execute(&field_command)?;
            match build_view(name, &field_rows) {
                Ok(view) => schema.views.push(view),
                Err(e) => discard(schema, "View", &name.name, "populating view fields", e),
            }
        }
        log::debug!(
            "Retrieved {} of {} view(s) in schema '{}'",
            schema.views.len(),
            names.len(),
            owner
        );
        Ok(())
    }

    /// Retrieve the parameters of the named stored procedures
    pub fn retrieve_stored_procedures(
        &self,
        schema: &mut Schema,
        names: &[ElementName],
    ) -> Result<(), SqlAnywhereError> {
        if names.is_empty() {
            return Ok(());
        }
        let owner = schema.owner.clone();
        let mut connection =
            ConnectionGuard::open(self.factory, "retrieving stored procedure metadata")?;

        let mut command = Command::text(queries::procedure_parameters(&owner))
            .with_parameter(Parameter::input(PROCEDURE_NAME_PARAMETER, ""));
        connection.prepare(&command)?;

        let mut seen = HashSet::new();
        for name in names {
            if !seen.insert(name.name.as_str()) {
                continue;
            }
            command.bind(PROCEDURE_NAME_PARAMETER, name.name.as_str());
            let parameter_rows = connection.execute(&command)?;
            match build_stored_procedure(name, &parameter_rows) {
                Ok(procedure) => schema.stored_procedures.push(procedure),
                Err(e) => discard(
                    schema,
                    "Stored procedure",
                    &name.name,
                    "populating procedure parameters",
                    e,
                ),
            }
        }
        log::debug!(
            "Retrieved {} stored procedure(s) in schema '{}'",
            schema.stored_procedures.len(),
            owner
        );
        Ok(())
    }
}

fn discard(schema: &mut Schema, kind: &str, name: &str, operation: &str, error: CatalogDataError) {
    let element = format!("[{}].[{}]", schema.owner, name);
    log::warn!(
        "{} '{}' removed from list due to a data error while {}: {}",
        kind,
        element,
        operation,
        error
    );
    schema.record_diagnostic(RetrievalDiagnostic {
        element,
        operation: operation.to_string(),
        message: error.to_string(),
    });
}

/// Build a table from its field, primary key and unique index rows
pub fn build_table(
    name: &ElementName,
    field_rows: &RowSet,
    pk_rows: &RowSet,
    uc_rows: &RowSet,
) -> Result<Table, CatalogDataError> {
    let mut table = Table::new(name.name.as_str(), name.description.as_str());

    for (index, row) in field_rows.rows().iter().enumerate() {
        let field = FieldRow::try_from(row)?;
        table.fields.push(field.into_table_field(index + 1));
    }

    for row in pk_rows.rows() {
        let pk = PrimaryKeyRow::try_from(row)?;
        if let Some(field) = table.find_field_mut(&pk.column_name) {
            field.is_primary_key = true;
        }
    }

    // Grouped by index name in order of first appearance
    let mut constraints: Vec<UniqueConstraint> = Vec::new();
    for row in uc_rows.rows() {
        let uc = UniqueIndexRow::try_from(row)?;
        let position = match constraints.iter().position(|c| c.name == uc.index_name) {
            Some(position) => position,
            None => {
                constraints.push(UniqueConstraint {
                    name: uc.index_name.clone(),
                    fields: Vec::new(),
                });
                constraints.len() - 1
            }
        };
        if let Some(field) = table.find_field(&uc.column_name) {
            constraints[position].fields.push(field.name.clone());
        }
    }
    table.unique_constraints = constraints
        .into_iter()
        .filter(|c| !c.fields.is_empty())
        .collect();

    Ok(table)
}

/// Build a view from its field rows
pub fn build_view(name: &ElementName, field_rows: &RowSet) -> Result<View, CatalogDataError> {
    let mut view = View::new(name.name.as_str(), name.description.as_str());
    for (index, row) in field_rows.rows().iter().enumerate() {
        let field = FieldRow::try_from(row)?;
        view.fields.push(field.into_view_field(index + 1));
    }
    Ok(view)
}

/// Build a stored procedure from its parameter rows. No rows means no parameters.
pub fn build_stored_procedure(
    name: &ElementName,
    parameter_rows: &RowSet,
) -> Result<StoredProcedure, CatalogDataError> {
    let mut procedure = StoredProcedure::new(name.name.as_str(), name.description.as_str());
    for row in parameter_rows.rows() {
        let parameter = ProcedureParameterRow::try_from(row)?;
        if parameter.is_parameter() {
            procedure.parameters.push(parameter.into_parameter()?);
        }
    }
    procedure.parameters.sort_by_key(|p| p.ordinal_position);
    Ok(procedure)
}
