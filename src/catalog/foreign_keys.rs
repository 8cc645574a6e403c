//! Cross-schema foreign key retrieval
//!
//! Rows arrive ordered by child schema, child table and column position. A new
//! constraint starts whenever the child table, the parent table or the
//! constraint name changes. A constraint is only attached to its table once
//! all of its rows resolved; one unresolvable row drops the whole constraint.

use uuid::Uuid;

use crate::error::CatalogDataError;
use crate::model::{Catalog, ElementRef, ForeignKeyConstraint, RetrievalDiagnostic};

use super::rows::ForeignKeyRow;
use super::RowSet;

const OPERATION: &str = "retrieving foreign key constraints";

/// How foreign key constraint names are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForeignKeyNaming {
    /// `FK_` plus a random identifier, new on every run
    #[default]
    Synthesized,
    /// The catalog's constraint name when present, else synthesized
    PreferCatalog,
}

impl ForeignKeyNaming {
    fn name_for(&self, catalog_name: Option<&str>) -> String {
        match (self, catalog_name) {
            (ForeignKeyNaming::PreferCatalog, Some(name)) if !name.trim().is_empty() => {
                name.to_string()
            }
            _ => format!("FK_{}", Uuid::new_v4().simple()),
        }
    }
}

/// Identity of the constraint a row belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
struct GroupKey {
    fk_schema: String,
    fk_table: String,
    pk_schema: String,
    pk_table: String,
    fk_name: Option<String>,
}

impl GroupKey {
    fn of(row: &ForeignKeyRow) -> Self {
        Self {
            fk_schema: row.fk_schema.clone(),
            fk_table: row.fk_table_name.clone(),
            pk_schema: row.pk_schema.clone(),
            pk_table: row.pk_table_name.clone(),
            fk_name: row.fk_name.clone(),
        }
    }

    fn describe(&self) -> String {
        format!(
            "[{}].[{}] -> [{}].[{}]",
            self.fk_schema, self.fk_table, self.pk_schema, self.pk_table
        )
    }
}

/// Constraint being assembled from consecutive rows
struct Pending {
    key: GroupKey,
    /// Schema and table index of the child table, if it resolved
    child: Option<(usize, usize)>,
    /// Schema and table index of the parent table, if it resolved
    parent: Option<(usize, usize)>,
    constraint: ForeignKeyConstraint,
    invalid_reason: Option<String>,
}

/// Attach foreign keys described by `rows` to the tables of `catalog`.
///
/// Returns the number of constraints added.
pub fn apply_foreign_key_rows(
    catalog: &mut Catalog,
    rows: &RowSet,
    naming: ForeignKeyNaming,
) -> usize {
    let mut added = 0;
    let mut pending: Option<Pending> = None;

    for row in rows.rows() {
        let row = match ForeignKeyRow::try_from(row) {
            Ok(row) => row,
            Err(e) => {
                // The row can't be attributed to a constraint; poison the active one
                if let Some(p) = pending.as_mut() {
                    p.invalid_reason.get_or_insert_with(|| e.to_string());
                } else {
                    log::warn!("Foreign key row skipped: {}", e);
                }
                continue;
            }
        };

        let key = GroupKey::of(&row);
        if pending.as_ref().map_or(true, |p| p.key != key) {
            if let Some(done) = pending.take() {
                added += flush(catalog, done);
            }
            pending = Some(start(catalog, key, &row, naming));
        }

        if let Some(p) = pending.as_mut() {
            append_pair(catalog, p, &row);
        }
    }

    if let Some(done) = pending.take() {
        added += flush(catalog, done);
    }
    log::debug!("Added {} foreign key constraint(s)", added);
    added
}

fn locate(catalog: &Catalog, schema: &str, table: &str) -> Option<(usize, usize)> {
    let schema_index = catalog
        .schemas
        .iter()
        .position(|s| s.owner.eq_ignore_ascii_case(schema))?;
    let table_index = catalog.schemas[schema_index]
        .tables
        .iter()
        .position(|t| t.name.eq_ignore_ascii_case(table))?;
    Some((schema_index, table_index))
}

fn start(catalog: &Catalog, key: GroupKey, row: &ForeignKeyRow, naming: ForeignKeyNaming) -> Pending {
    let child = locate(catalog, &row.fk_schema, &row.fk_table_name);
    let parent = locate(catalog, &row.pk_schema, &row.pk_table_name);
    let invalid_reason = match (child, parent) {
        (None, _) => Some(format!(
            "foreign key table [{}].[{}] not found",
            row.fk_schema, row.fk_table_name
        )),
        (_, None) => Some(format!(
            "primary key table [{}].[{}] not found",
            row.pk_schema, row.pk_table_name
        )),
        _ => None,
    };
    let primary_key_table = match parent {
        Some((s, t)) => ElementRef::new(
            catalog.schemas[s].owner.as_str(),
            catalog.schemas[s].tables[t].name.as_str(),
        ),
        None => ElementRef::new(row.pk_schema.as_str(), row.pk_table_name.as_str()),
    };
    Pending {
        constraint: ForeignKeyConstraint {
            name: naming.name_for(row.fk_name.as_deref()),
            primary_key_table,
            foreign_key_fields: Vec::new(),
            primary_key_fields: Vec::new(),
        },
        key,
        child,
        parent,
        invalid_reason,
    }
}

fn append_pair(catalog: &Catalog, pending: &mut Pending, row: &ForeignKeyRow) {
    if pending.invalid_reason.is_some() {
        return;
    }
    let (Some((cs, ct)), Some((ps, pt))) = (pending.child, pending.parent) else {
        return;
    };
    let child_table = &catalog.schemas[cs].tables[ct];
    let parent_table = &catalog.schemas[ps].tables[pt];

    match (
        child_table.find_field(&row.fk_column_name),
        parent_table.find_field(&row.pk_column_name),
    ) {
        (Some(fk_field), Some(pk_field)) => {
            pending.constraint.foreign_key_fields.push(fk_field.name.clone());
            pending.constraint.primary_key_fields.push(pk_field.name.clone());
        }
        (None, _) => {
            pending.invalid_reason = Some(
                CatalogDataError::Inconsistent {
                    message: format!("field '{}' not found", row.fk_column_name),
                }
                .to_string(),
            );
        }
        (_, None) => {
            pending.invalid_reason = Some(
                CatalogDataError::Inconsistent {
                    message: format!("referenced field '{}' not found", row.pk_column_name),
                }
                .to_string(),
            );
        }
    }
}

/// Attach a finished constraint, or record why it was dropped. Returns 1 when attached.
fn flush(catalog: &mut Catalog, pending: Pending) -> usize {
    let Pending {
        key,
        child,
        constraint,
        invalid_reason,
        ..
    } = pending;

    if invalid_reason.is_none() && constraint.foreign_key_fields.is_empty() {
        return 0;
    }
    match (invalid_reason, child) {
        (None, Some((s, t))) => {
            catalog.schemas[s].tables[t]
                .foreign_key_constraints
                .push(constraint);
            1
        }
        (reason, child) => {
            let message = reason.unwrap_or_else(|| "unresolved constraint".to_string());
            log::warn!(
                "Foreign key constraint {} dropped: {}",
                key.describe(),
                message
            );
            let diagnostic = RetrievalDiagnostic {
                element: key.describe(),
                operation: OPERATION.to_string(),
                message,
            };
            let schema_index = child.map(|(s, _)| s).or_else(|| {
                catalog
                    .schemas
                    .iter()
                    .position(|s| s.owner.eq_ignore_ascii_case(&key.fk_schema))
            });
            if let Some(s) = schema_index {
                catalog.schemas[s].record_diagnostic(diagnostic);
            }
            0
        }
    }
}
