//! Error types for rust-sqlanywhere

use std::path::PathBuf;
use thiserror::Error;

/// Error raised by the query-execution collaborator (driver/provider level).
pub type ExecutionError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Fatal errors surfaced to the caller
#[derive(Error, Debug)]
pub enum SqlAnywhereError {
    #[error("Failed to read configuration file: {path}")]
    ConfigReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration file: {path}")]
    ConfigParseError {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("Schema name overwrites were already installed for this process")]
    OverwritesAlreadyInstalled,

    #[error("Query execution failed during '{operation}'")]
    Execution {
        operation: String,
        #[source]
        source: ExecutionError,
    },

    #[error(transparent)]
    QueryConstruction(#[from] QueryConstructionError),
}

impl SqlAnywhereError {
    pub(crate) fn execution(operation: impl Into<String>, source: ExecutionError) -> Self {
        SqlAnywhereError::Execution {
            operation: operation.into(),
            source,
        }
    }
}

/// A query request that cannot be expressed in SQL Anywhere SQL
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryConstructionError {
    #[error("The insert query doesn't contain any fields.")]
    EmptyInsert,

    #[error("The update query doesn't contain any fields.")]
    EmptyUpdate,

    #[error("The query doesn't contain any fields to select.")]
    EmptySelectList,

    #[error("Field '{field}' has no persistence info; a target table can't be determined")]
    MissingPersistenceInfo { field: String },

    #[error("No function mapping found for {declaring_type}.{method} with {arity} argument(s)")]
    UnknownFunctionMapping {
        declaring_type: String,
        method: String,
        arity: usize,
    },

    #[error("Function mapping template '{template}' references argument {index}, but only {available} were supplied")]
    TemplateArgumentOutOfRange {
        template: String,
        index: usize,
        available: usize,
    },
}

/// Recoverable per-object data problems found while reading the catalog.
///
/// These never abort a retrieval run: the affected table, view, procedure or
/// constraint is dropped and the problem is logged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogDataError {
    #[error("Column '{column}' is missing from the catalog result set")]
    MissingColumn { column: String },

    #[error("Invalid cast of column '{column}': expected {expected}, found {found}")]
    InvalidCast {
        column: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Catalog inconsistency: {message}")]
    Inconsistent { message: String },
}
