//! Query-execution collaborator contract and scoped connection handling

use std::sync::Arc;

use crate::command::Command;
use crate::error::{CatalogDataError, ExecutionError, SqlAnywhereError};
use crate::value::{FromValue, Value};

/// A connection to the database, supplied by the host
pub trait Connection {
    fn open(&mut self) -> Result<(), ExecutionError>;

    /// Prepare a command for repeated execution. Parameters are re-bound
    /// between executions; the command text never changes.
    fn prepare(&mut self, _command: &Command) -> Result<(), ExecutionError> {
        Ok(())
    }

    fn execute(&mut self, command: &Command) -> Result<RowSet, ExecutionError>;

    /// Release the connection. Must be safe to call on a connection that
    /// never opened.
    fn close(&mut self);
}

/// Creates connections for one retrieval run
pub trait ConnectionFactory {
    fn create_connection(&self) -> Result<Box<dyn Connection>, ExecutionError>;
}

/// Open connection that is closed when the guard goes out of scope
pub struct ConnectionGuard {
    connection: Box<dyn Connection>,
    operation: String,
}

impl ConnectionGuard {
    /// Create and open a connection; `operation` names the retrieval step
    /// in error messages.
    pub fn open(
        factory: &dyn ConnectionFactory,
        operation: impl Into<String>,
    ) -> Result<Self, SqlAnywhereError> {
        let operation = operation.into();
        let connection = factory
            .create_connection()
            .map_err(|e| SqlAnywhereError::execution(operation.clone(), e))?;
        let mut guard = Self {
            connection,
            operation,
        };
        // close() runs through Drop if open() fails
        guard
            .connection
            .open()
            .map_err(|e| SqlAnywhereError::execution(guard.operation.clone(), e))?;
        Ok(guard)
    }

    pub fn prepare(&mut self, command: &Command) -> Result<(), SqlAnywhereError> {
        self.connection
            .prepare(command)
            .map_err(|e| SqlAnywhereError::execution(self.operation.clone(), e))
    }

    pub fn execute(&mut self, command: &Command) -> Result<RowSet, SqlAnywhereError> {
        log::trace!("Executing catalog query: {}", command.text);
        self.connection
            .execute(command)
            .map_err(|e| SqlAnywhereError::execution(self.operation.clone(), e))
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.connection.close();
    }
}

/// Result of one query execution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    columns: Arc<Vec<String>>,
    rows: Vec<Row>,
}

impl RowSet {
    pub fn new<S: AsRef<str>>(columns: &[S]) -> Self {
        Self {
            columns: Arc::new(columns.iter().map(|c| c.as_ref().to_string()).collect()),
            rows: Vec::new(),
        }
    }

    /// Append a row. Missing trailing values are NULL; extra values are dropped.
    pub fn push(&mut self, mut values: Vec<Value>) {
        values.resize(self.columns.len(), Value::Null);
        self.rows.push(Row {
            columns: Arc::clone(&self.columns),
            values,
        });
    }

    pub fn with_row(mut self, values: Vec<Value>) -> Self {
        self.push(values);
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A single result row with case-insensitive column lookup
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<Vec<String>>,
    values: Vec<Value>,
}

impl Row {
    pub fn value(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(column))
            .and_then(|i| self.values.get(i))
    }

    /// Typed access to a column
    pub fn get<T: FromValue>(&self, column: &str) -> Result<T, CatalogDataError> {
        let value = self
            .value(column)
            .ok_or_else(|| CatalogDataError::MissingColumn {
                column: column.to_string(),
            })?;
        T::from_value(value).ok_or_else(|| CatalogDataError::InvalidCast {
            column: column.to_string(),
            expected: T::EXPECTED,
            found: value.type_name(),
        })
    }
}
