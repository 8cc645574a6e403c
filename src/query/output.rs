//! Engine output: executable commands plus the instructions that go with them

use crate::command::{Command, Parameter};

/// Links an output parameter to the field that receives its value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterFieldRelation {
    pub field_name: String,
    pub parameter_name: String,
}

/// Query run after the main command to read back a generated value
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceRetrievalQuery {
    pub command: Command,
    /// Receives the retrieved value
    pub sequence_parameter: Parameter,
    pub execute_before_main: bool,
}

/// Insert, update or delete
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ActionQuery {
    pub command: Command,
    pub sequence_retrieval_queries: Vec<SequenceRetrievalQuery>,
    pub parameter_field_relations: Vec<ParameterFieldRelation>,
}

/// Select, with the work the caller has to finish on the client
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RetrievalQuery {
    pub command: Command,
    /// Stop reading after `manual_rows_to_take` rows
    pub requires_client_side_limitation: bool,
    /// Duplicate rows must be filtered while reading
    pub requires_client_side_distinct_filtering: bool,
    /// Skip `manual_rows_to_skip` rows, then take `manual_rows_to_take`
    pub requires_client_side_paging: bool,
    pub manual_rows_to_skip: usize,
    pub manual_rows_to_take: usize,
}

impl RetrievalQuery {
    pub fn sql(&self) -> &str {
        &self.command.text
    }
}

impl ActionQuery {
    pub fn sql(&self) -> &str {
        &self.command.text
    }
}
