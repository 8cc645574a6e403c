//! Commands and parameters handed to the query-execution collaborator

use std::fmt;

use crate::types::AsaDbType;
use crate::value::Value;

/// Direction of a command or stored-procedure parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParameterDirection {
    #[default]
    Input,
    Output,
    InputOutput,
    ReturnValue,
}

impl fmt::Display for ParameterDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParameterDirection::Input => "In",
            ParameterDirection::Output => "Out",
            ParameterDirection::InputOutput => "InOut",
            ParameterDirection::ReturnValue => "ReturnValue",
        };
        f.write_str(s)
    }
}

/// A command parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Name including the `@` prefix. Kept after anonymization so output
    /// values can be bound back.
    pub name: String,
    pub db_type: Option<AsaDbType>,
    pub size: i32,
    pub precision: u8,
    pub scale: u8,
    pub direction: ParameterDirection,
    pub is_nullable: bool,
    pub value: Value,
}

impl Parameter {
    /// Untyped input parameter
    pub fn input(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            db_type: None,
            size: 0,
            precision: 0,
            scale: 0,
            direction: ParameterDirection::Input,
            is_nullable: true,
            value: value.into(),
        }
    }
}

/// How the command text is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandType {
    #[default]
    Text,
    StoredProcedure,
}

/// Command text plus bound parameters
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Command {
    pub text: String,
    pub command_type: CommandType,
    pub parameters: Vec<Parameter>,
}

impl Command {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            command_type: CommandType::Text,
            parameters: Vec::new(),
        }
    }

    pub fn stored_procedure(name: impl Into<String>) -> Self {
        Self {
            text: name.into(),
            command_type: CommandType::StoredProcedure,
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Re-bind the value of an existing parameter. Returns false when unknown.
    pub fn bind(&mut self, name: &str, value: impl Into<Value>) -> bool {
        match self
            .parameters
            .iter_mut()
            .find(|p| p.name.eq_ignore_ascii_case(name))
        {
            Some(p) => {
                p.value = value.into();
                true
            }
            None => false,
        }
    }
}
