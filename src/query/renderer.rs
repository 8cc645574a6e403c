//! Expression and predicate rendering

use crate::command::ParameterDirection;
use crate::error::QueryConstructionError;
use crate::types::AsaDbType;
use crate::value::Value;

use super::creator::SpecificCreator;
use super::function_mappings::FunctionMappingStore;
use super::model::{ComparisonOperator, EntityField, Expression, FieldPersistenceInfo, Predicate};
use super::parameters::ParameterCollector;
use super::relations::RelationEnd;

/// Renders the query model into SQL text with named parameters
pub struct SqlRenderer<'a> {
    creator: &'a SpecificCreator,
    functions: &'a FunctionMappingStore,
    parameters: &'a mut ParameterCollector,
}

impl<'a> SqlRenderer<'a> {
    pub fn new(
        creator: &'a SpecificCreator,
        functions: &'a FunctionMappingStore,
        parameters: &'a mut ParameterCollector,
    ) -> Self {
        Self {
            creator,
            functions,
            parameters,
        }
    }

    pub fn creator(&self) -> &SpecificCreator {
        self.creator
    }

    pub(crate) fn relation_end(&self, end: &RelationEnd) -> String {
        let name = self.creator.create_object_name(&end.schema_name, &end.object_name);
        match end.alias.as_deref().filter(|a| !a.is_empty()) {
            Some(alias) => format!("{} {}", name, self.creator.create_valid_alias(alias)),
            None => name,
        }
    }

    pub(crate) fn relation_column(&self, end: &RelationEnd, column: &str) -> String {
        let column = self.creator.create_valid_alias(column);
        match end.alias.as_deref().filter(|a| !a.is_empty()) {
            Some(alias) => format!("{}.{}", self.creator.create_valid_alias(alias), column),
            None => format!(
                "{}.{}",
                self.creator.create_object_name(&end.schema_name, &end.object_name),
                column
            ),
        }
    }

    /// Field reference, with its aggregate applied when `apply_aggregate` is set
    pub fn field(&mut self, field: &EntityField, apply_aggregate: bool) -> Result<String, QueryConstructionError> {
        let aggregate = field.aggregate.filter(|_| apply_aggregate);
        if let Some(expression) = &field.expression {
            let text = self.expression(expression)?;
            return Ok(match aggregate {
                Some(aggregate) => self.creator.wrap_aggregate(aggregate, &text),
                None => text,
            });
        }
        let persistence = field.persistence.as_ref().ok_or_else(|| {
            QueryConstructionError::MissingPersistenceInfo {
                field: field.name.clone(),
            }
        })?;
        Ok(self
            .creator
            .create_field_name(persistence, field.object_alias.as_deref(), aggregate))
    }

    pub fn expression(&mut self, expression: &Expression) -> Result<String, QueryConstructionError> {
        match expression {
            Expression::Field(field) => self.field(field, true),
            Expression::Value(value) => Ok(self.value(value, None)),
            Expression::FunctionCall {
                declaring_type,
                method,
                receiver,
                arguments,
            } => {
                let mut rendered = Vec::with_capacity(arguments.len() + 1);
                if let Some(receiver) = receiver {
                    rendered.push(self.expression(receiver)?);
                }
                for argument in arguments {
                    rendered.push(self.expression(argument)?);
                }
                self.functions
                    .render(*declaring_type, method, arguments.len(), &rendered)
            }
            Expression::Arithmetic {
                left,
                operator,
                right,
            } => Ok(format!(
                "({} {} {})",
                self.expression(left)?,
                operator.as_sql(),
                self.expression(right)?
            )),
        }
    }

    /// Add a parameter for `value` and return its name. A mapped column the
    /// value is compared with types the parameter.
    fn value(&mut self, value: &Value, target: Option<&FieldPersistenceInfo>) -> String {
        let name = self.parameters.next_name();
        let parameter = match target {
            Some(persistence) => self.creator.create_field_parameter(
                name,
                persistence,
                ParameterDirection::Input,
                value.clone(),
            ),
            None => self.creator.create_value_parameter(name, value),
        };
        self.parameters.add(parameter)
    }

    /// Parameter for a value stored into a column
    pub(crate) fn field_value(&mut self, persistence: &FieldPersistenceInfo, value: &Value) -> String {
        self.value(value, Some(persistence))
    }

    /// Value operand rendered against the column on the other side, if any
    fn operand(&mut self, operand: &Expression, other: &Expression) -> Result<String, QueryConstructionError> {
        match (operand, other) {
            (Expression::Value(value), Expression::Field(field)) if field.is_plain_column() => {
                Ok(self.value(value, field.persistence.as_ref()))
            }
            _ => self.expression(operand),
        }
    }

    /// Predicate text; empty when the predicate has no conditions
    pub fn predicate(&mut self, predicate: &Predicate) -> Result<String, QueryConstructionError> {
        match predicate {
            Predicate::Compare {
                left,
                operator,
                right,
            } => {
                let is_equality = matches!(operator, ComparisonOperator::Equal | ComparisonOperator::NotEqual);
                if is_equality && matches!(right, Expression::Value(Value::Null)) {
                    let negate = *operator == ComparisonOperator::NotEqual;
                    return Ok(format!("{} IS {}NULL", self.expression(left)?, not(negate)));
                }
                let left_text = self.operand(left, right)?;
                let right_text = self.operand(right, left)?;
                Ok(format!("{} {} {}", left_text, operator.as_sql(), right_text))
            }
            Predicate::In {
                field,
                values,
                negate,
            } => {
                if values.is_empty() {
                    return Ok(if *negate { "1=1" } else { "1=0" }.to_string());
                }
                let field_text = self.expression(field)?;
                let target = match field {
                    Expression::Field(f) if f.is_plain_column() => f.persistence.as_ref(),
                    _ => None,
                };
                let names: Vec<String> = values.iter().map(|v| self.value(v, target)).collect();
                Ok(format!("{} {}IN ({})", field_text, not(*negate), names.join(", ")))
            }
            Predicate::IsNull { field, negate } => {
                Ok(format!("{} IS {}NULL", self.expression(field)?, not(*negate)))
            }
            Predicate::Like {
                field,
                pattern,
                negate,
            } => {
                let field_text = self.field(field, true)?;
                let target_type = field.db_type().unwrap_or(AsaDbType::NVarChar);
                let name = self.parameters.next_name();
                let parameter = self.creator.create_like_parameter(name, pattern, target_type);
                let name = self.parameters.add(parameter);
                Ok(format!("{} {}LIKE {}", field_text, not(*negate), name))
            }
            Predicate::Between {
                field,
                lower,
                upper,
                negate,
            } => {
                let field_text = self.expression(field)?;
                let lower_text = self.operand(lower, field)?;
                let upper_text = self.operand(upper, field)?;
                Ok(format!(
                    "{} {}BETWEEN {} AND {}",
                    field_text,
                    not(*negate),
                    lower_text,
                    upper_text
                ))
            }
            Predicate::And(items) => self.combine(items, " AND "),
            Predicate::Or(items) => self.combine(items, " OR "),
            Predicate::Not(inner) => {
                let text = self.predicate(inner)?;
                Ok(if text.is_empty() {
                    text
                } else {
                    format!("NOT ({})", text)
                })
            }
        }
    }

    fn combine(&mut self, items: &[Predicate], operator: &str) -> Result<String, QueryConstructionError> {
        let mut parts = Vec::with_capacity(items.len());
        for item in items {
            let text = self.predicate(item)?;
            if !text.is_empty() {
                parts.push(text);
            }
        }
        Ok(match parts.len() {
            0 => String::new(),
            1 => parts.remove(0),
            _ => format!("({})", parts.join(operator)),
        })
    }
}

fn not(negate: bool) -> &'static str {
    if negate {
        "NOT "
    } else {
        ""
    }
}
