//! Abstract query model consumed by the dynamic query engine

use crate::types::AsaDbType;
use crate::value::Value;

use super::function_mappings::DeclaringType;

/// Where a field lives in the database
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPersistenceInfo {
    pub source_schema_name: String,
    pub source_object_name: String,
    pub source_column_name: String,
    pub source_column_db_type: AsaDbType,
    pub source_column_max_length: i32,
    pub source_column_precision: u8,
    pub source_column_scale: u8,
    pub source_column_is_nullable: bool,
    /// Set for identity columns; the value is read back after an insert
    pub identity_value_sequence_name: Option<String>,
}

impl FieldPersistenceInfo {
    pub fn new(
        schema_name: impl Into<String>,
        object_name: impl Into<String>,
        column_name: impl Into<String>,
        db_type: AsaDbType,
    ) -> Self {
        Self {
            source_schema_name: schema_name.into(),
            source_object_name: object_name.into(),
            source_column_name: column_name.into(),
            source_column_db_type: db_type,
            source_column_max_length: 0,
            source_column_precision: 0,
            source_column_scale: 0,
            source_column_is_nullable: true,
            identity_value_sequence_name: None,
        }
    }

    pub fn with_length(mut self, max_length: i32) -> Self {
        self.source_column_max_length = max_length;
        self
    }

    pub fn with_precision(mut self, precision: u8, scale: u8) -> Self {
        self.source_column_precision = precision;
        self.source_column_scale = scale;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.source_column_is_nullable = false;
        self
    }

    pub fn identity(mut self, sequence_name: impl Into<String>) -> Self {
        self.identity_value_sequence_name = Some(sequence_name.into());
        self
    }

    pub fn is_identity(&self) -> bool {
        self.identity_value_sequence_name
            .as_deref()
            .is_some_and(|s| !s.is_empty())
    }
}

/// Aggregate applied to a projected field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateFunction {
    Count,
    CountDistinct,
    CountRow,
    CountBig,
    CountBigDistinct,
    CountBigRow,
    Avg,
    AvgDistinct,
    Max,
    Min,
    Sum,
    SumDistinct,
    StDev,
    StDevDistinct,
    Variance,
    VarianceDistinct,
}

/// A field in a select list, update set or predicate
#[derive(Debug, Clone, PartialEq)]
pub struct EntityField {
    pub name: String,
    /// Alias in the projection
    pub alias: Option<String>,
    /// Alias of the entity the field belongs to
    pub object_alias: Option<String>,
    pub is_primary_key: bool,
    pub is_changed: bool,
    pub is_read_only: bool,
    pub current_value: Value,
    pub aggregate: Option<AggregateFunction>,
    pub expression: Option<Box<Expression>>,
    pub persistence: Option<FieldPersistenceInfo>,
}

impl EntityField {
    pub fn new(name: impl Into<String>, persistence: FieldPersistenceInfo) -> Self {
        Self {
            persistence: Some(persistence),
            ..Self::unmapped(name)
        }
    }

    /// A field with no database mapping; it needs an expression to be emitted
    pub fn unmapped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            object_alias: None,
            is_primary_key: false,
            is_changed: false,
            is_read_only: false,
            current_value: Value::Null,
            aggregate: None,
            expression: None,
            persistence: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.is_read_only = true;
        self
    }

    /// Mark the field as changed with a new value
    pub fn changed(mut self, value: impl Into<Value>) -> Self {
        self.current_value = value.into();
        self.is_changed = true;
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_object_alias(mut self, alias: impl Into<String>) -> Self {
        self.object_alias = Some(alias.into());
        self
    }

    pub fn with_aggregate(mut self, aggregate: AggregateFunction) -> Self {
        self.aggregate = Some(aggregate);
        self
    }

    pub fn with_expression(mut self, expression: Expression) -> Self {
        self.expression = Some(Box::new(expression));
        self
    }

    /// Column type, when the field is mapped
    pub fn db_type(&self) -> Option<AsaDbType> {
        self.persistence.as_ref().map(|p| p.source_column_db_type)
    }

    /// True for a mapped column without aggregate or expression
    pub fn is_plain_column(&self) -> bool {
        self.persistence.is_some() && self.aggregate.is_none() && self.expression.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl ArithmeticOperator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ArithmeticOperator::Add => "+",
            ArithmeticOperator::Subtract => "-",
            ArithmeticOperator::Multiply => "*",
            ArithmeticOperator::Divide => "/",
            ArithmeticOperator::Modulo => "%",
        }
    }
}

/// Scalar expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Field(EntityField),
    Value(Value),
    /// Method call mapped through the function mapping table. The receiver,
    /// when present, is template argument 0.
    FunctionCall {
        declaring_type: DeclaringType,
        method: String,
        receiver: Option<Box<Expression>>,
        arguments: Vec<Expression>,
    },
    Arithmetic {
        left: Box<Expression>,
        operator: ArithmeticOperator,
        right: Box<Expression>,
    },
}

impl Expression {
    pub fn call(
        declaring_type: DeclaringType,
        method: impl Into<String>,
        receiver: Option<Expression>,
        arguments: Vec<Expression>,
    ) -> Self {
        Expression::FunctionCall {
            declaring_type,
            method: method.into(),
            receiver: receiver.map(Box::new),
            arguments,
        }
    }

    pub fn arithmetic(left: Expression, operator: ArithmeticOperator, right: Expression) -> Self {
        Expression::Arithmetic {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }
    }
}

impl From<EntityField> for Expression {
    fn from(field: EntityField) -> Self {
        Expression::Field(field)
    }
}

impl From<Value> for Expression {
    fn from(value: Value) -> Self {
        Expression::Value(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    LesserThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
}

impl ComparisonOperator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ComparisonOperator::Equal => "=",
            ComparisonOperator::NotEqual => "<>",
            ComparisonOperator::LesserThan => "<",
            ComparisonOperator::LessEqual => "<=",
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::GreaterEqual => ">=",
        }
    }
}

/// Filter predicate tree
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare {
        left: Expression,
        operator: ComparisonOperator,
        right: Expression,
    },
    In {
        field: Expression,
        values: Vec<Value>,
        negate: bool,
    },
    IsNull {
        field: Expression,
        negate: bool,
    },
    Like {
        field: EntityField,
        pattern: String,
        negate: bool,
    },
    Between {
        field: Expression,
        lower: Expression,
        upper: Expression,
        negate: bool,
    },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn compare(field: EntityField, operator: ComparisonOperator, value: impl Into<Value>) -> Self {
        Predicate::Compare {
            left: Expression::Field(field),
            operator,
            right: Expression::Value(value.into()),
        }
    }

    pub fn eq(field: EntityField, value: impl Into<Value>) -> Self {
        Self::compare(field, ComparisonOperator::Equal, value)
    }

    pub fn like(field: EntityField, pattern: impl Into<String>) -> Self {
        Predicate::Like {
            field,
            pattern: pattern.into(),
            negate: false,
        }
    }

    pub fn in_values(field: EntityField, values: Vec<Value>) -> Self {
        Predicate::In {
            field: Expression::Field(field),
            values,
            negate: false,
        }
    }

    pub fn is_null(field: EntityField) -> Self {
        Predicate::IsNull {
            field: Expression::Field(field),
            negate: false,
        }
    }

    pub fn between(field: EntityField, lower: impl Into<Value>, upper: impl Into<Value>) -> Self {
        Predicate::Between {
            field: Expression::Field(field),
            lower: Expression::Value(lower.into()),
            upper: Expression::Value(upper.into()),
            negate: false,
        }
    }

    pub fn and(self, other: Predicate) -> Self {
        match self {
            Predicate::And(mut items) => {
                items.push(other);
                Predicate::And(items)
            }
            first => Predicate::And(vec![first, other]),
        }
    }

    pub fn or(self, other: Predicate) -> Self {
        match self {
            Predicate::Or(mut items) => {
                items.push(other);
                Predicate::Or(items)
            }
            first => Predicate::Or(vec![first, other]),
        }
    }

    pub fn negate(self) -> Self {
        Predicate::Not(Box::new(self))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortClause {
    pub field: EntityField,
    pub direction: SortDirection,
}

impl SortClause {
    pub fn ascending(field: EntityField) -> Self {
        Self {
            field,
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(field: EntityField) -> Self {
        Self {
            field,
            direction: SortDirection::Descending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupByClause {
    pub fields: Vec<EntityField>,
    pub having: Option<Predicate>,
}

impl GroupByClause {
    pub fn new(fields: Vec<EntityField>) -> Self {
        Self {
            fields,
            having: None,
        }
    }

    pub fn with_having(mut self, having: Predicate) -> Self {
        self.having = Some(having);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
