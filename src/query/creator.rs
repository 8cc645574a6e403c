//! SQL Anywhere specific naming and parameter creation

use std::sync::Arc;

use crate::command::{Parameter, ParameterDirection};
use crate::types::AsaDbType;
use crate::util::bracket;
use crate::value::Value;

use super::model::{AggregateFunction, FieldPersistenceInfo};
use super::name_overwrites::{global_schema_overwrites, SchemaNameOverwrites};

/// Names objects and fields and creates typed parameters.
///
/// Schema names pass through the per-call overwrites first and the
/// process-wide overwrites second.
#[derive(Debug, Clone)]
pub struct SpecificCreator {
    global_overwrites: Arc<SchemaNameOverwrites>,
    per_call_overwrites: Option<SchemaNameOverwrites>,
}

impl Default for SpecificCreator {
    fn default() -> Self {
        Self::new()
    }
}

impl SpecificCreator {
    /// Creator using the installed process-wide overwrites
    pub fn new() -> Self {
        Self::with_global_overwrites(global_schema_overwrites())
    }

    pub fn with_global_overwrites(overwrites: Arc<SchemaNameOverwrites>) -> Self {
        Self {
            global_overwrites: overwrites,
            per_call_overwrites: None,
        }
    }

    pub fn with_per_call_overwrites(mut self, overwrites: SchemaNameOverwrites) -> Self {
        self.per_call_overwrites = Some(overwrites);
        self
    }

    pub fn get_new_schema_name(&self, name: &str) -> String {
        self.global_overwrites.get_new_schema_name(name)
    }

    pub fn get_new_per_call_schema_name(&self, name: &str) -> String {
        match &self.per_call_overwrites {
            Some(overwrites) => overwrites.get_new_schema_name(name),
            None => name.to_string(),
        }
    }

    pub fn get_new_stored_procedure_name(&self, name: &str) -> String {
        self.global_overwrites.get_new_stored_procedure_name(name)
    }

    pub fn get_new_per_call_stored_procedure_name(&self, name: &str) -> String {
        match &self.per_call_overwrites {
            Some(overwrites) => overwrites.get_new_stored_procedure_name(name),
            None => name.to_string(),
        }
    }

    /// Procedure name with both overwrite levels applied
    pub fn create_stored_procedure_name(&self, name: &str) -> String {
        self.get_new_stored_procedure_name(&self.get_new_per_call_stored_procedure_name(name))
    }

    /// `[schema].[element]`, or `[element]` when the schema resolves to empty
    pub fn create_object_name(&self, schema: &str, element: &str) -> String {
        let schema = self.get_new_schema_name(&self.get_new_per_call_schema_name(schema));
        if schema.is_empty() {
            self.create_valid_alias(element)
        } else {
            format!(
                "{}.{}",
                self.create_valid_alias(&schema),
                self.create_valid_alias(element)
            )
        }
    }

    pub fn create_object_name_for(&self, persistence: &FieldPersistenceInfo) -> String {
        self.create_object_name(&persistence.source_schema_name, &persistence.source_object_name)
    }

    pub fn create_valid_alias(&self, raw: &str) -> String {
        bracket(raw)
    }

    /// `[alias].[column]` when the containing entity is aliased, else the
    /// fully qualified column. Wrapped in the aggregate when one is given.
    pub fn create_field_name(
        &self,
        persistence: &FieldPersistenceInfo,
        object_alias: Option<&str>,
        aggregate: Option<AggregateFunction>,
    ) -> String {
        let column = self.create_valid_alias(&persistence.source_column_name);
        let name = match object_alias.filter(|a| !a.is_empty()) {
            Some(alias) => format!("{}.{}", self.create_valid_alias(alias), column),
            None => format!("{}.{}", self.create_object_name_for(persistence), column),
        };
        match aggregate {
            Some(aggregate) => self.wrap_aggregate(aggregate, &name),
            None => name,
        }
    }

    pub fn create_field_name_simple(&self, persistence: &FieldPersistenceInfo) -> String {
        self.create_valid_alias(&persistence.source_column_name)
    }

    pub fn convert_aggregate(&self, aggregate: AggregateFunction) -> AggregateFunction {
        match aggregate {
            AggregateFunction::CountBig => AggregateFunction::Count,
            AggregateFunction::CountBigDistinct => AggregateFunction::CountDistinct,
            AggregateFunction::CountBigRow => AggregateFunction::CountRow,
            other => other,
        }
    }

    pub fn wrap_aggregate(&self, aggregate: AggregateFunction, operand: &str) -> String {
        use AggregateFunction::*;
        match self.convert_aggregate(aggregate) {
            Count | CountBig => format!("COUNT({})", operand),
            CountDistinct | CountBigDistinct => format!("COUNT(DISTINCT {})", operand),
            CountRow | CountBigRow => "COUNT(*)".to_string(),
            Avg => format!("AVG({})", operand),
            AvgDistinct => format!("AVG(DISTINCT {})", operand),
            Max => format!("MAX({})", operand),
            Min => format!("MIN({})", operand),
            Sum => format!("SUM({})", operand),
            SumDistinct => format!("SUM(DISTINCT {})", operand),
            StDev => format!("STDDEV({})", operand),
            StDevDistinct => format!("STDDEV(DISTINCT {})", operand),
            Variance => format!("VARIANCE({})", operand),
            VarianceDistinct => format!("VARIANCE(DISTINCT {})", operand),
        }
    }

    /// Native type for an untyped value. The value is passed through unchanged.
    pub fn db_type_for_value(&self, value: &Value) -> (AsaDbType, Value) {
        let db_type = match value {
            Value::String(s) => match s.chars().count() {
                n if n < 4000 => AsaDbType::NVarChar,
                n if n < 8000 => AsaDbType::VarChar,
                _ => AsaDbType::Text,
            },
            Value::Byte(_) => AsaDbType::TinyInt,
            Value::Int32(_) => AsaDbType::Integer,
            Value::Int16(_) => AsaDbType::SmallInt,
            Value::Int64(_) => AsaDbType::BigInt,
            Value::DateTime(_) | Value::Date(_) => AsaDbType::DateTime,
            Value::Decimal(_) => AsaDbType::Decimal,
            Value::Double(_) => AsaDbType::Double,
            Value::Single(_) => AsaDbType::Real,
            Value::Boolean(_) => AsaDbType::Bit,
            Value::Bytes(b) if b.len() < 8000 => AsaDbType::VarBinary,
            Value::Bytes(_) => AsaDbType::Image,
            _ => AsaDbType::VarChar,
        };
        (db_type, value.clone())
    }

    /// Parameter for a literal value
    pub fn create_value_parameter(&self, name: impl Into<String>, value: &Value) -> Parameter {
        let (db_type, value) = self.db_type_for_value(value);
        let size = match &value {
            Value::String(s) => s.chars().count() as i32,
            Value::Bytes(b) => b.len() as i32,
            _ => 0,
        };
        Parameter {
            name: name.into(),
            db_type: Some(db_type),
            size,
            precision: 0,
            scale: 0,
            direction: ParameterDirection::Input,
            is_nullable: true,
            value,
        }
    }

    /// Parameter typed after the column a value is compared to or stored in
    pub fn create_field_parameter(
        &self,
        name: impl Into<String>,
        persistence: &FieldPersistenceInfo,
        direction: ParameterDirection,
        value: Value,
    ) -> Parameter {
        Parameter {
            name: name.into(),
            db_type: Some(persistence.source_column_db_type),
            size: persistence.source_column_max_length,
            precision: persistence.source_column_precision,
            scale: persistence.source_column_scale,
            direction,
            is_nullable: persistence.source_column_is_nullable,
            value,
        }
    }

    /// LIKE pattern parameter; character targets keep their type
    pub fn create_like_parameter(
        &self,
        name: impl Into<String>,
        pattern: &str,
        target_type: AsaDbType,
    ) -> Parameter {
        let db_type = match target_type {
            AsaDbType::Text => AsaDbType::VarChar,
            AsaDbType::Char | AsaDbType::NChar | AsaDbType::NVarChar | AsaDbType::VarChar => {
                target_type
            }
            _ => AsaDbType::NVarChar,
        };
        Parameter {
            name: name.into(),
            db_type: Some(db_type),
            size: pattern.chars().count() as i32,
            precision: 0,
            scale: 0,
            direction: ParameterDirection::Input,
            is_nullable: true,
            value: Value::String(pattern.to_string()),
        }
    }
}
