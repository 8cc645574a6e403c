//! Host method to SQL Anywhere function mapping
//!
//! Keyed by (declaring type, method name, arity). Arity counts the method's
//! own arguments; for instance methods the receiver is template argument 0
//! and the arguments follow it.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;

use crate::error::QueryConstructionError;

/// Host type that declares a mapped method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclaringType {
    VisualBasicOperators,
    Array,
    Boolean,
    Char,
    Convert,
    Byte,
    SByte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    DateTime,
    Decimal,
    Math,
    String,
    Object,
}

impl fmt::Display for DeclaringType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeclaringType::VisualBasicOperators => "Microsoft.VisualBasic.CompilerServices.Operators",
            DeclaringType::Array => "System.Array",
            DeclaringType::Boolean => "System.Boolean",
            DeclaringType::Char => "System.Char",
            DeclaringType::Convert => "System.Convert",
            DeclaringType::Byte => "System.Byte",
            DeclaringType::SByte => "System.SByte",
            DeclaringType::Int16 => "System.Int16",
            DeclaringType::UInt16 => "System.UInt16",
            DeclaringType::Int32 => "System.Int32",
            DeclaringType::UInt32 => "System.UInt32",
            DeclaringType::Int64 => "System.Int64",
            DeclaringType::UInt64 => "System.UInt64",
            DeclaringType::DateTime => "System.DateTime",
            DeclaringType::Decimal => "System.Decimal",
            DeclaringType::Math => "System.Math",
            DeclaringType::String => "System.String",
            DeclaringType::Object => "System.Object",
        };
        f.write_str(name)
    }
}

const COMPARE_TEMPLATE: &str = "CASE WHEN {0} < {1} THEN -1 WHEN {0} = {1} THEN 0 ELSE 1 END";

use DeclaringType as T;

// (declaring type, method, arity, template)
const MAPPINGS: &[(DeclaringType, &str, usize, &str)] = &[
    (T::VisualBasicOperators, "CompareString", 3, COMPARE_TEMPLATE),
    (T::Array, "get_Length", 0, "LENGTH({0})"),
    (T::Boolean, "Negate", 1, "NOT ({0}=1)"),
    (T::Boolean, "ToString", 0, "CASE WHEN ({0})=1 THEN 'True' ELSE 'False' END"),
    (T::Char, "ToUnicode", 1, "UNICODE({0})"),
    (T::Convert, "ToBoolean", 1, "(CONVERT(BIT, {0})=1)"),
    (T::Convert, "ToByte", 1, "CONVERT(TINYINT, {0})"),
    (T::Convert, "ToChar", 1, "CONVERT(NCHAR, {0})"),
    (T::Convert, "ToDateTime", 1, "CONVERT(DATETIME, {0})"),
    (T::Convert, "ToDecimal", 1, "CONVERT(DECIMAL, {0})"),
    (T::Convert, "ToDouble", 1, "CONVERT(FLOAT, {0})"),
    (T::Convert, "ToInt16", 1, "CONVERT(SMALLINT, {0})"),
    (T::Convert, "ToInt32", 1, "CONVERT(INT, {0})"),
    (T::Convert, "ToInt64", 1, "CONVERT(BIGINT, {0})"),
    (T::Convert, "ToSingle", 1, "CONVERT(REAL, {0})"),
    (T::Convert, "ToString", 1, "CONVERT(NVARCHAR(4000), {0})"),
    (T::Byte, "ToString", 0, "CONVERT(NVARCHAR(4), {0})"),
    (T::SByte, "ToString", 0, "CONVERT(NVARCHAR(4), {0})"),
    (T::Int16, "ToString", 0, "CONVERT(NVARCHAR(5), {0})"),
    (T::UInt16, "ToString", 0, "CONVERT(NVARCHAR(5), {0})"),
    (T::Int32, "ToString", 0, "CONVERT(NVARCHAR(10), {0})"),
    (T::UInt32, "ToString", 0, "CONVERT(NVARCHAR(10), {0})"),
    (T::Int64, "ToString", 0, "CONVERT(NVARCHAR(32), {0})"),
    (T::UInt64, "ToString", 0, "CONVERT(NVARCHAR(32), {0})"),
    (T::DateTime, "AddDays", 1, "DATEADD(day, {1}, {0})"),
    (T::DateTime, "AddHours", 1, "DATEADD(hour, {1}, {0})"),
    (T::DateTime, "AddMilliseconds", 1, "DATEADD(millisecond, {1}, {0})"),
    (T::DateTime, "AddMinutes", 1, "DATEADD(minute, {1}, {0})"),
    (T::DateTime, "AddMonths", 1, "DATEADD(month, {1}, {0})"),
    (T::DateTime, "AddSeconds", 1, "DATEADD(second, {1}, {0})"),
    (T::DateTime, "AddYears", 1, "DATEADD(year, {1}, {0})"),
    (T::DateTime, "Compare", 2, COMPARE_TEMPLATE),
    (T::DateTime, "get_Date", 0, "DATE({0})"),
    (T::DateTime, "get_Day", 0, "DAY({0})"),
    (
        T::DateTime,
        "get_DayOfWeek",
        0,
        "(DOW({0}) + (SELECT CONNECTION_PROPERTY('first_day_of_week')) + 6) % 7",
    ),
    (T::DateTime, "get_DayOfYear", 0, "DATEPART(dy, {0})"),
    (T::DateTime, "get_Hour", 0, "DATEPART(hh, {0})"),
    (T::DateTime, "get_Millisecond", 0, "DATEPART(ms, {0})"),
    (T::DateTime, "get_Minute", 0, "DATEPART(mi, {0})"),
    (T::DateTime, "get_Month", 0, "MONTH({0})"),
    (T::DateTime, "get_Second", 0, "DATEPART(ss, {0})"),
    (T::DateTime, "get_Year", 0, "YEAR({0})"),
    (T::Decimal, "Add", 2, "({0} + {1})"),
    (T::Decimal, "Ceiling", 1, "CEILING({0})"),
    (T::Decimal, "Compare", 2, COMPARE_TEMPLATE),
    (T::Decimal, "Divide", 2, "({0} / {1})"),
    (T::Decimal, "Floor", 1, "FLOOR({0})"),
    (T::Decimal, "Multiply", 2, "({0} * {1})"),
    (T::Decimal, "Negate", 1, "(-1 * {0})"),
    (T::Decimal, "Remainder", 2, "({0} - (CAST(({0} / {1}) AS INT) * {1}))"),
    (T::Decimal, "Round", 1, "ROUND({0}, 0)"),
    (T::Decimal, "Round", 2, "ROUND({0}, {1})"),
    (T::Decimal, "Subtract", 2, "({0} - {1})"),
    (T::Decimal, "Truncate", 1, "TRUNCNUM({0}, 0)"),
    (T::Math, "Pow", 2, "POWER({0}, {1})"),
    (T::String, "Compare", 2, COMPARE_TEMPLATE),
    (T::String, "Concat", 2, "({0} + {1})"),
    (T::String, "IndexOf", 1, "(CHARINDEX({1}, {0}) - 1)"),
    (T::String, "IndexOf", 2, "(CHARINDEX({1}, {0}, {2} + 1) - 1)"),
    (
        T::String,
        "LastIndexOf",
        1,
        "CASE WHEN COALESCE(CHARINDEX({1}, {0}), 0)=0 THEN -1 ELSE (LENGTH({0}) - CHARINDEX(REVERSE({1}), REVERSE({0})))-(LENGTH({1})-1) END",
    ),
    (
        T::String,
        "LastIndexOf",
        2,
        "CASE WHEN LENGTH({0})<= {2} THEN -1 WHEN COALESCE(CHARINDEX({1}, LEFT({0}, {2})), 0)=0 THEN -1 ELSE ({2} - CHARINDEX(REVERSE({1}), REVERSE(LEFT({0}, {2}))))-(LENGTH({1})-1) END",
    ),
    (
        T::String,
        "PadLeft",
        1,
        "CASE WHEN LENGTH({0})>={1} THEN {0} ELSE SPACE({1} - LENGTH({0})) + {0} END",
    ),
    (
        T::String,
        "PadLeft",
        2,
        "CASE WHEN LENGTH({0})>={1} THEN {0} ELSE REPLICATE({2}, {1} - LENGTH({0})) + {0} END",
    ),
    (
        T::String,
        "PadRight",
        1,
        "CASE WHEN LENGTH({0})>={1} THEN {0} ELSE {0} + SPACE({1} - LENGTH({0})) END",
    ),
    (
        T::String,
        "PadRight",
        2,
        "CASE WHEN LENGTH({0})>={1} THEN {0} ELSE {0} + REPLICATE({2}, {1} - LENGTH({0})) END",
    ),
    (T::String, "Remove", 1, "LEFT({0}, {1})"),
    (T::String, "Remove", 2, "STUFF({0}, {1}+1, {2}, '')"),
    (T::String, "Replace", 2, "REPLACE({0}, {1}, {2})"),
    (T::String, "Substring", 1, "SUBSTRING({0}, {1}+1)"),
    (T::String, "Substring", 2, "SUBSTRING({0}, {1}+1, {2})"),
    (T::String, "ToLower", 0, "LOWER({0})"),
    (T::String, "ToUpper", 0, "UPPER({0})"),
    (T::String, "Trim", 0, "TRIM({0})"),
    (T::String, "get_Length", 0, "LENGTH({0})"),
    // trailing space is part of the template
    (T::String, "get_Chars", 1, "SUBSTRING({0}, {1}+1, 1) "),
    (T::Object, "IIF", 3, "CASE WHEN {0}=1 THEN {1} ELSE {2} END"),
    (T::Object, "IIF_Bool", 3, "(CASE WHEN {0}=1 THEN {1} ELSE {2} END)=1"),
    (T::Object, "LeftShift", 2, "({0} * POWER(2, {1}))"),
    (T::Object, "RightShift", 2, "({0} / POWER(2, {1}))"),
    (T::Object, "BooleanInProjectionWrapper", 1, "CASE WHEN {0} THEN 1 ELSE 0 END"),
];

static DEFAULT_STORE: Lazy<FunctionMappingStore> = Lazy::new(|| {
    let mut builder = FunctionMappingStore::builder();
    for (declaring_type, method, arity, template) in MAPPINGS {
        builder.add(*declaring_type, *method, *arity, *template);
    }
    builder.freeze()
});

type MappingKey = (DeclaringType, String, usize);

/// Collects mappings before they are frozen
#[derive(Debug, Default)]
pub struct FunctionMappingStoreBuilder {
    mappings: HashMap<MappingKey, String>,
}

impl FunctionMappingStoreBuilder {
    /// Add or replace a mapping
    pub fn add(
        &mut self,
        declaring_type: DeclaringType,
        method: impl Into<String>,
        arity: usize,
        template: impl Into<String>,
    ) -> &mut Self {
        self.mappings
            .insert((declaring_type, method.into(), arity), template.into());
        self
    }

    pub fn freeze(self) -> FunctionMappingStore {
        FunctionMappingStore {
            mappings: self.mappings,
        }
    }
}

/// Immutable mapping table
#[derive(Debug, Clone)]
pub struct FunctionMappingStore {
    mappings: HashMap<MappingKey, String>,
}

impl FunctionMappingStore {
    pub fn builder() -> FunctionMappingStoreBuilder {
        FunctionMappingStoreBuilder::default()
    }

    /// The built-in SQL Anywhere mappings
    pub fn sql_anywhere() -> &'static FunctionMappingStore {
        &DEFAULT_STORE
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn get(&self, declaring_type: DeclaringType, method: &str, arity: usize) -> Option<&str> {
        self.mappings
            .get(&(declaring_type, method.to_string(), arity))
            .map(String::as_str)
    }

    /// Look up a mapping and substitute the rendered arguments into it
    pub fn render(
        &self,
        declaring_type: DeclaringType,
        method: &str,
        arity: usize,
        arguments: &[String],
    ) -> Result<String, QueryConstructionError> {
        let template = self.get(declaring_type, method, arity).ok_or_else(|| {
            QueryConstructionError::UnknownFunctionMapping {
                declaring_type: declaring_type.to_string(),
                method: method.to_string(),
                arity,
            }
        })?;
        apply_template(template, arguments)
    }
}

/// Substitute `{n}` placeholders in a single left-to-right pass. Text coming
/// from an argument is never rescanned, and braces that don't enclose a
/// number are copied as-is.
pub fn apply_template(template: &str, arguments: &[String]) -> Result<String, QueryConstructionError> {
    let mut out = String::with_capacity(template.len() + arguments.iter().map(String::len).sum::<usize>());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let digits = after.bytes().take_while(u8::is_ascii_digit).count();
        let closed = digits > 0 && after.as_bytes().get(digits) == Some(&b'}');
        if !closed {
            out.push('{');
            rest = after;
            continue;
        }
        let index: usize = after[..digits].parse().map_err(|_| {
            QueryConstructionError::TemplateArgumentOutOfRange {
                template: template.to_string(),
                index: usize::MAX,
                available: arguments.len(),
            }
        })?;
        let argument = arguments.get(index).ok_or_else(|| {
            QueryConstructionError::TemplateArgumentOutOfRange {
                template: template.to_string(),
                index,
                available: arguments.len(),
            }
        })?;
        out.push_str(argument);
        rest = &after[digits + 1..];
    }
    out.push_str(rest);
    Ok(out)
}
