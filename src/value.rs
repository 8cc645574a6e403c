//! Values exchanged with the database: catalog cells and parameter values

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use uuid::Uuid;

use crate::types::LangType;

/// Fixed-point decimal: `mantissa * 10^-scale`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decimal {
    pub mantissa: i128,
    pub scale: u32,
}

impl Decimal {
    pub fn new(mantissa: i128, scale: u32) -> Self {
        Self { mantissa, scale }
    }

    /// Number of significant digits
    pub fn precision(&self) -> u32 {
        let digits = self.mantissa.unsigned_abs().checked_ilog10().map_or(1, |d| d + 1);
        digits.max(self.scale)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.mantissa);
        }
        let sign = if self.mantissa < 0 { "-" } else { "" };
        let digits = self.mantissa.unsigned_abs().to_string();
        let scale = self.scale as usize;
        let padded = format!("{:0>width$}", digits, width = scale + 1);
        let (int_part, frac_part) = padded.split_at(padded.len() - scale);
        write!(f, "{}{}.{}", sign, int_part, frac_part)
    }
}

/// A single database value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Byte(u8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Single(f32),
    Double(f64),
    Decimal(Decimal),
    String(String),
    Bytes(Vec<u8>),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
    Time(NaiveTime),
    Guid(Uuid),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Language type of the value, `None` for NULL
    pub fn lang_type(&self) -> Option<LangType> {
        let lang_type = match self {
            Value::Null => return None,
            Value::Boolean(_) => LangType::Boolean,
            Value::Byte(_) => LangType::Byte,
            Value::Int16(_) => LangType::Int16,
            Value::Int32(_) => LangType::Int32,
            Value::Int64(_) => LangType::Int64,
            Value::UInt16(_) => LangType::UInt16,
            Value::UInt32(_) => LangType::UInt32,
            Value::UInt64(_) => LangType::UInt64,
            Value::Single(_) => LangType::Single,
            Value::Double(_) => LangType::Double,
            Value::Decimal(_) => LangType::Decimal,
            Value::String(_) => LangType::String,
            Value::Bytes(_) => LangType::Bytes,
            Value::DateTime(_) | Value::Date(_) => LangType::DateTime,
            Value::Time(_) => LangType::TimeSpan,
            Value::Guid(_) => LangType::Guid,
        };
        Some(lang_type)
    }

    /// Short name of the variant, used in cast diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "bool",
            Value::Byte(_) => "u8",
            Value::Int16(_) => "i16",
            Value::Int32(_) => "i32",
            Value::Int64(_) => "i64",
            Value::UInt16(_) => "u16",
            Value::UInt32(_) => "u32",
            Value::UInt64(_) => "u64",
            Value::Single(_) => "f32",
            Value::Double(_) => "f64",
            Value::Decimal(_) => "decimal",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::DateTime(_) => "datetime",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::Guid(_) => "guid",
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Byte(v) => Some(i64::from(*v)),
            Value::Int16(v) => Some(i64::from(*v)),
            Value::Int32(v) => Some(i64::from(*v)),
            Value::Int64(v) => Some(*v),
            Value::UInt16(v) => Some(i64::from(*v)),
            Value::UInt32(v) => Some(i64::from(*v)),
            Value::UInt64(v) => i64::try_from(*v).ok(),
            Value::Decimal(d) if d.scale == 0 => i64::try_from(d.mantissa).ok(),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Strongly-typed extraction of a `Value`
pub trait FromValue: Sized {
    /// Name of the expected type, for diagnostics
    const EXPECTED: &'static str;

    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for String {
    const EXPECTED: &'static str = "string";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    const EXPECTED: &'static str = "integer";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_i64()
    }
}

impl FromValue for i32 {
    const EXPECTED: &'static str = "32-bit integer";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_i64().and_then(|v| i32::try_from(v).ok())
    }
}

impl FromValue for bool {
    const EXPECTED: &'static str = "bool";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Boolean(b) => Some(*b),
            other => other.as_i64().map(|v| v != 0),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const EXPECTED: &'static str = T::EXPECTED;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}
