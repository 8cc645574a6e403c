//! Resolved column/parameter type

use std::fmt;

use super::{derive_type, AsaDbType};

/// A native type plus its size information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeDefinition {
    pub db_type: AsaDbType,
    /// Length in characters/bytes; 0 means unlimited
    pub length: i32,
    pub precision: i32,
    pub scale: i32,
}

impl TypeDefinition {
    pub fn new(db_type: AsaDbType, length: i32, precision: i32, scale: i32) -> Self {
        Self {
            db_type,
            length,
            precision,
            scale,
        }
    }

    /// Build a definition from raw catalog values.
    ///
    /// `precision` defaults to the length and `scale` to 0 when the catalog
    /// has no value. Long/LOB types always report a length of 0.
    pub fn from_catalog(
        domain_name: &str,
        width: i32,
        precision: Option<i32>,
        scale: Option<i32>,
    ) -> Self {
        let db_type = derive_type(domain_name, width);
        let length = if db_type.has_unlimited_length() {
            0
        } else {
            width
        };
        Self {
            db_type,
            length,
            precision: precision.unwrap_or(width),
            scale: scale.unwrap_or(0),
        }
    }

    /// Type as it would appear in DDL, e.g. `VARCHAR(50)` or `NUMERIC(10,2)`
    pub fn type_string(&self) -> String {
        let name = self.db_type.canonical_name();
        if self.db_type.is_decimal() {
            format!("{}({},{})", name, self.precision, self.scale)
        } else if (self.db_type.is_fixed_length() || self.db_type.is_variable_length())
            && self.length > 0
        {
            format!("{}({})", name, self.length)
        } else {
            name.to_string()
        }
    }
}

impl fmt::Display for TypeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_string())
    }
}
