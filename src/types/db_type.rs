//! SQL Anywhere native types and their parallel lookup tables

use std::fmt;

/// Native SQL Anywhere column types.
///
/// The discriminant is the index into the parallel lookup tables below, so the
/// order of the variants is significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AsaDbType {
    BigInt,
    Binary,
    Bit,
    Char,
    Date,
    DateTime,
    Decimal,
    Double,
    FloatReal,
    FloatDouble,
    Image,
    Integer,
    LongBinary,
    LongNVarChar,
    LongVarBit,
    LongVarChar,
    Money,
    NChar,
    NText,
    Numeric,
    NVarChar,
    Real,
    SmallDateTime,
    SmallInt,
    SmallMoney,
    Text,
    Time,
    TimeStamp,
    TinyInt,
    UniqueIdentifier,
    UnsignedBigInt,
    UnsignedInt,
    UnsignedSmallInt,
    VarBinary,
    VarBit,
    VarChar,
    Xml,
}

/// Number of native types
pub const AMOUNT_OF_DB_TYPES: usize = 37;

/// General-purpose language type a native type materializes as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LangType {
    Bytes,
    Boolean,
    String,
    DateTime,
    Decimal,
    Double,
    Single,
    Int64,
    Int32,
    Int16,
    Byte,
    TimeSpan,
    Guid,
    UInt64,
    UInt32,
    UInt16,
}

impl LangType {
    pub const ALL: [LangType; 16] = [
        LangType::Bytes,
        LangType::Boolean,
        LangType::String,
        LangType::DateTime,
        LangType::Decimal,
        LangType::Double,
        LangType::Single,
        LangType::Int64,
        LangType::Int32,
        LangType::Int16,
        LangType::Byte,
        LangType::TimeSpan,
        LangType::Guid,
        LangType::UInt64,
        LangType::UInt32,
        LangType::UInt16,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LangType::Bytes => "bytes",
            LangType::Boolean => "bool",
            LangType::String => "string",
            LangType::DateTime => "datetime",
            LangType::Decimal => "decimal",
            LangType::Double => "f64",
            LangType::Single => "f32",
            LangType::Int64 => "i64",
            LangType::Int32 => "i32",
            LangType::Int16 => "i16",
            LangType::Byte => "u8",
            LangType::TimeSpan => "time",
            LangType::Guid => "guid",
            LangType::UInt64 => "u64",
            LangType::UInt32 => "u32",
            LangType::UInt16 => "u16",
        }
    }
}

impl fmt::Display for LangType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for LangType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        let found = match lower.as_str() {
            "bytes" | "byte[]" | "binary" => Some(LangType::Bytes),
            "bool" | "boolean" => Some(LangType::Boolean),
            "string" | "str" => Some(LangType::String),
            "decimal" => Some(LangType::Decimal),
            "double" => Some(LangType::Double),
            "single" | "float" => Some(LangType::Single),
            "int64" | "long" => Some(LangType::Int64),
            "int32" | "int" => Some(LangType::Int32),
            "int16" | "short" => Some(LangType::Int16),
            "byte" => Some(LangType::Byte),
            "timespan" => Some(LangType::TimeSpan),
            "uuid" => Some(LangType::Guid),
            "uint64" | "ulong" => Some(LangType::UInt64),
            "uint32" | "uint" => Some(LangType::UInt32),
            "uint16" | "ushort" => Some(LangType::UInt16),
            _ => None,
        };
        found
            .or_else(|| LangType::ALL.iter().copied().find(|t| t.name() == lower))
            .ok_or_else(|| format!("Unknown language type: {}", s))
    }
}

// Parallel tables, indexed by `AsaDbType as usize`.

const PROVIDER_TYPE_NAMES: [&str; AMOUNT_OF_DB_TYPES] = [
    "BigInt",
    "Binary",
    "Bit",
    "Char",
    "Date",
    "DateTime",
    "Decimal",
    "Double",
    "Float",
    "Double",
    "Image",
    "Integer",
    "LongBinary",
    "LongNvarchar",
    "LongVarbit",
    "LongVarchar",
    "Money",
    "NChar",
    "NText",
    "Numeric",
    "NVarChar",
    "Real",
    "SmallDateTime",
    "SmallInt",
    "SmallMoney",
    "Text",
    "Time",
    "TimeStamp",
    "TinyInt",
    "UniqueIdentifier",
    "UnsignedBigInt",
    "UnsignedInt",
    "UnsignedSmallInt",
    "VarBinary",
    "VarBit",
    "VarChar",
    "Xml",
];

const LANG_TYPES: [LangType; AMOUNT_OF_DB_TYPES] = [
    LangType::Int64,
    LangType::Bytes,
    LangType::Boolean,
    LangType::String,
    LangType::DateTime,
    LangType::DateTime,
    LangType::Decimal,
    LangType::Double,
    LangType::Single,
    LangType::Double,
    LangType::Bytes,
    LangType::Int32,
    LangType::Bytes,
    LangType::String,
    LangType::String,
    LangType::String,
    LangType::Decimal,
    LangType::String,
    LangType::String,
    LangType::Decimal,
    LangType::String,
    LangType::Single,
    LangType::DateTime,
    LangType::Int16,
    LangType::Decimal,
    LangType::String,
    LangType::TimeSpan,
    LangType::DateTime,
    LangType::Byte,
    LangType::Guid,
    LangType::UInt64,
    LangType::UInt32,
    LangType::UInt16,
    LangType::Bytes,
    LangType::String,
    LangType::String,
    LangType::String,
];

const CANONICAL_NAMES: [&str; AMOUNT_OF_DB_TYPES] = [
    "BIGINT",
    "BINARY",
    "BIT",
    "CHAR",
    "DATE",
    "DATETIME",
    "DECIMAL",
    "DOUBLE",
    "FLOAT",
    "FLOAT",
    "IMAGE",
    "INTEGER",
    "LONG BINARY",
    "LONG NVARCHAR",
    "LONG VARBIT",
    "LONG VARCHAR",
    "MONEY",
    "NCHAR",
    "NTEXT",
    "NUMERIC",
    "NVARCHAR",
    "REAL",
    "SMALLDATETIME",
    "SMALLINT",
    "SMALLMONEY",
    "TEXT",
    "TIME",
    "TIMESTAMP",
    "TINYINT",
    "UNIQUEIDENTIFIER",
    "UNSIGNED BIGINT",
    "UNSIGNED INT",
    "UNSIGNED SMALLINT",
    "VARBINARY",
    "VARBIT",
    "VARCHAR",
    "XML",
];

impl AsaDbType {
    pub const ALL: [AsaDbType; AMOUNT_OF_DB_TYPES] = [
        AsaDbType::BigInt,
        AsaDbType::Binary,
        AsaDbType::Bit,
        AsaDbType::Char,
        AsaDbType::Date,
        AsaDbType::DateTime,
        AsaDbType::Decimal,
        AsaDbType::Double,
        AsaDbType::FloatReal,
        AsaDbType::FloatDouble,
        AsaDbType::Image,
        AsaDbType::Integer,
        AsaDbType::LongBinary,
        AsaDbType::LongNVarChar,
        AsaDbType::LongVarBit,
        AsaDbType::LongVarChar,
        AsaDbType::Money,
        AsaDbType::NChar,
        AsaDbType::NText,
        AsaDbType::Numeric,
        AsaDbType::NVarChar,
        AsaDbType::Real,
        AsaDbType::SmallDateTime,
        AsaDbType::SmallInt,
        AsaDbType::SmallMoney,
        AsaDbType::Text,
        AsaDbType::Time,
        AsaDbType::TimeStamp,
        AsaDbType::TinyInt,
        AsaDbType::UniqueIdentifier,
        AsaDbType::UnsignedBigInt,
        AsaDbType::UnsignedInt,
        AsaDbType::UnsignedSmallInt,
        AsaDbType::VarBinary,
        AsaDbType::VarBit,
        AsaDbType::VarChar,
        AsaDbType::Xml,
    ];

    /// Look up a type by its table ordinal
    pub fn from_ordinal(ordinal: usize) -> Option<AsaDbType> {
        Self::ALL.get(ordinal).copied()
    }

    /// Name of the provider-specific type enum member (e.g. `LongNvarchar`)
    pub fn provider_type_name(&self) -> &'static str {
        PROVIDER_TYPE_NAMES[*self as usize]
    }

    /// Language type values of this type materialize as
    pub fn lang_type(&self) -> LangType {
        LANG_TYPES[*self as usize]
    }

    /// Type name as used in DDL (e.g. `LONG BINARY`)
    pub fn canonical_name(&self) -> &'static str {
        CANONICAL_NAMES[*self as usize]
    }

    /// Enum member name (e.g. `FloatReal`)
    pub fn enum_name(&self) -> &'static str {
        match self {
            AsaDbType::BigInt => "BigInt",
            AsaDbType::Binary => "Binary",
            AsaDbType::Bit => "Bit",
            AsaDbType::Char => "Char",
            AsaDbType::Date => "Date",
            AsaDbType::DateTime => "DateTime",
            AsaDbType::Decimal => "Decimal",
            AsaDbType::Double => "Double",
            AsaDbType::FloatReal => "FloatReal",
            AsaDbType::FloatDouble => "FloatDouble",
            AsaDbType::Image => "Image",
            AsaDbType::Integer => "Integer",
            AsaDbType::LongBinary => "LongBinary",
            AsaDbType::LongNVarChar => "LongNVarChar",
            AsaDbType::LongVarBit => "LongVarBit",
            AsaDbType::LongVarChar => "LongVarChar",
            AsaDbType::Money => "Money",
            AsaDbType::NChar => "NChar",
            AsaDbType::NText => "NText",
            AsaDbType::Numeric => "Numeric",
            AsaDbType::NVarChar => "NVarChar",
            AsaDbType::Real => "Real",
            AsaDbType::SmallDateTime => "SmallDateTime",
            AsaDbType::SmallInt => "SmallInt",
            AsaDbType::SmallMoney => "SmallMoney",
            AsaDbType::Text => "Text",
            AsaDbType::Time => "Time",
            AsaDbType::TimeStamp => "TimeStamp",
            AsaDbType::TinyInt => "TinyInt",
            AsaDbType::UniqueIdentifier => "UniqueIdentifier",
            AsaDbType::UnsignedBigInt => "UnsignedBigInt",
            AsaDbType::UnsignedInt => "UnsignedInt",
            AsaDbType::UnsignedSmallInt => "UnsignedSmallInt",
            AsaDbType::VarBinary => "VarBinary",
            AsaDbType::VarBit => "VarBit",
            AsaDbType::VarChar => "VarChar",
            AsaDbType::Xml => "Xml",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            AsaDbType::BigInt
                | AsaDbType::Decimal
                | AsaDbType::Double
                | AsaDbType::FloatDouble
                | AsaDbType::FloatReal
                | AsaDbType::Integer
                | AsaDbType::Money
                | AsaDbType::Numeric
                | AsaDbType::Real
                | AsaDbType::SmallInt
                | AsaDbType::SmallMoney
                | AsaDbType::TinyInt
                | AsaDbType::UnsignedBigInt
                | AsaDbType::UnsignedInt
                | AsaDbType::UnsignedSmallInt
        )
    }

    /// Types SQL Anywhere can't compare for equality, so they can't take part in DISTINCT.
    pub fn is_large_object(&self) -> bool {
        matches!(
            self,
            AsaDbType::Text
                | AsaDbType::NText
                | AsaDbType::Image
                | AsaDbType::LongBinary
                | AsaDbType::LongVarChar
                | AsaDbType::LongNVarChar
                | AsaDbType::LongVarBit
                | AsaDbType::Xml
        )
    }

    /// Types whose catalog length is meaningless: always reported as 0 (unlimited)
    pub fn has_unlimited_length(&self) -> bool {
        matches!(
            self,
            AsaDbType::Image
                | AsaDbType::LongBinary
                | AsaDbType::LongNVarChar
                | AsaDbType::LongVarChar
        )
    }

    pub fn is_decimal(&self) -> bool {
        matches!(self, AsaDbType::Decimal | AsaDbType::Numeric)
    }

    pub fn is_currency(&self) -> bool {
        matches!(self, AsaDbType::SmallMoney | AsaDbType::Money)
    }

    pub fn is_fixed_length(&self) -> bool {
        matches!(self, AsaDbType::NChar | AsaDbType::Char | AsaDbType::Binary)
    }

    pub fn is_variable_length(&self) -> bool {
        matches!(
            self,
            AsaDbType::NVarChar | AsaDbType::VarChar | AsaDbType::VarBinary
        )
    }

    /// Character types LIKE patterns may keep as parameter type
    pub fn is_character(&self) -> bool {
        matches!(
            self,
            AsaDbType::Char | AsaDbType::NChar | AsaDbType::NVarChar | AsaDbType::VarChar
        )
    }
}

impl fmt::Display for AsaDbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.enum_name())
    }
}

/// Enum string value for a raw type ordinal, `"INVALID"` when out of range.
pub fn db_type_enum_string(ordinal: usize) -> &'static str {
    AsaDbType::from_ordinal(ordinal)
        .map(|t| t.enum_name())
        .unwrap_or("INVALID")
}

/// Map a catalog domain name to the native type.
///
/// Matching is case-insensitive. `float` is split on its storage size: 4 bytes
/// or less is single precision. Unknown names fall back to `VarChar`.
pub fn derive_type(raw_type_name: &str, length_in_bytes: i32) -> AsaDbType {
    match raw_type_name.trim().to_lowercase().as_str() {
        "bigint" => AsaDbType::BigInt,
        "binary" => AsaDbType::Binary,
        "bit" => AsaDbType::Bit,
        "char" => AsaDbType::Char,
        "date" => AsaDbType::Date,
        "datetime" => AsaDbType::DateTime,
        "decimal" => AsaDbType::Decimal,
        "double" => AsaDbType::Double,
        "float" => {
            if length_in_bytes <= 4 {
                AsaDbType::FloatReal
            } else {
                AsaDbType::FloatDouble
            }
        }
        "image" => AsaDbType::Image,
        "int" | "integer" => AsaDbType::Integer,
        "long binary" => AsaDbType::LongBinary,
        "long nvarchar" => AsaDbType::LongNVarChar,
        "long varbit" => AsaDbType::LongVarBit,
        "long varchar" => AsaDbType::LongVarChar,
        "money" => AsaDbType::Money,
        "nchar" => AsaDbType::NChar,
        "ntext" => AsaDbType::NText,
        "numeric" => AsaDbType::Numeric,
        "nvarchar" => AsaDbType::NVarChar,
        "real" => AsaDbType::Real,
        "smalldatetime" => AsaDbType::SmallDateTime,
        "smallint" => AsaDbType::SmallInt,
        "smallmoney" => AsaDbType::SmallMoney,
        "text" => AsaDbType::Text,
        "time" => AsaDbType::Time,
        "timestamp" => AsaDbType::TimeStamp,
        "tinyint" => AsaDbType::TinyInt,
        "uniqueidentifier" => AsaDbType::UniqueIdentifier,
        "unsigned bigint" => AsaDbType::UnsignedBigInt,
        "unsigned int" => AsaDbType::UnsignedInt,
        "unsigned smallint" => AsaDbType::UnsignedSmallInt,
        "varbinary" => AsaDbType::VarBinary,
        "varbit" => AsaDbType::VarBit,
        "varchar" => AsaDbType::VarChar,
        "xml" => AsaDbType::Xml,
        _ => AsaDbType::VarChar,
    }
}
