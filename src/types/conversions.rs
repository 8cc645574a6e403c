//! Ranked language-type → native-type rules and the type sort-order table

use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::{AsaDbType, LangType, TypeDefinition};

/// Size predicate of a conversion rule
pub type SizePredicate = fn(i32) -> bool;

/// Target size of a rule: a fixed value, or the value of the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSize {
    Fixed(i32),
    FromSource,
}

impl TargetSize {
    fn resolve(&self, source: i32) -> i32 {
        match self {
            TargetSize::Fixed(v) => *v,
            TargetSize::FromSource => source,
        }
    }
}

/// One candidate rule: (language type, size predicates) → native type
#[derive(Clone)]
pub struct ConversionRule {
    pub lang_type: LangType,
    pub length: Option<SizePredicate>,
    pub precision: Option<SizePredicate>,
    pub scale: Option<SizePredicate>,
    pub db_type: AsaDbType,
    pub target_length: TargetSize,
    pub target_precision: TargetSize,
    pub target_scale: TargetSize,
}

impl ConversionRule {
    /// Rule without size predicates
    fn plain(lang_type: LangType, db_type: AsaDbType, length: i32, precision: TargetSize) -> Self {
        Self {
            lang_type,
            length: None,
            precision: None,
            scale: None,
            db_type,
            target_length: TargetSize::Fixed(length),
            target_precision: precision,
            target_scale: TargetSize::Fixed(0),
        }
    }

    fn sized(
        lang_type: LangType,
        length: SizePredicate,
        db_type: AsaDbType,
        target_length: TargetSize,
    ) -> Self {
        Self {
            lang_type,
            length: Some(length),
            precision: None,
            scale: None,
            db_type,
            target_length,
            target_precision: TargetSize::Fixed(0),
            target_scale: TargetSize::Fixed(0),
        }
    }

    fn numeric(
        precision: SizePredicate,
        scale: Option<SizePredicate>,
        db_type: AsaDbType,
    ) -> Self {
        Self {
            lang_type: LangType::Decimal,
            length: None,
            precision: Some(precision),
            scale,
            db_type,
            target_length: TargetSize::Fixed(0),
            target_precision: TargetSize::FromSource,
            target_scale: TargetSize::FromSource,
        }
    }

    pub fn matches(&self, lang_type: LangType, length: i32, precision: i32, scale: i32) -> bool {
        self.lang_type == lang_type
            && self.length.map_or(true, |p| p(length))
            && self.precision.map_or(true, |p| p(precision))
            && self.scale.map_or(true, |p| p(scale))
    }

    fn to_definition(&self, length: i32, precision: i32, scale: i32) -> TypeDefinition {
        TypeDefinition::new(
            self.db_type,
            self.target_length.resolve(length),
            self.target_precision.resolve(precision),
            self.target_scale.resolve(scale),
        )
    }
}

impl std::fmt::Debug for ConversionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversionRule")
            .field("lang_type", &self.lang_type)
            .field("db_type", &self.db_type)
            .field("target_length", &self.target_length)
            .field("target_precision", &self.target_precision)
            .field("target_scale", &self.target_scale)
            .finish()
    }
}

/// Mutable builder phase of the type mapping tables
#[derive(Debug, Default)]
pub struct TypeMappingsBuilder {
    rules: Vec<ConversionRule>,
    sort_order: HashMap<AsaDbType, u8>,
}

impl TypeMappingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, rule: ConversionRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn sort_order(mut self, db_type: AsaDbType, order: u8) -> Self {
        self.sort_order.insert(db_type, order);
        self
    }

    pub fn freeze(self) -> TypeMappings {
        TypeMappings {
            rules: self.rules,
            sort_order: self.sort_order,
        }
    }
}

/// Frozen, process-wide type mapping tables
#[derive(Debug)]
pub struct TypeMappings {
    rules: Vec<ConversionRule>,
    sort_order: HashMap<AsaDbType, u8>,
}

impl TypeMappings {
    /// The shared SQL Anywhere tables
    pub fn global() -> &'static TypeMappings {
        &TYPE_MAPPINGS
    }

    pub fn rules(&self) -> &[ConversionRule] {
        &self.rules
    }

    /// Narrowest matching native type for a value shape; first matching rule wins.
    pub fn choose_column_type(
        &self,
        lang_type: LangType,
        length: i32,
        precision: i32,
        scale: i32,
    ) -> Option<TypeDefinition> {
        self.rules
            .iter()
            .find(|r| r.matches(lang_type, length, precision, scale))
            .map(|r| r.to_definition(length, precision, scale))
    }

    /// Every matching native type, ranked by the sort-order table (stable for ties)
    pub fn candidate_types(
        &self,
        lang_type: LangType,
        length: i32,
        precision: i32,
        scale: i32,
    ) -> Vec<TypeDefinition> {
        let mut candidates: Vec<TypeDefinition> = self
            .rules
            .iter()
            .filter(|r| r.matches(lang_type, length, precision, scale))
            .map(|r| r.to_definition(length, precision, scale))
            .collect();
        candidates.sort_by_key(|d| self.sort_order(d.db_type).unwrap_or(u8::MAX));
        candidates
    }

    pub fn sort_order(&self, db_type: AsaDbType) -> Option<u8> {
        self.sort_order.get(&db_type).copied()
    }
}

const UNLIMITED: i32 = 2_147_483_647;

fn long_binary(l: i32) -> bool {
    l == 0 || l >= 32768
}

fn short_binary(l: i32) -> bool {
    l > 0 && l < 32768
}

fn long_string(l: i32) -> bool {
    l == 0 || l >= 8192
}

fn short_string(l: i32) -> bool {
    l > 0 && l < 8192
}

fn numeric_precision(p: i32) -> bool {
    p > 0 && p < 127
}

fn zero_scale(s: i32) -> bool {
    s == 0
}

fn small_money_precision(p: i32) -> bool {
    p > 0 && p <= 10
}

fn money_precision(p: i32) -> bool {
    p > 0 && p <= 19
}

fn money_scale(s: i32) -> bool {
    s > 0 && s <= 4
}

static TYPE_MAPPINGS: Lazy<TypeMappings> = Lazy::new(build_sql_anywhere_mappings);

fn build_sql_anywhere_mappings() -> TypeMappings {
    use AsaDbType as T;
    use LangType as L;
    use TargetSize::{Fixed, FromSource};

    let mut builder = TypeMappingsBuilder::new();

    // byte arrays: fixed, variable, then unlimited
    for db_type in [T::Binary, T::VarBinary] {
        builder = builder.rule(ConversionRule::sized(L::Bytes, short_binary, db_type, FromSource));
    }
    for db_type in [T::Image, T::LongBinary] {
        builder = builder.rule(ConversionRule::sized(L::Bytes, long_binary, db_type, Fixed(UNLIMITED)));
    }

    // strings
    for db_type in [T::Char, T::NChar, T::NVarChar, T::VarChar] {
        builder = builder.rule(ConversionRule::sized(L::String, short_string, db_type, FromSource));
    }
    for db_type in [T::Text, T::NText, T::LongVarChar, T::LongNVarChar, T::Xml] {
        builder = builder.rule(ConversionRule::sized(L::String, long_string, db_type, Fixed(UNLIMITED)));
    }

    for db_type in [T::Date, T::DateTime, T::SmallDateTime, T::TimeStamp] {
        builder = builder.rule(ConversionRule::plain(L::DateTime, db_type, 0, Fixed(0)));
    }

    builder = builder
        .rule(ConversionRule::numeric(numeric_precision, Some(zero_scale), T::Numeric))
        .rule(ConversionRule::numeric(small_money_precision, Some(money_scale), T::SmallMoney))
        .rule(ConversionRule::numeric(money_precision, Some(money_scale), T::Money))
        .rule(ConversionRule::numeric(numeric_precision, None, T::Decimal))
        .rule(ConversionRule::plain(L::Single, T::Real, 0, FromSource))
        .rule(ConversionRule::plain(L::Double, T::Double, 0, FromSource))
        .rule(ConversionRule::plain(L::Int64, T::BigInt, 0, Fixed(19)))
        .rule(ConversionRule::plain(L::Boolean, T::Bit, 0, Fixed(0)))
        .rule(ConversionRule::plain(L::Int32, T::Integer, 0, Fixed(10)))
        .rule(ConversionRule::plain(L::Int16, T::SmallInt, 0, Fixed(5)))
        .rule(ConversionRule::plain(L::Byte, T::TinyInt, 0, Fixed(3)))
        .rule(ConversionRule::plain(L::TimeSpan, T::Time, 0, Fixed(0)))
        .rule(ConversionRule::plain(L::Guid, T::UniqueIdentifier, 0, Fixed(0)))
        .rule(ConversionRule::plain(L::UInt64, T::UnsignedBigInt, 0, Fixed(19)))
        .rule(ConversionRule::plain(L::UInt32, T::UnsignedInt, 0, Fixed(10)))
        .rule(ConversionRule::plain(L::UInt16, T::UnsignedSmallInt, 0, Fixed(5)));

    // byte[]
    builder = builder
        .sort_order(T::LongBinary, 0)
        .sort_order(T::Image, 0)
        .sort_order(T::VarBinary, 1)
        .sort_order(T::Binary, 2);

    // string
    builder = builder
        .sort_order(T::NText, 0)
        .sort_order(T::Text, 1)
        .sort_order(T::LongNVarChar, 1)
        .sort_order(T::LongVarChar, 3)
        .sort_order(T::Xml, 4)
        .sort_order(T::NVarChar, 0)
        .sort_order(T::VarChar, 1)
        .sort_order(T::NChar, 2)
        .sort_order(T::Char, 3);

    // datetime
    builder = builder
        .sort_order(T::DateTime, 0)
        .sort_order(T::Date, 1)
        .sort_order(T::SmallDateTime, 2)
        .sort_order(T::TimeStamp, 3);

    // decimal
    builder
        .sort_order(T::Decimal, 0)
        .sort_order(T::SmallMoney, 1)
        .sort_order(T::Money, 2)
        .sort_order(T::Numeric, 3)
        .freeze()
}

/// Narrowest native type for a value shape using the shared tables
pub fn choose_column_type(
    lang_type: LangType,
    length: i32,
    precision: i32,
    scale: i32,
) -> Option<TypeDefinition> {
    TYPE_MAPPINGS.choose_column_type(lang_type, length, precision, scale)
}
