//! Type mapping tables shared by the catalog retriever and the query engine

mod conversions;
mod db_type;
mod type_definition;

pub use conversions::{
    choose_column_type, ConversionRule, SizePredicate, TargetSize, TypeMappings,
    TypeMappingsBuilder,
};
pub use db_type::{db_type_enum_string, derive_type, AsaDbType, LangType, AMOUNT_OF_DB_TYPES};
pub use type_definition::TypeDefinition;
