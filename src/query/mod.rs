//! Dynamic query engine for SQL Anywhere
//!
//! Turns the abstract query model (fields, predicates, relations, sort and
//! group-by clauses) into SQL text with anonymous `?` placeholders.

mod creator;
mod engine;
mod fragments;
mod function_mappings;
mod model;
mod name_overwrites;
mod output;
mod parameters;
mod relations;
mod renderer;

pub use creator::SpecificCreator;
pub use engine::{DynamicQueryEngine, SelectRequest};
pub use fragments::{QueryFragments, Slot};
pub use function_mappings::{
    apply_template, DeclaringType, FunctionMappingStore, FunctionMappingStoreBuilder,
};
pub use model::{
    AggregateFunction, ArithmeticOperator, ComparisonOperator, EntityField, Expression,
    FieldPersistenceInfo, GroupByClause, Predicate, SortClause, SortDirection,
};
pub use name_overwrites::{
    global_schema_overwrites, install_schema_overwrites, split_procedure_name,
    SchemaNameOverwrites, SchemaNameOverwritesBuilder, WILDCARD_KEY,
};
pub use output::{
    ActionQuery, ParameterFieldRelation, RetrievalQuery, SequenceRetrievalQuery,
};
pub use parameters::{make_parameters_anonymous, ParameterCollector};
pub use relations::{EntityRelation, JoinHint, RelationCollection, RelationEnd, RelationType};
pub use renderer::SqlRenderer;
