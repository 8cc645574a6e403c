//! rust-sqlanywhere: catalog retrieval and SQL generation for SAP SQL Anywhere
//!
//! The catalog retriever reads tables, views, stored procedures and foreign
//! keys from the SQL Anywhere system catalog through a host-supplied
//! connection. The dynamic query engine turns an abstract query model into
//! SQL Anywhere SQL with anonymous parameters.

pub mod catalog;
pub mod command;
pub mod config;
pub mod driver;
pub mod error;
pub mod model;
pub mod query;
pub mod types;
pub mod value;

pub(crate) mod util;

pub use catalog::{CatalogRetriever, Connection, ConnectionFactory, ForeignKeyNaming, RowSet, SchemaSelection};
pub use command::{Command, CommandType, Parameter, ParameterDirection};
pub use config::{load_engine_config, ConnectionData, EngineConfig};
pub use driver::SqlAnywhereDriver;
pub use error::{CatalogDataError, ExecutionError, QueryConstructionError, SqlAnywhereError};
pub use model::Catalog;
pub use query::{DynamicQueryEngine, SelectRequest};
pub use types::{AsaDbType, LangType, TypeDefinition};
pub use value::Value;
