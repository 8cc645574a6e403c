//! Catalog retrieval: walks the SQL Anywhere system catalog through an
//! injected [`Connection`] and builds the in-memory [`Catalog`](crate::model::Catalog).

mod connection;
mod foreign_keys;
pub mod queries;
mod retriever;
pub mod rows;
mod schema_retriever;

pub use connection::{Connection, ConnectionFactory, ConnectionGuard, Row, RowSet};
pub use foreign_keys::{apply_foreign_key_rows, ForeignKeyNaming};
pub use retriever::{CatalogRetriever, SchemaSelection};
pub use schema_retriever::{build_stored_procedure, build_table, build_view, SchemaRetriever};
