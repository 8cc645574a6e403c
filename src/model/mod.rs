//! In-memory catalog graph produced by the catalog retriever

mod catalog;
mod elements;

pub use crate::command::ParameterDirection;
pub use catalog::{Catalog, RetrievalDiagnostic, Schema};
pub use elements::*;
