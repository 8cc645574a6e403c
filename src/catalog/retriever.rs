//! Catalog retrieval entry point

use crate::command::Command;
use crate::error::SqlAnywhereError;
use crate::model::{Catalog, ElementName, Schema, Sequence};

use super::foreign_keys::{apply_foreign_key_rows, ForeignKeyNaming};
use super::queries;
use super::schema_retriever::SchemaRetriever;
use super::{ConnectionFactory, ConnectionGuard};

/// Elements to retrieve for one schema
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaSelection {
    pub schema_name: String,
    pub tables: Vec<ElementName>,
    pub views: Vec<ElementName>,
    pub stored_procedures: Vec<ElementName>,
}

impl SchemaSelection {
    pub fn new(schema_name: impl Into<String>) -> Self {
        Self {
            schema_name: schema_name.into(),
            ..Default::default()
        }
    }

    pub fn with_tables<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables.extend(names.into_iter().map(ElementName::new));
        self
    }

    pub fn with_views<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.views.extend(names.into_iter().map(ElementName::new));
        self
    }

    pub fn with_stored_procedures<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stored_procedures
            .extend(names.into_iter().map(ElementName::new));
        self
    }
}

/// Builds a [`Catalog`] from the database's system catalog
pub struct CatalogRetriever<'a> {
    factory: &'a dyn ConnectionFactory,
    foreign_key_naming: ForeignKeyNaming,
    system_sequences: Vec<Sequence>,
}

impl<'a> CatalogRetriever<'a> {
    pub fn new(factory: &'a dyn ConnectionFactory) -> Self {
        Self {
            factory,
            foreign_key_naming: ForeignKeyNaming::default(),
            system_sequences: Vec::new(),
        }
    }

    pub fn with_foreign_key_naming(mut self, naming: ForeignKeyNaming) -> Self {
        self.foreign_key_naming = naming;
        self
    }

    /// Sequences added to every retrieved schema
    pub fn with_system_sequences(mut self, sequences: Vec<Sequence>) -> Self {
        self.system_sequences = sequences;
        self
    }

    /// Retrieve the selected elements of every schema, then the foreign keys
    /// between them.
    pub fn retrieve(
        &self,
        catalog_name: &str,
        selections: &[SchemaSelection],
    ) -> Result<Catalog, SqlAnywhereError> {
        log::debug!(
            "Retrieving catalog '{}' ({} schema(s))",
            catalog_name,
            selections.len()
        );
        let mut catalog = Catalog::new(catalog_name);
        let schema_retriever = SchemaRetriever::new(self.factory);

        for selection in selections {
            let mut schema = Schema::new(selection.schema_name.as_str());
            schema_retriever.retrieve_tables(&mut schema, &selection.tables)?;
            schema_retriever.retrieve_views(&mut schema, &selection.views)?;
            schema_retriever.retrieve_stored_procedures(&mut schema, &selection.stored_procedures)?;
            schema.sequences = self.system_sequences.clone();
            catalog.add_schema(schema);
        }

        self.retrieve_foreign_keys(&mut catalog)?;
        Ok(catalog)
    }

    /// Read every foreign key between the catalog's schemas in one query
    pub fn retrieve_foreign_keys(&self, catalog: &mut Catalog) -> Result<usize, SqlAnywhereError> {
        if catalog.table_count() == 0 {
            return Ok(0);
        }
        let owners: Vec<&str> = catalog.schemas.iter().map(|s| s.owner.as_str()).collect();
        let command = Command::text(queries::foreign_keys(&owners));
        let rows = {
            let mut connection =
                ConnectionGuard::open(self.factory, "retrieving foreign key constraints")?;
            connection.execute(&command)?
        };
        Ok(apply_foreign_key_rows(catalog, &rows, self.foreign_key_naming))
    }
}
