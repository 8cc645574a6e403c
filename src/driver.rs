//! SQL Anywhere driver: element listing, naming rules and catalog discovery

use std::fmt;

use crate::catalog::rows::ElementNameRow;
use crate::catalog::{
    queries, CatalogRetriever, ConnectionFactory, ConnectionGuard, ForeignKeyNaming, RowSet,
    SchemaSelection,
};
use crate::command::Command;
use crate::config::ConnectionData;
use crate::error::SqlAnywhereError;
use crate::model::{Catalog, ElementName, Sequence};

pub const DRIVER_TYPE: &str = "Sybase ASA DBDriver";
pub const DRIVER_VERSION: &str = "5.0.20160127";
pub const DEFAULT_SCHEMA_NAME: &str = "dbo";
/// The only sequence SQL Anywhere exposes for identity values
pub const IDENTITY_SEQUENCE: &str = "@@IDENTITY";

const PROVIDER_INVARIANT_NAMES: &[&str] = &["iAnywhere.Data.SQLAnywhere", "Sap.Data.SQLAnywhere"];

/// Capabilities of the database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionalityAspect {
    AutoGenerateIdentityFields,
    CentralUnitIsCatalog,
    SupportsForeignKeyConstraints,
    SupportsMultipleSchemasPerCentralUnit,
    SupportsSchemaOnlyResultsetRetrieval,
    SupportsNaturalCharacterSpecificTypes,
}

impl fmt::Display for FunctionalityAspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

const FUNCTIONALITY_ASPECTS: &[FunctionalityAspect] = &[
    FunctionalityAspect::AutoGenerateIdentityFields,
    FunctionalityAspect::CentralUnitIsCatalog,
    FunctionalityAspect::SupportsForeignKeyConstraints,
    FunctionalityAspect::SupportsMultipleSchemasPerCentralUnit,
    FunctionalityAspect::SupportsSchemaOnlyResultsetRetrieval,
    FunctionalityAspect::SupportsNaturalCharacterSpecificTypes,
];

/// Driver over a host-supplied connection factory
pub struct SqlAnywhereDriver {
    factory: Box<dyn ConnectionFactory>,
    connection_data: ConnectionData,
    foreign_key_naming: ForeignKeyNaming,
}

impl SqlAnywhereDriver {
    pub fn new(factory: Box<dyn ConnectionFactory>) -> Self {
        Self {
            factory,
            connection_data: ConnectionData::default(),
            foreign_key_naming: ForeignKeyNaming::default(),
        }
    }

    pub fn with_connection_data(mut self, connection_data: ConnectionData) -> Self {
        self.connection_data = connection_data;
        self
    }

    pub fn with_foreign_key_naming(mut self, naming: ForeignKeyNaming) -> Self {
        self.foreign_key_naming = naming;
        self
    }

    pub fn connection_data(&self) -> &ConnectionData {
        &self.connection_data
    }

    pub fn default_schema_name(&self) -> &'static str {
        DEFAULT_SCHEMA_NAME
    }

    /// `[schema].[name]`, or the bare name for elements without a schema
    pub fn full_name_for_command_execution(&self, schema: Option<&str>, name: &str) -> String {
        match schema {
            Some(schema) => format!("[{}].[{}]", schema, name),
            None => name.to_string(),
        }
    }

    pub fn functionality_aspects(&self) -> &'static [FunctionalityAspect] {
        FUNCTIONALITY_ASPECTS
    }

    pub fn supports(&self, aspect: FunctionalityAspect) -> bool {
        FUNCTIONALITY_ASPECTS.contains(&aspect)
    }

    pub fn provider_invariant_names(&self) -> &'static [&'static str] {
        PROVIDER_INVARIANT_NAMES
    }

    pub fn target_description(&self, server_version: &str) -> String {
        format!(
            "{} (Server: {}. Version: {}.)",
            DRIVER_TYPE, self.connection_data.server_name, server_version
        )
    }

    pub fn connection_string(&self) -> String {
        self.connection_data.connection_string()
    }

    /// User schemas; system owners are excluded
    pub fn get_all_schema_names(&self, catalog_name: &str) -> Result<Vec<String>, SqlAnywhereError> {
        log::debug!("Listing schemas of catalog '{}'", catalog_name);
        let rows = self.run(queries::SCHEMA_NAMES, "retrieving schema names")?;
        let mut names = Vec::with_capacity(rows.len());
        for row in rows.rows() {
            match row.get::<String>("SchemaName") {
                Ok(name) => names.push(name),
                Err(e) => log::warn!("Schema name row skipped: {}", e),
            }
        }
        Ok(names)
    }

    pub fn get_all_table_names(
        &self,
        _catalog_name: &str,
        schema_name: &str,
    ) -> Result<Vec<ElementName>, SqlAnywhereError> {
        self.element_names(&queries::table_names(schema_name), "retrieving table names")
    }

    pub fn get_all_view_names(
        &self,
        _catalog_name: &str,
        schema_name: &str,
    ) -> Result<Vec<ElementName>, SqlAnywhereError> {
        self.element_names(&queries::view_names(schema_name), "retrieving view names")
    }

    pub fn get_all_stored_procedure_names(
        &self,
        _catalog_name: &str,
        schema_name: &str,
    ) -> Result<Vec<ElementName>, SqlAnywhereError> {
        self.element_names(
            &queries::stored_procedure_names(schema_name),
            "retrieving stored procedure names",
        )
    }

    pub fn get_all_system_sequences(&self) -> Vec<Sequence> {
        vec![Sequence {
            name: IDENTITY_SEQUENCE.to_string(),
        }]
    }

    pub fn create_catalog_retriever(&self) -> CatalogRetriever<'_> {
        CatalogRetriever::new(self.factory.as_ref())
            .with_foreign_key_naming(self.foreign_key_naming)
            .with_system_sequences(self.get_all_system_sequences())
    }

    /// List every table, view and procedure of the given schemas and retrieve
    /// them all. An empty schema list means every user schema.
    pub fn discover(
        &self,
        catalog_name: &str,
        schema_names: &[&str],
    ) -> Result<Catalog, SqlAnywhereError> {
        let schema_names: Vec<String> = if schema_names.is_empty() {
            self.get_all_schema_names(catalog_name)?
        } else {
            schema_names.iter().map(|s| s.to_string()).collect()
        };

        let mut selections = Vec::with_capacity(schema_names.len());
        for schema_name in schema_names {
            selections.push(SchemaSelection {
                tables: self.get_all_table_names(catalog_name, &schema_name)?,
                views: self.get_all_view_names(catalog_name, &schema_name)?,
                stored_procedures: self.get_all_stored_procedure_names(catalog_name, &schema_name)?,
                schema_name,
            });
        }
        self.create_catalog_retriever()
            .retrieve(catalog_name, &selections)
    }

    fn run(&self, sql: &str, operation: &str) -> Result<RowSet, SqlAnywhereError> {
        let mut connection = ConnectionGuard::open(self.factory.as_ref(), operation)?;
        connection.execute(&Command::text(sql))
    }

    fn element_names(&self, sql: &str, operation: &str) -> Result<Vec<ElementName>, SqlAnywhereError> {
        let rows = self.run(sql, operation)?;
        let mut names = Vec::with_capacity(rows.len());
        for row in rows.rows() {
            match ElementNameRow::try_from(row) {
                Ok(r) => names.push(ElementName::with_description(
                    r.element_name,
                    r.remarks.unwrap_or_default(),
                )),
                Err(e) => log::warn!("Element name row skipped while {}: {}", operation, e),
            }
        }
        Ok(names)
    }
}
