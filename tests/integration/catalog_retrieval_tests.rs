//! Integration tests for catalog retrieval
//!
//! The driver and retriever run against `ScriptedDatabase`, which answers the
//! system catalog queries with a small `DBA` schema.

use pretty_assertions::assert_eq;

use rust_sqlanywhere::catalog::RowSet;
use rust_sqlanywhere::{
    AsaDbType, CatalogRetriever, ForeignKeyNaming, ParameterDirection, SchemaSelection,
    SqlAnywhereDriver, SqlAnywhereError, Value,
};

use crate::common::{bound_name, demo_database, demo_fields, field, FIELD_COLUMNS};

// ============================================================================
// Discovery
// ============================================================================

#[test]
fn test_discover_builds_complete_catalog() {
    let driver = SqlAnywhereDriver::new(Box::new(demo_database()));
    let catalog = driver.discover("demo", &[]).expect("discovery should succeed");

    assert_eq!(catalog.name, "demo");
    assert_eq!(catalog.schemas.len(), 1);
    let schema = catalog.find_schema("dba").expect("schema lookup is case-insensitive");
    assert_eq!(schema.owner, "DBA");
    assert_eq!(schema.tables.len(), 2);
    assert_eq!(schema.views.len(), 1);
    assert_eq!(schema.stored_procedures.len(), 1);
    assert!(schema.diagnostics.is_empty());

    let sequences: Vec<&str> = schema.sequences.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(sequences, vec!["@@IDENTITY"]);
}

#[test]
fn test_table_fields_keys_and_constraints() {
    let driver = SqlAnywhereDriver::new(Box::new(demo_database()));
    let catalog = driver.discover("demo", &["DBA"]).unwrap();
    let customer = catalog.find_schema("DBA").unwrap().find_table("customer").unwrap();

    assert_eq!(customer.description, "Customers");
    let names: Vec<&str> = customer.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["id", "name", "notes"]);
    let ordinals: Vec<usize> = customer.fields.iter().map(|f| f.ordinal_position).collect();
    assert_eq!(ordinals, vec![1, 2, 3]);

    let id = customer.find_field("id").unwrap();
    assert!(id.is_primary_key);
    assert!(id.is_identity);
    assert!(!id.is_nullable);
    assert_eq!(id.type_definition.db_type, AsaDbType::Integer);
    assert_eq!(customer.identity_field().map(|f| f.name.as_str()), Some("id"));

    let name = customer.find_field("name").unwrap();
    assert!(name.is_nullable);
    assert_eq!(name.type_definition.db_type, AsaDbType::VarChar);
    assert_eq!(name.type_definition.length, 40);

    let notes = customer.find_field("notes").unwrap();
    assert_eq!(notes.type_definition.db_type, AsaDbType::LongVarChar);
    assert_eq!(notes.type_definition.length, 0, "long types report unlimited length");

    assert_eq!(customer.unique_constraints.len(), 1);
    assert_eq!(customer.unique_constraints[0].name, "ux_customer_name");
    assert_eq!(customer.unique_constraints[0].fields, vec!["name".to_string()]);
}

#[test]
fn test_numeric_precision_and_scale() {
    let driver = SqlAnywhereDriver::new(Box::new(demo_database()));
    let catalog = driver.discover("demo", &["DBA"]).unwrap();
    let order = catalog.find_schema("DBA").unwrap().find_table("order").unwrap();

    let amount = order.find_field("amount").unwrap();
    assert_eq!(amount.type_definition.db_type, AsaDbType::Numeric);
    assert_eq!(amount.type_definition.precision, 10);
    assert_eq!(amount.type_definition.scale, 2);
}

#[test]
fn test_view_fields() {
    let driver = SqlAnywhereDriver::new(Box::new(demo_database()));
    let catalog = driver.discover("demo", &["DBA"]).unwrap();
    let view = catalog
        .find_schema("DBA")
        .unwrap()
        .find_view("customer_summary")
        .unwrap();

    let names: Vec<&str> = view.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["name", "order_count"]);
    assert_eq!(view.fields[1].type_definition.db_type, AsaDbType::Integer);
}

#[test]
fn test_procedure_parameters_skip_result_columns() {
    let driver = SqlAnywhereDriver::new(Box::new(demo_database()));
    let catalog = driver.discover("demo", &["DBA"]).unwrap();
    let procedure = catalog
        .find_schema("DBA")
        .unwrap()
        .find_stored_procedure("get_orders")
        .unwrap();

    let parameters: Vec<(&str, ParameterDirection)> = procedure
        .parameters
        .iter()
        .map(|p| (p.name.as_str(), p.direction))
        .collect();
    assert_eq!(
        parameters,
        vec![
            ("ret", ParameterDirection::ReturnValue),
            ("@cust_id", ParameterDirection::Input),
            ("@total", ParameterDirection::InputOutput),
        ]
    );
    assert!(procedure.find_parameter("order_id").is_none());
}

// ============================================================================
// Foreign keys
// ============================================================================

#[test]
fn test_foreign_key_attached_to_child_table() {
    let driver = SqlAnywhereDriver::new(Box::new(demo_database()));
    let catalog = driver.discover("demo", &["DBA"]).unwrap();
    let schema = catalog.find_schema("DBA").unwrap();

    assert!(schema
        .find_table("customer")
        .unwrap()
        .foreign_key_constraints
        .is_empty());

    let order = schema.find_table("order").unwrap();
    assert_eq!(order.foreign_key_constraints.len(), 1);
    let fk = &order.foreign_key_constraints[0];
    assert_eq!(fk.primary_key_table.full_name(), "[DBA].[customer]");
    let pairs: Vec<(&str, &str)> = fk.field_pairs().collect();
    assert_eq!(pairs, vec![("cust_id", "id")]);

    // Synthesized names are FK_ plus a 32 digit identifier
    assert!(fk.name.starts_with("FK_"), "unexpected name {}", fk.name);
    assert_eq!(fk.name.len(), 35);
}

#[test]
fn test_foreign_key_names_from_catalog() {
    let driver = SqlAnywhereDriver::new(Box::new(demo_database()))
        .with_foreign_key_naming(ForeignKeyNaming::PreferCatalog);
    let catalog = driver.discover("demo", &["DBA"]).unwrap();
    let order = catalog.find_schema("DBA").unwrap().find_table("order").unwrap();

    assert_eq!(order.foreign_key_constraints[0].name, "fk_order_customer");
}

// ============================================================================
// Connection handling and failures
// ============================================================================

#[test]
fn test_every_opened_connection_is_closed() {
    let database = demo_database();
    let log = database.log();
    let driver = SqlAnywhereDriver::new(Box::new(database));
    driver.discover("demo", &[]).unwrap();

    let log = log.borrow();
    // schema names, three listings, three element kinds and the foreign keys
    assert_eq!(log.opened, 8);
    assert_eq!(log.closed, log.opened);
    assert_eq!(log.count("from sysfkey"), 1);
    // one field query per table and view
    assert_eq!(log.count("select tc.*"), 3);
}

#[test]
fn test_metadata_commands_prepared_once_per_connection() {
    let database = demo_database();
    let log = database.log();
    let driver = SqlAnywhereDriver::new(Box::new(database));
    driver.discover("demo", &["DBA"]).unwrap();

    let log = log.borrow();
    // field query: once for the tables, once for the views
    assert_eq!(log.prepared_count("select tc.*"), 2);
    assert_eq!(log.count("select tc.*"), 3);
    assert_eq!(log.prepared_count("sp_pkeys"), 1);
    assert_eq!(log.count("sp_pkeys"), 2);
    assert_eq!(log.prepared_count("select i.index_name"), 1);
    assert_eq!(log.count("select i.index_name"), 2);
    assert_eq!(log.prepared_count("select pp.*"), 1);
}

#[test]
fn test_data_error_discards_only_that_table() {
    let database = demo_database().overriding("select tc.*", |command| {
        let table = bound_name(command, "@table_name");
        if table == "customer" {
            let mut row = field("name", "varchar", 40);
            row[2] = Value::from("wide");
            let mut rows = RowSet::new(&FIELD_COLUMNS);
            rows.push(row);
            return Ok(rows);
        }
        Ok(demo_fields(&table))
    });

    let catalog = CatalogRetriever::new(&database)
        .retrieve(
            "demo",
            &[SchemaSelection::new("DBA").with_tables(["customer", "order"])],
        )
        .expect("data errors are not fatal");

    let schema = catalog.find_schema("DBA").unwrap();
    assert!(schema.find_table("customer").is_none());
    assert!(schema.find_table("order").is_some());

    let diagnostic = schema
        .diagnostics
        .iter()
        .find(|d| d.element == "[DBA].[customer]")
        .expect("dropped table is reported");
    assert_eq!(diagnostic.operation, "populating table fields");

    // The foreign key to the dropped table can't resolve
    let order = schema.find_table("order").unwrap();
    assert!(order.foreign_key_constraints.is_empty());
    assert_eq!(catalog.diagnostics().count(), 2);
}

#[test]
fn test_execution_error_aborts_retrieval() {
    let database = demo_database().failing("sp_pkeys", "permission denied");
    let log = database.log();
    let driver = SqlAnywhereDriver::new(Box::new(database));

    let err = driver.discover("demo", &["DBA"]).unwrap_err();
    match err {
        SqlAnywhereError::Execution { operation, source } => {
            assert_eq!(operation, "retrieving table metadata");
            assert_eq!(source.to_string(), "permission denied");
        }
        other => panic!("unexpected error: {}", other),
    }

    let log = log.borrow();
    assert_eq!(log.closed, log.opened);
    assert_eq!(log.count("from sysfkey"), 0);
}

#[test]
fn test_unreachable_server() {
    let database = demo_database().unreachable();
    let log = database.log();
    let driver = SqlAnywhereDriver::new(Box::new(database));

    let err = driver.get_all_schema_names("demo").unwrap_err();
    assert!(matches!(err, SqlAnywhereError::Execution { .. }));

    let log = log.borrow();
    assert_eq!(log.opened, 0);
    assert_eq!(log.closed, log.created, "a connection that failed to open is still closed");
    assert!(log.executed.is_empty());
}

#[test]
fn test_empty_selection_touches_nothing() {
    let database = demo_database();
    let log = database.log();
    let catalog = CatalogRetriever::new(&database)
        .retrieve("demo", &[SchemaSelection::new("DBA")])
        .unwrap();

    assert_eq!(catalog.schemas.len(), 1);
    assert_eq!(catalog.table_count(), 0);
    assert_eq!(log.borrow().created, 0);
}
