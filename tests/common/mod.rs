//! Common test utilities for rust-sqlanywhere tests
//!
//! `ScriptedDatabase` stands in for a SQL Anywhere server: every executed
//! command is matched against a list of text fragments and answered by the
//! first matching responder.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use rust_sqlanywhere::catalog::{Connection, ConnectionFactory, RowSet};
use rust_sqlanywhere::{Command, ExecutionError, Value};

type Responder = Rc<dyn Fn(&Command) -> Result<RowSet, ExecutionError>>;

/// What the connections of a `ScriptedDatabase` did
#[derive(Debug, Default)]
pub struct ConnectionLog {
    pub created: usize,
    pub opened: usize,
    pub closed: usize,
    /// Text of every prepared command, in order
    pub prepared: Vec<String>,
    /// Text of every executed command, in order
    pub executed: Vec<String>,
}

impl ConnectionLog {
    /// Number of executed commands containing `needle`
    pub fn count(&self, needle: &str) -> usize {
        self.executed.iter().filter(|t| t.contains(needle)).count()
    }

    /// Number of prepared commands containing `needle`
    pub fn prepared_count(&self, needle: &str) -> usize {
        self.prepared.iter().filter(|t| t.contains(needle)).count()
    }
}

/// Fake database answering commands by text fragment
#[derive(Clone, Default)]
pub struct ScriptedDatabase {
    routes: Vec<(String, Responder)>,
    log: Rc<RefCell<ConnectionLog>>,
    fail_open: bool,
}

impl ScriptedDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands containing `needle` with `responder`. Routes are
    /// tried in the order they were added.
    pub fn route<F>(mut self, needle: &str, responder: F) -> Self
    where
        F: Fn(&Command) -> Result<RowSet, ExecutionError> + 'static,
    {
        self.routes.push((needle.to_string(), Rc::new(responder)));
        self
    }

    /// Like `route`, but tried before every route added so far
    pub fn overriding<F>(mut self, needle: &str, responder: F) -> Self
    where
        F: Fn(&Command) -> Result<RowSet, ExecutionError> + 'static,
    {
        self.routes.insert(0, (needle.to_string(), Rc::new(responder)));
        self
    }

    /// Answer commands containing `needle` with a fixed result
    pub fn rows(self, needle: &str, rows: RowSet) -> Self {
        self.route(needle, move |_| Ok(rows.clone()))
    }

    /// Fail every command containing `needle`
    pub fn failing(self, needle: &str, message: &'static str) -> Self {
        self.overriding(needle, move |_| Err(message.into()))
    }

    /// Make every connection fail to open
    pub fn unreachable(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Shared handle to the connection log
    pub fn log(&self) -> Rc<RefCell<ConnectionLog>> {
        Rc::clone(&self.log)
    }
}

impl ConnectionFactory for ScriptedDatabase {
    fn create_connection(&self) -> Result<Box<dyn Connection>, ExecutionError> {
        self.log.borrow_mut().created += 1;
        Ok(Box::new(ScriptedConnection {
            routes: self.routes.clone(),
            log: Rc::clone(&self.log),
            fail_open: self.fail_open,
        }))
    }
}

struct ScriptedConnection {
    routes: Vec<(String, Responder)>,
    log: Rc<RefCell<ConnectionLog>>,
    fail_open: bool,
}

impl Connection for ScriptedConnection {
    fn open(&mut self) -> Result<(), ExecutionError> {
        if self.fail_open {
            return Err("server not reachable".into());
        }
        self.log.borrow_mut().opened += 1;
        Ok(())
    }

    fn prepare(&mut self, command: &Command) -> Result<(), ExecutionError> {
        self.log.borrow_mut().prepared.push(command.text.clone());
        Ok(())
    }

    fn execute(&mut self, command: &Command) -> Result<RowSet, ExecutionError> {
        self.log.borrow_mut().executed.push(command.text.clone());
        match self
            .routes
            .iter()
            .find(|(needle, _)| command.text.contains(needle.as_str()))
        {
            Some((_, responder)) => responder(command),
            None => Ok(RowSet::default()),
        }
    }

    fn close(&mut self) {
        self.log.borrow_mut().closed += 1;
    }
}

// ============================================================================
// Catalog fixtures
// ============================================================================

pub const FIELD_COLUMNS: [&str; 10] = [
    "column_name",
    "domain_name",
    "width",
    "precision",
    "scale",
    "default",
    "max_identity",
    "column_type",
    "nulls",
    "remarks",
];

pub const PARAMETER_COLUMNS: [&str; 10] = [
    "parm_name",
    "parm_type",
    "parm_id",
    "parm_mode_in",
    "parm_mode_out",
    "domain_name",
    "width",
    "precision",
    "scale",
    "remarks",
];

pub const FOREIGN_KEY_COLUMNS: [&str; 7] = [
    "FK_SCHEMA",
    "FK_TABLE_NAME",
    "FK_COLUMN_NAME",
    "PK_SCHEMA",
    "PK_TABLE_NAME",
    "PK_COLUMN_NAME",
    "FK_NAME",
];

/// Helper to build a nullable, non-identity column row
pub fn field(name: &str, domain: &str, width: i32) -> Vec<Value> {
    vec![
        Value::from(name),
        Value::from(domain),
        Value::Int32(width),
        Value::Null,
        Value::Int32(0),
        Value::Null,
        Value::Int64(0),
        Value::from("R"),
        Value::from("Y"),
        Value::Null,
    ]
}

/// Helper to build an autoincrement, not-null column row
pub fn identity_field(name: &str) -> Vec<Value> {
    let mut row = field(name, "integer", 4);
    row[5] = Value::from("autoincrement");
    row[8] = Value::from("N");
    row
}

/// Helper to build a numeric column row
pub fn numeric_field(name: &str, precision: i32, scale: i32) -> Vec<Value> {
    let mut row = field(name, "numeric", precision);
    row[3] = Value::Int32(precision);
    row[4] = Value::Int32(scale);
    row
}

/// Helper to build a procedure parameter row
pub fn procedure_parameter(
    name: &str,
    parm_type: i32,
    parm_id: i32,
    mode: (&str, &str),
    domain: &str,
    width: i32,
) -> Vec<Value> {
    vec![
        Value::from(name),
        Value::Int32(parm_type),
        Value::Int32(parm_id),
        Value::from(mode.0),
        Value::from(mode.1),
        Value::from(domain),
        Value::Int32(width),
        Value::Null,
        Value::Int32(0),
        Value::Null,
    ]
}

/// Helper to build one column pair of a foreign key
pub fn foreign_key(child: (&str, &str, &str), parent: (&str, &str, &str), name: &str) -> Vec<Value> {
    vec![
        Value::from(child.0),
        Value::from(child.1),
        Value::from(child.2),
        Value::from(parent.0),
        Value::from(parent.1),
        Value::from(parent.2),
        Value::from(name),
    ]
}

/// Helper to build a name listing (`ElementName`, `remarks`)
pub fn element_names(names: &[(&str, Option<&str>)]) -> RowSet {
    let mut rows = RowSet::new(&["ElementName", "remarks"]);
    for (name, remark) in names {
        rows.push(vec![Value::from(*name), Value::from(remark.map(str::to_string))]);
    }
    rows
}

/// Name the command's table or procedure parameter is bound to
pub fn bound_name(command: &Command, parameter: &str) -> String {
    match command.parameter(parameter).map(|p| &p.value) {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

fn rows_of(columns: &[&str], rows: Vec<Vec<Value>>) -> RowSet {
    let mut set = RowSet::new(columns);
    for row in rows {
        set.push(row);
    }
    set
}

/// Column rows of the demo tables and view
pub fn demo_fields(table: &str) -> RowSet {
    let rows = match table {
        "customer" => vec![
            identity_field("id"),
            field("name", "varchar", 40),
            field("notes", "long varchar", 32767),
        ],
        "order" => vec![
            identity_field("id"),
            field("cust_id", "integer", 4),
            numeric_field("amount", 10, 2),
        ],
        "customer_summary" => vec![field("name", "varchar", 40), field("order_count", "integer", 4)],
        _ => Vec::new(),
    };
    rows_of(&FIELD_COLUMNS, rows)
}

/// A single-schema catalog: two related tables, a view and a procedure
pub fn demo_database() -> ScriptedDatabase {
    let mut schemas = RowSet::new(&["SchemaName"]);
    schemas.push(vec![Value::from("DBA")]);

    ScriptedDatabase::new()
        .rows("from sysusers", schemas)
        .rows(
            "table_type = 1",
            element_names(&[("customer", Some("Customers")), ("order", None)]),
        )
        .rows("table_type in (2, 21)", element_names(&[("customer_summary", None)]))
        .rows("proc_name As ElementName", element_names(&[("get_orders", None)]))
        .route("select tc.*", |command| {
            Ok(demo_fields(&bound_name(command, "@table_name")))
        })
        .route("sp_pkeys", |command| {
            let mut rows = RowSet::new(&["column_name"]);
            match bound_name(command, "@table_name").as_str() {
                "customer" | "order" => rows.push(vec![Value::from("id")]),
                _ => {}
            }
            Ok(rows)
        })
        .route("select i.index_name", |command| {
            let mut rows = RowSet::new(&["index_name", "column_name"]);
            if bound_name(command, "@table_name") == "customer" {
                rows.push(vec![Value::from("ux_customer_name"), Value::from("name")]);
            }
            Ok(rows)
        })
        .route("select pp.*", |command| {
            let rows = match bound_name(command, "@procedure_name").as_str() {
                "get_orders" => vec![
                    procedure_parameter("order_id", 1, 3, ("Y", "N"), "integer", 4),
                    procedure_parameter("@total", 0, 2, ("Y", "Y"), "integer", 4),
                    procedure_parameter("@cust_id", 0, 1, ("Y", "N"), "integer", 4),
                    procedure_parameter("ret", 4, 0, ("N", "Y"), "integer", 4),
                ],
                _ => Vec::new(),
            };
            Ok(rows_of(&PARAMETER_COLUMNS, rows))
        })
        .route("from sysfkey", |_| {
            Ok(rows_of(
                &FOREIGN_KEY_COLUMNS,
                vec![foreign_key(
                    ("DBA", "order", "cust_id"),
                    ("DBA", "customer", "id"),
                    "fk_order_customer",
                )],
            ))
        })
}
