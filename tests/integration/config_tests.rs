//! Integration tests for configuration loading

use std::fs;

use log::LevelFilter;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use rust_sqlanywhere::model::ElementRef;
use rust_sqlanywhere::query::{install_schema_overwrites, SchemaNameOverwrites};
use rust_sqlanywhere::{load_engine_config, ConnectionData, DynamicQueryEngine, SqlAnywhereError};

/// Helper to write a config file into a fresh temp directory
fn write_config(bytes: &[u8]) -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = dir.path().join("app.config");
    fs::write(&path, bytes).expect("Failed to write config");
    (dir, path)
}

#[test]
fn test_load_overwrites_and_trace_level() {
    let (_dir, path) = write_config(
        br#"<?xml version="1.0" encoding="utf-8"?>
<configuration>
  <sybaseAsaSchemaNameOverwrites>
    <add key="DBA" value="production"/>
    <add key="DBA" value="ignored"/>
    <add key="staging" value=""/>
  </sybaseAsaSchemaNameOverwrites>
  <system.diagnostics>
    <switches>
      <add name="SybaseAsaDQE" value="info"/>
    </switches>
  </system.diagnostics>
</configuration>"#,
    );

    let config = load_engine_config(&path).unwrap();
    assert_eq!(config.schema_overwrites.len(), 2);
    assert_eq!(config.schema_overwrites.get_new_schema_name("DBA"), "production");
    assert_eq!(config.schema_overwrites.get_new_schema_name("[DBA]"), "production");
    assert_eq!(config.schema_overwrites.get_new_schema_name("dba"), "dba");
    assert_eq!(config.schema_overwrites.get_new_schema_name("staging"), "");
    assert_eq!(config.trace_level, Some(LevelFilter::Debug));
}

#[test]
fn test_load_windows_1252_file() {
    let mut bytes = b"<configuration><schemaNameOverwrites><add key=\"K".to_vec();
    bytes.push(0xE4); // a-umlaut in Windows-1252
    bytes.extend_from_slice(b"se\" value=\"Stra");
    bytes.push(0xDF); // sharp s
    bytes.extend_from_slice(b"e\"/></schemaNameOverwrites></configuration>");
    let (_dir, path) = write_config(&bytes);

    let config = load_engine_config(&path).unwrap();
    assert_eq!(config.schema_overwrites.get("K\u{e4}se"), Some("Stra\u{df}e"));
    assert_eq!(config.trace_level, None);
}

#[test]
fn test_load_file_with_byte_order_mark() {
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(
        br#"<configuration><schemaNameOverwrites><add key="*" value="sales"/></schemaNameOverwrites></configuration>"#,
    );
    let (_dir, path) = write_config(&bytes);

    let config = load_engine_config(&path).unwrap();
    assert_eq!(config.schema_overwrites.get_new_schema_name("anything"), "sales");
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = load_engine_config(&dir.path().join("missing.config")).unwrap_err();
    assert!(matches!(err, SqlAnywhereError::ConfigReadError { .. }));
}

#[test]
fn test_overwrite_without_key() {
    let (_dir, path) = write_config(
        br#"<configuration><schemaNameOverwrites><add value="x"/></schemaNameOverwrites></configuration>"#,
    );
    let err = load_engine_config(&path).unwrap_err();
    assert!(matches!(err, SqlAnywhereError::InvalidConfiguration { .. }));
}

#[test]
fn test_installed_overwrites_are_used_by_default_engines() {
    let (_dir, path) = write_config(
        br#"<configuration><schemaNameOverwrites><add key="DBA" value="prod"/></schemaNameOverwrites></configuration>"#,
    );
    let config = load_engine_config(&path).unwrap();
    install_schema_overwrites(config.schema_overwrites).unwrap();

    let query = DynamicQueryEngine::new()
        .create_delete(&ElementRef::new("DBA", "customer"), None, None)
        .unwrap();
    assert_eq!(query.sql(), "DELETE FROM [prod].[customer]");

    // The first snapshot stays in place
    let err = install_schema_overwrites(SchemaNameOverwrites::default()).unwrap_err();
    assert!(matches!(err, SqlAnywhereError::OverwritesAlreadyInstalled));
}

#[test]
fn test_connection_data() {
    let data = ConnectionData::new("asa17", "demo", "dba", "s;ql");
    assert!(data.validate());
    assert_eq!(
        data.connection_string(),
        "UserID=dba;Password=s';'ql;DatabaseName=demo;ServerName=asa17;CommLinks=TCPIP()"
    );

    assert!(!ConnectionData::new("asa17", "demo", " ", "").validate());
    assert!(ConnectionData::new("asa17", "demo", "dba", "").validate());
}
