//! Parser for the engine's XML configuration file

use std::path::Path;

use encoding_rs::WINDOWS_1252;
use log::LevelFilter;
use roxmltree::{Document, Node};

use crate::error::SqlAnywhereError;
use crate::query::{SchemaNameOverwrites, SchemaNameOverwritesBuilder};

/// Section names accepted for schema name overwrites
const OVERWRITE_SECTIONS: &[&str] = &["schemaNameOverwrites", "sybaseAsaSchemaNameOverwrites"];

/// Trace switch names consulted for the engine's log level
const TRACE_SWITCHES: &[&str] = &["SqlAnywhereDQE", "SybaseAsaDQE"];

/// Settings read from the configuration file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub schema_overwrites: SchemaNameOverwrites,
    /// Level derived from the trace switch; `None` when the switch is absent
    pub trace_level: Option<LevelFilter>,
}

/// Load and parse a configuration file
pub fn load_engine_config(path: &Path) -> Result<EngineConfig, SqlAnywhereError> {
    let content =
        read_file_with_encoding_fallback(path).map_err(|e| SqlAnywhereError::ConfigReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
    parse_engine_config(&content, path)
}

/// Parse configuration text; `path` is only used for error reporting
pub fn parse_engine_config(content: &str, path: &Path) -> Result<EngineConfig, SqlAnywhereError> {
    let doc = Document::parse(content).map_err(|e| SqlAnywhereError::ConfigParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let root = doc.root_element();

    let mut builder = SchemaNameOverwritesBuilder::new();
    if let Some(section) = find_section(&root, OVERWRITE_SECTIONS) {
        parse_overwrites(&section, &mut builder)?;
    }

    let trace_level = match find_switch_value(&root) {
        Some(value) => Some(parse_trace_level(&value)?),
        None => None,
    };

    Ok(EngineConfig {
        schema_overwrites: builder.freeze(),
        trace_level,
    })
}

/// Map a trace switch value onto a log level.
///
/// Accepts the numeric levels 0-4 or their names (off, error, warning, info, verbose).
pub fn parse_trace_level(value: &str) -> Result<LevelFilter, SqlAnywhereError> {
    match value.trim().to_lowercase().as_str() {
        "0" | "off" => Ok(LevelFilter::Off),
        "1" | "error" => Ok(LevelFilter::Error),
        "2" | "warning" => Ok(LevelFilter::Warn),
        "3" | "info" => Ok(LevelFilter::Debug),
        "4" | "verbose" => Ok(LevelFilter::Trace),
        other => Err(SqlAnywhereError::InvalidConfiguration {
            message: format!("Unknown trace switch value '{}'", other),
        }),
    }
}

fn find_section<'a, 'input>(root: &Node<'a, 'input>, names: &[&str]) -> Option<Node<'a, 'input>> {
    root.descendants()
        .find(|n| n.is_element() && names.contains(&n.tag_name().name()))
}

fn parse_overwrites(
    section: &Node,
    builder: &mut SchemaNameOverwritesBuilder,
) -> Result<(), SqlAnywhereError> {
    for node in section.children().filter(|n| n.is_element()) {
        match node.tag_name().name() {
            "add" => {
                let key = node.attribute("key").ok_or_else(|| {
                    SqlAnywhereError::InvalidConfiguration {
                        message: "Schema name overwrite is missing its 'key' attribute".to_string(),
                    }
                })?;
                let value = node.attribute("value").unwrap_or_default();
                builder.add(key, value);
            }
            "clear" | "remove" => {
                log::warn!(
                    "Unsupported element <{}> in schema name overwrites ignored",
                    node.tag_name().name()
                );
            }
            other => {
                return Err(SqlAnywhereError::InvalidConfiguration {
                    message: format!("Unexpected element <{}> in schema name overwrites", other),
                });
            }
        }
    }
    Ok(())
}

fn find_switch_value(root: &Node) -> Option<String> {
    let switches = find_section(root, &["switches"])?;
    switches
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "add")
        .find(|n| {
            n.attribute("name")
                .is_some_and(|name| TRACE_SWITCHES.contains(&name))
        })
        .and_then(|n| n.attribute("value").map(|v| v.to_string()))
}

/// Read a file as UTF-8, falling back to Windows-1252 for legacy files
fn read_file_with_encoding_fallback(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s.trim_start_matches('\u{feff}').to_string()),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, had_errors) = WINDOWS_1252.decode(&bytes);
            if had_errors {
                Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "File contains invalid characters",
                ))
            } else {
                Ok(decoded.into_owned())
            }
        }
    }
}
