//! Configuration: engine settings file and connection data

mod app_config;
mod connection;

pub use app_config::{load_engine_config, parse_engine_config, parse_trace_level, EngineConfig};
pub use connection::ConnectionData;
