//! Process-wide plumbing shared by rowmap applications: layered
//! configuration and tracing setup.

pub mod config;
pub mod logging;

pub use config::{ConfigError, ConfigProperties, ConfigValue, DatabaseConfig, RowmapConfig};
pub use logging::{init_tracing, init_tracing_with};
