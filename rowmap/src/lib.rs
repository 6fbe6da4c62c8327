//! rowmap - map database tables onto Rust types over one SQL connection.
//!
//! This facade re-exports the rowmap crates through a single dependency:
//!
//! ```ignore
//! use rowmap::prelude::*;
//! ```
//!
//! # Feature flags
//!
//! | Feature  | Default | Crate                                      |
//! |----------|---------|--------------------------------------------|
//! | `sqlite` | **yes** | `rowmap-data-sqlx` (SQLite `Connection`)   |
//!
//! `rowmap-core` (configuration, tracing) and `rowmap-data` (entities,
//! query building, repository, key allocation) are always included.

pub extern crate rowmap_core;
pub extern crate rowmap_data;

#[cfg(feature = "sqlite")]
pub use rowmap_data_sqlx;

pub use rowmap_core::{config, init_tracing, ConfigError, DatabaseConfig, RowmapConfig};
pub use rowmap_data::{
    Column, ColumnarRows, Condition, Connection, CounterRow, DataError, Dialect, Entity,
    FromValue, KeyAllocator, KeyStrategy, Page, Pageable, QueryBuilder, Repository, Row,
    Statement, Value, BASE_LIMIT,
};

/// Unified prelude: import everything with `use rowmap::prelude::*`.
pub mod prelude {
    pub use rowmap_core::{init_tracing, ConfigProperties, DatabaseConfig, RowmapConfig};
    pub use rowmap_data::prelude::*;
    pub use rowmap_data::{CounterRow, Dialect, KeyStrategy};

    #[cfg(feature = "sqlite")]
    pub use rowmap_data_sqlx::{SharedConnection, SqlxConnection};
}
