//! # rowmap-data-sqlx
//!
//! SQLite backend for the rowmap data layer, built on
//! [SQLx](https://github.com/launchbadge/sqlx). It owns one live connection
//! and exposes it through [`rowmap_data::Connection`], so every
//! [`Repository`](rowmap_data::Repository) runs on it unchanged.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`SqlxConnection`] | One SQLite connection; lazy write transaction flushed by `commit` |
//! | [`SharedConnection`] | `Arc<Mutex<_>>` handle for tasks taking turns on one connection |
//! | [`SqlxErrorExt`] | Converts `sqlx::Error` into `DataError` (`.into_data_error()`) |
//! | [`SqlxResult<T>`] | Type alias for `Result<T, DataError>` |
//!
//! # Quick start
//!
//! ```ignore
//! use rowmap_data::prelude::*;
//! use rowmap_data_sqlx::SqlxConnection;
//!
//! let mut conn = SqlxConnection::connect("sqlite://catalog.db").await?;
//! let mut products = Repository::<Product, _>::new(&mut conn);
//! products.insert(&mut Product::named("Lamp")).await?;
//! products.commit().await?;
//! ```
//!
//! Values bind by variant (`Value::Null` binds SQL `NULL`) and cells decode
//! by SQLite storage class: `INTEGER` to `Value::Integer`, `REAL` to
//! `Value::Real`, `TEXT` to `Value::Text`, `BLOB` to `Value::Blob`.

pub mod error;
pub mod shared;

#[cfg(feature = "sqlite")]
pub mod connection;

#[cfg(feature = "sqlite")]
pub use connection::SqlxConnection;
pub use error::{SqlxErrorExt, SqlxResult};
pub use shared::SharedConnection;
