pub mod column;
pub mod connection;
pub mod entity;
pub mod error;
pub mod keys;
pub mod page;
pub mod query;
pub mod repository;
pub mod value;

pub use column::{Column, KeyStrategy};
pub use connection::Connection;
pub use entity::Entity;
pub use error::DataError;
pub use keys::{CounterRow, KeyAllocator, COUNTER_TABLE};
pub use page::{Page, Pageable, BASE_LIMIT};
pub use query::{Condition, Dialect, QueryBuilder, Statement};
pub use repository::Repository;
pub use value::{ColumnarRows, FromValue, Row, Value};

pub mod prelude {
    //! Re-exports of the most commonly used data types.
    pub use crate::{
        Column, Connection, DataError, Entity, FromValue, Page, Pageable, QueryBuilder,
        Repository, Row, Value,
    };
}
