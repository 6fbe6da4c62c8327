use std::str::FromStr;

use rowmap_core::DatabaseConfig;
use rowmap_data::{Connection, DataError, Dialect, Row, Value};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{Column as _, ConnectOptions, Connection as _, Row as _, TypeInfo, ValueRef};

use crate::error::{SqlxErrorExt, SqlxResult};
use crate::shared::SharedConnection;

/// One SQLite connection implementing [`Connection`].
///
/// Writes run inside a transaction opened on the first `execute` after a
/// commit and flushed by [`commit`](Connection::commit). Reads see the
/// connection's own pending writes. Dropping or closing the connection with
/// writes pending discards them.
pub struct SqlxConnection {
    conn: SqliteConnection,
    dialect: Dialect,
    in_transaction: bool,
}

impl SqlxConnection {
    /// Open a connection from a URL such as `sqlite::memory:` or
    /// `sqlite://catalog.db`, creating the file if needed.
    pub async fn connect(url: &str) -> SqlxResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(SqlxErrorExt::into_data_error)?
            .create_if_missing(true);
        Self::connect_with(options).await
    }

    /// Open a connection from process configuration.
    ///
    /// The configured dialect must be one SQLite understands (`sqlite` or
    /// `generic`).
    pub async fn from_config(config: &DatabaseConfig) -> SqlxResult<Self> {
        let dialect: Dialect = config.dialect.parse()?;
        if !matches!(dialect, Dialect::Sqlite | Dialect::Generic) {
            return Err(DataError::Unsupported(format!(
                "the SQLite backend cannot speak the {dialect:?} dialect"
            )));
        }
        let options = SqliteConnectOptions::from_str(&config.connect_url())
            .map_err(SqlxErrorExt::into_data_error)?
            .create_if_missing(config.create_if_missing);
        let mut conn = Self::connect_with(options).await?;
        conn.dialect = dialect;
        Ok(conn)
    }

    pub async fn connect_with(options: SqliteConnectOptions) -> SqlxResult<Self> {
        let conn = options
            .connect()
            .await
            .map_err(SqlxErrorExt::into_data_error)?;
        tracing::info!(filename = %options.get_filename().display(), "database connection opened");
        Ok(Self {
            conn,
            dialect: Dialect::Sqlite,
            in_transaction: false,
        })
    }

    /// Whether writes are waiting for a commit.
    pub fn has_pending_writes(&self) -> bool {
        self.in_transaction
    }

    /// Hand the connection to a lock so several tasks can take turns on it.
    pub fn into_shared(self) -> SharedConnection<Self> {
        SharedConnection::new(self)
    }

    /// Close the connection. Uncommitted writes are discarded.
    pub async fn close(self) -> SqlxResult<()> {
        if self.in_transaction {
            tracing::warn!("closing connection with uncommitted writes");
        }
        self.conn
            .close()
            .await
            .map_err(SqlxErrorExt::into_data_error)?;
        tracing::info!("database connection closed");
        Ok(())
    }

    async fn begin_if_idle(&mut self) -> SqlxResult<()> {
        if !self.in_transaction {
            sqlx::Executor::execute(&mut self.conn, sqlx::raw_sql("BEGIN"))
                .await
                .map_err(SqlxErrorExt::into_data_error)?;
            self.in_transaction = true;
        }
        Ok(())
    }
}

impl Connection for SqlxConnection {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn query(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Row>, DataError> {
        tracing::debug!(sql, params = params.len(), "query");
        let rows = bind_all(sqlx::query(sql), params)
            .fetch_all(&mut self.conn)
            .await
            .map_err(SqlxErrorExt::into_data_error)?;
        rows.iter().map(decode_row).collect()
    }

    async fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64, DataError> {
        self.begin_if_idle().await?;
        tracing::debug!(sql, params = params.len(), "execute");
        let result = bind_all(sqlx::query(sql), params)
            .execute(&mut self.conn)
            .await
            .map_err(SqlxErrorExt::into_data_error)?;
        Ok(result.rows_affected())
    }

    async fn commit(&mut self) -> Result<(), DataError> {
        if self.in_transaction {
            sqlx::Executor::execute(&mut self.conn, sqlx::raw_sql("COMMIT"))
                .await
                .map_err(SqlxErrorExt::into_data_error)?;
            self.in_transaction = false;
            tracing::debug!("commit");
        }
        Ok(())
    }
}

fn bind_all<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &'q [Value],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for param in params {
        query = match param {
            Value::Null => query.bind(None::<String>),
            Value::Integer(i) => query.bind(*i),
            Value::Real(r) => query.bind(*r),
            Value::Text(s) => query.bind(s.as_str()),
            Value::Blob(b) => query.bind(b.as_slice()),
            Value::Bool(b) => query.bind(*b),
        };
    }
    query
}

fn decode_row(row: &SqliteRow) -> SqlxResult<Row> {
    let mut decoded = Row::with_capacity(row.columns().len());
    for column in row.columns() {
        decoded.push(column.name(), decode_value(row, column.ordinal())?);
    }
    Ok(decoded)
}

/// Map one cell by its storage class. Values whose type SQLite reports by
/// declared affinity fall back through integer, real, then text.
fn decode_value(row: &SqliteRow, index: usize) -> SqlxResult<Value> {
    let raw = row
        .try_get_raw(index)
        .map_err(SqlxErrorExt::into_data_error)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let storage = raw.type_info().name().to_ascii_uppercase();
    let value = match storage.as_str() {
        "INTEGER" => row.try_get(index).map(Value::Integer),
        "REAL" => row.try_get(index).map(Value::Real),
        "TEXT" => row.try_get(index).map(Value::Text),
        "BLOB" => row.try_get(index).map(Value::Blob),
        "BOOLEAN" => row.try_get(index).map(Value::Bool),
        _ => row
            .try_get(index)
            .map(Value::Integer)
            .or_else(|_| row.try_get(index).map(Value::Real))
            .or_else(|_| row.try_get(index).map(Value::Text)),
    };
    value.map_err(SqlxErrorExt::into_data_error)
}
