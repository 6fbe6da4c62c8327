use crate::error::DataError;
use crate::query::{Dialect, Statement};
use crate::value::{ColumnarRows, Row, Value};
use std::future::Future;

/// A single live database connection, used serially.
///
/// Every method takes `&mut self`: one handle serves one caller at a time.
/// Deployments that share a handle across tasks wrap it in their own lock
/// (see `rowmap_data_sqlx::SharedConnection`). Nothing is committed implicitly.
///
/// Uses RPITIT (return-position `impl Trait` in traits), no `async-trait`.
pub trait Connection: Send {
    /// Dialect the statements sent to this connection must be written in.
    fn dialect(&self) -> Dialect;

    /// Run a statement and return one mapping per row. Parameters bind
    /// positionally in placeholder order.
    fn query(
        &mut self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Result<Vec<Row>, DataError>> + Send;

    /// Run a write statement (INSERT/UPDATE) and return the affected row count.
    fn execute(
        &mut self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Result<u64, DataError>> + Send;

    /// Flush everything executed since the last commit.
    fn commit(&mut self) -> impl Future<Output = Result<(), DataError>> + Send;

    /// First row of the result; `DataError::NotFound` when there is none.
    fn query_one(
        &mut self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Result<Row, DataError>> + Send {
        async move {
            self.query(sql, params)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| DataError::NotFound(format!("no row returned by: {sql}")))
        }
    }

    /// Column-oriented variant of [`query`](Connection::query): one entry per
    /// column name holding that column's values across all rows.
    fn query_columnar(
        &mut self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Result<ColumnarRows, DataError>> + Send {
        async move { Ok(ColumnarRows::from_rows(self.query(sql, params).await?)) }
    }

    fn query_statement(
        &mut self,
        statement: &Statement,
    ) -> impl Future<Output = Result<Vec<Row>, DataError>> + Send {
        self.query(&statement.sql, &statement.params)
    }

    fn execute_statement(
        &mut self,
        statement: &Statement,
    ) -> impl Future<Output = Result<u64, DataError>> + Send {
        self.execute(&statement.sql, &statement.params)
    }
}
