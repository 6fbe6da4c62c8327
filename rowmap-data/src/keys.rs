//! Primary key allocation for inserts.
//!
//! Two strategies compete: database sequences (generators) and a counter
//! table holding the next code per `(table, column)`. Counter allocation is a
//! read-increment-write; the exclusive `&mut` borrow of the connection keeps it
//! serialized in-process and a compare-and-set update catches writers from
//! other processes.

use crate::column::{Column, KeyStrategy};
use crate::connection::Connection;
use crate::entity::Entity;
use crate::error::DataError;
use crate::query::QueryBuilder;
use crate::repository::Repository;
use crate::value::{FromValue, Row, Value};

/// Table holding one counter row per generated `(table, column)` pair.
pub const COUNTER_TABLE: &str = "CODIGO";
const TABLE_COLUMN: &str = "NOMETABELA";
const FIELD_COLUMN: &str = "NOMECAMPO";
const CODE_COLUMN: &str = "ULTIMOCODIGO";

/// The tracked code for one `(table, column)` pair.
///
/// `last_issued_code` is kept as read so a write-back preserves the stored
/// representation (integer or digit string).
#[derive(Debug, Clone, PartialEq)]
pub struct CounterRow {
    pub table_name: String,
    pub column_name: String,
    pub last_issued_code: Value,
}

impl CounterRow {
    pub fn new(table_name: &str, column_name: &str, code: impl Into<Value>) -> Self {
        Self {
            table_name: table_name.to_string(),
            column_name: column_name.to_string(),
            last_issued_code: code.into(),
        }
    }

    pub fn code(&self) -> Result<u64, DataError> {
        u64::from_value(self.last_issued_code.clone(), CODE_COLUMN)
    }

    /// `code`, in the same representation as the stored one.
    fn encode(&self, code: u64) -> Result<Value, DataError> {
        match self.last_issued_code {
            Value::Text(_) => Ok(Value::Text(code.to_string())),
            _ => i64::try_from(code)
                .map(Value::Integer)
                .map_err(|_| DataError::decode(CODE_COLUMN, "i64")),
        }
    }
}

impl Entity for CounterRow {
    fn table_name() -> &'static str {
        COUNTER_TABLE
    }

    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[
            Column::new(TABLE_COLUMN).primary_key(),
            Column::new(FIELD_COLUMN).primary_key(),
            Column::new(CODE_COLUMN),
        ];
        COLUMNS
    }

    fn from_row(mut row: Row) -> Result<Self, DataError> {
        Ok(Self {
            table_name: row.take(TABLE_COLUMN)?,
            column_name: row.take(FIELD_COLUMN)?,
            last_issued_code: row.take(CODE_COLUMN)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.table_name.clone().into(),
            self.column_name.clone().into(),
            self.last_issued_code.clone(),
        ]
    }

    fn assign(&mut self, column: &str, value: Value) -> Result<(), DataError> {
        match column {
            TABLE_COLUMN => self.table_name = String::from_value(value, column)?,
            FIELD_COLUMN => self.column_name = String::from_value(value, column)?,
            CODE_COLUMN => self.last_issued_code = value,
            other => {
                return Err(DataError::declaration(format!(
                    "{COUNTER_TABLE} has no column {other}"
                )))
            }
        }
        Ok(())
    }
}

pub struct KeyAllocator;

impl KeyAllocator {
    /// Resolve every generated key column of `entity`, in declaration order,
    /// assigning the issued values in place.
    ///
    /// Columns with [`KeyStrategy::Supplied`] are left alone, as are counter
    /// columns without a counter row.
    pub async fn allocate<T: Entity, C: Connection>(
        conn: &mut C,
        entity: &mut T,
    ) -> Result<(), DataError> {
        for column in T::primary_key() {
            let issued = match column.strategy {
                KeyStrategy::Supplied => None,
                KeyStrategy::Counter { width } => {
                    Self::next_counter(conn, T::table_name(), column.name, width).await?
                }
                KeyStrategy::Sequence(generator) => Some(Self::next_sequence(conn, generator).await?),
            };
            if let Some(value) = issued {
                tracing::debug!(table = T::table_name(), column = column.name, key = %value, "key allocated");
                entity.assign(column.name, value)?;
            }
        }
        Ok(())
    }

    /// Issue the counter's code zero-padded to `width`, then persist and commit
    /// the incremented counter before returning.
    ///
    /// `Ok(None)` when no counter row exists for `(table, column)`.
    pub async fn next_counter<C: Connection>(
        conn: &mut C,
        table: &str,
        column: &str,
        width: usize,
    ) -> Result<Option<Value>, DataError> {
        let counter = Repository::<CounterRow, C>::new(conn)
            .find_one_by_columns(&[(TABLE_COLUMN, table.into()), (FIELD_COLUMN, column.into())])
            .await?;
        let Some(counter) = counter else {
            tracing::debug!(table, column, "no counter row, key left unresolved");
            return Ok(None);
        };

        let code = counter.code()?;
        let next = code
            .checked_add(1)
            .ok_or_else(|| DataError::decode(CODE_COLUMN, "code below u64::MAX"))?;
        let issued = format!("{code:0>width$}");
        let stmt = QueryBuilder::new(COUNTER_TABLE)
            .dialect(conn.dialect())
            .where_exact(TABLE_COLUMN, table)
            .where_exact(FIELD_COLUMN, column)
            .where_exact(CODE_COLUMN, counter.last_issued_code.clone())
            .build_update(&[(CODE_COLUMN, counter.encode(next)?)])?;
        if conn.execute_statement(&stmt).await? == 0 {
            tracing::warn!(table, column, code, "counter row changed during allocation");
            return Err(DataError::Conflict(format!(
                "counter for {table}.{column} moved past {code}"
            )));
        }
        conn.commit().await?;
        Ok(Some(Value::Text(issued)))
    }

    /// Fetch the next value of `generator` and commit.
    pub async fn next_sequence<C: Connection>(
        conn: &mut C,
        generator: &str,
    ) -> Result<Value, DataError> {
        let sql = conn.dialect().next_value_sql(generator)?;
        let mut row = conn.query_one(&sql, &[]).await?;
        let value: Value = row.take("NEXT_VALUE")?;
        conn.commit().await?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_preserves_representation() {
        let text = CounterRow::new("PRODUTO", "CODPROD", "000007");
        assert_eq!(text.code().unwrap(), 7);
        assert_eq!(text.encode(8).unwrap(), Value::Text("8".into()));

        let int = CounterRow::new("PRODUTO", "CODPROD", 7i64);
        assert_eq!(int.encode(8).unwrap(), Value::Integer(8));
    }

    #[test]
    fn test_encode_refuses_integer_overflow() {
        let int = CounterRow::new("PRODUTO", "CODPROD", i64::MAX);
        let err = int.encode(i64::MAX as u64 + 1).unwrap_err();
        assert!(matches!(err, DataError::Decode { ref column, .. } if column == "ULTIMOCODIGO"));

        let text = CounterRow::new("PRODUTO", "CODPROD", "9223372036854775808");
        assert_eq!(
            text.encode(i64::MAX as u64 + 2).unwrap(),
            Value::Text("9223372036854775809".into())
        );
    }

    #[test]
    fn test_counter_row_is_keyed_by_table_and_column() {
        let key: Vec<_> = CounterRow::primary_key().iter().map(|c| c.name).collect();
        assert_eq!(key, vec!["NOMETABELA", "NOMECAMPO"]);
    }
}
