use crate::column::Column;
use crate::error::DataError;
use crate::value::{Row, Value};

/// Trait representing a mapped table: a table name, an ordered column list, and
/// conversions between a row and the entity.
///
/// The column list is a static declaration, fixed for the process lifetime.
///
/// # Example
///
/// ```ignore
/// impl Entity for ProductPrice {
///     fn table_name() -> &'static str { "PRODUTOPRECO" }
///     fn columns() -> &'static [Column] {
///         const COLUMNS: &[Column] = &[
///             Column::new("CODPRODUTOPRECO").primary_key().sequence("GEN_PRODUTOPRECO"),
///             Column::new("CODPROD"),
///             Column::new("PRECO"),
///         ];
///         COLUMNS
///     }
///     fn from_row(mut row: Row) -> Result<Self, DataError> {
///         Ok(Self {
///             id: row.take("CODPRODUTOPRECO")?,
///             product: row.take("CODPROD")?,
///             price: row.take("PRECO")?,
///         })
///     }
///     fn values(&self) -> Vec<Value> {
///         vec![self.id.into(), self.product.clone().into(), self.price.into()]
///     }
///     fn assign(&mut self, column: &str, value: Value) -> Result<(), DataError> {
///         match column {
///             "CODPRODUTOPRECO" => self.id = FromValue::from_value(value, column)?,
///             other => return Err(DataError::declaration(format!("cannot assign {other}"))),
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Entity: Sized + Send + Sync + 'static {
    fn table_name() -> &'static str;

    fn columns() -> &'static [Column];

    /// Build an instance from a row holding one value per declared column.
    fn from_row(row: Row) -> Result<Self, DataError>;

    /// Current column values, in declaration order.
    fn values(&self) -> Vec<Value>;

    /// Overwrite one column's field. Used by the key allocator.
    fn assign(&mut self, column: &str, value: Value) -> Result<(), DataError>;

    /// Runs before every insert, ahead of key allocation.
    fn before_insert(&mut self) -> Result<(), DataError> {
        Ok(())
    }

    /// Runs before every update.
    fn before_update(&mut self) -> Result<(), DataError> {
        Ok(())
    }

    fn column_names() -> Vec<&'static str> {
        Self::columns().iter().map(|c| c.name).collect()
    }

    fn primary_key() -> Vec<&'static Column> {
        Self::columns().iter().filter(|c| c.primary_key).collect()
    }

    fn has_column(name: &str) -> bool {
        Self::columns().iter().any(|c| c.name == name)
    }

    /// The declared key columns, or a declaration error when there are none.
    fn require_primary_key() -> Result<Vec<&'static Column>, DataError> {
        let key = Self::primary_key();
        if key.is_empty() {
            return Err(DataError::declaration(format!(
                "primary key is missing for entity table {}",
                Self::table_name()
            )));
        }
        Ok(key)
    }

    /// Values paired with their column names, in declaration order.
    fn named_values(&self) -> Vec<(&'static str, Value)> {
        Self::columns()
            .iter()
            .map(|c| c.name)
            .zip(self.values())
            .collect()
    }
}
