use crate::connection::Connection;
use crate::entity::Entity;
use crate::error::DataError;
use crate::keys::KeyAllocator;
use crate::page::{Page, Pageable};
use crate::query::{self, Condition, QueryBuilder};
use crate::value::Value;
use std::marker::PhantomData;

/// Generic mapping between an [`Entity`] type and its table, driven over an
/// injected [`Connection`].
///
/// The repository borrows the connection mutably for its whole lifetime, so
/// statements it issues can't interleave with another caller's.
///
/// # Example
///
/// ```ignore
/// let mut products = Repository::<Product, _>::new(&mut conn);
/// let page = products.find_by_columns(Pageable::page(1), false, &[("NOMEPROD", "red car".into())]).await?;
/// let mut product = products.find_by_key("000042").await?.expect("exists");
/// product.name = "Blue car".into();
/// products.update(&mut product).await?;
/// products.commit().await?;
/// ```
pub struct Repository<'c, T, C> {
    conn: &'c mut C,
    _marker: PhantomData<T>,
}

impl<'c, T: Entity, C: Connection> Repository<'c, T, C> {
    pub fn new(conn: &'c mut C) -> Self {
        Self {
            conn,
            _marker: PhantomData,
        }
    }

    /// Get the underlying connection.
    pub fn connection(&mut self) -> &mut C {
        self.conn
    }

    /// Create a `QueryBuilder` pre-configured for this entity's table and the
    /// connection's dialect.
    pub fn query(&self) -> QueryBuilder {
        QueryBuilder::for_entity::<T>().dialect(self.conn.dialect())
    }

    /// Every row of the table, optionally paginated.
    pub async fn all(&mut self, pageable: Pageable) -> Result<Vec<T>, DataError> {
        let stmt = self.query().paginate(pageable).build_select();
        self.fetch(&stmt).await
    }

    /// Look an entity up by its single-column primary key.
    ///
    /// `Ok(None)` means no row matched. Entities without a key, or with a
    /// composite key, get a declaration error before any statement runs.
    pub async fn find_by_key(&mut self, key: impl Into<Value>) -> Result<Option<T>, DataError> {
        let columns = T::require_primary_key()?;
        if columns.len() > 1 {
            return Err(DataError::declaration(format!(
                "find_by_key needs a single-column key, table {} declares {}",
                T::table_name(),
                columns.len()
            )));
        }
        let stmt = self
            .query()
            .where_exact(columns[0].name, key)
            .build_select();
        Ok(self.fetch(&stmt).await?.into_iter().next())
    }

    /// Filter by column values, AND-combined.
    ///
    /// Filters naming undeclared columns are dropped. With `exact` each filter
    /// is an equality test; otherwise the value is split into words and each
    /// word must be contained in the column (a null value has no words). Returns `Ok(None)` when no
    /// declared column was given, and `Ok(Some(vec![]))` when filters matched
    /// nothing.
    pub async fn find_by_columns(
        &mut self,
        pageable: Pageable,
        exact: bool,
        filters: &[(&str, Value)],
    ) -> Result<Option<Vec<T>>, DataError> {
        let conditions: Vec<_> = filters
            .iter()
            .filter(|(column, _)| T::has_column(column))
            .map(|(column, value)| {
                if exact {
                    Condition::exact(column, value.clone())
                } else if value.is_null() {
                    Condition::fuzzy(column, "")
                } else {
                    Condition::fuzzy(column, &value.to_string())
                }
            })
            .collect();
        if conditions.is_empty() {
            return Ok(None);
        }
        let stmt = conditions
            .into_iter()
            .fold(self.query(), QueryBuilder::condition)
            .paginate(pageable)
            .build_select();
        self.fetch(&stmt).await.map(Some)
    }

    /// First exact match of `filters`, if any.
    pub async fn find_one_by_columns(
        &mut self,
        filters: &[(&str, Value)],
    ) -> Result<Option<T>, DataError> {
        Ok(self
            .find_by_columns(Pageable::unpaged(), true, filters)
            .await?
            .and_then(|rows| rows.into_iter().next()))
    }

    /// Number of rows in the table.
    pub async fn count(&mut self) -> Result<u64, DataError> {
        let stmt = self.query().build_count();
        let mut row = self.conn.query_one(&stmt.sql, &stmt.params).await?;
        row.take("TOTAL")
    }

    /// One page of [`all`](Self::all) with the table total.
    pub async fn page(&mut self, pageable: Pageable) -> Result<Page<T>, DataError> {
        let total = self.count().await?;
        let content = self.all(pageable).await?;
        Ok(Page::new(content, &pageable, total))
    }

    /// Insert `entity`, resolving generated key columns first.
    ///
    /// Key fields may be rewritten in place. Does not commit the insert itself;
    /// counter and sequence allocations are committed as they happen.
    pub async fn insert(&mut self, entity: &mut T) -> Result<(), DataError> {
        entity.before_insert()?;
        KeyAllocator::allocate(self.conn, entity).await?;
        let stmt = query::build_insert(self.conn.dialect(), entity);
        tracing::debug!(table = T::table_name(), "insert");
        self.conn.execute_statement(&stmt).await?;
        Ok(())
    }

    /// Write every non-key column, keyed by the entity's current key values.
    /// Does not commit.
    pub async fn update(&mut self, entity: &mut T) -> Result<(), DataError> {
        entity.before_update()?;
        let stmt = query::build_update(self.conn.dialect(), entity)?;
        tracing::debug!(table = T::table_name(), "update");
        self.conn.execute_statement(&stmt).await?;
        Ok(())
    }

    pub async fn commit(&mut self) -> Result<(), DataError> {
        self.conn.commit().await
    }

    async fn fetch(&mut self, stmt: &query::Statement) -> Result<Vec<T>, DataError> {
        self.conn
            .query_statement(stmt)
            .await?
            .into_iter()
            .map(T::from_row)
            .collect()
    }
}
