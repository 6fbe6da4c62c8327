//! SQL statement synthesis.
//!
//! Statements are plain text plus positional parameters. Identifiers come from
//! static entity declarations and are emitted as-is.

use crate::entity::Entity;
use crate::error::DataError;
use crate::page::{Pageable, Window};
use crate::value::Value;
use std::str::FromStr;

/// SQL flavour statements are rendered in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Dialect {
    /// Generic SQL using `?` placeholders and `LIMIT`/`OFFSET` (default).
    #[default]
    Generic,
    /// SQLite: `?` placeholders, `instr` containment.
    Sqlite,
    /// Postgres-style `$1, $2, ...` placeholders.
    Postgres,
    /// Firebird: `FIRST n SKIP m` pagination, `SIMILAR TO` containment, generators.
    Firebird,
}

impl Dialect {
    fn placeholder(self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${index}"),
            Dialect::Generic | Dialect::Sqlite | Dialect::Firebird => "?".to_string(),
        }
    }

    /// Case-sensitive "`column` contains `word`" test; `word` is already escaped.
    ///
    /// SQLite's `LIKE` folds ASCII case, so containment there goes through `instr`.
    fn contains(self, column: &str, word: &str) -> String {
        match self {
            Dialect::Firebird => format!("{column} SIMILAR TO '%{word}%'"),
            Dialect::Sqlite => format!("instr({column}, '{word}') > 0"),
            Dialect::Generic | Dialect::Postgres => format!("{column} LIKE '%{word}%'"),
        }
    }

    /// Single-row statement fetching the next value of `generator`.
    ///
    /// The value is returned under the `NEXT_VALUE` column.
    pub fn next_value_sql(self, generator: &str) -> Result<String, DataError> {
        match self {
            Dialect::Firebird => Ok(format!(
                "SELECT NEXT VALUE FOR {generator} AS NEXT_VALUE FROM RDB$DATABASE"
            )),
            Dialect::Postgres => Ok(format!("SELECT nextval('{generator}') AS NEXT_VALUE")),
            Dialect::Generic | Dialect::Sqlite => Err(DataError::Unsupported(format!(
                "dialect {self:?} has no sequences (generator {generator})"
            ))),
        }
    }
}

impl FromStr for Dialect {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "generic" => Ok(Dialect::Generic),
            "sqlite" => Ok(Dialect::Sqlite),
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            "firebird" => Ok(Dialect::Firebird),
            other => Err(DataError::Other(format!("unknown SQL dialect: {other}"))),
        }
    }
}

/// SQL text with its positional parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

/// A WHERE predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `column = ?`, value bound.
    Eq(String, Value),
    /// One containment test per word, AND-combined. Words are embedded in the
    /// SQL text, never bound.
    Contains(String, Vec<String>),
}

impl Condition {
    pub fn exact(column: &str, value: impl Into<Value>) -> Self {
        Condition::Eq(column.to_string(), value.into())
    }

    /// Split `text` on whitespace into words matched independently.
    pub fn fuzzy(column: &str, text: &str) -> Self {
        Condition::Contains(
            column.to_string(),
            text.split_whitespace().map(str::to_string).collect(),
        )
    }

    /// Render into SQL, pushing bound values onto `params`.
    ///
    /// Returns `None` for a containment test with no words.
    fn render(
        &self,
        dialect: Dialect,
        params: &mut Vec<Value>,
        placeholder_idx: &mut usize,
    ) -> Option<String> {
        match self {
            Condition::Eq(col, val) => {
                let placeholder = dialect.placeholder(*placeholder_idx);
                *placeholder_idx += 1;
                params.push(val.clone());
                Some(format!("{col} = {placeholder}"))
            }
            Condition::Contains(col, words) => {
                if words.is_empty() {
                    return None;
                }
                let parts: Vec<_> = words
                    .iter()
                    .map(|word| dialect.contains(col, &escape_literal(word)))
                    .collect();
                Some(parts.join(" AND "))
            }
        }
    }
}

/// Double single quotes so an embedded word cannot close the string literal.
fn escape_literal(word: &str) -> String {
    word.replace('\'', "''")
}

/// A fluent query builder for SELECT, COUNT, INSERT and UPDATE statements.
///
/// # Example
///
/// ```ignore
/// let stmt = QueryBuilder::new("PRODUTO")
///     .dialect(Dialect::Firebird)
///     .columns(&["CODPROD", "NOMEPROD"])
///     .where_fuzzy("NOMEPROD", "red car")
///     .paginate(Pageable::new(2, 10))
///     .build_select();
/// ```
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    table: String,
    columns: Vec<String>,
    conditions: Vec<Condition>,
    window: Option<Window>,
    dialect: Dialect,
}

impl QueryBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: Vec::new(),
            conditions: Vec::new(),
            window: None,
            dialect: Dialect::Generic,
        }
    }

    /// Builder over an entity's table, selecting its declared columns.
    pub fn for_entity<T: Entity>() -> Self {
        Self::new(T::table_name()).columns(&T::column_names())
    }

    /// Set the SQL dialect (affects placeholders, pagination and containment).
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn where_exact(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::exact(column, value));
        self
    }

    pub fn where_fuzzy(mut self, column: &str, text: &str) -> Self {
        self.conditions.push(Condition::fuzzy(column, text));
        self
    }

    pub fn condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn paginate(mut self, pageable: Pageable) -> Self {
        self.window = pageable.window();
        self
    }

    /// `SELECT [FIRST n SKIP m] cols FROM table [WHERE ...] [LIMIT n OFFSET m]`.
    pub fn build_select(&self) -> Statement {
        let columns = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns.join(", ")
        };
        let mut sql = match (self.dialect, self.window) {
            (Dialect::Firebird, Some(w)) => format!(
                "SELECT FIRST {} SKIP {} {columns} FROM {}",
                w.limit, w.offset, self.table
            ),
            _ => format!("SELECT {columns} FROM {}", self.table),
        };
        let mut params = Vec::new();
        let mut placeholder_idx = 1usize;
        self.append_where(&mut sql, &mut params, &mut placeholder_idx);
        if self.dialect != Dialect::Firebird {
            if let Some(w) = self.window {
                sql.push_str(&format!(" LIMIT {} OFFSET {}", w.limit, w.offset));
            }
        }
        Statement { sql, params }
    }

    /// Build a COUNT query over the same filters, ignoring pagination.
    pub fn build_count(&self) -> Statement {
        let mut sql = format!("SELECT COUNT(*) AS TOTAL FROM {}", self.table);
        let mut params = Vec::new();
        let mut placeholder_idx = 1usize;
        self.append_where(&mut sql, &mut params, &mut placeholder_idx);
        Statement { sql, params }
    }

    /// INSERT naming only the non-null values, in the given order.
    pub fn build_insert(&self, values: &[(&str, Value)]) -> Statement {
        let present: Vec<_> = values.iter().filter(|(_, v)| !v.is_null()).collect();
        if present.is_empty() {
            return Statement {
                sql: format!("INSERT INTO {} DEFAULT VALUES", self.table),
                params: Vec::new(),
            };
        }
        let columns: Vec<_> = present.iter().map(|(c, _)| *c).collect();
        let placeholders: Vec<_> = (1..=present.len())
            .map(|idx| self.dialect.placeholder(idx))
            .collect();
        Statement {
            sql: format!(
                "INSERT INTO {} ({}) VALUES ({})",
                self.table,
                columns.join(", "),
                placeholders.join(", ")
            ),
            params: present.into_iter().map(|(_, v)| v.clone()).collect(),
        }
    }

    /// UPDATE setting `set`, restricted by the builder's conditions.
    ///
    /// Parameters are SET values first, then WHERE values. An update with
    /// nothing to set or no restricting condition is refused.
    pub fn build_update(&self, set: &[(&str, Value)]) -> Result<Statement, DataError> {
        if set.is_empty() {
            return Err(DataError::declaration(format!(
                "no updatable columns for table {}",
                self.table
            )));
        }
        if self.conditions.is_empty() {
            return Err(DataError::declaration(format!(
                "refusing unkeyed update of table {}",
                self.table
            )));
        }
        let mut params = Vec::with_capacity(set.len() + self.conditions.len());
        let mut placeholder_idx = 1usize;
        let assignments: Vec<_> = set
            .iter()
            .map(|(col, val)| {
                let placeholder = self.dialect.placeholder(placeholder_idx);
                placeholder_idx += 1;
                params.push(val.clone());
                format!("{col} = {placeholder}")
            })
            .collect();
        let mut sql = format!("UPDATE {} SET {}", self.table, assignments.join(", "));
        self.append_where(&mut sql, &mut params, &mut placeholder_idx);
        Ok(Statement { sql, params })
    }

    fn append_where(&self, sql: &mut String, params: &mut Vec<Value>, placeholder_idx: &mut usize) {
        let clauses: Vec<_> = self
            .conditions
            .iter()
            .filter_map(|cond| cond.render(self.dialect, params, placeholder_idx))
            .collect();
        if clauses.is_empty() {
            return;
        }
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
}

/// Plain SELECT over an entity's declared columns, optionally paginated.
pub fn build_select<T: Entity>(dialect: Dialect, pageable: Pageable) -> String {
    QueryBuilder::for_entity::<T>()
        .dialect(dialect)
        .paginate(pageable)
        .build_select()
        .sql
}

/// Equality predicate with one bound parameter.
pub fn build_where_exact(column: &str, value: impl Into<Value>) -> (String, Vec<Value>) {
    render_single(&Condition::exact(column, value))
}

/// Word-by-word containment predicate. Produces no bound parameters.
pub fn build_where_fuzzy(column: &str, text: &str) -> (String, Vec<Value>) {
    render_single(&Condition::fuzzy(column, text))
}

fn render_single(condition: &Condition) -> (String, Vec<Value>) {
    let mut params = Vec::new();
    let fragment = condition
        .render(Dialect::Generic, &mut params, &mut 1)
        .unwrap_or_default();
    (fragment, params)
}

/// INSERT of the entity's non-null column values.
pub fn build_insert<T: Entity>(dialect: Dialect, entity: &T) -> Statement {
    QueryBuilder::new(T::table_name())
        .dialect(dialect)
        .build_insert(&entity.named_values())
}

/// UPDATE of every non-key column, keyed by the entity's current key values.
pub fn build_update<T: Entity>(dialect: Dialect, entity: &T) -> Result<Statement, DataError> {
    T::require_primary_key()?;
    let (keys, set): (Vec<_>, Vec<_>) = T::columns()
        .iter()
        .zip(entity.named_values())
        .partition(|(column, _)| column.primary_key);
    let set: Vec<_> = set.into_iter().map(|(_, pair)| pair).collect();
    let builder = keys
        .into_iter()
        .fold(QueryBuilder::new(T::table_name()).dialect(dialect), |b, (_, (col, val))| {
            b.where_exact(col, val)
        });
    builder.build_update(&set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::Column;
    use crate::value::Row;

    #[derive(Debug, Clone, PartialEq)]
    struct Note {
        id: i64,
        name: String,
        note: Option<String>,
    }

    impl Entity for Note {
        fn table_name() -> &'static str {
            "t"
        }

        fn columns() -> &'static [Column] {
            const COLUMNS: &[Column] = &[
                Column::new("id").primary_key(),
                Column::new("name"),
                Column::new("note"),
            ];
            COLUMNS
        }

        fn from_row(mut row: Row) -> Result<Self, DataError> {
            Ok(Self {
                id: row.take("id")?,
                name: row.take("name")?,
                note: row.take("note")?,
            })
        }

        fn values(&self) -> Vec<Value> {
            vec![
                self.id.into(),
                self.name.clone().into(),
                self.note.clone().into(),
            ]
        }

        fn assign(&mut self, column: &str, value: Value) -> Result<(), DataError> {
            match column {
                "id" => self.id = crate::value::FromValue::from_value(value, column)?,
                other => return Err(DataError::declaration(format!("cannot assign {other}"))),
            }
            Ok(())
        }
    }

    fn note() -> Note {
        Note {
            id: 5,
            name: "x".into(),
            note: None,
        }
    }

    #[test]
    fn test_simple_select() {
        let sql = build_select::<Note>(Dialect::Generic, Pageable::unpaged());
        assert_eq!(sql, "SELECT id, name, note FROM t");
    }

    #[test]
    fn test_select_page_two_skips_one_page() {
        let sql = build_select::<Note>(Dialect::Firebird, Pageable::new(2, 10));
        assert_eq!(sql, "SELECT FIRST 10 SKIP 10 id, name, note FROM t");

        let sql = build_select::<Note>(Dialect::Sqlite, Pageable::new(2, 10));
        assert_eq!(sql, "SELECT id, name, note FROM t LIMIT 10 OFFSET 10");
    }

    #[test]
    fn test_select_default_limit() {
        let sql = build_select::<Note>(Dialect::Firebird, Pageable::page(3));
        assert_eq!(sql, "SELECT FIRST 50 SKIP 100 id, name, note FROM t");
    }

    #[test]
    fn test_select_page_zero_or_missing_is_unpaginated() {
        for pageable in [Pageable::new(0, 10), Pageable::unpaged()] {
            for dialect in [Dialect::Firebird, Dialect::Sqlite] {
                let sql = build_select::<Note>(dialect, pageable);
                assert_eq!(sql, "SELECT id, name, note FROM t");
            }
        }
    }

    #[test]
    fn test_where_exact_binds_value() {
        let (fragment, params) = build_where_exact("name", "red car");
        assert_eq!(fragment, "name = ?");
        assert_eq!(params, vec![Value::Text("red car".into())]);
    }

    #[test]
    fn test_where_fuzzy_embeds_words_without_params() {
        // The search words are part of the SQL text, not bound parameters.
        let (fragment, params) = build_where_fuzzy("name", "red car");
        assert_eq!(fragment, "name LIKE '%red%' AND name LIKE '%car%'");
        assert!(params.is_empty());
    }

    #[test]
    fn test_where_fuzzy_quotes_cannot_escape_literal() {
        let (fragment, params) = build_where_fuzzy("name", "o'brien");
        assert_eq!(fragment, "name LIKE '%o''brien%'");
        assert!(params.is_empty());
    }

    #[test]
    fn test_fuzzy_firebird_uses_similar_to() {
        let stmt = QueryBuilder::new("PRODUTO")
            .dialect(Dialect::Firebird)
            .columns(&["CODPROD"])
            .where_fuzzy("NOMEPROD", "  red   car ")
            .build_select();
        assert_eq!(
            stmt.sql,
            "SELECT CODPROD FROM PRODUTO WHERE NOMEPROD SIMILAR TO '%red%' AND NOMEPROD SIMILAR TO '%car%'"
        );
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn test_fuzzy_sqlite_uses_case_sensitive_instr() {
        let stmt = QueryBuilder::new("PRODUTO")
            .dialect(Dialect::Sqlite)
            .where_fuzzy("NOMEPROD", "Red o'car")
            .build_select();
        assert_eq!(
            stmt.sql,
            "SELECT * FROM PRODUTO WHERE instr(NOMEPROD, 'Red') > 0 AND instr(NOMEPROD, 'o''car') > 0"
        );
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn test_empty_fuzzy_adds_no_predicate() {
        let stmt = QueryBuilder::new("t").where_fuzzy("name", "   ").build_select();
        assert_eq!(stmt.sql, "SELECT * FROM t");
    }

    #[test]
    fn test_insert_omits_null_columns() {
        let stmt = build_insert(Dialect::Generic, &note());
        assert_eq!(stmt.sql, "INSERT INTO t (id, name) VALUES (?, ?)");
        assert_eq!(stmt.params, vec![Value::Integer(5), Value::Text("x".into())]);
    }

    #[test]
    fn test_insert_all_null_uses_default_values() {
        let stmt = QueryBuilder::new("t").build_insert(&[("a", Value::Null)]);
        assert_eq!(stmt.sql, "INSERT INTO t DEFAULT VALUES");
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn test_update_excludes_key_from_set() {
        let stmt = build_update(Dialect::Generic, &note()).unwrap();
        assert_eq!(stmt.sql, "UPDATE t SET name = ?, note = ? WHERE id = ?");
        assert_eq!(
            stmt.params,
            vec![Value::Text("x".into()), Value::Null, Value::Integer(5)]
        );
    }

    #[test]
    fn test_update_postgres_numbering_continues_into_where() {
        let stmt = build_update(Dialect::Postgres, &note()).unwrap();
        assert_eq!(stmt.sql, "UPDATE t SET name = $1, note = $2 WHERE id = $3");
    }

    #[test]
    fn test_update_refuses_unkeyed() {
        let err = QueryBuilder::new("t")
            .build_update(&[("a", Value::Integer(1))])
            .unwrap_err();
        assert!(matches!(err, DataError::Declaration(_)));
    }

    #[test]
    fn test_postgres_placeholders_in_filters() {
        let stmt = QueryBuilder::new("users")
            .dialect(Dialect::Postgres)
            .where_exact("status", "active")
            .where_fuzzy("name", "al")
            .where_exact("role", "admin")
            .build_select();
        assert_eq!(
            stmt.sql,
            "SELECT * FROM users WHERE status = $1 AND name LIKE '%al%' AND role = $2"
        );
        assert_eq!(stmt.params.len(), 2);
    }

    #[test]
    fn test_count_query_ignores_pagination() {
        let stmt = QueryBuilder::new("users")
            .where_exact("active", true)
            .paginate(Pageable::new(3, 10))
            .build_count();
        assert_eq!(stmt.sql, "SELECT COUNT(*) AS TOTAL FROM users WHERE active = ?");
        assert_eq!(stmt.params, vec![Value::Bool(true)]);
    }

    #[test]
    fn test_next_value_sql() {
        assert_eq!(
            Dialect::Firebird.next_value_sql("GEN_X").unwrap(),
            "SELECT NEXT VALUE FOR GEN_X AS NEXT_VALUE FROM RDB$DATABASE"
        );
        assert!(matches!(
            Dialect::Sqlite.next_value_sql("GEN_X"),
            Err(DataError::Unsupported(_))
        ));
    }

    #[test]
    fn test_dialect_from_str() {
        assert_eq!("Firebird".parse::<Dialect>().unwrap(), Dialect::Firebird);
        assert_eq!("postgresql".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert!("oracle".parse::<Dialect>().is_err());
    }
}
