#![allow(dead_code)]

use rowmap_data::prelude::*;
use rowmap_data::{Dialect, KeyStrategy};
use std::collections::VecDeque;

/// One call observed by [`ScriptedConnection`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Query(String, Vec<Value>),
    Execute(String, Vec<Value>),
    Commit,
}

/// Connection fake: records every call and answers queries from a script.
pub struct ScriptedConnection {
    dialect: Dialect,
    pub calls: Vec<Call>,
    results: VecDeque<Vec<Row>>,
    affected: VecDeque<u64>,
}

impl ScriptedConnection {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            calls: Vec::new(),
            results: VecDeque::new(),
            affected: VecDeque::new(),
        }
    }

    /// Rows returned by the next query (queries past the script get no rows).
    pub fn then_rows(mut self, rows: Vec<Row>) -> Self {
        self.results.push_back(rows);
        self
    }

    /// Affected-row count of the next execute (default 1).
    pub fn then_affected(mut self, n: u64) -> Self {
        self.affected.push_back(n);
        self
    }

    pub fn statements(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Query(sql, _) | Call::Execute(sql, _) => Some(sql.as_str()),
                Call::Commit => None,
            })
            .collect()
    }
}

impl Connection for ScriptedConnection {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn query(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Row>, DataError> {
        self.calls.push(Call::Query(sql.to_string(), params.to_vec()));
        Ok(self.results.pop_front().unwrap_or_default())
    }

    async fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64, DataError> {
        self.calls.push(Call::Execute(sql.to_string(), params.to_vec()));
        Ok(self.affected.pop_front().unwrap_or(1))
    }

    async fn commit(&mut self) -> Result<(), DataError> {
        self.calls.push(Call::Commit);
        Ok(())
    }
}

pub fn row(pairs: &[(&str, Value)]) -> Row {
    pairs.iter().cloned().collect()
}

/// Product keyed by a 6-digit counter code.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub code: Option<String>,
    pub name: String,
    pub note: Option<String>,
    pub inserts: u32,
}

impl Product {
    pub fn named(name: &str) -> Self {
        Self {
            code: None,
            name: name.to_string(),
            note: None,
            inserts: 0,
        }
    }
}

impl Entity for Product {
    fn table_name() -> &'static str {
        "PRODUTO"
    }

    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[
            Column::new("CODPROD").primary_key().counter(6),
            Column::new("NOMEPROD"),
            Column::new("NOTE"),
        ];
        COLUMNS
    }

    fn from_row(mut row: Row) -> Result<Self, DataError> {
        Ok(Self {
            code: row.take("CODPROD")?,
            name: row.take("NOMEPROD")?,
            note: row.take("NOTE")?,
            inserts: 0,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.code.clone().into(),
            self.name.clone().into(),
            self.note.clone().into(),
        ]
    }

    fn assign(&mut self, column: &str, value: Value) -> Result<(), DataError> {
        match column {
            "CODPROD" => self.code = FromValue::from_value(value, column)?,
            other => return Err(DataError::declaration(format!("cannot assign {other}"))),
        }
        Ok(())
    }

    fn before_insert(&mut self) -> Result<(), DataError> {
        self.inserts += 1;
        Ok(())
    }
}

/// Price row keyed by a database sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Price {
    pub id: Option<i64>,
    pub product: String,
    pub price: f64,
}

impl Entity for Price {
    fn table_name() -> &'static str {
        "PRODUTOPRECO"
    }

    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[
            Column::new("CODPRODUTOPRECO").primary_key().sequence("GEN_PRODUTOPRECO"),
            Column::new("CODPROD"),
            Column::new("PRECO"),
        ];
        COLUMNS
    }

    fn from_row(mut row: Row) -> Result<Self, DataError> {
        Ok(Self {
            id: row.take("CODPRODUTOPRECO")?,
            product: row.take("CODPROD")?,
            price: row.take("PRECO")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![self.id.into(), self.product.clone().into(), self.price.into()]
    }

    fn assign(&mut self, column: &str, value: Value) -> Result<(), DataError> {
        match column {
            "CODPRODUTOPRECO" => self.id = FromValue::from_value(value, column)?,
            other => return Err(DataError::declaration(format!("cannot assign {other}"))),
        }
        Ok(())
    }
}

/// Stock keyed by (product, company); touched on every update.
#[derive(Debug, Clone, PartialEq)]
pub struct Stock {
    pub product: String,
    pub company: i64,
    pub quantity: f64,
    pub revision: i64,
}

impl Entity for Stock {
    fn table_name() -> &'static str {
        "PRODUTOESTOQUE"
    }

    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[
            Column::new("CODPROD").primary_key(),
            Column::new("CODEMPRESA").primary_key(),
            Column::new("ESTATU"),
            Column::new("REVISION"),
        ];
        COLUMNS
    }

    fn from_row(mut row: Row) -> Result<Self, DataError> {
        Ok(Self {
            product: row.take("CODPROD")?,
            company: row.take("CODEMPRESA")?,
            quantity: row.take("ESTATU")?,
            revision: row.take("REVISION")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.product.clone().into(),
            self.company.into(),
            self.quantity.into(),
            self.revision.into(),
        ]
    }

    fn assign(&mut self, column: &str, _value: Value) -> Result<(), DataError> {
        Err(DataError::declaration(format!("cannot assign {column}")))
    }

    fn before_update(&mut self) -> Result<(), DataError> {
        self.revision += 1;
        Ok(())
    }
}

/// A table declared without any key column.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditLine {
    pub message: String,
}

impl Entity for AuditLine {
    fn table_name() -> &'static str {
        "AUDIT"
    }

    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[Column::new("MESSAGE")];
        COLUMNS
    }

    fn from_row(mut row: Row) -> Result<Self, DataError> {
        Ok(Self {
            message: row.take("MESSAGE")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![self.message.clone().into()]
    }

    fn assign(&mut self, column: &str, _value: Value) -> Result<(), DataError> {
        Err(DataError::declaration(format!("cannot assign {column}")))
    }
}

pub fn strategy_of<T: Entity>(column: &str) -> Option<KeyStrategy> {
    T::columns()
        .iter()
        .find(|c| c.name == column)
        .map(|c| c.strategy)
}
