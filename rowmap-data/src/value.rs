use crate::error::DataError;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// A single SQL value as read from, or about to be written to, the database.
///
/// No coercion happens beyond what the driver performs: whatever storage class
/// the backend reports is what ends up here.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    Bool(bool),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Short type label used in decode errors and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Integer(_) => "INTEGER",
            Value::Real(_) => "REAL",
            Value::Text(_) => "TEXT",
            Value::Blob(_) => "BLOB",
            Value::Bool(_) => "BOOLEAN",
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Real(r) => write!(f, "{r}"),
            Value::Text(s) => f.write_str(s),
            Value::Blob(b) => write!(f, "<{} bytes>", b.len()),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Real(r) => serializer.serialize_f64(*r),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Blob(b) => b.serialize(serializer),
            Value::Bool(b) => serializer.serialize_bool(*b),
        }
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Integer(i64::from(v))
                }
            }
        )+
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Conversion from a [`Value`] into a concrete Rust type.
///
/// `column` is only used to build the error message.
pub trait FromValue: Sized {
    fn from_value(value: Value, column: &str) -> Result<Self, DataError>;
}

impl FromValue for Value {
    fn from_value(value: Value, _column: &str) -> Result<Self, DataError> {
        Ok(value)
    }
}

impl FromValue for i64 {
    fn from_value(value: Value, column: &str) -> Result<Self, DataError> {
        match value {
            Value::Integer(i) => Ok(i),
            Value::Bool(b) => Ok(i64::from(b)),
            // counter tables keep codes as digit strings
            Value::Text(s) => s.trim().parse().map_err(|_| DataError::decode(column, "i64")),
            _ => Err(DataError::decode(column, "i64")),
        }
    }
}

macro_rules! impl_from_value_int {
    ($($ty:ty),+) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value, column: &str) -> Result<Self, DataError> {
                    let i = i64::from_value(value, column)?;
                    <$ty>::try_from(i).map_err(|_| DataError::decode(column, stringify!($ty)))
                }
            }
        )+
    };
}

impl_from_value_int!(i32, u32, u64);

impl FromValue for f64 {
    fn from_value(value: Value, column: &str) -> Result<Self, DataError> {
        match value {
            Value::Real(r) => Ok(r),
            Value::Integer(i) => Ok(i as f64),
            _ => Err(DataError::decode(column, "f64")),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value, column: &str) -> Result<Self, DataError> {
        match value {
            Value::Text(s) => Ok(s),
            Value::Integer(i) => Ok(i.to_string()),
            Value::Real(r) => Ok(r.to_string()),
            _ => Err(DataError::decode(column, "String")),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: Value, column: &str) -> Result<Self, DataError> {
        match value {
            Value::Bool(b) => Ok(b),
            Value::Integer(0) => Ok(false),
            Value::Integer(1) => Ok(true),
            _ => Err(DataError::decode(column, "bool")),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value, column: &str) -> Result<Self, DataError> {
        match value {
            Value::Blob(b) => Ok(b),
            _ => Err(DataError::decode(column, "Vec<u8>")),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value, column: &str) -> Result<Self, DataError> {
        match value {
            Value::Null => Ok(None),
            v => T::from_value(v, column).map(Some),
        }
    }
}

/// One result row: column names (from the statement's result descriptor) paired
/// with their values, in select-list order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    entries: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, column: impl Into<String>, value: Value) {
        self.entries.push((column.into(), value));
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(name, _)| name == column)
            .or_else(|| {
                self.entries
                    .iter()
                    .position(|(name, _)| name.eq_ignore_ascii_case(column))
            })
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.position(column).map(|idx| &self.entries[idx].1)
    }

    /// Remove `column` from the row and decode it.
    ///
    /// A column absent from the row decodes like `NULL`, so `Option<T>` fields
    /// tolerate narrower select lists.
    pub fn take<T: FromValue>(&mut self, column: &str) -> Result<T, DataError> {
        let value = match self.position(column) {
            Some(idx) => self.entries.remove(idx).1,
            None => Value::Null,
        };
        T::from_value(value, column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl IntoIterator for Row {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Column-oriented result set: each column name maps to the ordered values of
/// that column across all rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColumnarRows {
    names: Vec<String>,
    columns: Vec<Vec<Value>>,
}

impl ColumnarRows {
    /// Pivot row-shaped results. Column order follows first appearance.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut out = Self::default();
        for row in rows {
            for (name, value) in row {
                match out.names.iter().position(|n| *n == name) {
                    Some(idx) => out.columns[idx].push(value),
                    None => {
                        out.names.push(name);
                        out.columns.push(vec![value]);
                    }
                }
            }
        }
        out
    }

    pub fn get(&self, column: &str) -> Option<&[Value]> {
        self.names
            .iter()
            .position(|n| n == column)
            .map(|idx| self.columns[idx].as_slice())
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
