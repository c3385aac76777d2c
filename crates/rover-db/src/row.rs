//! Schemaless rows: a mapping from column name to [`Value`].

use crate::error::{Error, Result};
use crate::value::{Value, ValueType};
use bstr::{BStr, BString};
use std::collections::HashMap;

/// A single row of column values.
///
/// Column names are unique within a row; setting an existing column replaces
/// its value. Column order is not significant and iteration order is
/// unspecified. Rows read back from the log are independent copies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: HashMap<BString, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            columns: HashMap::with_capacity(capacity),
        }
    }

    /// Sets `column` to `value`, replacing any previous value.
    pub fn set(&mut self, column: impl Into<BString>, value: impl Into<Value>) -> &mut Self {
        self.columns.insert(column.into(), value.into());
        self
    }

    /// Builder form of [`Row::set`].
    pub fn with(mut self, column: impl Into<BString>, value: impl Into<Value>) -> Self {
        self.set(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(BStr::new(column))
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.contains_key(BStr::new(column))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterates over `(column, value)` pairs in unspecified order.
    pub fn columns(&self) -> impl Iterator<Item = (&BStr, &Value)> {
        self.columns.iter().map(|(k, v)| (BStr::new(k), v))
    }

    pub fn get_int(&self, column: &str) -> Result<i64> {
        self.typed(column, ValueType::Integer, Value::as_int)
    }

    pub fn get_float(&self, column: &str) -> Result<f64> {
        self.typed(column, ValueType::Float, Value::as_float)
    }

    pub fn get_string(&self, column: &str) -> Result<&BStr> {
        self.typed(column, ValueType::String, Value::as_string)
    }

    pub fn get_bool(&self, column: &str) -> Result<bool> {
        self.typed(column, ValueType::Boolean, Value::as_bool)
    }

    fn typed<'a, T>(
        &'a self,
        column: &str,
        expected: ValueType,
        extract: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Result<T> {
        let value = self
            .get(column)
            .ok_or_else(|| Error::MissingColumn(column.into()))?;
        extract(value).ok_or_else(|| Error::TypeMismatch {
            column: column.into(),
            expected,
            found: value.value_type(),
        })
    }

    pub(crate) fn insert_raw(&mut self, column: BString, value: Value) {
        self.columns.insert(column, value);
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<BString>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            row.set(column, value);
        }
        row
    }
}
