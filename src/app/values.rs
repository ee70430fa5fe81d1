// src/app/values.rs
use rusqlite::types::Value;

use crate::app::error::{AppError, Result};

/// Column/value pairs for one insert or update, in insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContentValues {
    entries: Vec<(String, Value)>,
}

impl ContentValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `column`, replacing an earlier value for the same column.
    pub fn put(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        let value = value.into();
        match self.entries.iter_mut().find(|(c, _)| c == column) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((column.to_string(), value)),
        }
        self
    }

    pub fn with(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.put(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(c, v)| (c.as_str(), v))
    }
}

/// Extra WHERE clause with positional `?` arguments.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
    pub clause: String,
    pub args: Vec<Value>,
}

impl Selection {
    pub fn new(clause: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            clause: clause.into(),
            args,
        }
    }
}

/// Materialised query result. Column order follows the projection.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RowSet {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl RowSet {
    pub(crate) fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first(&self) -> Option<RowView<'_>> {
        self.iter().next()
    }

    pub fn iter(&self) -> impl Iterator<Item = RowView<'_>> {
        self.rows.iter().map(|values| RowView {
            columns: &self.columns,
            values,
        })
    }
}

#[derive(Clone, Copy, Debug)]
pub struct RowView<'a> {
    columns: &'a [String],
    values: &'a [Value],
}

impl<'a> RowView<'a> {
    pub fn value(&self, column: &str) -> Result<&'a Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
            .ok_or_else(|| AppError::CorruptRow(format!("column `{column}` not in projection")))
    }

    pub fn get_i64(&self, column: &str) -> Result<i64> {
        match self.value(column)? {
            Value::Integer(n) => Ok(*n),
            other => Err(type_mismatch(column, "integer", other)),
        }
    }

    pub fn get_f64(&self, column: &str) -> Result<f64> {
        match self.value(column)? {
            Value::Real(f) => Ok(*f),
            Value::Integer(n) => Ok(*n as f64),
            other => Err(type_mismatch(column, "real", other)),
        }
    }

    pub fn get_bool(&self, column: &str) -> Result<bool> {
        Ok(self.get_i64(column)? != 0)
    }

    pub fn get_str(&self, column: &str) -> Result<&'a str> {
        match self.value(column)? {
            Value::Text(s) => Ok(s.as_str()),
            other => Err(type_mismatch(column, "text", other)),
        }
    }

    pub fn get_string(&self, column: &str) -> Result<String> {
        self.get_str(column).map(str::to_string)
    }

    /// Blob columns; NULL maps to `None`.
    pub fn get_blob(&self, column: &str) -> Result<Option<Vec<u8>>> {
        match self.value(column)? {
            Value::Blob(b) => Ok(Some(b.clone())),
            Value::Null => Ok(None),
            other => Err(type_mismatch(column, "blob", other)),
        }
    }
}

fn type_mismatch(column: &str, wanted: &str, got: &Value) -> AppError {
    AppError::CorruptRow(format!(
        "column `{column}`: expected {wanted}, found {:?}",
        got.data_type()
    ))
}
