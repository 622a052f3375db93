// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Typed table rows and the `RowFetcher` contract used to read package tables.

use thiserror::Error;

/// Integer value the installer database uses to mark an integer column as empty.
pub const NULL_INTEGER: i32 = i32::MIN;

/// Errors raised while decoding a single row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("Missing value in mandatory column {table}.{column}")]
    NullValue { table: String, column: String },
    #[error("Column {table}.{column} is not an integer column")]
    NotAnInteger { table: String, column: String },
    #[error("Invalid integer {value:?} in column {table}.{column}")]
    InvalidInteger {
        table: String,
        column: String,
        value: String,
    },
    #[error("Invalid value {value} in column {table}.{column}")]
    InvalidValue {
        table: String,
        column: String,
        value: i32,
    },
    #[error("Row of table {table} has no column {index}")]
    ColumnOutOfRange { table: String, index: usize },
}

/// Errors raised by a `RowFetcher`. All of them are fatal for the analysis run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Table {table} has no column {column}")]
    UnknownColumn { table: String, column: String },
    #[error(transparent)]
    Row(#[from] RowError),
}

/// A single column value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Integer(i32),
    Null,
}

/// One table row, with values in the order of the requested projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    table: String,
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Create a row of `table` whose `values` correspond to `columns`.
    #[must_use]
    pub fn new(table: &str, columns: &[&str], values: Vec<Value>) -> Self {
        Self {
            table: table.to_string(),
            columns: columns.iter().map(ToString::to_string).collect(),
            values,
        }
    }

    fn value(&self, index: usize) -> Result<&Value, RowError> {
        self.values
            .get(index)
            .ok_or_else(|| RowError::ColumnOutOfRange {
                table: self.table.clone(),
                index,
            })
    }

    fn column(&self, index: usize) -> String {
        self.columns
            .get(index)
            .cloned()
            .unwrap_or_else(|| index.to_string())
    }

    /// Get a string column. Empty and null values both read as `""`; integers are rendered.
    ///
    /// # Errors
    /// Returns an error if the column index is out of range.
    pub fn text(&self, index: usize) -> Result<String, RowError> {
        Ok(match self.value(index)? {
            Value::Text(text) => text.clone(),
            Value::Integer(NULL_INTEGER) | Value::Null => String::new(),
            Value::Integer(value) => value.to_string(),
        })
    }

    /// Get a mandatory integer column.
    ///
    /// # Errors
    /// Returns `RowError::NullValue` if the column holds no value.
    pub fn integer(&self, index: usize) -> Result<i32, RowError> {
        self.optional_integer(index)?
            .ok_or_else(|| RowError::NullValue {
                table: self.table.clone(),
                column: self.column(index),
            })
    }

    /// Get a nullable integer column.
    ///
    /// # Errors
    /// Returns an error if the column is out of range or holds text.
    pub fn optional_integer(&self, index: usize) -> Result<Option<i32>, RowError> {
        match self.value(index)? {
            Value::Integer(NULL_INTEGER) | Value::Null => Ok(None),
            Value::Integer(value) => Ok(Some(*value)),
            Value::Text(_) => Err(RowError::NotAnInteger {
                table: self.table.clone(),
                column: self.column(index),
            }),
        }
    }

    /// Build an error for an integer that is outside the column's allowed values.
    #[must_use]
    pub fn invalid_value(&self, index: usize, value: i32) -> RowError {
        RowError::InvalidValue {
            table: self.table.clone(),
            column: self.column(index),
            value,
        }
    }
}

/// Source of package table rows.
///
/// Implementations must return the values of each row in the order of `columns`. `Ok(None)`
/// reports that the table does not exist in the package, which is not an error by itself.
pub trait RowFetcher {
    /// Fetch all rows of `table`, projected onto `columns`.
    ///
    /// # Errors
    /// Returns an error if a column does not exist or a value cannot be decoded.
    fn fetch(&self, table: &str, columns: &[&str]) -> Result<Option<Vec<Row>>, FetchError>;
}
