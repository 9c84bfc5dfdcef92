//! In-memory table model used by labeling sessions.
//!
//! Rows are addressed by their 0-based position, which stays stable for the
//! lifetime of a session. Cells are nullable; a row that never mentioned a
//! column reads as [`Value::Null`].

pub mod io;

use std::fmt;

/// Positional identity of a row within a [`Table`].
pub type RowId = usize;

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer value.
    Integer(i64),
    /// Floating point value.
    Float(f64),
    /// Text value.
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view used for cross-type comparisons (`1` vs `1.0`).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
        }
    }
}

/// Ordered collection of rows sharing one set of named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table with the given column order.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::default();
        for column in columns {
            let column: String = column.into();
            table.ensure_column(&column);
        }
        table
    }

    /// Column names in table order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|name| name == column)
    }

    /// Add a column if missing, returning its index. Existing rows read it as null.
    pub fn ensure_column(&mut self, column: &str) -> usize {
        if let Some(idx) = self.column_index(column) {
            return idx;
        }
        self.columns.push(column.to_string());
        for row in &mut self.rows {
            row.push(Value::Null);
        }
        self.columns.len() - 1
    }

    /// Append a row from `(column, value)` pairs. Unknown columns are added.
    pub fn push_row<I, S>(&mut self, cells: I) -> RowId
    where
        I: IntoIterator<Item = (S, Value)>,
        S: AsRef<str>,
    {
        let mut row = vec![Value::Null; self.columns.len()];
        for (column, value) in cells {
            let idx = self.ensure_column(column.as_ref());
            if idx >= row.len() {
                row.resize(idx + 1, Value::Null);
            }
            row[idx] = value;
        }
        self.rows.push(row);
        self.rows.len() - 1
    }

    /// Borrow a cell. Returns `None` when the row or column does not exist.
    pub fn get(&self, row: RowId, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|cells| cells.get(idx))
    }

    /// Overwrite a cell. Returns the previous value, or `None` if out of range.
    pub fn set(&mut self, row: RowId, column: &str, value: Value) -> Option<Value> {
        let idx = self.column_index(column)?;
        let cell = self.rows.get_mut(row)?.get_mut(idx)?;
        Some(std::mem::replace(cell, value))
    }

    /// Iterate `(column, value)` pairs of a row in column order.
    pub fn row(&self, row: RowId) -> Option<impl Iterator<Item = (&str, &Value)>> {
        let cells = self.rows.get(row)?;
        Some(
            self.columns
                .iter()
                .map(String::as_str)
                .zip(cells.iter()),
        )
    }

    /// Row identities whose `column` value is null, in row order.
    ///
    /// Every row is reported when the column does not exist.
    pub fn null_rows(&self, column: &str) -> Vec<RowId> {
        let Some(idx) = self.column_index(column) else {
            return (0..self.rows.len()).collect();
        };
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, cells)| cells.get(idx).is_none_or(Value::is_null))
            .map(|(row, _)| row)
            .collect()
    }
}
