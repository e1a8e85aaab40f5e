//! # Labelled tabular dataset
//!
//! [`Table`] is the in-memory dataset the enrichment pipeline works on: an
//! integer index (one label per row) and an ordered list of named columns of
//! [`Value`] cells.
//!
//! ```text
//! Table
//! ├── index   [4, 21, 30, ...]          (row labels, i64)
//! └── columns
//!     ├── star_name [Text, Text, ...]
//!     └── st_teff   [Float, Missing, ...]
//! ```
//!
//! Rows are addressed either by position (`0..len()`) or by label through
//! [`Table::position_of`]. Column order is the insertion order.
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::phab_errors::PhabError;

use super::value::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    index: Vec<i64>,
    columns: Vec<Column>,
}

impl Table {
    /// An empty table with the given columns and no rows.
    pub fn new<S: AsRef<str>>(column_names: &[S]) -> Self {
        Table {
            index: Vec::new(),
            columns: column_names
                .iter()
                .map(|name| Column {
                    name: name.as_ref().to_string(),
                    values: Vec::new(),
                })
                .collect(),
        }
    }

    /// Build a table from row-major data.
    ///
    /// Arguments
    /// ---------
    /// * `index`: one label per row
    /// * `column_names`: the column names, in order
    /// * `rows`: the rows, each with exactly one value per column
    ///
    /// Return
    /// ------
    /// * the table, or [`PhabError::InvalidShape`] if the lengths disagree
    pub fn from_rows<S: AsRef<str>>(
        index: Vec<i64>,
        column_names: &[S],
        rows: Vec<Vec<Value>>,
    ) -> Result<Self, PhabError> {
        if index.len() != rows.len() {
            return Err(PhabError::InvalidShape(format!(
                "{} index labels for {} rows",
                index.len(),
                rows.len()
            )));
        }

        let mut table = Table::new(column_names);
        for (label, row) in index.into_iter().zip(rows) {
            table.push_row(label, row)?;
        }
        Ok(table)
    }

    /// Same as [`Table::from_rows`] with a `0..n` index.
    pub fn from_rows_default_index<S: AsRef<str>>(
        column_names: &[S],
        rows: Vec<Vec<Value>>,
    ) -> Result<Self, PhabError> {
        let index = (0..rows.len() as i64).collect();
        Table::from_rows(index, column_names, rows)
    }

    pub fn push_row(&mut self, label: i64, row: Vec<Value>) -> Result<(), PhabError> {
        if row.len() != self.columns.len() {
            return Err(PhabError::InvalidShape(format!(
                "row [{label}] has {} values for {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.index.push(label);
        for (column, value) in self.columns.iter_mut().zip(row) {
            column.values.push(value);
        }
        Ok(())
    }

    /// Check that every column holds one value per index label.
    ///
    /// Tables built through [`Table::from_rows`] and [`Table::push_row`]
    /// always pass; a table read from an arbitrary file may not.
    pub fn check_shape(&self) -> Result<(), PhabError> {
        match self.columns.iter().find(|c| c.values.len() != self.index.len()) {
            Some(ragged) => Err(PhabError::InvalidShape(format!(
                "column [{}] has {} values for {} index labels",
                ragged.name,
                ragged.values.len(),
                self.index.len()
            ))),
            None => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn index(&self) -> &[i64] {
        &self.index
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// The values of a column, or [`PhabError::MissingColumn`].
    pub fn try_column(&self, name: &str) -> Result<&[Value], PhabError> {
        self.column(name)
            .ok_or_else(|| PhabError::MissingColumn(name.to_string()))
    }

    pub fn position_of(&self, label: i64) -> Option<usize> {
        self.index.iter().position(|l| *l == label)
    }

    pub fn get(&self, position: usize, column: &str) -> Option<&Value> {
        self.column(column).and_then(|values| values.get(position))
    }

    /// Overwrite one cell, addressed by row position and column name.
    pub fn set(&mut self, position: usize, column: &str, value: Value) -> Result<(), PhabError> {
        let len = self.len();
        let values = &mut self
            .columns
            .iter_mut()
            .find(|c| c.name == column)
            .ok_or_else(|| PhabError::MissingColumn(column.to_string()))?
            .values;
        let cell = values.get_mut(position).ok_or_else(|| {
            PhabError::InvalidShape(format!("row position {position} out of {len} rows"))
        })?;
        *cell = value;
        Ok(())
    }

    /// Add a column filled with `fill`. An existing column of the same name
    /// is reset to `fill` instead.
    pub fn add_column(&mut self, name: &str, fill: Value) {
        let values = vec![fill; self.len()];
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(column) => column.values = values,
            None => self.columns.push(Column {
                name: name.to_string(),
                values,
            }),
        }
    }

    /// Cloned cells of the row at `position`, in column order.
    pub fn row(&self, position: usize) -> Vec<Value> {
        self.columns
            .iter()
            .map(|c| c.values[position].clone())
            .collect()
    }

    /// Whether two rows hold the same cells (`NaN` equals `NaN`).
    pub fn rows_equal(&self, a: usize, b: usize) -> bool {
        self.columns.iter().all(|c| c.values[a] == c.values[b])
    }

    /// A new table made of the rows at the given positions, in that order.
    pub fn select_rows(&self, positions: &[usize]) -> Table {
        Table {
            index: positions.iter().map(|p| self.index[*p]).collect(),
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    values: positions.iter().map(|p| c.values[*p].clone()).collect(),
                })
                .collect(),
        }
    }

    /// Distinct values of a column, in order of first appearance.
    pub fn unique_values(&self, column: &str) -> Result<Vec<Value>, PhabError> {
        let values = self.try_column(column)?;
        let mut uniques: Vec<Value> = Vec::new();
        for value in values {
            if !uniques.contains(value) {
                uniques.push(value.clone());
            }
        }
        Ok(uniques)
    }

    /// Positions of the rows whose `column` cell equals `value`.
    pub fn positions_where(&self, column: &str, value: &Value) -> Result<Vec<usize>, PhabError> {
        Ok(self
            .try_column(column)?
            .iter()
            .positions(|v| v == value)
            .collect())
    }

    /// Reorder the rows by ascending index label (stable).
    pub fn sort_index(&mut self) {
        let order: Vec<usize> = (0..self.len()).sorted_by_key(|p| self.index[*p]).collect();
        *self = self.select_rows(&order);
    }
}
