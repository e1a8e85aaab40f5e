//! Rows returned by a TAP service.
//!
//! [`QueryResult`] is the narrow, typed view of a TAP response used by the
//! rest of the crate: column names, row count, iteration and
//! get-by-column-name through [`Row`]. The cells are typed, and the raw
//! text of each cell is kept next to them for columns, such as identifiers,
//! whose numeric-looking values must not be re-typed.
use crate::datasets::Value;
use crate::phab_errors::PhabError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    text: Vec<Vec<String>>,
}

/// Borrowed view of one row of a [`QueryResult`].
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a [String],
    values: &'a [Value],
}

impl<'a> Row<'a> {
    /// The cell of the given column, `None` if the column does not exist.
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
    }

    pub fn values(&self) -> &'a [Value] {
        self.values
    }
}

impl QueryResult {
    pub fn new<S: AsRef<str>>(columns: &[S], rows: Vec<Vec<Value>>) -> Result<Self, PhabError> {
        let columns: Vec<String> = columns.iter().map(|c| c.as_ref().to_string()).collect();
        if let Some(bad) = rows.iter().find(|row| row.len() != columns.len()) {
            return Err(PhabError::InvalidShape(format!(
                "query row has {} values for {} columns",
                bad.len(),
                columns.len()
            )));
        }
        let text = rows
            .iter()
            .map(|row| row.iter().map(Value::to_string).collect())
            .collect();
        Ok(QueryResult {
            columns,
            rows,
            text,
        })
    }

    /// Parse the CSV body of a TAP synchronous query.
    ///
    /// The first line holds the column names; every cell is typed with
    /// [`Value::from_csv_cell`] and its text is kept as received.
    pub fn from_csv(body: &str) -> Result<Self, PhabError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(body.as_bytes());

        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let text = reader
            .records()
            .map(|record| record.map(|r| r.iter().map(str::to_string).collect()))
            .collect::<Result<Vec<Vec<String>>, csv::Error>>()?;
        let rows = text
            .iter()
            .map(|row| row.iter().map(|cell| Value::from_csv_cell(cell)).collect())
            .collect();

        Ok(QueryResult {
            columns,
            rows,
            text,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn row(&self, position: usize) -> Option<Row<'_>> {
        self.rows.get(position).map(|values| Row {
            columns: &self.columns,
            values,
        })
    }

    pub fn first(&self) -> Option<Row<'_>> {
        self.row(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(|values| Row {
            columns: &self.columns,
            values,
        })
    }

    /// All the cells of one column, `None` if the column does not exist.
    pub fn column(&self, column: &str) -> Option<Vec<&Value>> {
        let i = self.columns.iter().position(|c| c == column)?;
        Some(self.rows.iter().map(|row| &row[i]).collect())
    }

    /// The untyped text of one column, `None` if the column does not exist.
    ///
    /// `"0012"` stays `"0012"` here while [`QueryResult::column`] sees
    /// `Int(12)`.
    pub fn column_text(&self, column: &str) -> Option<Vec<&str>> {
        let i = self.columns.iter().position(|c| c == column)?;
        Some(self.text.iter().map(|row| row[i].as_str()).collect())
    }
}
