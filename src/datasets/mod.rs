//! # Dataset utilities
//!
//! Operations over [`Table`] used before and after the enrichment runs:
//!
//! * [`merge_tables`] – concatenate several tables, refusing overlapping index labels,
//! * [`deduplicate_table`] – keep the unique rows or only the duplicates,
//! * [`drop_meaningless_rows`] – thin out runs of rows identical to the baseline row.
//!
//! File persistence lives in [`table_file`].
pub mod table;
pub mod table_file;
pub mod value;

use itertools::Itertools;
use tracing::debug;

use crate::phab_errors::PhabError;

pub use table::Table;
pub use value::Value;

/// Merge (concatenate) several tables into one.
///
/// Columns are the union of all input columns in order of first appearance;
/// cells absent from a frame are [`Value::Missing`]. The result is sorted by
/// index.
///
/// Arguments
/// ---------
/// * `frames`: the tables to merge
///
/// Return
/// ------
/// * the merged table
/// * [`PhabError::DuplicateIndex`] if any index label appears more than once
///   across (or within) the inputs
pub fn merge_tables(frames: &[Table]) -> Result<Table, PhabError> {
    let duplicates: Vec<i64> = frames
        .iter()
        .flat_map(|frame| frame.index().iter().copied())
        .duplicates()
        .sorted()
        .collect();
    if !duplicates.is_empty() {
        return Err(PhabError::DuplicateIndex(duplicates));
    }

    let column_names: Vec<String> = frames
        .iter()
        .flat_map(|frame| frame.column_names())
        .unique()
        .map(str::to_string)
        .collect();

    let mut merged = Table::new(&column_names);
    for frame in frames {
        for (position, label) in frame.index().iter().enumerate() {
            let row = column_names
                .iter()
                .map(|name| frame.get(position, name).cloned().unwrap_or(Value::Missing))
                .collect();
            merged.push_row(*label, row)?;
        }
    }
    merged.sort_index();

    debug!("Total records in the resulting table: {}", merged.len());
    Ok(merged)
}

/// Find duplicate rows in the table.
///
/// The first occurrence of a row is always considered unique, even if it has
/// duplicates further down.
///
/// Arguments
/// ---------
/// * `table`: the table to inspect
/// * `return_uniques`: `true` returns the table without duplicates,
///   `false` returns only the duplicate rows
///
/// Return
/// ------
/// * a new table, original index labels preserved
pub fn deduplicate_table(table: &Table, return_uniques: bool) -> Table {
    let duplicated: Vec<bool> = (0..table.len())
        .map(|i| (0..i).any(|j| table.rows_equal(i, j)))
        .collect();
    let duplicate_count = duplicated.iter().filter(|d| **d).count();

    debug!("Unique rows count: {}", table.len() - duplicate_count);
    debug!("Duplicate rows count: {}", duplicate_count);

    let positions: Vec<usize> = duplicated
        .iter()
        .positions(|is_duplicate| *is_duplicate != return_uniques)
        .collect();
    table.select_rows(&positions)
}

/// Drop meaningless rows from a table.
///
/// The first row is the baseline and is always kept. A row is meaningless
/// when it equals the baseline and so do both of its neighbours (only the
/// previous one for the last row), so the rows right before and right after
/// a change are kept as the boundaries of that change.
///
/// Arguments
/// ---------
/// * `table`: the table to thin out
/// * `indicator_column`: compare only this column instead of entire rows.
///   Cells are compared as plain scalars there (see [`Value::scalar_eq`]), so
///   a missing or `NaN` baseline matches no row, while entire rows treat two
///   `NaN` as equal.
///
/// Return
/// ------
/// * the table without meaningless rows
/// * [`PhabError::MissingColumn`] for an unknown indicator column
pub fn drop_meaningless_rows(
    table: &Table,
    indicator_column: Option<&str>,
) -> Result<Table, PhabError> {
    let is_baseline: Vec<bool> = match indicator_column {
        Some(column) => {
            let values = table.try_column(column)?;
            values
                .iter()
                .map(|v| values.first().is_some_and(|baseline| v.scalar_eq(baseline)))
                .collect()
        }
        None => (0..table.len()).map(|i| table.rows_equal(i, 0)).collect(),
    };

    let last = table.len().saturating_sub(1);
    let rows_to_delete: Vec<usize> = (1..table.len())
        .filter(|&i| is_baseline[i] && is_baseline[i - 1] && (i == last || is_baseline[i + 1]))
        .collect();

    debug!(
        "Indexes of the rows to drop: {:?}",
        rows_to_delete.iter().map(|p| table.index()[*p]).collect_vec()
    );

    let kept: Vec<usize> = (0..table.len())
        .filter(|i| !rows_to_delete.contains(i))
        .collect();
    Ok(table.select_rows(&kept))
}

#[cfg(test)]
mod datasets_test {
    use super::*;

    fn ints(rows: &[&[i64]]) -> Vec<Vec<Value>> {
        rows.iter()
            .map(|row| row.iter().map(|v| Value::Int(*v)).collect())
            .collect()
    }

    #[test]
    fn test_deduplicate_table() {
        let table = Table::from_rows(
            vec![1, 2, 3, 4, 5, 6, 7],
            &["a", "b", "c"],
            ints(&[
                &[1, 2, 3],
                &[4, 5, 6],
                &[1, 2, 3],
                &[7, 8, 9],
                &[4, 5, 6],
                &[3, 1, 2],
                &[4, 5, 6],
            ]),
        )
        .unwrap();

        let uniques = deduplicate_table(&table, true);
        assert_eq!(uniques.len(), 4);
        assert_eq!(uniques.index(), &[1, 2, 4, 6]);

        let duplicates = deduplicate_table(&table, false);
        assert_eq!(duplicates.len(), 3);
        assert_eq!(duplicates.index(), &[3, 5, 7]);
        assert_eq!(duplicates.row(2), vec![Value::Int(4), Value::Int(5), Value::Int(6)]);
    }

    #[test]
    fn test_merge_tables() {
        let first = Table::from_rows(vec![3, 1], &["a"], ints(&[&[30], &[10]])).unwrap();
        let second = Table::from_rows(vec![2], &["a", "b"], ints(&[&[20, 200]])).unwrap();

        let merged = merge_tables(&[first, second]).unwrap();
        assert_eq!(merged.index(), &[1, 2, 3]);
        assert_eq!(merged.column_names(), vec!["a", "b"]);
        assert_eq!(merged.get(1, "b"), Some(&Value::Int(200)));
        assert_eq!(merged.get(0, "b"), Some(&Value::Missing));
    }

    #[test]
    fn test_merge_tables_overlapping_index() {
        let first = Table::from_rows(vec![1, 2], &["a"], ints(&[&[1], &[2]])).unwrap();
        let second = Table::from_rows(vec![2, 3], &["a"], ints(&[&[2], &[3]])).unwrap();
        assert_eq!(
            merge_tables(&[first, second]),
            Err(PhabError::DuplicateIndex(vec![2]))
        );
    }

    fn timeline() -> Table {
        let columns = ["a", "b", "c", "d", "e"];
        let data: [[i64; 11]; 5] = [
            [0, 0, 23, 2, 0, 0, 0, 19, 1, 0, 0],
            [0, 0, 2, 3, 0, 0, 0, 4, 3, 0, 0],
            [0, 0, 65, 34, 0, 0, 0, 45, 2, 0, 0],
            [0, 0, 33, 7, 0, 0, 0, 64, 33, 0, 0],
            [0, 0, 0, 45, 0, 0, 0, 12, 11, 0, 0],
        ];
        let rows = (0..11)
            .map(|r| data.iter().map(|col| Value::Int(col[r])).collect())
            .collect();
        Table::from_rows(vec![4, 21, 30, 57, 59, 62, 71, 80, 81, 102, 126], &columns, rows)
            .unwrap()
    }

    #[test]
    fn test_drop_meaningless_rows() {
        let table = timeline();
        let thinned = drop_meaningless_rows(&table, None).unwrap();
        assert_eq!(thinned.index(), &[4, 21, 30, 57, 59, 71, 80, 81, 102]);

        let by_a = drop_meaningless_rows(&table, Some("a")).unwrap();
        assert_eq!(by_a.index(), thinned.index());
    }

    #[test]
    fn test_drop_meaningless_rows_by_indicator() {
        let table = timeline();
        let thinned = drop_meaningless_rows(&table, Some("e")).unwrap();
        assert_eq!(thinned.index(), &[4, 30, 57, 59, 71, 80, 81, 102]);

        assert_eq!(
            drop_meaningless_rows(&table, Some("z")),
            Err(PhabError::MissingColumn("z".into()))
        );
    }

    #[test]
    fn test_drop_meaningless_rows_nan_baseline() {
        let rows = (0..5)
            .map(|i| vec![Value::Float(f64::NAN), Value::Int(i)])
            .collect();
        let table = Table::from_rows(vec![1, 2, 3, 4, 5], &["flux", "n"], rows).unwrap();

        let by_flux = drop_meaningless_rows(&table, Some("flux")).unwrap();
        assert_eq!(by_flux.index(), &[1, 2, 3, 4, 5]);

        let quiet = (0..5).map(|_| vec![Value::Float(f64::NAN), Value::Int(0)]).collect();
        let table = Table::from_rows(vec![1, 2, 3, 4, 5], &["flux", "n"], quiet).unwrap();
        let by_rows = drop_meaningless_rows(&table, None).unwrap();
        assert_eq!(by_rows.index(), &[1]);
    }
}
