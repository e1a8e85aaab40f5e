//! Table files on disk.
//!
//! A table file (`*.tbl`) is a JSON document holding the index, the column
//! names and the tagged cells of a [`Table`]. Floats are stored through
//! their string form so `NaN` and infinities are preserved.
use std::fs;
use std::io::{BufReader, BufWriter};

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::files::{directory_exists, file_exists};
use crate::phab_errors::PhabError;

use super::{merge_tables, Table};

/// Extension of the table files looked up by [`merge_tables_from_directory`].
pub const TABLE_FILE_EXTENSION: &str = "tbl";

/// Read a table from a file, after checking that the path is an existing file.
///
/// Return
/// ------
/// * the table, or [`PhabError::InvalidShape`] if a column of the file does
///   not hold exactly one value per index label
pub fn open_table(path: &Utf8Path) -> Result<Table, PhabError> {
    let file_path =
        file_exists(path).ok_or_else(|| PhabError::InvalidPath(path.to_string()))?;
    let reader = BufReader::new(fs::File::open(file_path)?);
    let table: Table = serde_json::from_reader(reader)?;
    table.check_shape()?;
    Ok(table)
}

/// Save a table to a file. Never overwrites an existing file.
pub fn save_table(table: &Table, path: &Utf8Path) -> Result<(), PhabError> {
    if path.exists() {
        return Err(PhabError::FileAlreadyExists(path.to_string()));
    }
    let writer = BufWriter::new(fs::File::create(path)?);
    serde_json::to_writer(writer, table)?;
    Ok(())
}

/// Merge every table file found (recursively) under a directory.
///
/// Arguments
/// ---------
/// * `tables_dir`: the directory to search for `*.tbl` files
/// * `output`: where to save the merged table, if any
///
/// Return
/// ------
/// * `Ok(None)` when the result was saved to `output`
/// * `Ok(Some(table))` when no output path was given
/// * [`PhabError::InvalidPath`] if `tables_dir` is not a directory,
///   [`PhabError::NoFilesToMerge`] if it holds no table file, and
///   [`PhabError::DuplicateIndex`] if two tables share an index label
///
/// See also
/// ------------
/// * [`merge_tables`] – the in-memory concatenation with integrity check.
pub fn merge_tables_from_directory(
    tables_dir: &Utf8Path,
    output: Option<&Utf8Path>,
) -> Result<Option<Table>, PhabError> {
    let input_dir = directory_exists(tables_dir)
        .ok_or_else(|| PhabError::InvalidPath(tables_dir.to_string()))?;

    let mut files: Vec<Utf8PathBuf> = WalkDir::new(&input_dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| Utf8PathBuf::from_path_buf(entry.into_path()).ok())
        .filter(|path| path.extension() == Some(TABLE_FILE_EXTENSION))
        .collect();
    files.sort();

    debug!("Found files: {}", files.len());
    if files.is_empty() {
        return Err(PhabError::NoFilesToMerge(tables_dir.to_string()));
    }

    let mut frames = Vec::with_capacity(files.len());
    for path in &files {
        info!("Merging {path}...");
        let table = open_table(path)?;
        debug!("Records in this table: {}", table.len());
        frames.push(table);
    }

    let merged = merge_tables(&frames)?;
    match output {
        Some(output_path) => {
            save_table(&merged, output_path)?;
            Ok(None)
        }
        None => Ok(Some(merged)),
    }
}

#[cfg(test)]
mod table_file_test {
    use super::*;
    use crate::datasets::Value;

    fn utf8_dir(dir: &tempfile::TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    fn small_table(labels: Vec<i64>) -> Table {
        let rows = labels
            .iter()
            .map(|l| vec![Value::Int(*l), Value::Float(f64::INFINITY)])
            .collect();
        Table::from_rows(labels, &["a", "b"], rows).unwrap()
    }

    #[test]
    fn test_save_and_open_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = utf8_dir(&dir).join("stars.tbl");

        let table = small_table(vec![1, 2]);
        save_table(&table, &path).unwrap();
        assert_eq!(open_table(&path).unwrap(), table);

        assert_eq!(
            save_table(&table, &path),
            Err(PhabError::FileAlreadyExists(path.to_string()))
        );
    }

    #[test]
    fn test_open_ragged_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = utf8_dir(&dir).join("ragged.tbl");
        fs::write(
            &path,
            r#"{"index":[0,1],"columns":[{"name":"a","values":[{"type":"Int","value":1}]}]}"#,
        )
        .unwrap();

        assert_eq!(
            open_table(&path),
            Err(PhabError::InvalidShape(
                "column [a] has 1 values for 2 index labels".into()
            ))
        );
    }

    #[test]
    fn test_open_missing_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = utf8_dir(&dir).join("nothing.tbl");
        assert_eq!(open_table(&path), Err(PhabError::InvalidPath(path.to_string())));
    }

    #[test]
    fn test_merge_tables_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8_dir(&dir);
        fs::create_dir_all(root.join("nested")).unwrap();
        save_table(&small_table(vec![3, 4]), &root.join("first.tbl")).unwrap();
        save_table(&small_table(vec![1, 2]), &root.join("nested").join("second.tbl")).unwrap();
        fs::write(root.join("notes.txt"), "not a table").unwrap();

        let merged = merge_tables_from_directory(&root, None).unwrap().unwrap();
        assert_eq!(merged.index(), &[1, 2, 3, 4]);

        let output = root.join("merged.out");
        assert_eq!(merge_tables_from_directory(&root, Some(output.as_path())), Ok(None));
        assert_eq!(open_table(&output).unwrap(), merged);
    }

    #[test]
    fn test_merge_tables_from_directory_failures() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8_dir(&dir);
        assert_eq!(
            merge_tables_from_directory(&root, None),
            Err(PhabError::NoFilesToMerge(root.to_string()))
        );

        save_table(&small_table(vec![1, 2]), &root.join("a.tbl")).unwrap();
        save_table(&small_table(vec![2, 3]), &root.join("b.tbl")).unwrap();
        assert_eq!(
            merge_tables_from_directory(&root, None),
            Err(PhabError::DuplicateIndex(vec![2]))
        );

        let missing = root.join("missing");
        assert_eq!(
            merge_tables_from_directory(&missing, None),
            Err(PhabError::InvalidPath(missing.to_string()))
        );
    }
}
