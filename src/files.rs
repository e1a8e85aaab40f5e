//! Common file-system checks.
use camino::{Utf8Path, Utf8PathBuf};
use tracing::error;

/// Check whether the path exists and is a directory.
///
/// Return
/// ------
/// * `Some(path)` if it is an existing directory, `None` otherwise (the reason is logged)
pub fn directory_exists(candidate: &Utf8Path) -> Option<Utf8PathBuf> {
    if !candidate.exists() {
        error!("The path [{candidate}] does not exist");
        return None;
    }
    if !candidate.is_dir() {
        error!("The path [{candidate}] is not a directory");
        return None;
    }
    Some(candidate.to_path_buf())
}

/// Check whether the path exists and is a file.
///
/// Return
/// ------
/// * `Some(path)` if it is an existing file, `None` otherwise (the reason is logged)
pub fn file_exists(candidate: &Utf8Path) -> Option<Utf8PathBuf> {
    if !candidate.exists() {
        error!("The path [{candidate}] does not exist");
        return None;
    }
    if !candidate.is_file() {
        error!("The path [{candidate}] is not a file");
        return None;
    }
    Some(candidate.to_path_buf())
}

#[cfg(test)]
mod files_test {
    use super::*;

    #[test]
    fn test_exists_checks() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let file = root.join("some.tbl");
        std::fs::write(&file, "{}").unwrap();

        assert_eq!(directory_exists(&root), Some(root.clone()));
        assert_eq!(directory_exists(&file), None);
        assert_eq!(file_exists(&file), Some(file.clone()));
        assert_eq!(file_exists(&root), None);
        assert_eq!(file_exists(&root.join("missing")), None);
    }
}
