//! Migration file discovery

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::ScanError;

/// Recursively collect every `.sql` file under `dir`, sorted by path
///
/// Symlinks are not followed. A missing directory is an error; an empty
/// result is not (callers decide whether zero files is acceptable).
pub fn discover_sql_files(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    if !dir.is_dir() {
        return Err(ScanError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut sql_files = Vec::new();

    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(|e| ScanError::Walk {
            path: e.path().unwrap_or(dir).to_path_buf(),
            message: e.to_string(),
        })?;

        if entry.file_type().is_file() && is_sql_file(entry.path()) {
            sql_files.push(entry.into_path());
        }
    }

    sql_files.sort();
    tracing::debug!(dir = %dir.display(), count = sql_files.len(), "discovered migration files");

    Ok(sql_files)
}

/// Suffix match on the file name; a bare `.sql` counts
fn is_sql_file(path: &Path) -> bool {
    path.file_name().is_some_and(|name| name.to_string_lossy().ends_with(".sql"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn finds_nested_sql_files_in_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("b/nested")).unwrap();
        fs::write(root.join("b/nested/0003_c.sql"), "").unwrap();
        fs::write(root.join("0002_b.sql"), "").unwrap();
        fs::write(root.join("0001_a.sql"), "").unwrap();
        fs::write(root.join("README.md"), "").unwrap();
        fs::write(root.join("b/notes.sql.bak"), "").unwrap();
        fs::write(root.join("b/.sql"), "").unwrap();

        let files = discover_sql_files(root).unwrap();
        let relative: Vec<PathBuf> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            relative,
            vec![
                PathBuf::from("0001_a.sql"),
                PathBuf::from("0002_b.sql"),
                PathBuf::from("b/.sql"),
                PathBuf::from("b/nested/0003_c.sql"),
            ]
        );
    }

    #[test]
    fn empty_directory_yields_no_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_sql_files(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_sql_files(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, ScanError::DirectoryNotFound(_)));
    }

    #[test]
    fn sql_extension_check() {
        assert!(is_sql_file(Path::new("a/0001_init.sql")));
        assert!(!is_sql_file(Path::new("a/0001_init.SQL.txt")));
        assert!(!is_sql_file(Path::new("a/init")));
        assert!(is_sql_file(Path::new("a/.sql")));
        assert!(!is_sql_file(Path::new("a/sql")));
    }
}
