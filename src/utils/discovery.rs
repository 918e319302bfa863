//! Configuration file discovery.

use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;

/// List regular files in `dir` whose extension matches `extension`.
///
/// The extension is compared without its leading dot and case-insensitively.
/// Results are sorted by file name so numbering is stable between runs.
pub fn list_config_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(eyre!("Directory '{}' not found", dir.display()));
    }

    let wanted = extension.trim_start_matches('.');
    let mut files = Vec::new();

    let entries = fs::read_dir(dir)
        .wrap_err_with(|| format!("Failed to read directory '{}'", dir.display()))?;
    for entry in entries {
        let entry = entry.wrap_err_with(|| format!("Failed to read entry in '{}'", dir.display()))?;
        let path = entry.path();

        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted));
        if matches && path.is_file() {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_list_config_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b_relay.txt"), "").unwrap();
        fs::write(dir.path().join("a_surface.TXT"), "").unwrap();
        fs::write(dir.path().join("notes.md"), "").unwrap();
        fs::create_dir(dir.path().join("nested.txt")).unwrap();

        let files = list_config_files(dir.path(), ".txt").unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["a_surface.TXT", "b_relay.txt"]);
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempdir().unwrap();
        assert!(list_config_files(dir.path(), "txt").unwrap().is_empty());
    }

    #[test]
    fn test_missing_directory() {
        let err = list_config_files(Path::new("/nonexistent/config"), "txt").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/config"));
    }
}
