//! Input directory listing

use crate::error::{BuildError, Result};
use std::fs;
use std::path::Path;

/// List the `.csv` file names in a directory, sorted by name
pub fn list_csv_files(dir: &Path) -> Result<Vec<String>> {
    let dir_error = |source: std::io::Error| BuildError::InputDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(dir_error)? {
        let entry = entry.map_err(dir_error)?;
        if !entry.path().is_file() {
            continue;
        }
        // Names that are not valid UTF-8 cannot match any category pattern
        if let Some(name) = entry.file_name().to_str() {
            if name.ends_with(".csv") {
                names.push(name.to_string());
            }
        }
    }

    names.sort();
    Ok(names)
}
