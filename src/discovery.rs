use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::errors::ParamError;
use crate::matrix::{MatrixFile, MatrixFormat};

/// Discovers matrix files under a directory.
///
/// The discovery process follows this flow:
/// 1. Walk the directory tree
/// 2. Keep files with a matrix extension (`.yaml`, `.yml`, `.json`)
/// 3. Sort for deterministic order
#[derive(Debug)]
pub struct MatrixDiscoverer;

impl MatrixDiscoverer {
    /// Recursively scans a directory for matrix files.
    ///
    /// The returned list of files is sorted to ensure deterministic order.
    pub fn discover_matrix_files<P: AsRef<Path>>(root: P) -> Result<Vec<PathBuf>, ParamError> {
        let root = root.as_ref();
        let mut files = Vec::new();
        for entry in WalkDir::new(root) {
            let entry = entry.map_err(|e| ParamError::Io {
                path: e
                    .path()
                    .unwrap_or(root)
                    .display()
                    .to_string(),
                source: e.into(),
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if !Self::is_matrix_file(path) {
                continue;
            }

            files.push(path.to_path_buf());
        }
        files.sort();
        tracing::debug!(root = %root.display(), found = files.len(), "discovered matrix files");
        Ok(files)
    }

    /// Loads every discovered file, keeping per-file failures alongside
    /// successes so one broken file does not hide the others.
    pub fn load_all<P: AsRef<Path>>(
        root: P,
    ) -> Result<Vec<(PathBuf, Result<MatrixFile, ParamError>)>, ParamError> {
        let files = Self::discover_matrix_files(root)?;
        Ok(files
            .into_iter()
            .map(|path| {
                let loaded = MatrixFile::load(&path);
                (path, loaded)
            })
            .collect())
    }

    fn is_matrix_file(path: &Path) -> bool {
        MatrixFormat::from_path(path).is_some()
    }
}
