//! Shared helpers for the paramset integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use paramset::{ParamRecord, ParamSet};

/// Drains a set, panicking on the first error.
pub fn drain(set: &ParamSet) -> Vec<ParamRecord> {
    set.iter()
        .map(|r| r.expect("set should expand without errors"))
        .collect()
}

/// Renders every record of a set as its query string.
pub fn queries(set: &ParamSet) -> Vec<String> {
    drain(set).iter().map(ParamRecord::to_query).collect()
}

/// A fresh scratch directory under the system temp dir, unique per test.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("paramset-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

/// Writes `contents` to `dir/name` and returns the path.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(&path, contents).expect("write scratch file");
    path
}

/// Path of a checked-in fixture.
pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}
