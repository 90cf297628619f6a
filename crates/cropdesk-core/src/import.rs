//! Legacy-format import

use std::path::{Path, PathBuf};

/// Converts a legacy simulation file into the current document format.
pub trait ImportAdapter {
    /// Write a converted copy of `legacy_path` and return where it went,
    /// normally `converted_path(legacy_path, <document extension>)`.
    fn convert(&self, legacy_path: &Path) -> anyhow::Result<PathBuf>;
}

/// Same directory and file stem as `legacy_path`, new extension.
pub fn converted_path(legacy_path: &Path, extension: &str) -> PathBuf {
    legacy_path.with_extension(extension.trim_start_matches('.'))
}
