//! Numbered image listings - slide_7.jpg sorts by the 7, not the name

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

use crate::core::error::SyncError;

static TRAILING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\.[^.]+$").expect("valid regex"));

/// Number right before the extension, e.g. "slide_22.jpg" -> 22.
pub fn file_number(filename: &str) -> Option<u64> {
    TRAILING_NUMBER
        .captures(filename)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// All non-hidden files in `dir` with `extension`, sorted by trailing number.
///
/// A matching file without a trailing number breaks the ordering contract
/// and fails the listing.
pub fn numbered_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, SyncError> {
    let mut numbered: Vec<(u64, PathBuf)> = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => continue,
        };
        if name.starts_with('.') {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }
        match file_number(name) {
            Some(number) => numbered.push((number, path)),
            None => return Err(SyncError::UnnumberedFile(name.to_string())),
        }
    }

    numbered.sort_by_key(|(number, _)| *number);
    Ok(numbered.into_iter().map(|(_, path)| path).collect())
}
