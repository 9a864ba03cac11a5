//! Path helpers for tree walks

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Resolve `path` to its canonical form without UNC prefixes on Windows.
///
/// Symlinks are followed, so a linked directory resolves to the directory.
pub fn canonical(path: &Path) -> Result<PathBuf> {
    dunce::canonicalize(path).map_err(|e| Error::io(path, e))
}

/// Whether two paths name the same existing filesystem entry.
///
/// Returns `false` when either path cannot be resolved.
pub fn same_entry(a: &Path, b: &Path) -> bool {
    match (dunce::canonicalize(a), dunce::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// The final component of `path` as UTF-8 text, lossily converted.
pub fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_entry_follows_relative_segments() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, "x").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        assert!(same_entry(&file, &dir.path().join("sub").join("..").join("a.txt")));
        assert!(!same_entry(&file, &dir.path().join("missing.txt")));
    }

    #[test]
    fn entry_name_returns_last_component() {
        assert_eq!(entry_name(Path::new("/in/sub/b.txt")), "b.txt");
        assert_eq!(entry_name(Path::new("/")), "");
    }
}
