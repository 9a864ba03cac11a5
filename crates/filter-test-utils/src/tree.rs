//! [`FixtureTree`] builder for filtering scenarios.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

/// A temporary directory with helpers to lay out template files and inspect
/// what a filter run produced.
///
/// # Example
///
/// ```rust,no_run
/// use filter_test_utils::FixtureTree;
///
/// let tree = FixtureTree::new();
/// tree.file("in/app.conf", "host=${host}\n");
/// tree.dir("out");
/// assert_eq!(tree.files_under("in"), vec!["app.conf".to_string()]);
/// ```
pub struct FixtureTree {
    temp_dir: TempDir,
}

impl Default for FixtureTree {
    fn default() -> Self {
        Self::new()
    }
}

impl FixtureTree {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Root of the fixture.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `relative` inside the fixture.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write `content` to `relative`, creating parent directories.
    ///
    /// # Panics
    /// Panics if the filesystem operations fail.
    pub fn file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .unwrap_or_else(|e| panic!("file: failed to create {}: {e}", parent.display()));
        }
        fs::write(&path, content)
            .unwrap_or_else(|e| panic!("file: failed to write {}: {e}", path.display()));
        path
    }

    /// Create the directory `relative` and any missing parents.
    ///
    /// # Panics
    /// Panics if the directory cannot be created.
    pub fn dir(&self, relative: &str) -> PathBuf {
        let path = self.path(relative);
        fs::create_dir_all(&path)
            .unwrap_or_else(|e| panic!("dir: failed to create {}: {e}", path.display()));
        path
    }

    /// Read `relative` as UTF-8 text.
    ///
    /// # Panics
    /// Panics if the file is missing or not valid UTF-8.
    pub fn read(&self, relative: &str) -> String {
        let path = self.path(relative);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("read: failed to read {}: {e}", path.display()))
    }

    /// Every regular file under `relative`, as sorted `/`-separated paths
    /// relative to it. Returns an empty list if `relative` does not exist.
    pub fn files_under(&self, relative: &str) -> Vec<String> {
        self.entries_under(relative, false)
    }

    /// Every directory under `relative` (excluding itself), as sorted
    /// `/`-separated relative paths.
    pub fn dirs_under(&self, relative: &str) -> Vec<String> {
        self.entries_under(relative, true)
    }

    fn entries_under(&self, relative: &str, directories: bool) -> Vec<String> {
        let base = self.path(relative);
        if !base.exists() {
            return Vec::new();
        }

        WalkDir::new(&base)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|entry| entry.file_type().is_dir() == directories)
            .map(|entry| {
                let rel = entry.path().strip_prefix(&base).unwrap_or(entry.path());
                rel.to_string_lossy().replace('\\', "/")
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Assert that `relative` exists.
    ///
    /// # Panics
    /// Panics if the path does not exist.
    pub fn assert_exists(&self, relative: &str) {
        assert!(
            self.path(relative).exists(),
            "Expected {relative} to exist in fixture"
        );
    }

    /// Assert that `relative` does not exist.
    ///
    /// # Panics
    /// Panics if the path exists.
    pub fn assert_absent(&self, relative: &str) {
        assert!(
            !self.path(relative).exists(),
            "Expected {relative} to be absent from fixture"
        );
    }
}
