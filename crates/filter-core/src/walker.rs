//! Directory tree filtering
//!
//! Walks an input tree and filters every matched file into the same relative
//! location under an output root. Only matched entries appear in the output;
//! nothing is copied through unfiltered. To mirror a full tree, copy it first
//! and filter it in place.

use std::fs;
use std::path::{Path, PathBuf};

use filter_fs::path as fs_path;
use regex::Regex;
use walkdir::{DirEntry, WalkDir};

use crate::{Error, LineFilterEngine, PropertySource, Result};

/// Name predicate for directory walks.
///
/// The directory regex decides which directories are descended into (at
/// every depth); the filename regex decides which files are filtered. A
/// missing regex matches everything on its axis. Patterns must match the
/// whole entry name.
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    directory_name: Option<Regex>,
    file_name: Option<Regex>,
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{pattern})$"))
        .map_err(|e| Error::configuration(format!("Invalid name pattern '{pattern}': {e}")))
}

impl FileFilter {
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if either pattern fails to compile.
    pub fn new(directory_pattern: Option<&str>, file_pattern: Option<&str>) -> Result<Self> {
        Ok(Self {
            directory_name: directory_pattern.map(compile).transpose()?,
            file_name: file_pattern.map(compile).transpose()?,
        })
    }

    /// A filter that accepts every entry.
    pub fn match_all() -> Self {
        Self::default()
    }

    pub fn accepts_directory(&self, name: &str) -> bool {
        self.directory_name.as_ref().is_none_or(|re| re.is_match(name))
    }

    pub fn accepts_file(&self, name: &str) -> bool {
        self.file_name.as_ref().is_none_or(|re| re.is_match(name))
    }
}

/// Paths written by a walk, in visiting order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkSummary {
    pub files: Vec<PathBuf>,
    pub directories: Vec<PathBuf>,
}

/// Filters matched files of a directory tree into a mirrored tree.
#[derive(Debug, Clone, Default)]
pub struct DirectoryWalker {
    engine: LineFilterEngine,
}

impl DirectoryWalker {
    pub fn new(engine: LineFilterEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &LineFilterEngine {
        &self.engine
    }

    /// Filter every file under `input_dir` accepted by `filter` into the
    /// mirrored path under `output_dir`.
    ///
    /// Links are followed, so a symlinked directory counts as a directory;
    /// a link back to one of its own ancestors is skipped. Directories are
    /// entered only when `recurse` is set. An output root nested inside the
    /// input root is never walked.
    ///
    /// # Errors
    ///
    /// - [`Error::ResourceNotFound`] if `input_dir` does not exist
    /// - [`Error::Configuration`] if `input_dir` is not a directory
    /// - the first error from listing a directory or filtering a file
    pub fn walk(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        filter: &FileFilter,
        recurse: bool,
        sources: &[PropertySource],
    ) -> Result<WalkSummary> {
        let input_root = fs_path::canonical(input_dir)?;
        if !input_root.is_dir() {
            return Err(Error::configuration(format!(
                "Input {} is not a directory",
                input_dir.display()
            )));
        }
        fs::create_dir_all(output_dir).map_err(|e| filter_fs::Error::io(output_dir, e))?;
        let output_root = fs_path::canonical(output_dir)?;

        let walker = WalkDir::new(input_dir)
            .follow_links(true)
            .sort_by_file_name()
            .min_depth(1)
            .max_depth(if recurse { usize::MAX } else { 1 });
        let entries = walker
            .into_iter()
            .filter_entry(|entry| enters(entry, filter, &output_root));

        let mut summary = WalkSummary::default();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.loop_ancestor().is_some() => {
                    tracing::debug!(path = ?e.path(), "Skipping symlink loop");
                    continue;
                }
                Err(e) if is_dangling(&e) => {
                    tracing::warn!(path = ?e.path(), "Skipping unresolvable entry");
                    continue;
                }
                Err(e) => {
                    let path = e.path().unwrap_or(input_dir).to_path_buf();
                    return Err(filter_fs::Error::io(path, e.into()).into());
                }
            };

            let Ok(relative) = entry.path().strip_prefix(input_dir) else {
                continue;
            };
            let target = output_dir.join(relative);

            if entry.file_type().is_dir() {
                if !recurse {
                    continue;
                }
                fs::create_dir_all(&target).map_err(|e| filter_fs::Error::io(&target, e))?;
                summary.directories.push(target);
            } else if entry.file_type().is_file()
                && filter.accepts_file(&fs_path::entry_name(entry.path()))
            {
                self.engine.filter_file(entry.path(), &target, sources)?;
                summary.files.push(target);
            }
        }

        tracing::debug!(
            input = ?input_dir,
            output = ?output_dir,
            files = summary.files.len(),
            directories = summary.directories.len(),
            "Filtered directory tree"
        );
        Ok(summary)
    }
}

fn is_dangling(error: &walkdir::Error) -> bool {
    error
        .io_error()
        .is_some_and(|e| e.kind() == std::io::ErrorKind::NotFound)
}

/// Whether the walk descends into `entry`. Files always pass; the filename
/// pattern is applied when they are filtered.
fn enters(entry: &DirEntry, filter: &FileFilter, output_root: &Path) -> bool {
    if !entry.file_type().is_dir() {
        return true;
    }
    if !filter.accepts_directory(&fs_path::entry_name(entry.path())) {
        return false;
    }
    if fs_path::canonical(entry.path()).is_ok_and(|resolved| resolved == output_root) {
        tracing::debug!(path = ?entry.path(), "Skipping output root inside input tree");
        return false;
    }
    true
}
