//! One input-to-output filtering operation

use std::path::PathBuf;

use crate::{DirectoryWalker, FilterOptions, PropertySource, Result, WalkSummary};

/// An input resource, an output resource, the sources to resolve against and
/// the options to apply. Nothing is kept once [`FilterJob::run`] returns.
#[derive(Debug, Clone)]
pub struct FilterJob {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Searched in order; the first source defining a key wins.
    pub sources: Vec<PropertySource>,
    pub options: FilterOptions,
    pub system_properties: PropertySource,
}

impl FilterJob {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            sources: Vec::new(),
            options: FilterOptions::default(),
            system_properties: PropertySource::new("system"),
        }
    }

    pub fn with_source(mut self, source: PropertySource) -> Self {
        self.sources.push(source);
        self
    }

    pub fn with_options(mut self, options: FilterOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_system_properties(mut self, system_properties: PropertySource) -> Self {
        self.system_properties = system_properties;
        self
    }

    /// Filter a single file, or a whole tree when `input` is a directory.
    ///
    /// Directory inputs honour `recurse`, `directoryNameRegex` and
    /// `filenameRegex`; a file input is filtered regardless of the name
    /// patterns. All options are validated before any I/O happens.
    pub fn run(&self) -> Result<WalkSummary> {
        let engine = self.options.engine(self.system_properties.clone())?;
        let file_filter = self.options.file_filter()?;

        if self.input.is_dir() {
            tracing::debug!(input = ?self.input, output = ?self.output, "Running directory filter job");
            return DirectoryWalker::new(engine).walk(
                &self.input,
                &self.output,
                &file_filter,
                self.options.recurse,
                &self.sources,
            );
        }

        tracing::debug!(input = ?self.input, output = ?self.output, "Running file filter job");
        engine.filter_file(&self.input, &self.output, &self.sources)?;
        Ok(WalkSummary {
            files: vec![self.output.clone()],
            directories: Vec::new(),
        })
    }
}
