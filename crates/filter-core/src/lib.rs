//! Property-placeholder filtering for propfilter
//!
//! Generates configuration files from templates by substituting `${key}`
//! placeholders with values from layered property sources.
//!
//! # Layers
//!
//! - [`PlaceholderResolver`]: pure string substitution with nesting, inline
//!   defaults and cycle detection
//! - [`LineFilterEngine`]: streams a template through the resolver, reading
//!   all input before acquiring the output so in-place filtering is safe
//! - [`PropertySetMerger`]: assembles and filters layered property sets
//! - [`DirectoryWalker`]: filters matched files of a tree into a mirror tree
//! - [`FilterJob`]: runs one file or directory job from [`FilterOptions`]
//!
//! System properties are never read from global state: callers inject a
//! [`PropertySource`] (for example [`PropertySource::from_process_env`]) and
//! pick its priority with [`SystemPropertiesMode`].

pub mod engine;
pub mod error;
pub mod job;
pub mod merger;
pub mod mode;
pub mod options;
pub mod resolver;
pub mod source;
pub mod walker;

pub use engine::LineFilterEngine;
pub use error::{Error, Result};
pub use job::FilterJob;
pub use merger::{FileSystemLoader, PropertyLoader, PropertySetMerger};
pub use mode::SystemPropertiesMode;
pub use options::FilterOptions;
pub use resolver::PlaceholderResolver;
pub use source::PropertySource;
pub use walker::{DirectoryWalker, FileFilter, WalkSummary};
