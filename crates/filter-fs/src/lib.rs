//! Filesystem and stream plumbing for propfilter
//!
//! Provides standard-stream aware stream handles, deferred output factories,
//! property-file loading and path helpers.

pub mod config;
pub mod error;
pub mod io;
pub mod path;
pub mod properties;
pub mod text;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use io::{Sink, Source};
