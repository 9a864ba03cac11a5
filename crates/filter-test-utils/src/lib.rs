//! Shared test utilities for the propfilter workspace.
//!
//! This crate provides standardised test fixtures to eliminate duplication
//! across crate test suites. It is a dev-dependency only and is never published.
//!
//! # Modules
//!
//! - [`tree`]: [`FixtureTree`] builder for input/output directory scenarios

pub mod tree;

pub use tree::FixtureTree;
