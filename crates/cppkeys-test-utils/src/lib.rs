//! Shared test utilities for the cppkeys workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`fixtures`] - catalogs and selections under `test-fixtures/`
//! - [`workspace`] - [`TestWorkspace`] builder for on-disk CLI scenarios

pub mod fixtures;
pub mod workspace;

pub use workspace::TestWorkspace;
