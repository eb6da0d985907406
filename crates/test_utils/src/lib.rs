//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! tuition ledger test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built test data for common entities
//! - `builders`: Builder patterns for test data construction
//! - `backend`: In-memory backend wiring for workflow tests
//! - `assertions`: Custom assertion helpers for domain types
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod backend;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use backend::*;
pub use assertions::*;
pub use generators::*;
