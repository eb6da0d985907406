//! Infrastructure Storage Layer
//!
//! This crate provides the storage backend for the tuition ledger: an
//! in-memory document store with versioned settlement rows and atomic
//! batch commits, plus the repository adapters that implement the domain
//! ports over it.
//!
//! # Architecture
//!
//! The crate follows the repository pattern. The engine ([`MemoryStore`])
//! owns the state and the one write path; repositories adapt it to the
//! read and write ports the domain consumes.
//!
//! # Concurrency
//!
//! Settlement rows carry versions. A commit validates every operation
//! against current state before applying any of them, so a batch planned
//! on a stale snapshot is rejected whole and the caller replans.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_store::{MemoryStore, RosterRepository, TuitionRepository};
//!
//! let store = MemoryStore::new();
//! let roster = RosterRepository::new(store.clone());
//! let tuition = TuitionRepository::new(store);
//! ```

pub mod error;
pub mod repositories;
pub mod store;

pub use error::StoreError;
pub use repositories::{RosterRepository, TuitionRepository};
pub use store::{MemoryStore, StoreConfig};
