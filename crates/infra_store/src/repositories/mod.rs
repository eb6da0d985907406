//! Port adapters over the document store

pub mod roster;
pub mod tuition;

pub use roster::RosterRepository;
pub use tuition::TuitionRepository;
