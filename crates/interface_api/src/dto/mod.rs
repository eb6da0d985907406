//! Request and response data transfer objects

pub mod ledger;
pub mod payments;
pub mod statistics;
pub mod students;
