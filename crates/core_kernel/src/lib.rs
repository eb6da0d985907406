//! Core Kernel - Foundational types and utilities for the tuition ledger
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Billing month arithmetic and campus-local clock
//! - Common identifiers and port abstractions

pub mod clock;
pub mod error;
pub mod identifiers;
pub mod money;
pub mod month;
pub mod ports;

pub use clock::{CampusClock, ClockError};
pub use error::CoreError;
pub use identifiers::{EnrollmentId, InvoiceId, LedgerEntryId, SettlementId, StudentId};
pub use money::{Currency, Money, MoneyError};
pub use month::{month_name, BillingMonth, MonthError, MONTH_NAMES};
pub use ports::{DomainPort, PortError};
