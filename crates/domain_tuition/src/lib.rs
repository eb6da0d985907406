//! Tuition Domain - Monthly Dues, Allocation, and Collection Ledger
//!
//! This crate implements the tuition ledger for the coaching center: who
//! owes what, how a lump-sum payment spreads across billing months, and
//! the income/expense trail every collection leaves behind.
//!
//! # Settlement Model
//!
//! Each enrollment owes its monthly fee for every month from the
//! enrollment month through the current one, the enrollment month
//! included. A settlement row marks one `(enrollment, month)` as unpaid,
//! partial, or paid; months with no row yet are implicitly unpaid.
//!
//! # Allocation
//!
//! Payments settle the oldest outstanding month first and roll any
//! surplus into advance months. Every collection produces an immutable
//! invoice plus an income ledger entry in the same atomic write; deleting
//! the invoice reverses all of it and books the offsetting expense.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_tuition::{CollectPaymentCommand, TuitionService};
//!
//! let service = TuitionService::new(store, enrollments, students, clock, currency);
//!
//! let collected = service
//!     .collect_payment(CollectPaymentCommand {
//!         student_id,
//!         enrollment_id,
//!         amount,
//!         discount,
//!         method: Some(PaymentMethod::Cash),
//!         transaction_ref: None,
//!         notes: None,
//!     })
//!     .await?;
//! println!("invoice {}", collected.invoice.id);
//! ```

pub mod allocator;
pub mod dues;
pub mod enrollment;
pub mod error;
pub mod history;
pub mod invoice;
pub mod ledger;
pub mod ports;
pub mod services;
pub mod settlement;
pub mod statistics;

pub use allocator::{
    AllocationOutcome, AllocationPlan, AllocationRequest, MonthAllocation, PaymentAllocator,
    SettlementUpdate,
};
pub use dues::{DuesCalculator, DuesReport, EnrollmentDue};
pub use enrollment::{Enrollment, Student};
pub use error::TuitionError;
pub use history::{HistorySummary, MonthRecord, PaymentHistoryBuilder};
pub use invoice::Invoice;
pub use ledger::{EntryKind, LedgerEntry, LedgerPage, LedgerTotals};
pub use ports::{EnrollmentSource, StudentSource, TuitionStore, Versioned, WriteBatch, WriteOp};
pub use services::{
    CollectPaymentCommand, EnrollmentHistory, LedgerView, PaymentCollected, TuitionService,
};
pub use settlement::{PaymentMethod, Settlement, SettlementStatus};
pub use statistics::{
    CourseCount, CourseSlotCount, MonthlyCollection, StatisticsAggregator, TuitionOverview,
    UnpaidStudent,
};
