//! Income and expense ledger
//!
//! A flat, append-only journal of money movements. Every collected payment
//! appends an income entry; every invoice reversal appends a compensating
//! expense entry, so the create/delete pair of an invoice nets to zero.

use chrono::{DateTime, Utc};
use core_kernel::{LedgerEntryId, Money, MoneyError};
use serde::{Deserialize, Serialize};

/// Direction of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Income,
    Expense,
}

/// One row in the income/expense journal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: LedgerEntryId,
    pub title: String,
    pub amount: Money,
    pub kind: EntryKind,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn income(title: impl Into<String>, amount: Money) -> Self {
        Self {
            id: LedgerEntryId::new_v7(),
            title: title.into(),
            amount,
            kind: EntryKind::Income,
            created_at: Utc::now(),
        }
    }

    pub fn expense(title: impl Into<String>, amount: Money) -> Self {
        Self {
            id: LedgerEntryId::new_v7(),
            title: title.into(),
            amount,
            kind: EntryKind::Expense,
            created_at: Utc::now(),
        }
    }
}

/// Running totals over the whole journal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerTotals {
    pub income: Money,
    pub expense: Money,
}

impl LedgerTotals {
    /// Net profit; negative when expenses exceed income
    pub fn profit(&self) -> Result<Money, MoneyError> {
        self.income.checked_sub(&self.expense)
    }
}

/// One page of ledger entries, newest first
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerPage {
    pub entries: Vec<LedgerEntry>,
    pub page: u32,
    pub per_page: u32,
    pub total_entries: u64,
}

impl LedgerPage {
    /// Number of pages at this page size, at least 1
    pub fn total_pages(&self) -> u64 {
        if self.per_page == 0 {
            return 1;
        }
        let pages = self.total_entries.div_ceil(self.per_page as u64);
        pages.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn bdt(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::BDT)
    }

    #[test]
    fn test_entry_constructors() {
        let income = LedgerEntry::income("Tuition payment from Rahim", bdt(dec!(1200)));
        assert_eq!(income.kind, EntryKind::Income);
        assert_eq!(income.amount, bdt(dec!(1200)));

        let expense = LedgerEntry::expense("Reversal of invoice", bdt(dec!(1200)));
        assert_eq!(expense.kind, EntryKind::Expense);
    }

    #[test]
    fn test_profit_can_go_negative() {
        let totals = LedgerTotals {
            income: bdt(dec!(500)),
            expense: bdt(dec!(800)),
        };
        assert_eq!(totals.profit().unwrap(), bdt(dec!(-300)));
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let page = LedgerPage {
            entries: vec![],
            page: 1,
            per_page: 10,
            total_entries: 31,
        };
        assert_eq!(page.total_pages(), 4);
    }

    #[test]
    fn test_empty_ledger_still_has_one_page() {
        let page = LedgerPage {
            entries: vec![],
            page: 1,
            per_page: 10,
            total_entries: 0,
        };
        assert_eq!(page.total_pages(), 1);
    }
}
