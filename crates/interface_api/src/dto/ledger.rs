//! Ledger DTOs

use chrono::{DateTime, Utc};
use domain_tuition::{EntryKind, LedgerEntry, LedgerView};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Query string of `GET /ledger`
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerQuery {
    pub page: Option<u32>,
}

/// One income or expense row
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntryDto {
    pub id: Uuid,
    pub title: String,
    pub amount: Decimal,
    pub kind: EntryKind,
    pub created_at: DateTime<Utc>,
}

impl From<&LedgerEntry> for LedgerEntryDto {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            id: *entry.id.as_uuid(),
            title: entry.title.clone(),
            amount: entry.amount.amount(),
            kind: entry.kind,
            created_at: entry.created_at,
        }
    }
}

/// Response of `GET /ledger`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerResponse {
    pub entries: Vec<LedgerEntryDto>,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub total_profit: Decimal,
    pub total_pages: u64,
}

impl LedgerResponse {
    pub fn from_view(view: &LedgerView, profit: Decimal) -> Self {
        Self {
            entries: view.page.entries.iter().map(LedgerEntryDto::from).collect(),
            total_income: view.totals.income.amount(),
            total_expense: view.totals.expense.amount(),
            total_profit: profit,
            total_pages: view.page.total_pages(),
        }
    }
}
