//! Student history and dues DTOs

use chrono::{DateTime, NaiveDate, Utc};
use domain_tuition::{
    DuesReport, EnrollmentDue, EnrollmentHistory, HistorySummary, MonthRecord, PaymentMethod,
    SettlementStatus,
};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// One billing month of an enrollment's history
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthRecordDto {
    pub month: String,
    pub year: i32,
    pub month_number: u32,
    pub monthly_fee: Decimal,
    pub amount_paid: Decimal,
    pub discount: Decimal,
    pub status: SettlementStatus,
    pub due_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<PaymentMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl From<&MonthRecord> for MonthRecordDto {
    fn from(record: &MonthRecord) -> Self {
        Self {
            month: record.month.label(),
            year: record.month.year(),
            month_number: record.month.month(),
            monthly_fee: record.monthly_fee.amount(),
            amount_paid: record.amount_paid.amount(),
            discount: record.discount.amount(),
            status: record.status,
            due_date: record.due_date,
            payment_date: record.payment_date,
            method: record.method,
            transaction_ref: record.transaction_ref.clone(),
            notes: record.notes.clone(),
        }
    }
}

/// Roll-up across an enrollment's history
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummaryDto {
    pub paid_months: usize,
    pub partial_months: usize,
    pub unpaid_months: usize,
    pub total_due: Decimal,
}

impl From<&HistorySummary> for HistorySummaryDto {
    fn from(summary: &HistorySummary) -> Self {
        Self {
            paid_months: summary.paid_months,
            partial_months: summary.partial_months,
            unpaid_months: summary.unpaid_months,
            total_due: summary.total_due.amount(),
        }
    }
}

/// Response of `GET /students/:id/enrollments/:eid/history`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub enrollment_id: Uuid,
    pub course_name: String,
    pub time_slot: String,
    pub monthly_fee: Decimal,
    pub active: bool,
    pub records: Vec<MonthRecordDto>,
    pub summary: HistorySummaryDto,
}

impl From<&EnrollmentHistory> for HistoryResponse {
    fn from(history: &EnrollmentHistory) -> Self {
        Self {
            enrollment_id: *history.enrollment.id.as_uuid(),
            course_name: history.enrollment.course_name.clone(),
            time_slot: history.enrollment.time_slot.clone(),
            monthly_fee: history.enrollment.monthly_fee.amount(),
            active: history.enrollment.active,
            records: history.records.iter().map(MonthRecordDto::from).collect(),
            summary: HistorySummaryDto::from(&history.summary),
        }
    }
}

/// Outstanding months of one enrollment
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentDueDto {
    pub enrollment_id: Uuid,
    pub course_name: String,
    pub time_slot: String,
    pub monthly_fee: Decimal,
    pub months_owed: i64,
    pub outstanding: Decimal,
}

impl From<&EnrollmentDue> for EnrollmentDueDto {
    fn from(due: &EnrollmentDue) -> Self {
        Self {
            enrollment_id: *due.enrollment_id.as_uuid(),
            course_name: due.course_name.clone(),
            time_slot: due.time_slot.clone(),
            monthly_fee: due.monthly_fee.amount(),
            months_owed: due.months_owed,
            outstanding: due.outstanding.amount(),
        }
    }
}

/// Response of `GET /students/:id/due`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DueResponse {
    pub student_id: Uuid,
    pub total_due: Decimal,
    pub enrollments: Vec<EnrollmentDueDto>,
}

impl From<&DuesReport> for DueResponse {
    fn from(report: &DuesReport) -> Self {
        Self {
            student_id: *report.student_id.as_uuid(),
            total_due: report.total_due.amount(),
            enrollments: report.enrollments.iter().map(EnrollmentDueDto::from).collect(),
        }
    }
}
