//! Statistics DTOs

use domain_tuition::{
    CourseCount, CourseSlotCount, MonthlyCollection, TuitionOverview, UnpaidStudent,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One month of the trailing collection series
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyCollectionDto {
    pub month: String,
    pub amount: Decimal,
}

impl From<&MonthlyCollection> for MonthlyCollectionDto {
    fn from(collection: &MonthlyCollection) -> Self {
        Self {
            month: collection.label.clone(),
            amount: collection.collected.amount(),
        }
    }
}

/// Distinct-student count per course
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseCountDto {
    pub course_name: String,
    pub students: usize,
}

impl From<&CourseCount> for CourseCountDto {
    fn from(count: &CourseCount) -> Self {
        Self {
            course_name: count.course_name.clone(),
            students: count.students,
        }
    }
}

/// Distinct-student count per course and time slot
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSlotCountDto {
    pub course_name: String,
    pub time_slot: String,
    pub students: usize,
}

impl From<&CourseSlotCount> for CourseSlotCountDto {
    fn from(count: &CourseSlotCount) -> Self {
        Self {
            course_name: count.course_name.clone(),
            time_slot: count.time_slot.clone(),
            students: count.students,
        }
    }
}

/// Response of `GET /statistics`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsResponse {
    pub total_students: u64,
    pub total_courses: usize,
    pub total_paid_amount: Decimal,
    pub current_month_due: Decimal,
    pub last12_months_paid_amount: Vec<MonthlyCollectionDto>,
    pub course_enrollment_counts: Vec<CourseCountDto>,
    pub course_batch_enrollment_counts: Vec<CourseSlotCountDto>,
}

impl From<&TuitionOverview> for StatisticsResponse {
    fn from(overview: &TuitionOverview) -> Self {
        Self {
            total_students: overview.total_students,
            total_courses: overview.total_courses,
            total_paid_amount: overview.total_collected.amount(),
            current_month_due: overview.current_month_due.amount(),
            last12_months_paid_amount: overview
                .trailing_12_months
                .iter()
                .map(MonthlyCollectionDto::from)
                .collect(),
            course_enrollment_counts: overview
                .course_counts
                .iter()
                .map(CourseCountDto::from)
                .collect(),
            course_batch_enrollment_counts: overview
                .course_slot_counts
                .iter()
                .map(CourseSlotCountDto::from)
                .collect(),
        }
    }
}

/// Query string of `GET /statistics/unpaid`
///
/// Months are zero-based, January is 0.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UnpaidRangeQuery {
    pub from_month: u32,
    pub from_year: i32,
    pub to_month: u32,
    pub to_year: i32,
}

/// One student with no settlement activity in the range
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnpaidStudentDto {
    pub student_id: Uuid,
    pub name: String,
    pub monthly_fee_total: Decimal,
    pub months_in_range: i64,
    pub estimated_due: Decimal,
}

impl From<&UnpaidStudent> for UnpaidStudentDto {
    fn from(student: &UnpaidStudent) -> Self {
        Self {
            student_id: *student.student_id.as_uuid(),
            name: student.name.clone(),
            monthly_fee_total: student.monthly_fee_total.amount(),
            months_in_range: student.months_in_range,
            estimated_due: student.estimated_due.amount(),
        }
    }
}

/// Response of `GET /statistics/unpaid`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnpaidStudentsResponse {
    pub from: String,
    pub to: String,
    pub count: usize,
    pub students: Vec<UnpaidStudentDto>,
}
