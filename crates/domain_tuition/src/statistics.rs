//! Collection statistics
//!
//! Read-only aggregations over the settlement store and the roster
//! sources: the trailing twelve-month collection series, the current
//! month's shortfall, enrollment counts, and the unpaid-students report.
//! All reads run against a live snapshot and may interleave with
//! commits; a slightly stale dashboard is acceptable.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use core_kernel::{BillingMonth, Currency, Money, StudentId};
use rust_decimal::Decimal;

use crate::dues::DuesCalculator;
use crate::enrollment::Enrollment;
use crate::error::TuitionError;
use crate::ports::{EnrollmentSource, StudentSource, TuitionStore};
use crate::settlement::Settlement;

/// One month of the trailing collection series
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyCollection {
    pub month: BillingMonth,
    pub label: String,
    pub collected: Money,
}

/// Distinct-student count for one course
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseCount {
    pub course_name: String,
    pub students: usize,
}

/// Distinct-student count for one course and time slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseSlotCount {
    pub course_name: String,
    pub time_slot: String,
    pub students: usize,
}

/// A student with no settlement activity inside a month range
#[derive(Debug, Clone, PartialEq)]
pub struct UnpaidStudent {
    pub student_id: StudentId,
    pub name: String,
    /// Sum of the student's active enrollment fees
    pub monthly_fee_total: Money,
    pub months_in_range: i64,
    /// Flat estimate: fee total times range length. Partial coverage
    /// outside the range is ignored.
    pub estimated_due: Money,
}

/// The dashboard overview payload
#[derive(Debug, Clone, PartialEq)]
pub struct TuitionOverview {
    pub total_students: u64,
    pub total_courses: usize,
    pub total_collected: Money,
    pub current_month_due: Money,
    pub trailing_12_months: Vec<MonthlyCollection>,
    pub course_counts: Vec<CourseCount>,
    pub course_slot_counts: Vec<CourseSlotCount>,
}

/// Aggregates collection statistics across the whole roster
pub struct StatisticsAggregator {
    store: Arc<dyn TuitionStore>,
    enrollments: Arc<dyn EnrollmentSource>,
    students: Arc<dyn StudentSource>,
    currency: Currency,
}

impl StatisticsAggregator {
    pub fn new(
        store: Arc<dyn TuitionStore>,
        enrollments: Arc<dyn EnrollmentSource>,
        students: Arc<dyn StudentSource>,
        currency: Currency,
    ) -> Self {
        Self {
            store,
            enrollments,
            students,
            currency,
        }
    }

    /// Collected amounts for the last twelve months including `as_of`,
    /// oldest first; months with no settlements report zero
    pub async fn trailing_12_months_collected(
        &self,
        as_of: BillingMonth,
    ) -> Result<Vec<MonthlyCollection>, TuitionError> {
        let mut series = Vec::with_capacity(12);
        for offset in 0..12 {
            let month = BillingMonth::from_index(as_of.index() - 11 + offset);
            let collected = self.store.collected_in_month(month, self.currency).await?;
            series.push(MonthlyCollection {
                month,
                label: month.label(),
                collected,
            });
        }
        Ok(series)
    }

    /// Sum of per-student shortfalls for the given month
    pub async fn current_month_shortfall(
        &self,
        as_of: BillingMonth,
    ) -> Result<Money, TuitionError> {
        let enrollments = self.enrollments.all_active_enrollments().await?;
        let rows = self.store.settlements_in_month(as_of).await?;
        Self::shortfall(&enrollments, &rows, self.currency)
    }

    /// Distinct-student counts per course, sorted by course name
    pub async fn enrollment_counts_by_course(
        &self,
    ) -> Result<Vec<CourseCount>, TuitionError> {
        let enrollments = self.enrollments.all_active_enrollments().await?;
        Ok(Self::counts_by_course(&enrollments))
    }

    /// Distinct-student counts per course and time slot, sorted by
    /// course then slot
    pub async fn enrollment_counts_by_course_and_slot(
        &self,
    ) -> Result<Vec<CourseSlotCount>, TuitionError> {
        let enrollments = self.enrollments.all_active_enrollments().await?;
        Ok(Self::counts_by_course_and_slot(&enrollments))
    }

    /// Active students with no settlement rows inside the inclusive
    /// month range, sorted by name
    pub async fn unpaid_students_in_range(
        &self,
        from: BillingMonth,
        to: BillingMonth,
    ) -> Result<Vec<UnpaidStudent>, TuitionError> {
        if from > to {
            return Err(TuitionError::validation(
                "range start must not be after range end",
            ));
        }

        let settled = self.store.students_with_settlements_in_range(from, to).await?;
        let students = self.students.list_active_students().await?;
        let months_in_range = to.index() - from.index() + 1;

        let mut unpaid = Vec::new();
        for student in students {
            if settled.contains(&student.id) {
                continue;
            }
            let enrollments = self
                .enrollments
                .active_enrollments_for_student(student.id)
                .await?;
            let mut fee_total = Money::zero(self.currency);
            for enrollment in &enrollments {
                fee_total = fee_total.checked_add(&enrollment.monthly_fee)?;
            }
            let estimated_due = fee_total.multiply(Decimal::from(months_in_range));
            unpaid.push(UnpaidStudent {
                student_id: student.id,
                name: student.name,
                monthly_fee_total: fee_total,
                months_in_range,
                estimated_due,
            });
        }
        unpaid.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(unpaid)
    }

    /// Assembles the full dashboard payload
    pub async fn overview(&self, as_of: BillingMonth) -> Result<TuitionOverview, TuitionError> {
        let enrollments = self.enrollments.all_active_enrollments().await?;
        let rows_this_month = self.store.settlements_in_month(as_of).await?;

        let course_names: HashSet<&str> = enrollments
            .iter()
            .map(|e| e.course_name.as_str())
            .collect();

        Ok(TuitionOverview {
            total_students: self.students.count_active_students().await?,
            total_courses: course_names.len(),
            total_collected: self.store.total_collected(self.currency).await?,
            current_month_due: Self::shortfall(&enrollments, &rows_this_month, self.currency)?,
            trailing_12_months: self.trailing_12_months_collected(as_of).await?,
            course_counts: Self::counts_by_course(&enrollments),
            course_slot_counts: Self::counts_by_course_and_slot(&enrollments),
        })
    }

    /// Per-student shortfall, floored at zero per student before summing
    fn shortfall(
        enrollments: &[Enrollment],
        rows: &[Settlement],
        currency: Currency,
    ) -> Result<Money, TuitionError> {
        let mut enrollments_by_student: HashMap<StudentId, Vec<Enrollment>> = HashMap::new();
        for enrollment in enrollments {
            enrollments_by_student
                .entry(enrollment.student_id)
                .or_default()
                .push(enrollment.clone());
        }

        let mut rows_by_student: HashMap<StudentId, Vec<Settlement>> = HashMap::new();
        for row in rows {
            rows_by_student
                .entry(row.student_id)
                .or_default()
                .push(row.clone());
        }

        let empty: Vec<Settlement> = Vec::new();
        let mut total = Money::zero(currency);
        for (student_id, student_enrollments) in &enrollments_by_student {
            let student_rows = rows_by_student.get(student_id).unwrap_or(&empty);
            let shortfall = DuesCalculator::current_month_shortfall(
                student_enrollments,
                student_rows,
                currency,
            )?;
            total = total.checked_add(&shortfall)?;
        }
        Ok(total)
    }

    fn counts_by_course(enrollments: &[Enrollment]) -> Vec<CourseCount> {
        let mut by_course: BTreeMap<&str, HashSet<StudentId>> = BTreeMap::new();
        for enrollment in enrollments {
            by_course
                .entry(enrollment.course_name.as_str())
                .or_default()
                .insert(enrollment.student_id);
        }
        by_course
            .into_iter()
            .map(|(course_name, students)| CourseCount {
                course_name: course_name.to_string(),
                students: students.len(),
            })
            .collect()
    }

    fn counts_by_course_and_slot(enrollments: &[Enrollment]) -> Vec<CourseSlotCount> {
        let mut by_key: BTreeMap<(&str, &str), HashSet<StudentId>> = BTreeMap::new();
        for enrollment in enrollments {
            by_key
                .entry((
                    enrollment.course_name.as_str(),
                    enrollment.time_slot.as_str(),
                ))
                .or_default()
                .insert(enrollment.student_id);
        }
        by_key
            .into_iter()
            .map(|((course_name, time_slot), students)| CourseSlotCount {
                course_name: course_name.to_string(),
                time_slot: time_slot.to_string(),
                students: students.len(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mock::{MockRoster, MockTuitionStore};
    use crate::ports::WriteBatch;
    use crate::settlement::Settlement;
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;

    fn bdt(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::BDT)
    }

    fn month(year: i32, m: u32) -> BillingMonth {
        BillingMonth::new(year, m).unwrap()
    }

    fn aggregator(
        roster: &Arc<MockRoster>,
        store: &Arc<MockTuitionStore>,
    ) -> StatisticsAggregator {
        StatisticsAggregator::new(
            store.clone(),
            roster.clone(),
            roster.clone(),
            Currency::BDT,
        )
    }

    async fn seed_paid_row(
        store: &MockTuitionStore,
        enrollment: &Enrollment,
        month: BillingMonth,
        amount: Money,
    ) {
        let mut row = Settlement::unpaid(
            enrollment.student_id,
            enrollment.id,
            month,
            enrollment.monthly_fee,
        );
        row.receive(amount, Utc::now()).unwrap();
        store
            .commit(WriteBatch::new().create_settlement(row))
            .await
            .unwrap();
    }

    async fn student_and_enrollment(
        roster: &MockRoster,
        name: &str,
        course: &str,
        slot: &str,
        fee: Money,
    ) -> Enrollment {
        let student = crate::enrollment::Student::new(
            name,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        );
        let enrollment = Enrollment::new(
            student.id,
            course,
            slot,
            fee,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        );
        roster.add_student(student).await;
        roster.add_enrollment(enrollment.clone()).await;
        enrollment
    }

    #[tokio::test]
    async fn test_trailing_series_has_twelve_ordered_buckets() {
        let roster = Arc::new(MockRoster::new());
        let store = Arc::new(MockTuitionStore::new());
        let enrollment =
            student_and_enrollment(&roster, "Rahim", "Physics", "7:00 PM", bdt(dec!(500))).await;
        seed_paid_row(&store, &enrollment, month(2025, 7), bdt(dec!(300))).await;

        let stats = aggregator(&roster, &store);
        let series = stats
            .trailing_12_months_collected(month(2025, 7))
            .await
            .unwrap();

        assert_eq!(series.len(), 12);
        assert_eq!(series[0].month, month(2024, 8));
        assert_eq!(series[11].month, month(2025, 7));
        assert_eq!(series[11].collected, bdt(dec!(300)));
        assert!(series[..11].iter().all(|b| b.collected.is_zero()));
        assert_eq!(series[11].label, "August 2025");
    }

    #[tokio::test]
    async fn test_shortfall_floors_per_student() {
        let roster = Arc::new(MockRoster::new());
        let store = Arc::new(MockTuitionStore::new());

        // One student fully paid with an overpayment, one untouched.
        let paid_up =
            student_and_enrollment(&roster, "Karim", "Physics", "7:00 PM", bdt(dec!(500))).await;
        let _behind =
            student_and_enrollment(&roster, "Salma", "Chemistry", "5:00 PM", bdt(dec!(700))).await;
        seed_paid_row(&store, &paid_up, month(2025, 3), bdt(dec!(500))).await;

        let stats = aggregator(&roster, &store);
        let shortfall = stats.current_month_shortfall(month(2025, 3)).await.unwrap();

        // Karim's overshoot never offsets Salma's 700.
        assert_eq!(shortfall, bdt(dec!(700)));
    }

    #[tokio::test]
    async fn test_counts_group_distinct_students() {
        let roster = Arc::new(MockRoster::new());
        let store = Arc::new(MockTuitionStore::new());

        let rahim =
            student_and_enrollment(&roster, "Rahim", "Physics", "7:00 PM", bdt(dec!(500))).await;
        // Same student again in the same course, different slot.
        let second = Enrollment::new(
            rahim.student_id,
            "Physics",
            "9:00 AM",
            bdt(dec!(500)),
            NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
        );
        roster.add_enrollment(second).await;
        student_and_enrollment(&roster, "Salma", "Chemistry", "5:00 PM", bdt(dec!(700))).await;

        let stats = aggregator(&roster, &store);
        let by_course = stats.enrollment_counts_by_course().await.unwrap();
        let by_slot = stats.enrollment_counts_by_course_and_slot().await.unwrap();

        assert_eq!(by_course.len(), 2);
        assert_eq!(by_course[0].course_name, "Chemistry");
        assert_eq!(by_course[0].students, 1);
        assert_eq!(by_course[1].course_name, "Physics");
        // Distinct students, not enrollments.
        assert_eq!(by_course[1].students, 1);

        assert_eq!(by_slot.len(), 3);
        assert_eq!(by_slot[1].time_slot, "7:00 PM");
        assert_eq!(by_slot[2].time_slot, "9:00 AM");
    }

    #[tokio::test]
    async fn test_unpaid_range_lists_students_without_rows() {
        let roster = Arc::new(MockRoster::new());
        let store = Arc::new(MockTuitionStore::new());

        let payer =
            student_and_enrollment(&roster, "Karim", "Physics", "7:00 PM", bdt(dec!(500))).await;
        student_and_enrollment(&roster, "Salma", "Chemistry", "5:00 PM", bdt(dec!(700))).await;
        seed_paid_row(&store, &payer, month(2025, 1), bdt(dec!(100))).await;

        let stats = aggregator(&roster, &store);
        let unpaid = stats
            .unpaid_students_in_range(month(2025, 0), month(2025, 2))
            .await
            .unwrap();

        assert_eq!(unpaid.len(), 1);
        assert_eq!(unpaid[0].name, "Salma");
        assert_eq!(unpaid[0].months_in_range, 3);
        assert_eq!(unpaid[0].estimated_due, bdt(dec!(2100)));
    }

    #[tokio::test]
    async fn test_unpaid_range_rejects_inverted_bounds() {
        let roster = Arc::new(MockRoster::new());
        let store = Arc::new(MockTuitionStore::new());
        let stats = aggregator(&roster, &store);

        let err = stats
            .unpaid_students_in_range(month(2025, 5), month(2025, 1))
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_overview_assembles_all_sections() {
        let roster = Arc::new(MockRoster::new());
        let store = Arc::new(MockTuitionStore::new());

        let enrollment =
            student_and_enrollment(&roster, "Rahim", "Physics", "7:00 PM", bdt(dec!(500))).await;
        student_and_enrollment(&roster, "Salma", "Chemistry", "5:00 PM", bdt(dec!(700))).await;
        seed_paid_row(&store, &enrollment, month(2025, 3), bdt(dec!(500))).await;

        let stats = aggregator(&roster, &store);
        let overview = stats.overview(month(2025, 3)).await.unwrap();

        assert_eq!(overview.total_students, 2);
        assert_eq!(overview.total_courses, 2);
        assert_eq!(overview.total_collected, bdt(dec!(500)));
        assert_eq!(overview.current_month_due, bdt(dec!(700)));
        assert_eq!(overview.trailing_12_months.len(), 12);
        assert_eq!(overview.course_counts.len(), 2);
        assert_eq!(overview.course_slot_counts.len(), 2);
    }
}
