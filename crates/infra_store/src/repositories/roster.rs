//! Roster repository implementation
//!
//! Adapts the document store to the roster ports and carries the write
//! side of roster administration: registering students, opening and
//! closing enrollments. Ledger writes never come through here.

use async_trait::async_trait;

use core_kernel::{DomainPort, EnrollmentId, PortError, StudentId};
use domain_tuition::{Enrollment, EnrollmentSource, Student, StudentSource};

use crate::error::StoreError;
use crate::store::MemoryStore;

/// Repository for students and enrollments
#[derive(Clone)]
pub struct RosterRepository {
    store: MemoryStore,
}

impl RosterRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }

    /// Inserts or replaces a student record
    pub async fn save_student(&self, student: Student) {
        let mut state = self.store.write().await;
        state.students.insert(student.id, student);
    }

    /// Inserts or replaces an enrollment; the student must exist
    pub async fn save_enrollment(&self, enrollment: Enrollment) -> Result<(), StoreError> {
        let mut state = self.store.write().await;
        if !state.students.contains_key(&enrollment.student_id) {
            return Err(StoreError::not_found("Student", enrollment.student_id));
        }
        state.enrollments.insert(enrollment.id, enrollment);
        Ok(())
    }

    /// Marks an enrollment inactive, keeping its history readable
    pub async fn deactivate_enrollment(&self, id: EnrollmentId) -> Result<(), StoreError> {
        let mut state = self.store.write().await;
        match state.enrollments.get_mut(&id) {
            Some(enrollment) => {
                enrollment.deactivate();
                Ok(())
            }
            None => Err(StoreError::not_found("Enrollment", id)),
        }
    }

    /// Marks a student inactive; their enrollments drop out of the
    /// active views
    pub async fn deactivate_student(&self, id: StudentId) -> Result<(), StoreError> {
        let mut state = self.store.write().await;
        match state.students.get_mut(&id) {
            Some(student) => {
                student.active = false;
                Ok(())
            }
            None => Err(StoreError::not_found("Student", id)),
        }
    }
}

impl DomainPort for RosterRepository {}

#[async_trait]
impl EnrollmentSource for RosterRepository {
    async fn get_enrollment(&self, id: EnrollmentId) -> Result<Enrollment, PortError> {
        let state = self.store.read().await;
        state
            .enrollments
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Enrollment", id))
    }

    async fn active_enrollments_for_student(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<Enrollment>, PortError> {
        let state = self.store.read().await;
        let student_active = state
            .students
            .get(&student_id)
            .map(|s| s.active)
            .unwrap_or(false);
        if !student_active {
            return Ok(Vec::new());
        }
        let mut rows: Vec<Enrollment> = state
            .enrollments
            .values()
            .filter(|e| e.student_id == student_id && e.active)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.enrolled_on.cmp(&b.enrolled_on));
        Ok(rows)
    }

    async fn all_active_enrollments(&self) -> Result<Vec<Enrollment>, PortError> {
        let state = self.store.read().await;
        Ok(state
            .enrollments
            .values()
            .filter(|e| {
                e.active
                    && state
                        .students
                        .get(&e.student_id)
                        .map(|s| s.active)
                        .unwrap_or(false)
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl StudentSource for RosterRepository {
    async fn get_student(&self, id: StudentId) -> Result<Student, PortError> {
        let state = self.store.read().await;
        state
            .students
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Student", id))
    }

    async fn list_active_students(&self) -> Result<Vec<Student>, PortError> {
        let state = self.store.read().await;
        Ok(state.students.values().filter(|s| s.active).cloned().collect())
    }

    async fn count_active_students(&self) -> Result<u64, PortError> {
        let state = self.store.read().await;
        Ok(state.students.values().filter(|s| s.active).count() as u64)
    }
}
