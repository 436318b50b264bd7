use chrono::{DateTime, Utc};

use crate::errors::Result;
use crate::models::{
    assignments::responses::InstructorDashboardStats, progress::responses::StatusBreakdown,
};
use crate::services::access::{AuthContext, require_instructor};
use crate::services::progress::percentage;
use crate::storage::Storage;

/// 教师仪表盘统计
pub async fn dashboard_stats(
    storage: &dyn Storage,
    ctx: &AuthContext,
    now: DateTime<Utc>,
) -> Result<InstructorDashboardStats> {
    let instructor = require_instructor(storage, ctx).await?;

    let assignments = storage.list_assignments_by_instructor(instructor.id).await?;
    let students = storage.list_students().await?;
    let entries = storage.list_entries_by_instructor(instructor.id).await?;

    let mut breakdown = StatusBreakdown::default();
    for entry in &entries {
        breakdown.add(entry.status, 1);
    }
    let total = breakdown.total();

    Ok(InstructorDashboardStats {
        total_assignments: assignments.len() as i64,
        total_students: students.len() as i64,
        total_student_assignments: total,
        total_assigned: breakdown.assigned,
        total_in_progress: breakdown.in_progress,
        total_completed: breakdown.completed,
        completion_rate: percentage(breakdown.completed, total),
        overdue_assignments: assignments.iter().filter(|a| a.is_overdue(now)).count() as i64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::student_assignments::entities::AssignmentStatus;
    use crate::services::test_support::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_dashboard_stats() {
        let storage = storage().await;
        let now = Utc::now();
        let alice = instructor(&storage, "teacher1").await;
        let s1 = student(&storage, "student1").await;
        let s2 = student(&storage, "student2").await;
        student(&storage, "student3").await;
        let past = assignment(&storage, &alice, "Past", Some(now - Duration::days(2))).await;
        assignment(&storage, &alice, "Open", None).await;
        assign(&storage, &past, &[&s1, &s2], now).await;
        storage
            .update_student_assignment_status(past.id, s1.id, AssignmentStatus::Completed, now)
            .await
            .unwrap();

        let stats = dashboard_stats(storage.as_ref(), &ctx(&alice), now)
            .await
            .unwrap();
        assert_eq!(
            stats,
            InstructorDashboardStats {
                total_assignments: 2,
                total_students: 3,
                total_student_assignments: 2,
                total_assigned: 1,
                total_in_progress: 0,
                total_completed: 1,
                completion_rate: 50.0,
                overdue_assignments: 1,
            }
        );
    }
}
