use crate::errors::Result;
use crate::models::progress::responses::AssignmentProgress;
use crate::services::access::{AuthContext, require_owned_assignment};
use crate::storage::Storage;

use super::percentage;

/// 作业的状态分布，没有学生时所有百分比为 0
pub async fn assignment_progress(
    storage: &dyn Storage,
    ctx: &AuthContext,
    assignment_id: i64,
) -> Result<AssignmentProgress> {
    let (_, assignment) = require_owned_assignment(storage, ctx, assignment_id).await?;
    let breakdown = storage.count_statuses_for_assignment(assignment.id).await?;
    let total = breakdown.total();

    Ok(AssignmentProgress {
        assignment_id: assignment.id,
        total_students: total,
        assigned: breakdown.assigned,
        in_progress: breakdown.in_progress,
        completed: breakdown.completed,
        assigned_percentage: percentage(breakdown.assigned, total),
        in_progress_percentage: percentage(breakdown.in_progress, total),
        completed_percentage: percentage(breakdown.completed, total),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::student_assignments::entities::AssignmentStatus;
    use crate::services::test_support::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_three_students_one_each() {
        let storage = storage().await;
        let alice = instructor(&storage, "teacher1").await;
        let s1 = student(&storage, "student1").await;
        let s2 = student(&storage, "student2").await;
        let s3 = student(&storage, "student3").await;
        let a = assignment_in(&storage, &alice, "Test", "reading", None).await;
        assign(&storage, &a, &[&s1, &s2, &s3], Utc::now()).await;
        storage
            .update_student_assignment_status(a.id, s2.id, AssignmentStatus::InProgress, Utc::now())
            .await
            .unwrap();
        storage
            .update_student_assignment_status(a.id, s3.id, AssignmentStatus::Completed, Utc::now())
            .await
            .unwrap();

        let progress = assignment_progress(storage.as_ref(), &ctx(&alice), a.id)
            .await
            .unwrap();
        assert_eq!(progress.total_students, 3);
        assert_eq!(
            (progress.assigned, progress.in_progress, progress.completed),
            (1, 1, 1)
        );
        for pct in [
            progress.assigned_percentage,
            progress.in_progress_percentage,
            progress.completed_percentage,
        ] {
            assert!((pct - 33.33).abs() < 0.01);
        }
        let sum = progress.assigned_percentage
            + progress.in_progress_percentage
            + progress.completed_percentage;
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_empty_assignment_is_all_zero() {
        let storage = storage().await;
        let alice = instructor(&storage, "teacher1").await;
        let a = assignment(&storage, &alice, "Empty", None).await;

        let progress = assignment_progress(storage.as_ref(), &ctx(&alice), a.id)
            .await
            .unwrap();
        assert_eq!(progress.total_students, 0);
        assert_eq!(progress.assigned_percentage, 0.0);
        assert_eq!(progress.in_progress_percentage, 0.0);
        assert_eq!(progress.completed_percentage, 0.0);
    }
}
