use chrono::{DateTime, Utc};

use crate::errors::Result;
use crate::models::progress::responses::{
    DetailedProgressReport, StatusBreakdown, StudentProgressDetail,
};
use crate::services::access::{AuthContext, require_owned_assignment};
use crate::storage::Storage;

use super::percentage;

/// 逐个学生的进度明细
pub async fn detailed_report(
    storage: &dyn Storage,
    ctx: &AuthContext,
    assignment_id: i64,
    now: DateTime<Utc>,
) -> Result<DetailedProgressReport> {
    let (_, assignment) = require_owned_assignment(storage, ctx, assignment_id).await?;
    let students = storage.list_assigned_students(assignment.id).await?;

    let mut breakdown = StatusBreakdown::default();
    let mut overdue_count = 0;
    let mut completed_hours = 0;
    let mut details = Vec::with_capacity(students.len());

    for row in students {
        let entry = row.entry;
        let is_overdue = !entry.is_completed() && assignment.is_overdue(now);
        let hours = entry.hours_to_complete();

        breakdown.add(entry.status, 1);
        if is_overdue {
            overdue_count += 1;
        }
        if entry.is_completed() {
            completed_hours += hours.unwrap_or(0);
        }

        details.push(StudentProgressDetail {
            student_id: row.student.id,
            student_name: row.student.username,
            student_email: row.student.email,
            status: entry.status,
            assigned_at: entry.created_at,
            completed_at: entry.completed_at,
            time_to_complete_hours: hours,
            is_overdue,
        });
    }

    let total = breakdown.total();
    let average_time_to_complete_hours = if breakdown.completed > 0 {
        completed_hours / breakdown.completed
    } else {
        0
    };

    Ok(DetailedProgressReport {
        assignment_id: assignment.id,
        title: assignment.title,
        total_students: total,
        completion_rate: percentage(breakdown.completed, total),
        average_time_to_complete_hours,
        status_breakdown: breakdown,
        overdue_count,
        student_details: details,
        created_at: assignment.created_at,
        due_date: assignment.due_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::student_assignments::entities::AssignmentStatus;
    use crate::services::test_support::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_report_hours_and_overdue() {
        let storage = storage().await;
        let now = Utc::now();
        let alice = instructor(&storage, "teacher1").await;
        let s1 = student(&storage, "student1").await;
        let s2 = student(&storage, "student2").await;
        let a = assignment(&storage, &alice, "Essay", Some(now - Duration::hours(1))).await;
        assign(&storage, &a, &[&s1, &s2], now - Duration::hours(10)).await;
        storage
            .update_student_assignment_status(
                a.id,
                s1.id,
                AssignmentStatus::Completed,
                now - Duration::minutes(270),
            )
            .await
            .unwrap();

        let report = detailed_report(storage.as_ref(), &ctx(&alice), a.id, now)
            .await
            .unwrap();
        assert_eq!(report.total_students, 2);
        assert_eq!(report.completion_rate, 50.0);
        assert_eq!(report.overdue_count, 1);
        // 10h - 4.5h = 5.5h，向下取整
        assert_eq!(report.average_time_to_complete_hours, 5);

        let done = &report.student_details[0];
        assert_eq!(done.student_name, "student1");
        assert_eq!(done.time_to_complete_hours, Some(5));
        assert!(!done.is_overdue);
        let late = &report.student_details[1];
        assert!(late.is_overdue);
        assert!(late.time_to_complete_hours.is_none());
    }

    #[tokio::test]
    async fn test_report_requires_owner() {
        let storage = storage().await;
        let alice = instructor(&storage, "teacher1").await;
        let bob = instructor(&storage, "teacher2").await;
        let a = assignment(&storage, &alice, "Essay", None).await;

        let err = detailed_report(storage.as_ref(), &ctx(&bob), a.id, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E010");
    }
}
