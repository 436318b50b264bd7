use chrono::{DateTime, Utc};

use crate::errors::{Result, TrackerError};
use crate::models::student_assignments::entities::{AssignmentStatus, StudentAssignmentDetail};
use crate::services::access::{AuthContext, require_student};
use crate::storage::Storage;

use super::list::parse_status;

fn not_assigned() -> TrackerError {
    TrackerError::not_found("Assignment not found")
}

/// 学生自己的一条台账记录
pub async fn get_entry(
    storage: &dyn Storage,
    ctx: &AuthContext,
    assignment_id: i64,
) -> Result<StudentAssignmentDetail> {
    let student = require_student(storage, ctx).await?;
    storage
        .get_student_assignment_detail(assignment_id, student.id)
        .await?
        .ok_or_else(not_assigned)
}

/// 直接设置台账状态
///
/// 状态之间没有强制顺序；进入 completed 时记录完成时间，离开时保留。
pub async fn set_status(
    storage: &dyn Storage,
    ctx: &AuthContext,
    assignment_id: i64,
    status: AssignmentStatus,
    now: DateTime<Utc>,
) -> Result<StudentAssignmentDetail> {
    let student = require_student(storage, ctx).await?;

    // 作业已删除的记录对学生不可见，也不能再修改
    let detail = storage
        .get_student_assignment_detail(assignment_id, student.id)
        .await?
        .ok_or_else(not_assigned)?;

    let entry = storage
        .update_student_assignment_status(assignment_id, student.id, status, now)
        .await?
        .ok_or_else(not_assigned)?;
    tracing::debug!(
        "Student {} set assignment {} to {}",
        student.id,
        assignment_id,
        status
    );

    Ok(StudentAssignmentDetail {
        entry,
        assignment: detail.assignment,
    })
}

pub async fn update_status(
    storage: &dyn Storage,
    ctx: &AuthContext,
    assignment_id: i64,
    status: &str,
    now: DateTime<Utc>,
) -> Result<StudentAssignmentDetail> {
    let status = parse_status(status)?;
    set_status(storage, ctx, assignment_id, status, now).await
}

pub async fn mark_completed(
    storage: &dyn Storage,
    ctx: &AuthContext,
    assignment_id: i64,
    now: DateTime<Utc>,
) -> Result<StudentAssignmentDetail> {
    set_status(storage, ctx, assignment_id, AssignmentStatus::Completed, now).await
}

pub async fn mark_in_progress(
    storage: &dyn Storage,
    ctx: &AuthContext,
    assignment_id: i64,
    now: DateTime<Utc>,
) -> Result<StudentAssignmentDetail> {
    set_status(storage, ctx, assignment_id, AssignmentStatus::InProgress, now).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::*;

    #[tokio::test]
    async fn test_status_lifecycle() {
        let storage = storage().await;
        let alice = instructor(&storage, "teacher1").await;
        let s1 = student(&storage, "student1").await;
        let a = assignment(&storage, &alice, "Essay", None).await;
        assign(&storage, &a, &[&s1], Utc::now()).await;

        let fresh = get_entry(storage.as_ref(), &ctx(&s1), a.id).await.unwrap();
        assert_eq!(fresh.entry.status, AssignmentStatus::Assigned);
        assert!(fresh.entry.completed_at.is_none());

        let done = mark_completed(storage.as_ref(), &ctx(&s1), a.id, Utc::now())
            .await
            .unwrap();
        assert!(done.entry.completed_at.is_some());

        // 回退状态不会清除完成时间
        let back = mark_in_progress(storage.as_ref(), &ctx(&s1), a.id, Utc::now())
            .await
            .unwrap();
        assert_eq!(back.entry.status, AssignmentStatus::InProgress);
        assert_eq!(back.entry.completed_at, done.entry.completed_at);

        let err = update_status(storage.as_ref(), &ctx(&s1), a.id, "finished", Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E015");
        let assigned = update_status(storage.as_ref(), &ctx(&s1), a.id, "assigned", Utc::now())
            .await
            .unwrap();
        assert_eq!(assigned.entry.status, AssignmentStatus::Assigned);
    }

    #[tokio::test]
    async fn test_unassigned_or_deleted_is_not_found() {
        let storage = storage().await;
        let alice = instructor(&storage, "teacher1").await;
        let s1 = student(&storage, "student1").await;
        let s2 = student(&storage, "student2").await;
        let a = assignment(&storage, &alice, "Essay", None).await;
        assign(&storage, &a, &[&s1], Utc::now()).await;

        let err = mark_completed(storage.as_ref(), &ctx(&s2), a.id, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E009");

        storage.delete_assignment(a.id, Utc::now()).await.unwrap();
        let err = get_entry(storage.as_ref(), &ctx(&s1), a.id).await.unwrap_err();
        assert_eq!(err.code(), "E009");
        let err = mark_completed(storage.as_ref(), &ctx(&s1), a.id, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E009");
    }
}
