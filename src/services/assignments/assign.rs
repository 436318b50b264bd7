use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::errors::{Result, TrackerError};
use crate::models::assignments::responses::AssignStudentsResponse;
use crate::services::access::{AuthContext, require_owned_assignment};
use crate::storage::Storage;

/// 批量分配学生
///
/// 先过滤掉已有有效记录的学生，再在一个事务里插入其余学生；
/// 并发的重复分配由 (assignment_id, student_id) 唯一索引兜底。
pub async fn assign_students(
    storage: &dyn Storage,
    ctx: &AuthContext,
    assignment_id: i64,
    student_ids: &[i64],
    now: DateTime<Utc>,
) -> Result<AssignStudentsResponse> {
    let (instructor, assignment) = require_owned_assignment(storage, ctx, assignment_id).await?;

    let mut seen = HashSet::new();
    let requested: Vec<i64> = student_ids
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect();
    if requested.is_empty() {
        return Err(TrackerError::validation("At least one student is required"));
    }

    let students: HashSet<i64> = storage
        .get_users_by_ids(&requested)
        .await?
        .into_iter()
        .filter(|user| user.is_student())
        .map(|user| user.id)
        .collect();
    let invalid: Vec<String> = requested
        .iter()
        .filter(|id| !students.contains(*id))
        .map(|id| id.to_string())
        .collect();
    if !invalid.is_empty() {
        return Err(TrackerError::invalid_students(format!(
            "Invalid student IDs: {}",
            invalid.join(", ")
        )));
    }

    let already_assigned = storage
        .list_assigned_student_ids(assignment.id, &requested)
        .await?;
    let remaining: Vec<i64> = requested
        .into_iter()
        .filter(|id| !already_assigned.contains(id))
        .collect();
    if remaining.is_empty() {
        return Err(TrackerError::all_already_assigned(
            "All selected students are already assigned to this assignment",
        ));
    }

    let entries = storage
        .assign_students(assignment.id, &remaining, now)
        .await?;
    tracing::info!(
        "Instructor {} assigned {} students to assignment {}",
        instructor.id,
        entries.len(),
        assignment.id
    );

    Ok(AssignStudentsResponse {
        assigned: remaining,
        already_assigned,
    })
}
