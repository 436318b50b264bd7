use chrono::{DateTime, Utc};

use crate::errors::{Result, TrackerError};
use crate::services::access::{AuthContext, require_owned_assignment};
use crate::storage::Storage;

/// 把学生从作业中移除（软删除台账记录）
pub async fn remove_student(
    storage: &dyn Storage,
    ctx: &AuthContext,
    assignment_id: i64,
    student_id: i64,
    now: DateTime<Utc>,
) -> Result<()> {
    require_owned_assignment(storage, ctx, assignment_id).await?;

    if storage
        .remove_student_assignment(assignment_id, student_id, now)
        .await?
    {
        tracing::info!(
            "Student {} removed from assignment {}",
            student_id,
            assignment_id
        );
        Ok(())
    } else {
        Err(TrackerError::not_found(
            "Student is not assigned to this assignment",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::*;

    #[tokio::test]
    async fn test_remove_then_reassign() {
        let storage = storage().await;
        let alice = instructor(&storage, "teacher1").await;
        let s1 = student(&storage, "student1").await;
        let a = assignment(&storage, &alice, "Essay", None).await;
        assign(&storage, &a, &[&s1], Utc::now()).await;

        remove_student(storage.as_ref(), &ctx(&alice), a.id, s1.id, Utc::now())
            .await
            .unwrap();
        let err = remove_student(storage.as_ref(), &ctx(&alice), a.id, s1.id, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E009");

        let result = crate::services::assignments::assign::assign_students(
            storage.as_ref(),
            &ctx(&alice),
            a.id,
            &[s1.id],
            Utc::now(),
        )
        .await
        .unwrap();
        assert_eq!(result.assigned, vec![s1.id]);
    }
}
