use crate::errors::{Result, TrackerError};
use crate::models::assignments::entities::Assignment;
use crate::models::users::entities::UserRole;
use crate::services::access::AuthContext;
use crate::storage::Storage;

/// 按 ID 获取作业
///
/// 创建者或持有有效台账记录的学生可以访问；其他情况一律返回 NotFound，不暴露作业是否存在。
pub async fn get_assignment(
    storage: &dyn Storage,
    ctx: &AuthContext,
    assignment_id: i64,
) -> Result<Assignment> {
    let not_found = || TrackerError::not_found("Assignment not found");

    let requester = storage.get_user_by_id(ctx.user_id).await?.ok_or_else(not_found)?;
    let assignment = storage
        .get_assignment_by_id(assignment_id)
        .await?
        .ok_or_else(not_found)?;

    let allowed = match requester.role {
        UserRole::Instructor => assignment.is_owned_by(requester.id),
        UserRole::Student => storage
            .get_student_assignment(assignment_id, requester.id)
            .await?
            .is_some(),
    };

    if allowed { Ok(assignment) } else { Err(not_found()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_visibility() {
        let storage = storage().await;
        let alice = instructor(&storage, "teacher1").await;
        let bob = instructor(&storage, "teacher2").await;
        let s1 = student(&storage, "student1").await;
        let s2 = student(&storage, "student2").await;
        let a = assignment(&storage, &alice, "Essay", None).await;
        assign(&storage, &a, &[&s1], Utc::now()).await;

        assert!(get_assignment(storage.as_ref(), &ctx(&alice), a.id).await.is_ok());
        assert!(get_assignment(storage.as_ref(), &ctx(&s1), a.id).await.is_ok());

        for outsider in [&bob, &s2] {
            let err = get_assignment(storage.as_ref(), &ctx(outsider), a.id)
                .await
                .unwrap_err();
            assert_eq!(err.code(), "E009");
        }
    }

    #[tokio::test]
    async fn test_removed_student_loses_access() {
        let storage = storage().await;
        let alice = instructor(&storage, "teacher1").await;
        let s1 = student(&storage, "student1").await;
        let a = assignment(&storage, &alice, "Essay", None).await;
        assign(&storage, &a, &[&s1], Utc::now()).await;
        storage
            .remove_student_assignment(a.id, s1.id, Utc::now())
            .await
            .unwrap();

        let err = get_assignment(storage.as_ref(), &ctx(&s1), a.id)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E009");
    }
}
