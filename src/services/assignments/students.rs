use crate::errors::Result;
use crate::models::{
    assignments::responses::AssignmentStudentsResponse, users::entities::User,
};
use crate::services::access::{AuthContext, require_instructor, require_owned_assignment};
use crate::storage::Storage;

/// 某作业下的学生及其进度
pub async fn assignment_students(
    storage: &dyn Storage,
    ctx: &AuthContext,
    assignment_id: i64,
) -> Result<AssignmentStudentsResponse> {
    let (_, assignment) = require_owned_assignment(storage, ctx, assignment_id).await?;
    let items = storage.list_assigned_students(assignment.id).await?;

    Ok(AssignmentStudentsResponse {
        assignment_id: assignment.id,
        total: items.len() as i64,
        items,
    })
}

/// 全部学生账号，供教师挑选分配对象
pub async fn list_students(storage: &dyn Storage, ctx: &AuthContext) -> Result<Vec<User>> {
    require_instructor(storage, ctx).await?;
    storage.list_students().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_assignment_students() {
        let storage = storage().await;
        let alice = instructor(&storage, "teacher1").await;
        let s1 = student(&storage, "student1").await;
        let s2 = student(&storage, "student2").await;
        let a = assignment(&storage, &alice, "Essay", None).await;
        assign(&storage, &a, &[&s2, &s1], Utc::now()).await;

        let response = assignment_students(storage.as_ref(), &ctx(&alice), a.id)
            .await
            .unwrap();
        assert_eq!(response.total, 2);
        assert_eq!(response.items[0].student.username, "student1");

        let students = list_students(storage.as_ref(), &ctx(&alice)).await.unwrap();
        assert_eq!(students.len(), 2);
        assert!(list_students(storage.as_ref(), &ctx(&s1)).await.is_err());
    }
}
