use chrono::{DateTime, Utc};

use super::create::validated_fields;
use crate::errors::{Result, TrackerError};
use crate::models::assignments::{entities::Assignment, requests::AssignmentRequest};
use crate::services::access::{AuthContext, require_owned_assignment};
use crate::storage::Storage;

/// 整体替换作业字段，只有创建者可以修改
pub async fn update_assignment(
    storage: &dyn Storage,
    ctx: &AuthContext,
    assignment_id: i64,
    req: AssignmentRequest,
    now: DateTime<Utc>,
) -> Result<Assignment> {
    require_owned_assignment(storage, ctx, assignment_id).await?;
    let fields = validated_fields(req)?;

    storage
        .update_assignment(assignment_id, fields, now)
        .await?
        .ok_or_else(|| TrackerError::not_found("Assignment not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::*;

    fn request(title: &str) -> AssignmentRequest {
        AssignmentRequest {
            title: title.to_string(),
            url: "https://example.com/new".to_string(),
            due_date: Some("2030-01-15".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_owner_updates() {
        let storage = storage().await;
        let alice = instructor(&storage, "teacher1").await;
        let a = assignment(&storage, &alice, "Draft", None).await;

        let updated = update_assignment(
            storage.as_ref(),
            &ctx(&alice),
            a.id,
            request("Final"),
            Utc::now(),
        )
        .await
        .unwrap();
        assert_eq!(updated.title, "Final");
        assert!(updated.due_date.is_some());
    }

    #[tokio::test]
    async fn test_other_instructor_denied() {
        let storage = storage().await;
        let alice = instructor(&storage, "teacher1").await;
        let bob = instructor(&storage, "teacher2").await;
        let a = assignment(&storage, &alice, "Draft", None).await;

        let err = update_assignment(storage.as_ref(), &ctx(&bob), a.id, request("Mine"), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E010");
    }

    #[tokio::test]
    async fn test_update_revalidates() {
        let storage = storage().await;
        let alice = instructor(&storage, "teacher1").await;
        let a = assignment(&storage, &alice, "Draft", None).await;

        let err = update_assignment(storage.as_ref(), &ctx(&alice), a.id, request(""), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E007");
    }
}
