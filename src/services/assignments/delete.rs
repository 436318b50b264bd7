use chrono::{DateTime, Utc};

use crate::errors::{Result, TrackerError};
use crate::services::access::{AuthContext, require_owned_assignment};
use crate::storage::Storage;

/// 软删除作业，台账记录保留但不再对学生可见
pub async fn delete_assignment(
    storage: &dyn Storage,
    ctx: &AuthContext,
    assignment_id: i64,
    now: DateTime<Utc>,
) -> Result<()> {
    require_owned_assignment(storage, ctx, assignment_id).await?;

    if storage.delete_assignment(assignment_id, now).await? {
        tracing::info!("Assignment {} deleted by {}", assignment_id, ctx.user_id);
        Ok(())
    } else {
        Err(TrackerError::not_found("Assignment not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::*;

    #[tokio::test]
    async fn test_delete_then_missing() {
        let storage = storage().await;
        let alice = instructor(&storage, "teacher1").await;
        let bob = instructor(&storage, "teacher2").await;
        let a = assignment(&storage, &alice, "Essay", None).await;

        let err = delete_assignment(storage.as_ref(), &ctx(&bob), a.id, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E010");

        delete_assignment(storage.as_ref(), &ctx(&alice), a.id, Utc::now())
            .await
            .unwrap();
        let err = delete_assignment(storage.as_ref(), &ctx(&alice), a.id, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E009");
    }
}
