use crate::errors::Result;
use crate::models::assignments::{entities::Assignment, requests::AssignmentListParams};
use crate::services::access::{AuthContext, require_instructor};
use crate::storage::Storage;

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// 列出教师自己的作业，category 优先于 search
pub async fn list_assignments(
    storage: &dyn Storage,
    ctx: &AuthContext,
    params: &AssignmentListParams,
) -> Result<Vec<Assignment>> {
    let instructor = require_instructor(storage, ctx).await?;

    match (non_empty(&params.category), non_empty(&params.search)) {
        (Some(category), _) => {
            storage
                .list_assignments_by_category(instructor.id, category)
                .await
        }
        (None, Some(query)) => storage.search_assignments(instructor.id, query).await,
        (None, None) => storage.list_assignments_by_instructor(instructor.id).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::*;

    fn params(category: Option<&str>, search: Option<&str>) -> AssignmentListParams {
        AssignmentListParams {
            category: category.map(String::from),
            search: search.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_filters() {
        let storage = storage().await;
        let alice = instructor(&storage, "teacher1").await;
        assignment_in(&storage, &alice, "Hamlet", "drama", None).await;
        assignment_in(&storage, &alice, "Odyssey", "epic", None).await;
        assignment_in(&storage, &alice, "Macbeth", "drama", None).await;

        let all = list_assignments(storage.as_ref(), &ctx(&alice), &params(None, None))
            .await
            .unwrap();
        assert_eq!(all.len(), 3);

        let drama = list_assignments(storage.as_ref(), &ctx(&alice), &params(Some("drama"), None))
            .await
            .unwrap();
        assert_eq!(drama.len(), 2);

        let found = list_assignments(storage.as_ref(), &ctx(&alice), &params(None, Some("odys")))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Odyssey");

        // category 优先
        let both = list_assignments(
            storage.as_ref(),
            &ctx(&alice),
            &params(Some("epic"), Some("Hamlet")),
        )
        .await
        .unwrap();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].title, "Odyssey");

        let blank = list_assignments(storage.as_ref(), &ctx(&alice), &params(Some("  "), None))
            .await
            .unwrap();
        assert_eq!(blank.len(), 3);
    }

    #[tokio::test]
    async fn test_student_cannot_list() {
        let storage = storage().await;
        let pupil = student(&storage, "student1").await;

        let err = list_assignments(storage.as_ref(), &ctx(&pupil), &params(None, None))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E017");
    }
}
