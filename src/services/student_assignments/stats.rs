use chrono::{DateTime, Utc};

use crate::errors::Result;
use crate::models::student_assignments::{
    entities::AssignmentStatus, requests::StudentAssignmentFilter,
    responses::StudentDashboardStats,
};
use crate::services::access::{AuthContext, require_student};
use crate::storage::Storage;

/// 学生仪表盘：各状态数量以及过期未完成数量
pub async fn dashboard_stats(
    storage: &dyn Storage,
    ctx: &AuthContext,
    now: DateTime<Utc>,
) -> Result<StudentDashboardStats> {
    let student = require_student(storage, ctx).await?;
    let entries = storage
        .list_student_assignments(student.id, StudentAssignmentFilter::All)
        .await?;

    let mut stats = StudentDashboardStats {
        total: entries.len() as i64,
        ..Default::default()
    };
    for detail in &entries {
        match detail.entry.status {
            AssignmentStatus::Assigned => stats.assigned += 1,
            AssignmentStatus::InProgress => stats.in_progress += 1,
            AssignmentStatus::Completed => stats.completed += 1,
        }
        if detail.is_overdue(now) {
            stats.overdue += 1;
        }
    }

    Ok(stats)
}

/// 学生作业涉及的分类（去重、非空、排序）
pub async fn categories(storage: &dyn Storage, ctx: &AuthContext) -> Result<Vec<String>> {
    let student = require_student(storage, ctx).await?;
    storage.list_student_categories(student.id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_dashboard_and_categories() {
        let storage = storage().await;
        let now = Utc::now();
        let alice = instructor(&storage, "teacher1").await;
        let s1 = student(&storage, "student1").await;
        let late = assignment_in(&storage, &alice, "Late", "epic", Some(now - Duration::days(1))).await;
        let open = assignment_in(&storage, &alice, "Open", "drama", None).await;
        let loose = assignment_in(&storage, &alice, "Loose", "", None).await;
        assign(&storage, &late, &[&s1], now).await;
        assign(&storage, &open, &[&s1], now).await;
        assign(&storage, &loose, &[&s1], now).await;
        storage
            .update_student_assignment_status(open.id, s1.id, AssignmentStatus::InProgress, now)
            .await
            .unwrap();
        storage
            .update_student_assignment_status(loose.id, s1.id, AssignmentStatus::Completed, now)
            .await
            .unwrap();

        let stats = dashboard_stats(storage.as_ref(), &ctx(&s1), now).await.unwrap();
        assert_eq!(
            stats,
            StudentDashboardStats {
                total: 3,
                assigned: 1,
                in_progress: 1,
                completed: 1,
                overdue: 1,
            }
        );

        let categories = categories(storage.as_ref(), &ctx(&s1)).await.unwrap();
        assert_eq!(categories, vec!["drama".to_string(), "epic".to_string()]);
    }
}
