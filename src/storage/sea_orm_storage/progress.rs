//! 进度统计存储操作

use super::SeaOrmStorage;
use crate::entity::assignments::{Column as AssignmentColumn, Entity as Assignments};
use crate::entity::student_assignments::{Column, Entity as StudentAssignments};
use crate::entity::users::{Column as UserColumn, Entity as Users};
use crate::errors::{Result, TrackerError};
use crate::models::{
    progress::responses::StatusBreakdown,
    student_assignments::entities::{AssignmentStatus, StudentAssignment},
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

impl SeaOrmStorage {
    /// 按状态统计作业的有效台账记录，已停用的学生不计入
    pub async fn count_statuses_for_assignment_impl(
        &self,
        assignment_id: i64,
    ) -> Result<StatusBreakdown> {
        let rows: Vec<(String, i64)> = StudentAssignments::find()
            .select_only()
            .column(Column::Status)
            .column_as(Column::Id.count(), "count")
            .inner_join(Users)
            .filter(Column::AssignmentId.eq(assignment_id))
            .filter(Column::DeletedAt.is_null())
            .filter(UserColumn::DeletedAt.is_null())
            .group_by(Column::Status)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("统计作业进度失败: {e}")))?;

        let mut breakdown = StatusBreakdown::default();
        for (status, count) in rows {
            match status.parse::<AssignmentStatus>() {
                Ok(status) => breakdown.add(status, count),
                Err(_) => tracing::warn!("忽略未知的台账状态: {}", status),
            }
        }

        Ok(breakdown)
    }

    /// 教师名下未删除作业的全部有效台账记录，已停用的学生不计入
    pub async fn list_entries_by_instructor_impl(
        &self,
        instructor_id: i64,
    ) -> Result<Vec<StudentAssignment>> {
        let entries = StudentAssignments::find()
            .inner_join(Assignments)
            .inner_join(Users)
            .filter(AssignmentColumn::CreatedBy.eq(instructor_id))
            .filter(AssignmentColumn::DeletedAt.is_null())
            .filter(UserColumn::DeletedAt.is_null())
            .filter(Column::DeletedAt.is_null())
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("查询教师台账失败: {e}")))?;

        Ok(entries
            .into_iter()
            .map(|m| m.into_student_assignment())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assignments::entities::AssignmentFields;
    use crate::models::users::{entities::UserRole, requests::NewLocalUser};
    use chrono::Utc;

    /// 一位教师、三名学生，一条作业分给全部学生
    async fn seeded() -> (SeaOrmStorage, Vec<i64>, i64) {
        let storage = SeaOrmStorage::in_memory().await;
        let mut ids = Vec::new();
        for (name, role) in [
            ("teacher1", UserRole::Instructor),
            ("student1", UserRole::Student),
            ("student2", UserRole::Student),
            ("student3", UserRole::Student),
        ] {
            let user = storage
                .create_user_impl(
                    NewLocalUser {
                        username: name.to_string(),
                        email: format!("{name}@example.com"),
                        password_hash: "hash".to_string(),
                        role,
                    },
                    Utc::now(),
                )
                .await
                .unwrap();
            ids.push(user.id);
        }
        let assignment = storage
            .create_assignment_impl(
                ids[0],
                AssignmentFields {
                    title: "Test".to_string(),
                    description: String::new(),
                    url: "https://x".to_string(),
                    category: "reading".to_string(),
                    due_date: None,
                },
                Utc::now(),
            )
            .await
            .unwrap();
        storage
            .assign_students_impl(assignment.id, &ids[1..], Utc::now())
            .await
            .unwrap();
        (storage, ids, assignment.id)
    }

    #[tokio::test]
    async fn test_status_counts_skip_removed_entries() {
        let (storage, ids, assignment_id) = seeded().await;
        storage
            .update_student_assignment_status_impl(
                assignment_id,
                ids[2],
                AssignmentStatus::Completed,
                Utc::now(),
            )
            .await
            .unwrap();
        storage
            .remove_student_assignment_impl(assignment_id, ids[3], Utc::now())
            .await
            .unwrap();

        let breakdown = storage
            .count_statuses_for_assignment_impl(assignment_id)
            .await
            .unwrap();
        assert_eq!(
            breakdown,
            StatusBreakdown {
                assigned: 1,
                in_progress: 0,
                completed: 1,
            }
        );

        let entries = storage.list_entries_by_instructor_impl(ids[0]).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(
            storage
                .list_entries_by_instructor_impl(ids[1])
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_deactivated_students_are_not_counted() {
        let (storage, ids, assignment_id) = seeded().await;
        Users::update_many()
            .col_expr(
                UserColumn::DeletedAt,
                sea_orm::sea_query::Expr::value(Utc::now().timestamp()),
            )
            .filter(UserColumn::Id.eq(ids[1]))
            .exec(&storage.db)
            .await
            .unwrap();

        let breakdown = storage
            .count_statuses_for_assignment_impl(assignment_id)
            .await
            .unwrap();
        let assigned = storage
            .list_assigned_students_impl(assignment_id)
            .await
            .unwrap();
        assert_eq!(breakdown.total(), 2);
        assert_eq!(assigned.len() as i64, breakdown.total());
        assert_eq!(
            storage.list_entries_by_instructor_impl(ids[0]).await.unwrap().len(),
            2
        );
    }
}
