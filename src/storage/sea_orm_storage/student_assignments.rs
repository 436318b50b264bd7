//! 学生作业台账存储操作

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::assignments::{Column as AssignmentColumn, Entity as Assignments};
use crate::entity::student_assignments::{ActiveModel, Column, Entity as StudentAssignments};
use crate::entity::users::{Column as UserColumn, Entity as Users};
use crate::errors::{Result, TrackerError};
use crate::models::student_assignments::{
    entities::{AssignedStudent, AssignmentStatus, StudentAssignment, StudentAssignmentDetail},
    requests::StudentAssignmentFilter,
};
use crate::utils::sql::contains_pattern;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, SqlErr, Set, TransactionTrait,
};

/// 唯一索引冲突说明同一学生已经持有该作业的台账记录
fn ledger_write_error(context: &str, err: DbErr) -> TrackerError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            TrackerError::duplicate_assignment("Student is already assigned to this assignment")
        }
        _ => TrackerError::database_operation(format!("{context}: {err}")),
    }
}

impl SeaOrmStorage {
    /// 批量分配学生
    ///
    /// 曾被移除的学生复用原记录（状态重置为 assigned），其余学生插入新记录，全部在一个事务内完成。
    pub async fn assign_students_impl(
        &self,
        assignment_id: i64,
        student_ids: &[i64],
        now: DateTime<Utc>,
    ) -> Result<Vec<StudentAssignment>> {
        if student_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ts = now.timestamp();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| TrackerError::database_operation(format!("开启事务失败: {e}")))?;

        let existing: HashMap<i64, _> = StudentAssignments::find()
            .filter(Column::AssignmentId.eq(assignment_id))
            .filter(Column::StudentId.is_in(student_ids.iter().copied()))
            .all(&txn)
            .await
            .map_err(|e| TrackerError::database_operation(format!("查询台账失败: {e}")))?
            .into_iter()
            .map(|m| (m.student_id, m))
            .collect();

        let mut inserts = Vec::new();
        for &student_id in student_ids {
            match existing.get(&student_id) {
                Some(row) if row.deleted_at.is_none() => {
                    return Err(TrackerError::duplicate_assignment(format!(
                        "Student {student_id} is already assigned to this assignment"
                    )));
                }
                Some(row) => {
                    let mut model: ActiveModel = row.clone().into();
                    model.status = Set(AssignmentStatus::Assigned.to_string());
                    model.completed_at = Set(None);
                    model.deleted_at = Set(None);
                    model.created_at = Set(ts);
                    model.updated_at = Set(ts);
                    model
                        .update(&txn)
                        .await
                        .map_err(|e| ledger_write_error("恢复台账记录失败", e))?;
                }
                None => inserts.push(ActiveModel {
                    assignment_id: Set(assignment_id),
                    student_id: Set(student_id),
                    status: Set(AssignmentStatus::Assigned.to_string()),
                    completed_at: Set(None),
                    created_at: Set(ts),
                    updated_at: Set(ts),
                    ..Default::default()
                }),
            }
        }

        if !inserts.is_empty() {
            StudentAssignments::insert_many(inserts)
                .exec(&txn)
                .await
                .map_err(|e| ledger_write_error("创建台账记录失败", e))?;
        }

        let entries = StudentAssignments::find()
            .filter(Column::AssignmentId.eq(assignment_id))
            .filter(Column::StudentId.is_in(student_ids.iter().copied()))
            .filter(Column::DeletedAt.is_null())
            .order_by_asc(Column::Id)
            .all(&txn)
            .await
            .map_err(|e| TrackerError::database_operation(format!("查询台账失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| TrackerError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(entries
            .into_iter()
            .map(|m| m.into_student_assignment())
            .collect())
    }

    /// 返回已持有有效台账记录的学生 ID
    pub async fn list_assigned_student_ids_impl(
        &self,
        assignment_id: i64,
        student_ids: &[i64],
    ) -> Result<Vec<i64>> {
        if student_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids = StudentAssignments::find()
            .select_only()
            .column(Column::StudentId)
            .filter(Column::AssignmentId.eq(assignment_id))
            .filter(Column::StudentId.is_in(student_ids.iter().copied()))
            .filter(Column::DeletedAt.is_null())
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("查询台账失败: {e}")))?;

        Ok(ids)
    }

    /// 获取单条有效台账记录
    pub async fn get_student_assignment_impl(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Option<StudentAssignment>> {
        let result = StudentAssignments::find()
            .filter(Column::AssignmentId.eq(assignment_id))
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("查询台账失败: {e}")))?;

        Ok(result.map(|m| m.into_student_assignment()))
    }

    /// 获取台账记录及作业详情，作业已删除时视为不存在
    pub async fn get_student_assignment_detail_impl(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Option<StudentAssignmentDetail>> {
        let result = StudentAssignments::find()
            .find_also_related(Assignments)
            .filter(Column::AssignmentId.eq(assignment_id))
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::DeletedAt.is_null())
            .filter(AssignmentColumn::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("查询台账失败: {e}")))?;

        Ok(result.and_then(|(entry, assignment)| {
            assignment.map(|a| StudentAssignmentDetail {
                entry: entry.into_student_assignment(),
                assignment: a.into_assignment(),
            })
        }))
    }

    /// 列出作业下的学生及其进度
    pub async fn list_assigned_students_impl(
        &self,
        assignment_id: i64,
    ) -> Result<Vec<AssignedStudent>> {
        let rows = StudentAssignments::find()
            .find_also_related(Users)
            .filter(Column::AssignmentId.eq(assignment_id))
            .filter(Column::DeletedAt.is_null())
            .filter(UserColumn::DeletedAt.is_null())
            .order_by_asc(UserColumn::Username)
            .all(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("查询作业学生失败: {e}")))?;

        Ok(rows
            .into_iter()
            .filter_map(|(entry, student)| {
                student.map(|s| AssignedStudent {
                    entry: entry.into_student_assignment(),
                    student: s.into_user(),
                })
            })
            .collect())
    }

    /// 更新台账状态
    ///
    /// 进入 completed 时记录完成时间；离开 completed 时保留原有完成时间。
    pub async fn update_student_assignment_status_impl(
        &self,
        assignment_id: i64,
        student_id: i64,
        status: AssignmentStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<StudentAssignment>> {
        let existing = StudentAssignments::find()
            .filter(Column::AssignmentId.eq(assignment_id))
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("查询台账失败: {e}")))?;

        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        model.status = Set(status.to_string());
        if status == AssignmentStatus::Completed {
            model.completed_at = Set(Some(now.timestamp()));
        }
        model.updated_at = Set(now.timestamp());

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("更新台账状态失败: {e}")))?;

        Ok(Some(result.into_student_assignment()))
    }

    /// 软删除台账记录
    pub async fn remove_student_assignment_impl(
        &self,
        assignment_id: i64,
        student_id: i64,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let result = StudentAssignments::update_many()
            .col_expr(
                Column::DeletedAt,
                sea_orm::sea_query::Expr::value(now.timestamp()),
            )
            .col_expr(
                Column::UpdatedAt,
                sea_orm::sea_query::Expr::value(now.timestamp()),
            )
            .filter(Column::AssignmentId.eq(assignment_id))
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::DeletedAt.is_null())
            .exec(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("移除台账记录失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 按条件列出学生的台账记录
    pub async fn list_student_assignments_impl(
        &self,
        student_id: i64,
        filter: StudentAssignmentFilter,
    ) -> Result<Vec<StudentAssignmentDetail>> {
        let mut select = StudentAssignments::find()
            .find_also_related(Assignments)
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::DeletedAt.is_null())
            .filter(AssignmentColumn::DeletedAt.is_null());

        let not_completed = Column::Status.ne(AssignmentStatus::Completed.to_string());

        select = match filter {
            StudentAssignmentFilter::All => select.order_by_desc(Column::CreatedAt),
            StudentAssignmentFilter::Status(status) => select
                .filter(Column::Status.eq(status.to_string()))
                .order_by_desc(Column::CreatedAt),
            StudentAssignmentFilter::Category(category) => select
                .filter(AssignmentColumn::Category.eq(category))
                .order_by_desc(Column::CreatedAt),
            StudentAssignmentFilter::Search(query) => {
                let query = query.trim().to_string();
                select
                    .filter(
                        Condition::any()
                            .add(AssignmentColumn::Title.like(contains_pattern(&query)))
                            .add(AssignmentColumn::Description.like(contains_pattern(&query))),
                    )
                    .order_by_desc(Column::CreatedAt)
            }
            StudentAssignmentFilter::Overdue { now } => select
                .filter(AssignmentColumn::DueDate.lt(now.timestamp()))
                .filter(not_completed)
                .order_by_asc(AssignmentColumn::DueDate),
            StudentAssignmentFilter::DueWithin {
                from,
                to,
                exclusive_start,
            } => {
                let start = if exclusive_start {
                    AssignmentColumn::DueDate.gt(from.timestamp())
                } else {
                    AssignmentColumn::DueDate.gte(from.timestamp())
                };
                select
                    .filter(start)
                    .filter(AssignmentColumn::DueDate.lte(to.timestamp()))
                    .filter(not_completed)
                    .order_by_asc(AssignmentColumn::DueDate)
            }
            StudentAssignmentFilter::CompletedSince(since) => select
                .filter(Column::Status.eq(AssignmentStatus::Completed.to_string()))
                .filter(Column::CompletedAt.gte(since.timestamp()))
                .order_by_desc(Column::CompletedAt),
        };

        let rows = select
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("查询学生作业失败: {e}")))?;

        Ok(rows
            .into_iter()
            .filter_map(|(entry, assignment)| {
                assignment.map(|a| StudentAssignmentDetail {
                    entry: entry.into_student_assignment(),
                    assignment: a.into_assignment(),
                })
            })
            .collect())
    }

    /// 学生作业涉及的非空分类，按字母排序
    pub async fn list_student_categories_impl(&self, student_id: i64) -> Result<Vec<String>> {
        let categories = StudentAssignments::find()
            .inner_join(Assignments)
            .select_only()
            .column(AssignmentColumn::Category)
            .distinct()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::DeletedAt.is_null())
            .filter(AssignmentColumn::DeletedAt.is_null())
            .filter(AssignmentColumn::Category.ne(""))
            .order_by_asc(AssignmentColumn::Category)
            .into_tuple::<String>()
            .all(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("查询作业分类失败: {e}")))?;

        Ok(categories)
    }
}
