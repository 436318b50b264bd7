//! 作业目录存储操作

use super::SeaOrmStorage;
use crate::entity::assignments::{ActiveModel, Column, Entity as Assignments};
use crate::errors::{Result, TrackerError};
use crate::models::assignments::entities::{Assignment, AssignmentFields};
use crate::utils::sql::contains_pattern;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Select, Set,
};

impl SeaOrmStorage {
    /// 教师名下未删除的作业
    fn owned_assignments(instructor_id: i64) -> Select<Assignments> {
        Assignments::find()
            .filter(Column::CreatedBy.eq(instructor_id))
            .filter(Column::DeletedAt.is_null())
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
    }

    /// 创建作业
    pub async fn create_assignment_impl(
        &self,
        instructor_id: i64,
        fields: AssignmentFields,
        now: DateTime<Utc>,
    ) -> Result<Assignment> {
        let now = now.timestamp();

        let model = ActiveModel {
            title: Set(fields.title),
            description: Set(fields.description),
            url: Set(fields.url),
            category: Set(fields.category),
            due_date: Set(fields.due_date.map(|dt| dt.timestamp())),
            created_by: Set(instructor_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("创建作业失败: {e}")))?;

        Ok(result.into_assignment())
    }

    /// 通过 ID 获取作业
    pub async fn get_assignment_by_id_impl(&self, id: i64) -> Result<Option<Assignment>> {
        let result = Assignments::find_by_id(id)
            .filter(Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("查询作业失败: {e}")))?;

        Ok(result.map(|m| m.into_assignment()))
    }

    /// 整体替换作业字段，创建者不可修改
    pub async fn update_assignment_impl(
        &self,
        id: i64,
        fields: AssignmentFields,
        now: DateTime<Utc>,
    ) -> Result<Option<Assignment>> {
        let existing = Assignments::find_by_id(id)
            .filter(Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("查询作业失败: {e}")))?;

        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        model.title = Set(fields.title);
        model.description = Set(fields.description);
        model.url = Set(fields.url);
        model.category = Set(fields.category);
        model.due_date = Set(fields.due_date.map(|dt| dt.timestamp()));
        model.updated_at = Set(now.timestamp());

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("更新作业失败: {e}")))?;

        Ok(Some(result.into_assignment()))
    }

    /// 软删除作业，关联的台账记录保持原样
    pub async fn delete_assignment_impl(&self, id: i64, now: DateTime<Utc>) -> Result<bool> {
        let result = Assignments::update_many()
            .col_expr(
                Column::DeletedAt,
                sea_orm::sea_query::Expr::value(now.timestamp()),
            )
            .filter(Column::Id.eq(id))
            .filter(Column::DeletedAt.is_null())
            .exec(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("删除作业失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 列出教师的所有作业
    pub async fn list_assignments_by_instructor_impl(
        &self,
        instructor_id: i64,
    ) -> Result<Vec<Assignment>> {
        let assignments = Self::owned_assignments(instructor_id)
            .all(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("查询作业列表失败: {e}")))?;

        Ok(assignments.into_iter().map(|m| m.into_assignment()).collect())
    }

    /// 按分类列出教师的作业（精确匹配）
    pub async fn list_assignments_by_category_impl(
        &self,
        instructor_id: i64,
        category: &str,
    ) -> Result<Vec<Assignment>> {
        let assignments = Self::owned_assignments(instructor_id)
            .filter(Column::Category.eq(category))
            .all(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("查询作业列表失败: {e}")))?;

        Ok(assignments.into_iter().map(|m| m.into_assignment()).collect())
    }

    /// 在标题和描述中搜索关键字
    pub async fn search_assignments_impl(
        &self,
        instructor_id: i64,
        query: &str,
    ) -> Result<Vec<Assignment>> {
        let query = query.trim();
        let assignments = Self::owned_assignments(instructor_id)
            .filter(
                Condition::any()
                    .add(Column::Title.like(contains_pattern(query)))
                    .add(Column::Description.like(contains_pattern(query))),
            )
            .all(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("搜索作业失败: {e}")))?;

        Ok(assignments.into_iter().map(|m| m.into_assignment()).collect())
    }
}
