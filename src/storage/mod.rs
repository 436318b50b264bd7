use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::models::{
    assignments::entities::{Assignment, AssignmentFields},
    progress::responses::StatusBreakdown,
    student_assignments::{
        entities::{AssignedStudent, AssignmentStatus, StudentAssignment, StudentAssignmentDetail},
        requests::StudentAssignmentFilter,
    },
    users::{
        entities::User,
        requests::{ExternalProfile, NewLocalUser},
    },
};

use crate::errors::Result;

pub mod sea_orm_storage;

/// 持久化接口
///
/// 所有读取方法都只返回未软删除的记录；写入方法接收 `now` 以便测试替换时钟。
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建本地账号
    async fn create_user(&self, user: NewLocalUser, now: DateTime<Utc>) -> Result<User>;
    // 按 GitHub ID 创建或同步外部账号，账号已停用时返回 None
    async fn upsert_external_user(
        &self,
        profile: ExternalProfile,
        now: DateTime<Utc>,
    ) -> Result<Option<User>>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过用户名获取用户信息
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    // 通过邮箱获取用户信息
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    // 通过用户名或邮箱获取用户信息
    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>>;
    // 批量获取用户
    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>>;
    // 列出所有学生
    async fn list_students(&self) -> Result<Vec<User>>;
    // 统计用户数量
    async fn count_users(&self) -> Result<u64>;
    // 更新用户最后登录时间
    async fn update_last_login(&self, id: i64, now: DateTime<Utc>) -> Result<bool>;

    /// 作业管理方法
    async fn create_assignment(
        &self,
        instructor_id: i64,
        fields: AssignmentFields,
        now: DateTime<Utc>,
    ) -> Result<Assignment>;
    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>>;
    async fn update_assignment(
        &self,
        id: i64,
        fields: AssignmentFields,
        now: DateTime<Utc>,
    ) -> Result<Option<Assignment>>;
    // 软删除作业
    async fn delete_assignment(&self, id: i64, now: DateTime<Utc>) -> Result<bool>;
    async fn list_assignments_by_instructor(&self, instructor_id: i64) -> Result<Vec<Assignment>>;
    async fn list_assignments_by_category(
        &self,
        instructor_id: i64,
        category: &str,
    ) -> Result<Vec<Assignment>>;
    // 标题或描述包含关键字
    async fn search_assignments(&self, instructor_id: i64, query: &str)
    -> Result<Vec<Assignment>>;

    /// 学生台账方法
    // 在一个事务中批量创建台账记录
    async fn assign_students(
        &self,
        assignment_id: i64,
        student_ids: &[i64],
        now: DateTime<Utc>,
    ) -> Result<Vec<StudentAssignment>>;
    // 返回 student_ids 中已经持有有效台账记录的学生
    async fn list_assigned_student_ids(
        &self,
        assignment_id: i64,
        student_ids: &[i64],
    ) -> Result<Vec<i64>>;
    async fn get_student_assignment(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Option<StudentAssignment>>;
    async fn get_student_assignment_detail(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Option<StudentAssignmentDetail>>;
    async fn list_assigned_students(&self, assignment_id: i64) -> Result<Vec<AssignedStudent>>;
    async fn update_student_assignment_status(
        &self,
        assignment_id: i64,
        student_id: i64,
        status: AssignmentStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<StudentAssignment>>;
    // 软删除台账记录
    async fn remove_student_assignment(
        &self,
        assignment_id: i64,
        student_id: i64,
        now: DateTime<Utc>,
    ) -> Result<bool>;
    async fn list_student_assignments(
        &self,
        student_id: i64,
        filter: StudentAssignmentFilter,
    ) -> Result<Vec<StudentAssignmentDetail>>;
    async fn list_student_categories(&self, student_id: i64) -> Result<Vec<String>>;

    /// 进度统计方法
    async fn count_statuses_for_assignment(&self, assignment_id: i64) -> Result<StatusBreakdown>;
    // 教师名下所有作业的有效台账记录
    async fn list_entries_by_instructor(&self, instructor_id: i64)
    -> Result<Vec<StudentAssignment>>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
