//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod assignments;
mod progress;
mod student_assignments;
mod users;

use crate::config::AppConfig;
use crate::errors::{Result, TrackerError};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 按全局配置创建存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        Self::connect(
            &config.database.url,
            config.database.pool_size,
            config.database.timeout,
        )
        .await
    }

    /// 连接数据库并运行迁移
    pub async fn connect(url: &str, pool_size: u32, timeout: u64) -> Result<Self> {
        let db_url = Self::build_database_url(url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, pool_size, timeout).await?
        } else {
            Self::connect_generic(&db_url, pool_size, timeout).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| TrackerError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, pool_size: u32, timeout: u64) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let in_memory = url.contains(":memory:");

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| TrackerError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(if in_memory {
                SqliteJournalMode::Memory
            } else {
                SqliteJournalMode::Wal
            })
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory");

        // 内存数据库只存在于单个连接中，连接池必须固定为一个永不回收的连接
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
                .max_connections(pool_size)
                .min_connections(1)
                .test_before_acquire(true)
                .idle_timeout(Duration::from_secs(300))
        };

        let pool = pool_options
            .acquire_timeout(Duration::from_secs(timeout))
            .connect_with(opt)
            .await
            .map_err(|e| TrackerError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(
        url: &str,
        pool_size: u32,
        timeout: u64,
    ) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(pool_size)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(timeout))
            .acquire_timeout(Duration::from_secs(timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| TrackerError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url == ":memory:" {
            Ok("sqlite::memory:".to_string())
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(TrackerError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }

    /// 测试用内存数据库
    #[cfg(test)]
    pub(crate) async fn in_memory() -> Self {
        Self::connect("sqlite::memory:", 1, 5)
            .await
            .expect("in-memory sqlite should open")
    }
}

// Storage trait 实现
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
use crate::storage::Storage;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: NewLocalUser, now: DateTime<Utc>) -> Result<User> {
        self.create_user_impl(user, now).await
    }

    async fn upsert_external_user(
        &self,
        profile: ExternalProfile,
        now: DateTime<Utc>,
    ) -> Result<Option<User>> {
        self.upsert_external_user_impl(profile, now).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.get_user_by_username_impl(username).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>> {
        self.get_user_by_username_or_email_impl(identifier).await
    }

    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>> {
        self.get_users_by_ids_impl(ids).await
    }

    async fn list_students(&self) -> Result<Vec<User>> {
        self.list_students_impl().await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    async fn update_last_login(&self, id: i64, now: DateTime<Utc>) -> Result<bool> {
        self.update_last_login_impl(id, now).await
    }

    // 作业模块
    async fn create_assignment(
        &self,
        instructor_id: i64,
        fields: AssignmentFields,
        now: DateTime<Utc>,
    ) -> Result<Assignment> {
        self.create_assignment_impl(instructor_id, fields, now)
            .await
    }

    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>> {
        self.get_assignment_by_id_impl(id).await
    }

    async fn update_assignment(
        &self,
        id: i64,
        fields: AssignmentFields,
        now: DateTime<Utc>,
    ) -> Result<Option<Assignment>> {
        self.update_assignment_impl(id, fields, now).await
    }

    async fn delete_assignment(&self, id: i64, now: DateTime<Utc>) -> Result<bool> {
        self.delete_assignment_impl(id, now).await
    }

    async fn list_assignments_by_instructor(&self, instructor_id: i64) -> Result<Vec<Assignment>> {
        self.list_assignments_by_instructor_impl(instructor_id)
            .await
    }

    async fn list_assignments_by_category(
        &self,
        instructor_id: i64,
        category: &str,
    ) -> Result<Vec<Assignment>> {
        self.list_assignments_by_category_impl(instructor_id, category)
            .await
    }

    async fn search_assignments(
        &self,
        instructor_id: i64,
        query: &str,
    ) -> Result<Vec<Assignment>> {
        self.search_assignments_impl(instructor_id, query).await
    }

    // 学生台账模块
    async fn assign_students(
        &self,
        assignment_id: i64,
        student_ids: &[i64],
        now: DateTime<Utc>,
    ) -> Result<Vec<StudentAssignment>> {
        self.assign_students_impl(assignment_id, student_ids, now)
            .await
    }

    async fn list_assigned_student_ids(
        &self,
        assignment_id: i64,
        student_ids: &[i64],
    ) -> Result<Vec<i64>> {
        self.list_assigned_student_ids_impl(assignment_id, student_ids)
            .await
    }

    async fn get_student_assignment(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Option<StudentAssignment>> {
        self.get_student_assignment_impl(assignment_id, student_id)
            .await
    }

    async fn get_student_assignment_detail(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Option<StudentAssignmentDetail>> {
        self.get_student_assignment_detail_impl(assignment_id, student_id)
            .await
    }

    async fn list_assigned_students(&self, assignment_id: i64) -> Result<Vec<AssignedStudent>> {
        self.list_assigned_students_impl(assignment_id).await
    }

    async fn update_student_assignment_status(
        &self,
        assignment_id: i64,
        student_id: i64,
        status: AssignmentStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<StudentAssignment>> {
        self.update_student_assignment_status_impl(assignment_id, student_id, status, now)
            .await
    }

    async fn remove_student_assignment(
        &self,
        assignment_id: i64,
        student_id: i64,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        self.remove_student_assignment_impl(assignment_id, student_id, now)
            .await
    }

    async fn list_student_assignments(
        &self,
        student_id: i64,
        filter: StudentAssignmentFilter,
    ) -> Result<Vec<StudentAssignmentDetail>> {
        self.list_student_assignments_impl(student_id, filter)
            .await
    }

    async fn list_student_categories(&self, student_id: i64) -> Result<Vec<String>> {
        self.list_student_categories_impl(student_id).await
    }

    // 进度统计模块
    async fn count_statuses_for_assignment(&self, assignment_id: i64) -> Result<StatusBreakdown> {
        self.count_statuses_for_assignment_impl(assignment_id).await
    }

    async fn list_entries_by_instructor(
        &self,
        instructor_id: i64,
    ) -> Result<Vec<StudentAssignment>> {
        self.list_entries_by_instructor_impl(instructor_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_database_url() {
        assert_eq!(
            SeaOrmStorage::build_database_url("data/tracker.db").unwrap(),
            "sqlite://data/tracker.db?mode=rwc"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url(":memory:").unwrap(),
            "sqlite::memory:"
        );
        assert!(SeaOrmStorage::build_database_url("postgres://localhost/db").is_ok());
        assert!(SeaOrmStorage::build_database_url("ftp://nope").is_err());
    }
}
