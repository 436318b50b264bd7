use super::SeaOrmStorage;
use crate::entity::users::{ActiveModel, Column, Entity as Users};
use crate::errors::{Result, TrackerError};
use crate::models::users::{
    entities::{User, UserRole},
    requests::{ExternalProfile, NewLocalUser},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};

impl SeaOrmStorage {
    /// 创建本地用户
    pub async fn create_user_impl(&self, req: NewLocalUser, now: DateTime<Utc>) -> Result<User> {
        let now = now.timestamp();

        let model = ActiveModel {
            username: Set(req.username),
            email: Set(req.email),
            password_hash: Set(Some(req.password_hash)),
            github_id: Set(None),
            role: Set(req.role.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("创建用户失败: {e}")))?;

        Ok(result.into_user())
    }

    /// 按 GitHub ID 创建或同步外部用户
    ///
    /// 新用户默认为学生；已存在的用户同步用户名、邮箱和头像。
    pub async fn upsert_external_user_impl(
        &self,
        profile: ExternalProfile,
        now: DateTime<Utc>,
    ) -> Result<Option<User>> {
        let ts = now.timestamp();

        let existing = Users::find()
            .filter(Column::GithubId.eq(profile.github_id))
            .one(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("查询用户失败: {e}")))?;

        let username = self
            .available_username(&profile.username, profile.github_id)
            .await?;

        let model = match existing {
            Some(existing) if existing.deleted_at.is_some() => return Ok(None),
            Some(existing) => {
                let mut model: ActiveModel = existing.into();
                model.username = Set(username);
                model.email = Set(profile.email);
                model.avatar_url = Set(profile.avatar_url);
                model.updated_at = Set(ts);
                model
                    .update(&self.db)
                    .await
                    .map_err(|e| TrackerError::database_operation(format!("同步用户失败: {e}")))?
            }
            None => ActiveModel {
                username: Set(username),
                email: Set(profile.email),
                password_hash: Set(None),
                github_id: Set(Some(profile.github_id)),
                avatar_url: Set(profile.avatar_url),
                role: Set(UserRole::Student.to_string()),
                created_at: Set(ts),
                updated_at: Set(ts),
                ..Default::default()
            }
            .insert(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("创建用户失败: {e}")))?,
        };

        Ok(Some(model.into_user()))
    }

    /// GitHub 登录名与其他账号冲突时追加 GitHub ID 作为后缀
    async fn available_username(&self, login: &str, github_id: i64) -> Result<String> {
        let taken = Users::find()
            .filter(Column::Username.eq(login))
            .filter(
                Condition::any()
                    .add(Column::GithubId.is_null())
                    .add(Column::GithubId.ne(github_id)),
            )
            .count(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("查询用户失败: {e}")))?;

        if taken > 0 {
            Ok(format!("{login}-{github_id}"))
        } else {
            Ok(login.to_string())
        }
    }

    /// 通过 ID 获取用户
    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        let result = Users::find_by_id(id)
            .filter(Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 通过用户名获取用户
    pub async fn get_user_by_username_impl(&self, username: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::Username.eq(username))
            .filter(Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 通过邮箱获取用户
    pub async fn get_user_by_email_impl(&self, email: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::Email.eq(email))
            .filter(Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 通过用户名或邮箱获取用户
    pub async fn get_user_by_username_or_email_impl(
        &self,
        identifier: &str,
    ) -> Result<Option<User>> {
        let result = Users::find()
            .filter(
                Condition::any()
                    .add(Column::Username.eq(identifier))
                    .add(Column::Email.eq(identifier)),
            )
            .filter(Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 批量获取用户
    pub async fn get_users_by_ids_impl(&self, ids: &[i64]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = Users::find()
            .filter(Column::Id.is_in(ids.iter().copied()))
            .filter(Column::DeletedAt.is_null())
            .all(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("批量查询用户失败: {e}")))?;

        Ok(users.into_iter().map(|m| m.into_user()).collect())
    }

    /// 列出所有学生
    pub async fn list_students_impl(&self) -> Result<Vec<User>> {
        let users = Users::find()
            .filter(Column::Role.eq(UserRole::Student.to_string()))
            .filter(Column::DeletedAt.is_null())
            .order_by_asc(Column::Username)
            .all(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("查询学生列表失败: {e}")))?;

        Ok(users.into_iter().map(|m| m.into_user()).collect())
    }

    /// 更新用户最后登录时间
    pub async fn update_last_login_impl(&self, id: i64, now: DateTime<Utc>) -> Result<bool> {
        let result = Users::update_many()
            .col_expr(
                Column::LastLogin,
                sea_orm::sea_query::Expr::value(now.timestamp()),
            )
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("更新最后登录时间失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 统计用户数量（包括已停用的账号）
    pub async fn count_users_impl(&self) -> Result<u64> {
        let count = Users::find()
            .count(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("统计用户数量失败: {e}")))?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(username: &str, role: UserRole) -> NewLocalUser {
        NewLocalUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "hash".to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn test_local_user_has_no_github_id() {
        let storage = SeaOrmStorage::in_memory().await;
        let user = storage
            .create_user_impl(local("alice", UserRole::Student), Utc::now())
            .await
            .unwrap();

        assert!(user.password_hash.is_some());
        assert!(user.github_id.is_none());
        assert!(
            storage
                .get_user_by_username_or_email_impl("alice@example.com")
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_external_user_is_created_then_synced() {
        let storage = SeaOrmStorage::in_memory().await;
        let profile = ExternalProfile {
            github_id: 42,
            username: "octocat".to_string(),
            email: "octo@example.com".to_string(),
            avatar_url: None,
        };

        let created = storage
            .upsert_external_user_impl(profile.clone(), Utc::now())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(created.role, UserRole::Student);
        assert!(created.password_hash.is_none());
        assert_eq!(created.github_id, Some(42));

        let synced = storage
            .upsert_external_user_impl(
                ExternalProfile {
                    email: "new@example.com".to_string(),
                    ..profile
                },
                Utc::now(),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(synced.id, created.id);
        assert_eq!(synced.email, "new@example.com");
        assert_eq!(storage.count_users_impl().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_external_login_avoids_local_username() {
        let storage = SeaOrmStorage::in_memory().await;
        storage
            .create_user_impl(local("octocat", UserRole::Instructor), Utc::now())
            .await
            .unwrap();

        let user = storage
            .upsert_external_user_impl(
                ExternalProfile {
                    github_id: 7,
                    username: "octocat".to_string(),
                    email: String::new(),
                    avatar_url: None,
                },
                Utc::now(),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.username, "octocat-7");
    }

    #[tokio::test]
    async fn test_list_students_only_returns_students() {
        let storage = SeaOrmStorage::in_memory().await;
        storage
            .create_user_impl(local("teacher", UserRole::Instructor), Utc::now())
            .await
            .unwrap();
        storage
            .create_user_impl(local("pupil1", UserRole::Student), Utc::now())
            .await
            .unwrap();

        let students = storage.list_students_impl().await.unwrap();
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].username, "pupil1");
    }
}
