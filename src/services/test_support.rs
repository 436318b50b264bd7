//! 服务层测试的公共夹具

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::models::assignments::entities::{Assignment, AssignmentFields};
use crate::models::users::{
    entities::{User, UserRole},
    requests::NewLocalUser,
};
use crate::services::access::AuthContext;
use crate::storage::{Storage, sea_orm_storage::SeaOrmStorage};

pub async fn storage() -> Arc<dyn Storage> {
    Arc::new(SeaOrmStorage::in_memory().await)
}

async fn user(storage: &Arc<dyn Storage>, username: &str, role: UserRole) -> User {
    storage
        .create_user(
            NewLocalUser {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password_hash: "hash".to_string(),
                role,
            },
            Utc::now(),
        )
        .await
        .unwrap()
}

pub async fn instructor(storage: &Arc<dyn Storage>, username: &str) -> User {
    user(storage, username, UserRole::Instructor).await
}

pub async fn student(storage: &Arc<dyn Storage>, username: &str) -> User {
    user(storage, username, UserRole::Student).await
}

pub fn ctx(user: &User) -> AuthContext {
    AuthContext::from_user(user)
}

pub async fn assignment(
    storage: &Arc<dyn Storage>,
    owner: &User,
    title: &str,
    due_date: Option<DateTime<Utc>>,
) -> Assignment {
    assignment_in(storage, owner, title, "", due_date).await
}

pub async fn assignment_in(
    storage: &Arc<dyn Storage>,
    owner: &User,
    title: &str,
    category: &str,
    due_date: Option<DateTime<Utc>>,
) -> Assignment {
    storage
        .create_assignment(
            owner.id,
            AssignmentFields {
                title: title.to_string(),
                description: String::new(),
                url: "https://example.com/read".to_string(),
                category: category.to_string(),
                due_date,
            },
            Utc::now(),
        )
        .await
        .unwrap()
}

/// 直接在存储层分配，并把分配时间设为 assigned_at
pub async fn assign(
    storage: &Arc<dyn Storage>,
    assignment: &Assignment,
    students: &[&User],
    assigned_at: DateTime<Utc>,
) {
    let ids: Vec<i64> = students.iter().map(|s| s.id).collect();
    storage
        .assign_students(assignment.id, &ids, assigned_at)
        .await
        .unwrap();
}
