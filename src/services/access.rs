//! 权限检查
//!
//! 每个业务操作都重新从存储中解析当前用户，以数据库里的角色为准，
//! 已停用或不存在的用户一律按角色不匹配处理。

use actix_web::HttpRequest;

use crate::errors::{Result, TrackerError};
use crate::middlewares::RequireJWT;
use crate::models::assignments::entities::Assignment;
use crate::models::users::entities::{User, UserRole};
use crate::storage::Storage;

/// 当前请求的身份
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: i64,
    pub role: UserRole,
}

impl AuthContext {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
        }
    }

    /// 从 RequireJWT 放入请求扩展的用户构造
    pub fn from_request(request: &HttpRequest) -> Result<Self> {
        RequireJWT::extract_user(request)
            .map(|user| Self::from_user(&user))
            .ok_or_else(|| TrackerError::authentication("无法获取用户信息"))
    }
}

/// 要求当前用户是教师
pub async fn require_instructor(storage: &dyn Storage, ctx: &AuthContext) -> Result<User> {
    match storage.get_user_by_id(ctx.user_id).await? {
        Some(user) if user.is_instructor() => Ok(user),
        Some(_) => Err(TrackerError::not_an_instructor("User is not an instructor")),
        None => Err(TrackerError::not_an_instructor("Instructor not found")),
    }
}

/// 要求当前用户是学生
pub async fn require_student(storage: &dyn Storage, ctx: &AuthContext) -> Result<User> {
    match storage.get_user_by_id(ctx.user_id).await? {
        Some(user) if user.is_student() => Ok(user),
        Some(_) => Err(TrackerError::not_a_student("User is not a student")),
        None => Err(TrackerError::not_a_student("Student not found")),
    }
}

/// 要求当前用户是作业的创建者
///
/// 作业不存在（或已删除）返回 NotFound，属于其他教师返回 AccessDenied。
pub async fn require_owned_assignment(
    storage: &dyn Storage,
    ctx: &AuthContext,
    assignment_id: i64,
) -> Result<(User, Assignment)> {
    let instructor = require_instructor(storage, ctx).await?;
    let assignment = storage
        .get_assignment_by_id(assignment_id)
        .await?
        .ok_or_else(|| TrackerError::not_found("Assignment not found"))?;

    if !assignment.is_owned_by(instructor.id) {
        return Err(TrackerError::access_denied("Access denied"));
    }

    Ok((instructor, assignment))
}
