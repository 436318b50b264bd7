use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{DateTime, Utc};

use crate::errors::{Result, TrackerError};
use crate::models::{
    ApiResponse, ErrorCode,
    auth::RegisterRequest,
    users::{
        entities::{User, UserRole},
        requests::NewLocalUser,
    },
};
use crate::storage::Storage;
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_password_simple, validate_username};

use super::AuthService;

/// 校验注册信息并创建本地账号，无法识别的角色按学生处理
pub async fn create_local_user(
    storage: &dyn Storage,
    req: RegisterRequest,
    now: DateTime<Utc>,
) -> Result<User> {
    let username = req.username.trim().to_string();
    let email = req.email.trim().to_string();

    validate_username(&username).map_err(TrackerError::validation)?;
    validate_email(&email).map_err(TrackerError::validation)?;
    validate_password_simple(&req.password).map_err(TrackerError::validation)?;

    let user = storage
        .create_user(
            NewLocalUser {
                username,
                email,
                password_hash: hash_password(&req.password)?,
                role: UserRole::from_registration(req.role.as_deref()),
            },
            now,
        )
        .await?;
    tracing::info!("Registered {} account {}", user.role, user.username);
    Ok(user)
}

pub async fn handle_register(
    service: &AuthService,
    register_request: RegisterRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    // 1. 检查用户名是否已存在
    if let Err(response) = check_username_exists(storage.as_ref(), register_request.username.trim()).await {
        return Ok(response);
    }

    // 2. 检查邮箱是否已存在
    if let Err(response) = check_email_exists(storage.as_ref(), register_request.email.trim()).await {
        return Ok(response);
    }

    // 3. 校验并创建用户
    match create_local_user(storage.as_ref(), register_request, Utc::now()).await {
        Ok(user) => Ok(HttpResponse::Created().json(ApiResponse::success(user, "注册成功"))),
        Err(e) => Ok(e.to_response()),
    }
}

async fn check_username_exists(storage: &dyn Storage, username: &str) -> std::result::Result<(), HttpResponse> {
    match storage.get_user_by_username(username).await {
        Ok(Some(_)) => Err(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::UserNameAlreadyExists,
            "Username already exists",
        ))),
        Ok(None) => Ok(()),
        Err(e) => Err(e.to_response()),
    }
}

async fn check_email_exists(storage: &dyn Storage, email: &str) -> std::result::Result<(), HttpResponse> {
    match storage.get_user_by_email(email).await {
        Ok(Some(_)) => Err(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::UserEmailAlreadyExists,
            "Email already exists",
        ))),
        Ok(None) => Ok(()),
        Err(e) => Err(e.to_response()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::storage;
    use crate::utils::password::verify_password;

    fn register(username: &str, password: &str, role: Option<&str>) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: password.to_string(),
            role: role.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_register_roles() {
        let storage = storage().await;

        let teacher = create_local_user(
            storage.as_ref(),
            register("teacher1", "SecurePass123", Some("instructor")),
            Utc::now(),
        )
        .await
        .unwrap();
        assert_eq!(teacher.role, UserRole::Instructor);
        assert!(verify_password(
            "SecurePass123",
            teacher.password_hash.as_deref().unwrap()
        ));

        let pupil = create_local_user(
            storage.as_ref(),
            register("pupil01", "SecurePass123", Some("admin")),
            Utc::now(),
        )
        .await
        .unwrap();
        assert_eq!(pupil.role, UserRole::Student);
    }

    #[tokio::test]
    async fn test_register_validation() {
        let storage = storage().await;

        for req in [
            register("abc", "SecurePass123", None),
            register("reader1", "weak", None),
            RegisterRequest {
                email: "not-an-email".to_string(),
                ..register("reader1", "SecurePass123", None)
            },
        ] {
            let err = create_local_user(storage.as_ref(), req, Utc::now())
                .await
                .unwrap_err();
            assert_eq!(err.code(), "E007");
        }
        assert_eq!(storage.count_users().await.unwrap(), 0);
    }
}
