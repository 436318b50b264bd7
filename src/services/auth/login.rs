use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{DateTime, Utc};

use crate::errors::{Result, TrackerError};
use crate::models::{auth::LoginRequest, users::entities::User};
use crate::storage::Storage;
use crate::utils::password::verify_password;

use super::{AuthService, issue_session};

const BAD_CREDENTIALS: &str = "Username or password is incorrect";

/// 按用户名或邮箱校验本地账号密码
///
/// GitHub 账号没有本地密码，一律按凭据错误处理。
pub async fn authenticate(
    storage: &dyn Storage,
    login_request: &LoginRequest,
    now: DateTime<Utc>,
) -> Result<User> {
    let user = storage
        .get_user_by_username_or_email(login_request.username.trim())
        .await?
        .ok_or_else(|| TrackerError::authentication(BAD_CREDENTIALS))?;

    if user.is_external() {
        tracing::debug!("GitHub account {} attempted password login", user.id);
    }

    let verified = user
        .password_hash
        .as_deref()
        .is_some_and(|hash| verify_password(&login_request.password, hash));
    if !verified {
        return Err(TrackerError::authentication(BAD_CREDENTIALS));
    }

    if let Err(e) = storage.update_last_login(user.id, now).await {
        tracing::warn!("Failed to update last login for user {}: {}", user.id, e);
    }

    Ok(user)
}

pub async fn handle_login(
    service: &AuthService,
    login_request: LoginRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match authenticate(storage.as_ref(), &login_request, Utc::now()).await {
        Ok(user) => {
            tracing::info!("User {} logged in successfully", user.username);
            issue_session(user, login_request.remember_me, "Login successful")
        }
        Err(e) => Ok(e.to_response()),
    }
}
