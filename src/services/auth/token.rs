use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::errors::{Result, TrackerError};
use crate::middlewares::RequireJWT;
use crate::models::auth::responses::{RefreshTokenResponse, UserInfoResponse};
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;
use crate::utils::jwt::JwtUtils;

use super::AuthService;

/// 用 refresh token 换取新的 access token
///
/// 角色从存储重新读取，已停用的账号无法续期。
pub async fn refresh_access_token(storage: &dyn Storage, refresh_token: &str) -> Result<(User, String)> {
    let claims = JwtUtils::verify_refresh_token(refresh_token)
        .map_err(|e| TrackerError::authentication(format!("Invalid refresh token: {e}")))?;
    let user_id = claims
        .user_id()
        .ok_or_else(|| TrackerError::authentication("Invalid user ID in refresh token"))?;

    let user = storage
        .get_user_by_id(user_id)
        .await?
        .ok_or_else(|| TrackerError::authentication("User not found"))?;
    let access_token = JwtUtils::generate_access_token(user.id, user.role)
        .map_err(|e| TrackerError::authentication(format!("生成 access token 失败: {e}")))?;

    Ok((user, access_token))
}

pub async fn handle_refresh_token(
    service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let config = service.get_config();
    let storage = service.get_storage(request);

    let Some(refresh_token) = JwtUtils::extract_refresh_token_from_cookie(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized access, please login",
        )));
    };

    match refresh_access_token(storage.as_ref(), &refresh_token).await {
        Ok((_, access_token)) => {
            let response = RefreshTokenResponse {
                access_token,
                expires_in: config.jwt.access_token_expiry * 60,
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                response,
                "Token refreshed successfully",
            )))
        }
        Err(e) if e.is_internal() => Ok(e.to_response()),
        Err(e) => {
            tracing::info!("Refresh token rejected: {}", e);

            // 清除无效的 refresh token cookie
            let empty_cookie = JwtUtils::create_empty_refresh_token_cookie();
            Ok(HttpResponse::Unauthorized().cookie(empty_cookie).json(
                ApiResponse::error_empty(
                    ErrorCode::Unauthorized,
                    "Login expired or invalid, please login again",
                ),
            ))
        }
    }
}

pub async fn handle_get_user(request: &HttpRequest) -> ActixResult<HttpResponse> {
    match RequireJWT::extract_user(request) {
        Some(user) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            UserInfoResponse { user },
            "User information retrieved successfully",
        ))),
        None => Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized access, please login",
        ))),
    }
}
