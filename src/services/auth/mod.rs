pub mod github;
pub mod login;
pub mod logout;
pub mod register;
pub mod token;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::models::auth::{GithubCallbackQuery, LoginRequest, LoginResponse, RegisterRequest};
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;
use crate::utils::jwt::JwtUtils;

pub struct AuthService {
    storage: Option<Arc<dyn Storage>>,
}

impl AuthService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    pub(crate) fn get_config(&self) -> &AppConfig {
        AppConfig::get()
    }

    // 本地账号登录
    pub async fn login(
        &self,
        login_request: LoginRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        login::handle_login(self, login_request, request).await
    }

    // 本地账号注册
    pub async fn register(
        &self,
        register_request: RegisterRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        register::handle_register(self, register_request, request).await
    }

    // 刷新令牌
    pub async fn refresh_token(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        token::handle_refresh_token(self, request).await
    }

    pub async fn logout(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        logout::handle_logout(request).await
    }

    // 获取当前用户信息
    pub async fn get_user(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        token::handle_get_user(request).await
    }

    pub async fn github_login(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        github::handle_github_login(self, request).await
    }

    pub async fn github_callback(
        &self,
        query: GithubCallbackQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        github::handle_github_callback(self, query, request).await
    }
}

/// 签发 access token 与 refresh token cookie
///
/// 本地登录和 GitHub 登录共用；“记住我”延长 refresh token 的有效期。
pub(crate) fn issue_session(
    user: User,
    remember_me: bool,
    message: &str,
) -> ActixResult<HttpResponse> {
    let jwt = &AppConfig::get().jwt;
    let refresh_days = if remember_me {
        jwt.refresh_token_remember_me_expiry
    } else {
        jwt.refresh_token_expiry
    };

    match user.generate_token_pair(Some(chrono::Duration::days(refresh_days))) {
        Ok(token_pair) => {
            let refresh_cookie =
                JwtUtils::create_refresh_token_cookie(&token_pair.refresh_token, refresh_days);
            let response = LoginResponse {
                access_token: token_pair.access_token,
                expires_in: jwt.access_token_expiry * 60, // 转换为秒
                user,
                created_at: chrono::Utc::now(),
            };

            Ok(HttpResponse::Ok()
                .cookie(refresh_cookie)
                .json(ApiResponse::success(response, message)))
        }
        Err(e) => {
            tracing::error!("Failed to generate JWT token: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Login failed, unable to generate token",
                )),
            )
        }
    }
}
