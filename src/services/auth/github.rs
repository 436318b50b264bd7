//! GitHub OAuth2 登录
//!
//! 授权码流程：login 生成 state 并重定向到 GitHub，callback 校验 state、
//! 换取 access token、读取 `/user`，再按 GitHub ID 创建或同步账号。

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::header, web};
use chrono::{DateTime, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::ObjectCache;
use crate::config::GithubConfig;
use crate::errors::{Result, TrackerError};
use crate::models::{
    ApiResponse, ErrorCode,
    auth::GithubCallbackQuery,
    users::{entities::User, requests::ExternalProfile},
};
use crate::storage::Storage;

use super::{AuthService, issue_session};

/// state 的有效期（秒）
const STATE_TTL_SECS: u64 = 600;

#[derive(Debug, Deserialize)]
struct GithubTokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GithubUser {
    id: i64,
    login: String,
    email: Option<String>,
    avatar_url: Option<String>,
}

impl From<GithubUser> for ExternalProfile {
    fn from(user: GithubUser) -> Self {
        ExternalProfile {
            github_id: user.id,
            username: user.login,
            email: user.email.unwrap_or_default(),
            avatar_url: user.avatar_url,
        }
    }
}

fn state_key(state: &str) -> String {
    format!("oauth_state:{state}")
}

/// 拼接 GitHub 授权地址
pub fn authorize_url(config: &GithubConfig, state: &str) -> Result<String> {
    let url = Url::parse_with_params(
        &config.authorize_url,
        &[
            ("client_id", config.client_id.as_str()),
            ("redirect_uri", config.redirect_url.as_str()),
            ("scope", "read:user user:email"),
            ("state", state),
        ],
    )
    .map_err(|e| TrackerError::external_identity(format!("GitHub 授权地址无效: {e}")))?;
    Ok(url.into())
}

/// 取出并作废 state，一次性使用
///
/// 只有真正删掉缓存条目的调用才算成功，并发回调中至多一个通过。
pub async fn take_state(cache: &dyn ObjectCache, state: &str) -> bool {
    cache.remove(&state_key(state)).await.is_some()
}

fn http_client() -> Result<Client> {
    Client::builder()
        .user_agent(concat!("reading-tracker/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| TrackerError::external_identity(format!("HTTP 客户端初始化失败: {e}")))
}

/// 用授权码换取 GitHub access token
async fn exchange_code(client: &Client, config: &GithubConfig, code: &str) -> Result<String> {
    let params = [
        ("client_id", config.client_id.as_str()),
        ("client_secret", config.client_secret.as_str()),
        ("code", code),
        ("redirect_uri", config.redirect_url.as_str()),
    ];

    let response = client
        .post(&config.token_url)
        .header(header::ACCEPT.as_str(), "application/json")
        .form(&params)
        .send()
        .await
        .map_err(|e| TrackerError::external_identity(format!("Token exchange failed: {e}")))?;

    if !response.status().is_success() {
        return Err(TrackerError::external_identity(format!(
            "Token exchange failed with status {}",
            response.status()
        )));
    }

    let token: GithubTokenResponse = response.json().await.map_err(|e| {
        TrackerError::external_identity(format!("Failed to parse token response: {e}"))
    })?;

    match token {
        GithubTokenResponse {
            access_token: Some(access_token),
            ..
        } => Ok(access_token),
        GithubTokenResponse {
            error,
            error_description,
            ..
        } => Err(TrackerError::external_identity(format!(
            "GitHub rejected the code: {}",
            error_description.or(error).unwrap_or_default()
        ))),
    }
}

/// 读取 GitHub 用户资料
async fn fetch_profile(
    client: &Client,
    config: &GithubConfig,
    access_token: &str,
) -> Result<ExternalProfile> {
    let response = client
        .get(format!("{}/user", config.api_url.trim_end_matches('/')))
        .bearer_auth(access_token)
        .header(header::ACCEPT.as_str(), "application/vnd.github+json")
        .send()
        .await
        .map_err(|e| TrackerError::external_identity(format!("User request failed: {e}")))?;

    if !response.status().is_success() {
        return Err(TrackerError::external_identity(format!(
            "User request failed with status {}",
            response.status()
        )));
    }

    let user: GithubUser = response
        .json()
        .await
        .map_err(|e| TrackerError::external_identity(format!("Failed to parse user: {e}")))?;
    Ok(user.into())
}

/// 按 GitHub 资料创建或同步账号，已停用的账号拒绝登录
pub async fn sign_in_external(
    storage: &dyn Storage,
    profile: ExternalProfile,
    now: DateTime<Utc>,
) -> Result<User> {
    let github_id = profile.github_id;
    let user = storage
        .upsert_external_user(profile, now)
        .await?
        .ok_or_else(|| TrackerError::authentication("Account has been disabled"))?;

    if let Err(e) = storage.update_last_login(user.id, now).await {
        tracing::warn!("Failed to update last login for user {}: {}", user.id, e);
    }
    tracing::info!("GitHub user {} signed in as {}", github_id, user.username);
    Ok(user)
}

fn disabled_response() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::ExternalIdentityDisabled,
        "GitHub login is not configured",
    ))
}

fn object_cache(request: &HttpRequest) -> Option<Arc<dyn ObjectCache>> {
    request
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .map(|data| data.get_ref().clone())
}

pub async fn handle_github_login(
    service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let config = &service.get_config().github;
    if !config.is_enabled() {
        return Ok(disabled_response());
    }
    let Some(cache) = object_cache(request) else {
        tracing::error!("Object cache not found in app data");
        return Ok(TrackerError::external_identity("Login state store unavailable").to_response());
    };

    let state = uuid::Uuid::new_v4().to_string();
    let location = match authorize_url(config, &state) {
        Ok(url) => url,
        Err(e) => return Ok(e.to_response()),
    };
    cache
        .insert_raw(state_key(&state), Utc::now().timestamp().to_string(), STATE_TTL_SECS)
        .await;

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish())
}

pub async fn handle_github_callback(
    service: &AuthService,
    query: GithubCallbackQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let config = &service.get_config().github;
    if !config.is_enabled() {
        return Ok(disabled_response());
    }

    if let Some(error) = query.error {
        return Ok(
            TrackerError::external_identity(format!("GitHub authorization failed: {error}"))
                .to_response(),
        );
    }

    let state_ok = match (object_cache(request), query.state.as_deref()) {
        (Some(cache), Some(state)) => take_state(cache.as_ref(), state).await,
        _ => false,
    };
    if !state_ok {
        return Ok(TrackerError::authentication("Invalid or expired OAuth state").to_response());
    }

    let Some(code) = query.code.filter(|c| !c.is_empty()) else {
        return Ok(TrackerError::validation("Missing authorization code").to_response());
    };

    let storage = service.get_storage(request);
    let result = async {
        let client = http_client()?;
        let access_token = exchange_code(&client, config, &code).await?;
        let profile = fetch_profile(&client, config, &access_token).await?;
        sign_in_external(storage.as_ref(), profile, Utc::now()).await
    }
    .await;

    match result {
        Ok(user) => issue_session(user, false, "Login successful"),
        Err(e) => {
            tracing::warn!("GitHub login failed: {}", e);
            Ok(e.to_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MokaCacheWrapper;
    use crate::models::users::entities::UserRole;
    use crate::services::test_support::storage;

    #[test]
    fn test_authorize_url_encodes_params() {
        let config = GithubConfig {
            client_id: "abc".to_string(),
            client_secret: "secret".to_string(),
            ..Default::default()
        };

        let url = authorize_url(&config, "xyz").unwrap();
        assert!(url.starts_with("https://github.com/login/oauth/authorize?client_id=abc"));
        assert!(url.contains("state=xyz"));
        assert!(url.contains("redirect_uri=http%3A%2F%2F127.0.0.1%3A8080"));
        assert!(!url.contains("secret"));
    }

    #[tokio::test]
    async fn test_state_is_single_use() {
        let cache = MokaCacheWrapper::new(100, 60);
        cache
            .insert_raw(state_key("s1"), String::new(), STATE_TTL_SECS)
            .await;

        assert!(take_state(&cache, "s1").await);
        assert!(!take_state(&cache, "s1").await);
        assert!(!take_state(&cache, "unknown").await);
    }

    #[tokio::test]
    async fn test_concurrent_callbacks_share_one_state() {
        let cache = MokaCacheWrapper::new(100, 60);
        cache
            .insert_raw(state_key("s2"), String::new(), STATE_TTL_SECS)
            .await;

        let (first, second) = tokio::join!(take_state(&cache, "s2"), take_state(&cache, "s2"));
        assert!(first ^ second);
    }

    #[test]
    fn test_profile_without_email() {
        let profile: ExternalProfile = GithubUser {
            id: 9,
            login: "octocat".to_string(),
            email: None,
            avatar_url: Some("https://avatars/9".to_string()),
        }
        .into();
        assert_eq!(profile.email, "");
        assert_eq!(profile.github_id, 9);
    }

    #[tokio::test]
    async fn test_first_sign_in_creates_student() {
        let storage = storage().await;
        let profile = ExternalProfile {
            github_id: 5,
            username: "octocat".to_string(),
            email: "octo@example.com".to_string(),
            avatar_url: None,
        };

        let user = sign_in_external(storage.as_ref(), profile.clone(), Utc::now())
            .await
            .unwrap();
        assert_eq!(user.role, UserRole::Student);
        assert!(user.password_hash.is_none());

        let again = sign_in_external(storage.as_ref(), profile, Utc::now())
            .await
            .unwrap();
        assert_eq!(again.id, user.id);
    }
}
