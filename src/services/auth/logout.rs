use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::header, web};
use std::sync::Arc;

use crate::cache::ObjectCache;
use crate::models::ApiResponse;
use crate::utils::jwt::JwtUtils;

/// 处理用户登出
///
/// 清除 refresh_token cookie，并丢弃当前 access token 对应的用户缓存。
pub async fn handle_logout(request: &HttpRequest) -> ActixResult<HttpResponse> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "));

    if let (Some(token), Some(cache)) = (token, request.app_data::<web::Data<Arc<dyn ObjectCache>>>()) {
        cache.remove(&format!("user:{token}")).await;
    }

    // max_age=0 会让浏览器删除该 cookie
    let empty_cookie = JwtUtils::create_empty_refresh_token_cookie();

    Ok(HttpResponse::Ok()
        .cookie(empty_cookie)
        .json(ApiResponse::<()>::success_empty("登出成功")))
}
