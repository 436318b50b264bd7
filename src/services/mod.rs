use actix_web::{HttpResponse, Result as ActixResult, http::StatusCode};
use serde::Serialize;
use ts_rs::TS;

use crate::errors::Result;
use crate::models::ApiResponse;

/// 取出当前请求的身份，失败时直接返回错误响应
macro_rules! auth_context {
    ($request:expr) => {
        match $crate::services::access::AuthContext::from_request($request) {
            Ok(ctx) => ctx,
            Err(e) => return Ok(e.to_response()),
        }
    };
}

pub mod access;
pub mod assignments;
pub mod auth;
pub mod due_dates;
pub mod progress;
pub mod student_assignments;

#[cfg(test)]
mod test_support;

pub use access::AuthContext;
pub use assignments::AssignmentService;
pub use auth::AuthService;
pub use due_dates::DueDateService;
pub use progress::ProgressService;
pub use student_assignments::StudentAssignmentService;

/// 把业务结果渲染为统一响应
pub(crate) fn respond_with<T: Serialize + TS>(
    status: StatusCode,
    result: Result<T>,
    message: &str,
) -> ActixResult<HttpResponse> {
    match result {
        Ok(data) => Ok(HttpResponse::build(status).json(ApiResponse::success(data, message))),
        Err(e) => Ok(e.to_response()),
    }
}

pub(crate) fn respond<T: Serialize + TS>(result: Result<T>, message: &str) -> ActixResult<HttpResponse> {
    respond_with(StatusCode::OK, result, message)
}

pub(crate) fn respond_empty(result: Result<()>, message: &str) -> ActixResult<HttpResponse> {
    match result {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty(message))),
        Err(e) => Ok(e.to_response()),
    }
}
