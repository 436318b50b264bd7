//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码、类型名称以及到 HTTP 响应的映射。

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use std::fmt;

use crate::models::{ApiResponse, ErrorCode};

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_tracker_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum TrackerError {
            $($variant(String),)*
        }

        impl TrackerError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(TrackerError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(TrackerError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(TrackerError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl TrackerError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        TrackerError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_tracker_errors! {
    DatabaseConfig("E001", "Database Configuration Error"),
    DatabaseConnection("E002", "Database Connection Error"),
    DatabaseOperation("E003", "Database Operation Error"),
    FileOperation("E004", "File Operation Error"),
    Serialization("E005", "Serialization Error"),
    DateParse("E006", "Date Parse Error"),
    Validation("E007", "Validation Error"),
    InvalidDueDate("E008", "Invalid Due Date"),
    NotFound("E009", "Resource Not Found"),
    AccessDenied("E010", "Access Denied"),
    Authentication("E011", "Authentication Error"),
    DuplicateAssignment("E012", "Duplicate Assignment"),
    AllAlreadyAssigned("E013", "All Students Already Assigned"),
    InvalidStudents("E014", "Invalid Students"),
    InvalidStatus("E015", "Invalid Status"),
    NotAStudent("E016", "Not A Student"),
    NotAnInstructor("E017", "Not An Instructor"),
    ExternalIdentity("E018", "External Identity Error"),
}

impl TrackerError {
    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// 是否属于内部错误（数据库、序列化等），这类错误对调用方不透明
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            TrackerError::DatabaseConfig(_)
                | TrackerError::DatabaseConnection(_)
                | TrackerError::DatabaseOperation(_)
                | TrackerError::FileOperation(_)
                | TrackerError::Serialization(_)
                | TrackerError::DateParse(_)
        )
    }

    /// 映射为 API 业务错误码
    pub fn error_code(&self) -> ErrorCode {
        match self {
            TrackerError::Validation(_) => ErrorCode::BadRequest,
            TrackerError::InvalidDueDate(_) => ErrorCode::InvalidDueDate,
            TrackerError::NotFound(_) => ErrorCode::NotFound,
            TrackerError::AccessDenied(_) => ErrorCode::Forbidden,
            TrackerError::Authentication(_) => ErrorCode::AuthFailed,
            TrackerError::DuplicateAssignment(_) => ErrorCode::DuplicateAssignment,
            TrackerError::AllAlreadyAssigned(_) => ErrorCode::AllAlreadyAssigned,
            TrackerError::InvalidStudents(_) => ErrorCode::InvalidStudents,
            TrackerError::InvalidStatus(_) => ErrorCode::InvalidStatus,
            TrackerError::NotAStudent(_) => ErrorCode::NotAStudent,
            TrackerError::NotAnInstructor(_) => ErrorCode::NotAnInstructor,
            TrackerError::ExternalIdentity(_) => ErrorCode::ExternalIdentityFailed,
            _ => ErrorCode::InternalServerError,
        }
    }

    /// 映射为 HTTP 状态码
    pub fn http_status(&self) -> StatusCode {
        match self {
            TrackerError::Validation(_)
            | TrackerError::InvalidDueDate(_)
            | TrackerError::InvalidStudents(_)
            | TrackerError::InvalidStatus(_) => StatusCode::BAD_REQUEST,
            TrackerError::NotFound(_) => StatusCode::NOT_FOUND,
            TrackerError::AccessDenied(_)
            | TrackerError::NotAStudent(_)
            | TrackerError::NotAnInstructor(_) => StatusCode::FORBIDDEN,
            TrackerError::Authentication(_) => StatusCode::UNAUTHORIZED,
            TrackerError::DuplicateAssignment(_) | TrackerError::AllAlreadyAssigned(_) => {
                StatusCode::CONFLICT
            }
            TrackerError::ExternalIdentity(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 转换为统一的 API 错误响应
    ///
    /// 内部错误只记录日志，不向客户端暴露细节。
    pub fn to_response(&self) -> HttpResponse {
        let message = if self.is_internal() {
            #[cfg(debug_assertions)]
            tracing::error!("{}", self.format_colored());
            #[cfg(not(debug_assertions))]
            tracing::error!("{}", self.format_simple());
            "Internal server error".to_string()
        } else {
            self.message().to_string()
        };

        HttpResponse::build(self.http_status())
            .json(ApiResponse::error_empty(self.error_code(), message))
    }
}

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for TrackerError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for TrackerError {
    fn from(err: sea_orm::DbErr) -> Self {
        TrackerError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for TrackerError {
    fn from(err: std::io::Error) -> Self {
        TrackerError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        TrackerError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for TrackerError {
    fn from(err: chrono::ParseError) -> Self {
        TrackerError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(TrackerError::database_config("test").code(), "E001");
        assert_eq!(TrackerError::validation("test").code(), "E007");
        assert_eq!(TrackerError::not_found("test").code(), "E009");
        assert_eq!(TrackerError::all_already_assigned("test").code(), "E013");
        assert_eq!(TrackerError::not_an_instructor("test").code(), "E017");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            TrackerError::invalid_due_date("test").error_type(),
            "Invalid Due Date"
        );
        assert_eq!(
            TrackerError::not_a_student("test").error_type(),
            "Not A Student"
        );
    }

    #[test]
    fn test_error_message() {
        let err = TrackerError::validation("Title is required");
        assert_eq!(err.message(), "Title is required");
    }

    #[test]
    fn test_format_simple() {
        let err = TrackerError::access_denied("not the owner");
        let formatted = err.format_simple();
        assert!(formatted.contains("Access Denied"));
        assert!(formatted.contains("not the owner"));
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(
            TrackerError::validation("x").http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            TrackerError::not_found("x").http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            TrackerError::access_denied("x").http_status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            TrackerError::all_already_assigned("x").http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            TrackerError::database_operation("x").http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_errors_are_opaque() {
        assert!(TrackerError::database_operation("boom").is_internal());
        assert!(!TrackerError::invalid_status("bad").is_internal());
        assert_eq!(
            TrackerError::database_operation("boom").error_code(),
            ErrorCode::InternalServerError
        );
    }
}
