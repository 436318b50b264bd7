pub mod assignments;
pub mod auth;
pub mod common;
pub mod due_dates;
pub mod progress;
pub mod student_assignments;
pub mod users;

pub use common::response::ApiResponse;

/// API 业务错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误
    BadRequest = 1000,
    Unauthorized = 1001,
    AuthFailed = 1002,
    Forbidden = 1003,
    NotFound = 1004,
    InternalServerError = 1005,

    // 用户相关
    UserNameAlreadyExists = 2002,
    UserEmailAlreadyExists = 2004,
    ExternalIdentityFailed = 2007,
    ExternalIdentityDisabled = 2008,

    // 阅读作业相关
    InvalidDueDate = 3000,
    DuplicateAssignment = 3001,
    AllAlreadyAssigned = 3002,
    InvalidStudents = 3003,
    InvalidStatus = 3004,
    NotAStudent = 3005,
    NotAnInstructor = 3006,
}

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}
