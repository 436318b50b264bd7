use super::entities::User;
use serde::Serialize;
use ts_rs::TS;

// 学生列表响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "user.ts")]
pub struct StudentListResponse {
    pub items: Vec<User>,
    pub total: i64,
}
