use chrono::{DateTime, Utc};
use serde::Deserialize;
use ts_rs::TS;

use super::entities::AssignmentStatus;

// 状态更新请求，status 在服务层解析以便返回 InvalidStatus
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "student_assignment.ts")]
pub struct UpdateStatusRequest {
    pub status: String,
}

// 学生作业列表查询参数
//
// 优先级：status > category > search。
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "student_assignment.ts")]
pub struct StudentAssignmentListParams {
    pub status: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
}

// 时间窗口参数（天）
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "student_assignment.ts")]
pub struct WindowParams {
    pub days: Option<i64>,
}

// 学生台账查询条件（存储层使用）
//
// 所有条件都会排除已软删除的台账记录和作业。
#[derive(Debug, Clone, PartialEq)]
pub enum StudentAssignmentFilter {
    /// 全部，按分配时间倒序
    All,
    Status(AssignmentStatus),
    Category(String),
    /// 标题或描述包含关键字
    Search(String),
    /// 截止时间早于 now 且未完成
    Overdue { now: DateTime<Utc> },
    /// 截止时间位于 [from, to] 且未完成，按截止时间升序；exclusive_start 时不含 from
    DueWithin {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        exclusive_start: bool,
    },
    /// since 之后完成，按完成时间倒序
    CompletedSince(DateTime<Utc>),
}
