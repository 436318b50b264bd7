use chrono::{DateTime, Utc};
use serde::Serialize;
use ts_rs::TS;

use crate::models::student_assignments::entities::AssignmentStatus;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "due_date.ts")]
pub enum AlertType {
    DueToday,
    DueTomorrow,
    Upcoming,
    Overdue,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "due_date.ts")]
pub enum AlertPriority {
    Low,
    Medium,
    High,
    Critical,
}

// 截止日期提醒，按需计算，不落库
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "due_date.ts")]
pub struct DueDateAlert {
    pub student_id: i64,
    pub student_name: String,
    pub student_email: String,
    pub assignment_id: i64,
    pub assignment_title: String,
    pub assignment_url: String,
    pub due_date: DateTime<Utc>,
    /// 距截止的整天数，过期时为负
    pub days_until_due: i64,
    pub status: AssignmentStatus,
    pub alert_type: AlertType,
    pub priority: AlertPriority,
}
