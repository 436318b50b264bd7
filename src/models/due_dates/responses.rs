use chrono::{DateTime, Utc};
use serde::Serialize;
use ts_rs::TS;

use super::entities::DueDateAlert;

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "due_date.ts")]
pub struct DueDateAlertsResponse {
    pub alerts: Vec<DueDateAlert>,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "due_date.ts")]
pub struct DueDateSummary {
    pub total_upcoming: i64,
    pub due_today: i64,
    pub due_tomorrow: i64,
    pub due_this_week: i64,
    pub overdue: i64,
    pub upcoming_alerts: Vec<DueDateAlert>,
    pub overdue_alerts: Vec<DueDateAlert>,
    pub due_today_alerts: Vec<DueDateAlert>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "due_date.ts")]
pub struct DueDateNotification {
    #[serde(flatten)]
    pub alert: DueDateAlert,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "due_date.ts")]
pub struct NotificationsResponse {
    pub notifications: Vec<DueDateNotification>,
    pub summary: DueDateSummary,
}

// 教师视角：即将截止的作业
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "due_date.ts")]
pub struct UpcomingDeadline {
    pub assignment_id: i64,
    pub title: String,
    pub due_date: DateTime<Utc>,
    pub days_until_due: i64,
    pub incomplete_count: i64,
    pub total_students: i64,
}

// 教师视角：已过期且仍有学生未完成的作业
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "due_date.ts")]
pub struct OverdueDeadline {
    pub assignment_id: i64,
    pub title: String,
    pub due_date: DateTime<Utc>,
    pub days_overdue: i64,
    pub incomplete_count: i64,
    pub total_students: i64,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "due_date.ts")]
pub struct InstructorDueDateOverview {
    pub total_assignments: i64,
    pub assignments_with_due_dates: i64,
    pub upcoming_due_dates: i64,
    pub overdue_assignments: i64,
    pub upcoming_deadlines: Vec<UpcomingDeadline>,
    pub overdue_list: Vec<OverdueDeadline>,
}
