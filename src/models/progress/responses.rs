use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::models::student_assignments::entities::AssignmentStatus;

// 单个作业的状态分布
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "progress.ts")]
pub struct AssignmentProgress {
    pub assignment_id: i64,
    pub total_students: i64,
    pub assigned: i64,
    pub in_progress: i64,
    pub completed: i64,
    pub assigned_percentage: f64,
    pub in_progress_percentage: f64,
    pub completed_percentage: f64,
}

// 按状态计数
#[derive(Debug, Clone, Default, PartialEq, Serialize, TS)]
#[ts(export, export_to = "progress.ts")]
pub struct StatusBreakdown {
    pub assigned: i64,
    pub in_progress: i64,
    pub completed: i64,
}

impl StatusBreakdown {
    pub fn add(&mut self, status: AssignmentStatus, count: i64) {
        match status {
            AssignmentStatus::Assigned => self.assigned += count,
            AssignmentStatus::InProgress => self.in_progress += count,
            AssignmentStatus::Completed => self.completed += count,
        }
    }

    pub fn total(&self) -> i64 {
        self.assigned + self.in_progress + self.completed
    }
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "progress.ts")]
pub struct StudentProgressDetail {
    pub student_id: i64,
    pub student_name: String,
    pub student_email: String,
    pub status: AssignmentStatus,
    pub assigned_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub time_to_complete_hours: Option<i64>,
    pub is_overdue: bool,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "progress.ts")]
pub struct DetailedProgressReport {
    pub assignment_id: i64,
    pub title: String,
    pub total_students: i64,
    pub completion_rate: f64,
    pub average_time_to_complete_hours: i64,
    pub status_breakdown: StatusBreakdown,
    pub overdue_count: i64,
    pub student_details: Vec<StudentProgressDetail>,
    pub created_at: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
}

// 分类统计，完成率和平均用时由原始计数重新计算
#[derive(Debug, Clone, Default, PartialEq, Serialize, TS)]
#[ts(export, export_to = "progress.ts")]
pub struct CategoryStats {
    pub assignment_count: i64,
    pub student_assignment_count: i64,
    pub completed_count: i64,
    pub completion_rate: f64,
    pub average_time_to_complete_hours: i64,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "progress.ts")]
pub struct RecentCompletion {
    pub student_id: i64,
    pub student_name: String,
    pub assignment_id: i64,
    pub assignment_title: String,
    pub completed_at: DateTime<Utc>,
    pub time_taken_hours: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, TS)]
#[ts(export, export_to = "progress.ts")]
pub struct StudentEngagement {
    pub active_students: i64,
    pub average_assignments_per_student: f64,
    pub completions_last_7_days: i64,
    pub completions_last_30_days: i64,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "progress.ts")]
pub struct InstructorProgressSummary {
    pub total_assignments: i64,
    pub total_student_assignments: i64,
    pub overall_completion_rate: f64,
    pub assignments_with_due_dates: i64,
    pub overdue_assignments: i64,
    pub average_completion_time_hours: i64,
    pub category_breakdown: BTreeMap<String, CategoryStats>,
    pub recent_completions: Vec<RecentCompletion>,
    pub student_engagement: StudentEngagement,
}
