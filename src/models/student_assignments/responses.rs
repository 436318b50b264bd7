use serde::Serialize;
use ts_rs::TS;

use super::entities::StudentAssignmentDetail;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "student_assignment.ts")]
pub struct StudentAssignmentListResponse {
    pub items: Vec<StudentAssignmentDetail>,
    pub total: i64,
}

// 学生仪表盘统计
#[derive(Debug, Clone, Default, PartialEq, Serialize, TS)]
#[ts(export, export_to = "student_assignment.ts")]
pub struct StudentDashboardStats {
    pub total: i64,
    pub assigned: i64,
    pub in_progress: i64,
    pub completed: i64,
    pub overdue: i64,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "student_assignment.ts")]
pub struct CategoriesResponse {
    pub categories: Vec<String>,
}
