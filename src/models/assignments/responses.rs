use serde::Serialize;
use ts_rs::TS;

use super::entities::Assignment;
use crate::models::student_assignments::entities::AssignedStudent;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct AssignmentListResponse {
    pub items: Vec<Assignment>,
    pub total: i64,
}

// 批量分配结果，already_assigned 为被过滤掉的学生
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct AssignStudentsResponse {
    pub assigned: Vec<i64>,
    pub already_assigned: Vec<i64>,
}

// 某作业下的学生台账
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct AssignmentStudentsResponse {
    pub assignment_id: i64,
    pub items: Vec<AssignedStudent>,
    pub total: i64,
}

// 教师仪表盘统计
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct InstructorDashboardStats {
    pub total_assignments: i64,
    pub total_students: i64,
    pub total_student_assignments: i64,
    pub total_assigned: i64,
    pub total_in_progress: i64,
    pub total_completed: i64,
    pub completion_rate: f64,
    pub overdue_assignments: i64,
}
