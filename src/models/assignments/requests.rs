use serde::Deserialize;
use ts_rs::TS;

// 创建或更新作业请求（更新时为整体替换）
//
// due_date 接受三种格式：RFC3339、本地 "YYYY-MM-DDTHH:MM"、本地 "YYYY-MM-DD"。
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct AssignmentRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub due_date: Option<String>,
}

// 教师作业列表查询参数，category 优先于 search
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct AssignmentListParams {
    pub category: Option<String>,
    pub search: Option<String>,
}

// 批量分配请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct AssignStudentsRequest {
    pub student_ids: Vec<i64>,
}
