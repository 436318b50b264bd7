use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 阅读作业实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct Assignment {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub url: String,
    pub category: String,
    pub due_date: Option<DateTime<Utc>>,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Assignment {
    /// 截止时间已过（没有截止时间的作业永远不会过期）
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.due_date.is_some_and(|due| now > due)
    }

    pub fn is_owned_by(&self, instructor_id: i64) -> bool {
        self.created_by == instructor_id
    }

    /// 分类为空时归入 uncategorized
    pub fn category_label(&self) -> &str {
        if self.category.is_empty() {
            "uncategorized"
        } else {
            &self.category
        }
    }
}

// 经过校验的作业字段，创建和更新共用
#[derive(Debug, Clone)]
pub struct AssignmentFields {
    pub title: String,
    pub description: String,
    pub url: String,
    pub category: String,
    pub due_date: Option<DateTime<Utc>>,
}
