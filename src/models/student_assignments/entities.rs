use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::assignments::entities::Assignment;
use crate::models::users::entities::User;

// 台账状态
//
// 状态之间不强制顺序，学生可以直接设置任意状态。
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "student_assignment.ts")]
pub enum AssignmentStatus {
    Assigned,   // 已分配
    InProgress, // 进行中
    Completed,  // 已完成
}

impl AssignmentStatus {
    pub const ASSIGNED: &'static str = "assigned";
    pub const IN_PROGRESS: &'static str = "in_progress";
    pub const COMPLETED: &'static str = "completed";

    pub fn all() -> [AssignmentStatus; 3] {
        [
            AssignmentStatus::Assigned,
            AssignmentStatus::InProgress,
            AssignmentStatus::Completed,
        ]
    }
}

impl<'de> Deserialize<'de> for AssignmentStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<AssignmentStatus>().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的作业状态: '{s}'. 支持的状态: assigned, in_progress, completed"
            ))
        })
    }
}

impl std::fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssignmentStatus::Assigned => write!(f, "{}", AssignmentStatus::ASSIGNED),
            AssignmentStatus::InProgress => write!(f, "{}", AssignmentStatus::IN_PROGRESS),
            AssignmentStatus::Completed => write!(f, "{}", AssignmentStatus::COMPLETED),
        }
    }
}

impl std::str::FromStr for AssignmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            AssignmentStatus::ASSIGNED => Ok(AssignmentStatus::Assigned),
            AssignmentStatus::IN_PROGRESS => Ok(AssignmentStatus::InProgress),
            AssignmentStatus::COMPLETED => Ok(AssignmentStatus::Completed),
            _ => Err(format!("Invalid assignment status: {s}")),
        }
    }
}

// 台账记录：一名学生在一份作业上的进度
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "student_assignment.ts")]
pub struct StudentAssignment {
    pub id: i64,
    pub assignment_id: i64,
    pub student_id: i64,
    pub status: AssignmentStatus,
    /// 最近一次进入 completed 的时间，状态回退时不会清除
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StudentAssignment {
    pub fn is_completed(&self) -> bool {
        self.status == AssignmentStatus::Completed
    }

    /// 从分配到完成所用的整小时数
    pub fn hours_to_complete(&self) -> Option<i64> {
        self.completed_at
            .map(|completed| (completed - self.created_at).num_hours())
    }
}

// 学生视角：台账记录 + 作业详情
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "student_assignment.ts")]
pub struct StudentAssignmentDetail {
    #[serde(flatten)]
    pub entry: StudentAssignment,
    pub assignment: Assignment,
}

impl StudentAssignmentDetail {
    /// 未完成且已过截止时间
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.entry.is_completed() && self.assignment.is_overdue(now)
    }
}

// 教师视角：台账记录 + 学生信息
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "student_assignment.ts")]
pub struct AssignedStudent {
    #[serde(flatten)]
    pub entry: StudentAssignment,
    pub student: User,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_status_strings() {
        for status in AssignmentStatus::all() {
            assert_eq!(status.to_string().parse::<AssignmentStatus>(), Ok(status));
        }
        assert!("done".parse::<AssignmentStatus>().is_err());
        assert!(serde_json::from_str::<AssignmentStatus>("\"finished\"").is_err());
    }

    #[test]
    fn test_hours_to_complete_rounds_down() {
        let created = Utc::now();
        let entry = StudentAssignment {
            id: 1,
            assignment_id: 1,
            student_id: 2,
            status: AssignmentStatus::Completed,
            completed_at: Some(created + Duration::minutes(150)),
            created_at: created,
            updated_at: created,
        };
        assert_eq!(entry.hours_to_complete(), Some(2));
        assert!(entry.is_completed());
    }
}
