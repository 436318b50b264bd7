use chrono::{DateTime, Utc};

use crate::errors::{Result, TrackerError};
use crate::models::student_assignments::{
    entities::{AssignmentStatus, StudentAssignmentDetail},
    requests::{StudentAssignmentFilter, StudentAssignmentListParams},
};
use crate::services::access::{AuthContext, require_student};
use crate::storage::Storage;
use crate::utils::{offset_days, window_days};

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// 解析状态字符串，未知值返回 InvalidStatus
pub(crate) fn parse_status(value: &str) -> Result<AssignmentStatus> {
    value
        .trim()
        .parse::<AssignmentStatus>()
        .map_err(|_| TrackerError::invalid_status(format!("Invalid status: {}", value.trim())))
}

/// 学生的作业列表，优先级 status > category > search
pub async fn list_assignments(
    storage: &dyn Storage,
    ctx: &AuthContext,
    params: &StudentAssignmentListParams,
) -> Result<Vec<StudentAssignmentDetail>> {
    let student = require_student(storage, ctx).await?;

    let filter = if let Some(status) = non_empty(&params.status) {
        StudentAssignmentFilter::Status(parse_status(status)?)
    } else if let Some(category) = non_empty(&params.category) {
        StudentAssignmentFilter::Category(category.to_string())
    } else if let Some(query) = non_empty(&params.search) {
        StudentAssignmentFilter::Search(query.to_string())
    } else {
        StudentAssignmentFilter::All
    };

    storage.list_student_assignments(student.id, filter).await
}

/// 已过截止时间且未完成
pub async fn overdue(
    storage: &dyn Storage,
    ctx: &AuthContext,
    now: DateTime<Utc>,
) -> Result<Vec<StudentAssignmentDetail>> {
    let student = require_student(storage, ctx).await?;
    storage
        .list_student_assignments(student.id, StudentAssignmentFilter::Overdue { now })
        .await
}

/// 截止时间落在 (now, now + days] 内且未完成
pub async fn upcoming(
    storage: &dyn Storage,
    ctx: &AuthContext,
    days: Option<i64>,
    default_days: i64,
    now: DateTime<Utc>,
) -> Result<Vec<StudentAssignmentDetail>> {
    let student = require_student(storage, ctx).await?;
    let to = offset_days(now, window_days(days, default_days)?)?;

    storage
        .list_student_assignments(
            student.id,
            StudentAssignmentFilter::DueWithin {
                from: now,
                to,
                exclusive_start: true,
            },
        )
        .await
}

/// 最近 days 天内完成的作业
pub async fn recently_completed(
    storage: &dyn Storage,
    ctx: &AuthContext,
    days: Option<i64>,
    default_days: i64,
    now: DateTime<Utc>,
) -> Result<Vec<StudentAssignmentDetail>> {
    let student = require_student(storage, ctx).await?;
    let since = offset_days(now, -window_days(days, default_days)?)?;

    storage
        .list_student_assignments(student.id, StudentAssignmentFilter::CompletedSince(since))
        .await
}
