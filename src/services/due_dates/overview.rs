use chrono::{DateTime, Utc};

use crate::errors::Result;
use crate::models::due_dates::responses::{
    InstructorDueDateOverview, OverdueDeadline, UpcomingDeadline,
};
use crate::services::access::{AuthContext, require_instructor};
use crate::storage::Storage;
use crate::utils::offset_days;

use super::classify::whole_days_between;

/// 教师视角的截止日期概览
///
/// 截止时间在 (now, now + window_days) 内的作业计入即将到期；
/// 已过期且仍有学生未完成的作业计入过期列表。
pub async fn instructor_overview(
    storage: &dyn Storage,
    ctx: &AuthContext,
    window_days: i64,
    now: DateTime<Utc>,
) -> Result<InstructorDueDateOverview> {
    let instructor = require_instructor(storage, ctx).await?;
    let assignments = storage.list_assignments_by_instructor(instructor.id).await?;
    let horizon = offset_days(now, window_days)?;

    let mut overview = InstructorDueDateOverview {
        total_assignments: assignments.len() as i64,
        assignments_with_due_dates: 0,
        upcoming_due_dates: 0,
        overdue_assignments: 0,
        upcoming_deadlines: Vec::new(),
        overdue_list: Vec::new(),
    };

    for assignment in assignments {
        let Some(due_date) = assignment.due_date else {
            continue;
        };
        overview.assignments_with_due_dates += 1;

        let is_upcoming = due_date > now && due_date < horizon;
        let is_overdue = due_date < now;
        if !is_upcoming && !is_overdue {
            continue;
        }

        let breakdown = storage.count_statuses_for_assignment(assignment.id).await?;
        let total_students = breakdown.total();
        let incomplete_count = total_students - breakdown.completed;

        if is_upcoming {
            overview.upcoming_due_dates += 1;
            overview.upcoming_deadlines.push(UpcomingDeadline {
                assignment_id: assignment.id,
                title: assignment.title,
                due_date,
                days_until_due: whole_days_between(now, due_date),
                incomplete_count,
                total_students,
            });
        } else if incomplete_count > 0 {
            overview.overdue_assignments += 1;
            overview.overdue_list.push(OverdueDeadline {
                assignment_id: assignment.id,
                title: assignment.title,
                due_date,
                days_overdue: whole_days_between(due_date, now),
                incomplete_count,
                total_students,
            });
        }
    }

    Ok(overview)
}
