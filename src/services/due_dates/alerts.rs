use chrono::{DateTime, Utc};

use crate::errors::Result;
use crate::models::due_dates::{
    entities::{AlertPriority, AlertType, DueDateAlert},
    responses::{DueDateNotification, DueDateSummary, NotificationsResponse},
};
use crate::models::student_assignments::requests::StudentAssignmentFilter;
use crate::models::users::entities::User;
use crate::services::access::{AuthContext, require_student};
use crate::storage::Storage;
use crate::utils::{offset_days, window_days};

use super::classify::{build_alert, notification_message};

async fn collect(
    storage: &dyn Storage,
    student: &User,
    filter: StudentAssignmentFilter,
    now: DateTime<Utc>,
) -> Result<Vec<DueDateAlert>> {
    let entries = storage.list_student_assignments(student.id, filter).await?;
    Ok(entries
        .iter()
        .filter_map(|detail| build_alert(student, detail, now))
        .collect())
}

async fn upcoming_for(
    storage: &dyn Storage,
    student: &User,
    days: i64,
    now: DateTime<Utc>,
) -> Result<Vec<DueDateAlert>> {
    let filter = StudentAssignmentFilter::DueWithin {
        from: now,
        to: offset_days(now, days)?,
        exclusive_start: false,
    };
    collect(storage, student, filter, now).await
}

async fn overdue_for(
    storage: &dyn Storage,
    student: &User,
    now: DateTime<Utc>,
) -> Result<Vec<DueDateAlert>> {
    collect(storage, student, StudentAssignmentFilter::Overdue { now }, now).await
}

/// 截止时间位于 [now, now + days] 的未完成作业提醒，按截止时间升序
///
/// days 缺省或非正数时使用 default_days，超过上限返回 Validation。
pub async fn upcoming_alerts(
    storage: &dyn Storage,
    ctx: &AuthContext,
    days: Option<i64>,
    default_days: i64,
    now: DateTime<Utc>,
) -> Result<Vec<DueDateAlert>> {
    let student = require_student(storage, ctx).await?;
    let days = window_days(days, default_days)?;
    upcoming_for(storage, &student, days, now).await
}

/// 已过期的未完成作业提醒
pub async fn overdue_alerts(
    storage: &dyn Storage,
    ctx: &AuthContext,
    now: DateTime<Utc>,
) -> Result<Vec<DueDateAlert>> {
    let student = require_student(storage, ctx).await?;
    overdue_for(storage, &student, now).await
}

fn summarize(upcoming: Vec<DueDateAlert>, overdue: Vec<DueDateAlert>) -> DueDateSummary {
    let due_today_alerts: Vec<DueDateAlert> = upcoming
        .iter()
        .filter(|a| a.days_until_due == 0)
        .cloned()
        .collect();

    DueDateSummary {
        total_upcoming: upcoming.len() as i64,
        due_today: due_today_alerts.len() as i64,
        due_tomorrow: upcoming.iter().filter(|a| a.days_until_due == 1).count() as i64,
        due_this_week: upcoming.iter().filter(|a| a.days_until_due <= 7).count() as i64,
        overdue: overdue.len() as i64,
        upcoming_alerts: upcoming,
        overdue_alerts: overdue,
        due_today_alerts,
    }
}

/// 学生的截止日期汇总
pub async fn summary(
    storage: &dyn Storage,
    ctx: &AuthContext,
    window_days: i64,
    now: DateTime<Utc>,
) -> Result<DueDateSummary> {
    let student = require_student(storage, ctx).await?;
    let upcoming = upcoming_for(storage, &student, window_days, now).await?;
    let overdue = overdue_for(storage, &student, now).await?;
    Ok(summarize(upcoming, overdue))
}

/// 通知列表：过期、今天到期，以及优先级为 high/medium 的其余即将到期提醒
pub async fn notifications(
    storage: &dyn Storage,
    ctx: &AuthContext,
    window_days: i64,
    now: DateTime<Utc>,
) -> Result<NotificationsResponse> {
    let summary = summary(storage, ctx, window_days, now).await?;

    let upcoming = summary.upcoming_alerts.iter().filter(|a| {
        a.alert_type != AlertType::DueToday
            && matches!(a.priority, AlertPriority::High | AlertPriority::Medium)
    });
    let notifications = summary
        .overdue_alerts
        .iter()
        .chain(summary.due_today_alerts.iter())
        .chain(upcoming)
        .map(|alert| DueDateNotification {
            message: notification_message(alert),
            alert: alert.clone(),
        })
        .collect();

    Ok(NotificationsResponse {
        notifications,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::student_assignments::entities::AssignmentStatus;
    use chrono::Duration;
    use crate::services::test_support::*;

    #[tokio::test]
    async fn test_overdue_alert_for_assigned_entry() {
        let storage = storage().await;
        let now = Utc::now();
        let alice = instructor(&storage, "teacher1").await;
        let s1 = student(&storage, "student1").await;
        let a = assignment(&storage, &alice, "Essay", Some(now - Duration::hours(24))).await;
        assign(&storage, &a, &[&s1], now - Duration::days(3)).await;

        let alerts = overdue_alerts(storage.as_ref(), &ctx(&s1), now).await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].priority, AlertPriority::High);
        assert_eq!(alerts[0].alert_type, AlertType::Overdue);
        assert_eq!(alerts[0].days_until_due, -1);
        assert_eq!(alerts[0].student_name, "student1");
    }

    #[tokio::test]
    async fn test_completed_entries_produce_no_alerts() {
        let storage = storage().await;
        let now = Utc::now();
        let alice = instructor(&storage, "teacher1").await;
        let s1 = student(&storage, "student1").await;
        let late = assignment(&storage, &alice, "Late", Some(now - Duration::days(2))).await;
        let soon = assignment(&storage, &alice, "Soon", Some(now + Duration::days(2))).await;
        assign(&storage, &late, &[&s1], now).await;
        assign(&storage, &soon, &[&s1], now).await;
        for id in [late.id, soon.id] {
            storage
                .update_student_assignment_status(id, s1.id, AssignmentStatus::Completed, now)
                .await
                .unwrap();
        }

        assert!(overdue_alerts(storage.as_ref(), &ctx(&s1), now).await.unwrap().is_empty());
        assert!(
            upcoming_alerts(storage.as_ref(), &ctx(&s1), None, 7, now)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_summary_and_notifications() {
        let storage = storage().await;
        let now = Utc::now();
        let alice = instructor(&storage, "teacher1").await;
        let s1 = student(&storage, "student1").await;
        let hours = [-(24 * 10), 2, 30, 60, 24 * 5 + 1, 24 * 9];
        for (i, h) in hours.iter().enumerate() {
            let a = assignment(
                &storage,
                &alice,
                &format!("Reading {i}"),
                Some(now + Duration::hours(*h)),
            )
            .await;
            assign(&storage, &a, &[&s1], now - Duration::days(20)).await;
        }

        let summary = summary(storage.as_ref(), &ctx(&s1), 7, now).await.unwrap();
        assert_eq!(summary.total_upcoming, 4);
        assert_eq!(summary.due_today, 1);
        assert_eq!(summary.due_tomorrow, 1);
        assert_eq!(summary.due_this_week, 4);
        assert_eq!(summary.overdue, 1);
        assert_eq!(summary.overdue_alerts[0].priority, AlertPriority::Critical);
        let days: Vec<i64> = summary.upcoming_alerts.iter().map(|a| a.days_until_due).collect();
        assert_eq!(days, vec![0, 1, 2, 5]);

        let response = notifications(storage.as_ref(), &ctx(&s1), 7, now).await.unwrap();
        let kinds: Vec<AlertType> = response
            .notifications
            .iter()
            .map(|n| n.alert.alert_type)
            .collect();
        // 5 天后的提醒优先级为 low，不进入通知
        assert_eq!(
            kinds,
            vec![
                AlertType::Overdue,
                AlertType::DueToday,
                AlertType::DueTomorrow,
                AlertType::Upcoming,
            ]
        );
        assert!(response.notifications[1].message.contains("due today"));
    }

    #[tokio::test]
    async fn test_upcoming_window() {
        let storage = storage().await;
        let now = Utc::now();
        let alice = instructor(&storage, "teacher1").await;
        let s1 = student(&storage, "student1").await;
        let a = assignment(&storage, &alice, "Far", Some(now + Duration::days(10))).await;
        assign(&storage, &a, &[&s1], now).await;

        assert!(
            upcoming_alerts(storage.as_ref(), &ctx(&s1), Some(0), 7, now)
                .await
                .unwrap()
                .is_empty()
        );
        let alerts = upcoming_alerts(storage.as_ref(), &ctx(&s1), Some(14), 7, now)
            .await
            .unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].priority, AlertPriority::Low);
    }

    #[tokio::test]
    async fn test_oversized_alert_window_is_rejected() {
        let storage = storage().await;
        let s1 = student(&storage, "student1").await;

        for days in [1_000_000_000, i64::MAX] {
            let err = upcoming_alerts(storage.as_ref(), &ctx(&s1), Some(days), 7, Utc::now())
                .await
                .unwrap_err();
            assert_eq!(err.code(), "E007");
        }
    }
}
