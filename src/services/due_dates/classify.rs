//! 截止提醒分类
//!
//! 纯函数，不依赖存储和时钟。

use chrono::{DateTime, Utc};

use crate::models::due_dates::entities::{AlertPriority, AlertType, DueDateAlert};
use crate::models::student_assignments::entities::StudentAssignmentDetail;
use crate::models::users::entities::User;

/// 过期超过该天数升级为 critical
const CRITICAL_AFTER_DAYS: i64 = 7;

/// 距截止的整天数（向零截断）
pub fn whole_days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_days()
}

/// 未过期提醒的类型和优先级
pub fn classify_upcoming(days_until_due: i64) -> (AlertType, AlertPriority) {
    match days_until_due {
        0 => (AlertType::DueToday, AlertPriority::High),
        1 => (AlertType::DueTomorrow, AlertPriority::Medium),
        d if d <= 3 => (AlertType::Upcoming, AlertPriority::Medium),
        _ => (AlertType::Upcoming, AlertPriority::Low),
    }
}

/// 过期提醒的优先级
pub fn classify_overdue(days_past_due: i64) -> AlertPriority {
    if days_past_due > CRITICAL_AFTER_DAYS {
        AlertPriority::Critical
    } else {
        AlertPriority::High
    }
}

/// 由台账记录生成提醒；没有截止时间的作业不产生提醒
pub fn build_alert(
    student: &User,
    detail: &StudentAssignmentDetail,
    now: DateTime<Utc>,
) -> Option<DueDateAlert> {
    let due_date = detail.assignment.due_date?;

    let (days_until_due, alert_type, priority) = if due_date < now {
        let days_past = whole_days_between(due_date, now);
        (-days_past, AlertType::Overdue, classify_overdue(days_past))
    } else {
        let days = whole_days_between(now, due_date);
        let (alert_type, priority) = classify_upcoming(days);
        (days, alert_type, priority)
    };

    Some(DueDateAlert {
        student_id: student.id,
        student_name: student.username.clone(),
        student_email: student.email.clone(),
        assignment_id: detail.assignment.id,
        assignment_title: detail.assignment.title.clone(),
        assignment_url: detail.assignment.url.clone(),
        due_date,
        days_until_due,
        status: detail.entry.status,
        alert_type,
        priority,
    })
}

/// 提醒的展示文本
pub fn notification_message(alert: &DueDateAlert) -> String {
    let day = alert.due_date.format("%b %-d");
    match alert.alert_type {
        AlertType::DueToday => format!(
            "Assignment '{}' is due today! Complete it at: {}",
            alert.assignment_title, alert.assignment_url
        ),
        AlertType::DueTomorrow => format!(
            "Assignment '{}' is due tomorrow ({}). Complete it at: {}",
            alert.assignment_title, day, alert.assignment_url
        ),
        AlertType::Upcoming => format!(
            "Assignment '{}' is due in {} days ({}). Complete it at: {}",
            alert.assignment_title, alert.days_until_due, day, alert.assignment_url
        ),
        AlertType::Overdue => format!(
            "Assignment '{}' was due {} days ago ({}). Complete it now at: {}",
            alert.assignment_title, -alert.days_until_due, day, alert.assignment_url
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assignments::entities::Assignment;
    use crate::models::student_assignments::entities::{AssignmentStatus, StudentAssignment};
    use crate::models::users::entities::UserRole;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_upcoming_tiers() {
        assert_eq!(classify_upcoming(0), (AlertType::DueToday, AlertPriority::High));
        assert_eq!(
            classify_upcoming(1),
            (AlertType::DueTomorrow, AlertPriority::Medium)
        );
        assert_eq!(classify_upcoming(2), (AlertType::Upcoming, AlertPriority::Medium));
        assert_eq!(classify_upcoming(3), (AlertType::Upcoming, AlertPriority::Medium));
        assert_eq!(classify_upcoming(4), (AlertType::Upcoming, AlertPriority::Low));
    }

    #[test]
    fn test_overdue_tiers() {
        assert_eq!(classify_overdue(0), AlertPriority::High);
        assert_eq!(classify_overdue(7), AlertPriority::High);
        assert_eq!(classify_overdue(8), AlertPriority::Critical);
    }

    #[test]
    fn test_whole_days_truncate() {
        let now = Utc::now();
        assert_eq!(whole_days_between(now, now + Duration::hours(47)), 1);
        assert_eq!(whole_days_between(now, now + Duration::hours(23)), 0);
        assert_eq!(whole_days_between(now - Duration::hours(25), now), 1);
    }

    fn fixture(due_date: Option<DateTime<Utc>>) -> (User, StudentAssignmentDetail) {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let student = User {
            id: 2,
            username: "student1".to_string(),
            email: "student1@example.com".to_string(),
            github_id: None,
            avatar_url: None,
            password_hash: None,
            role: UserRole::Student,
            last_login: None,
            created_at: at,
            updated_at: at,
        };
        let detail = StudentAssignmentDetail {
            entry: StudentAssignment {
                id: 1,
                assignment_id: 10,
                student_id: 2,
                status: AssignmentStatus::Assigned,
                completed_at: None,
                created_at: at,
                updated_at: at,
            },
            assignment: Assignment {
                id: 10,
                title: "Essay".to_string(),
                description: String::new(),
                url: "https://x".to_string(),
                category: String::new(),
                due_date,
                created_by: 1,
                created_at: at,
                updated_at: at,
            },
        };
        (student, detail)
    }

    #[test]
    fn test_overdue_by_a_day() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        let (student, detail) = fixture(Some(now - Duration::hours(24)));

        let alert = build_alert(&student, &detail, now).unwrap();
        assert_eq!(alert.alert_type, AlertType::Overdue);
        assert_eq!(alert.priority, AlertPriority::High);
        assert_eq!(alert.days_until_due, -1);
        assert_eq!(
            notification_message(&alert),
            "Assignment 'Essay' was due 1 days ago (Mar 9). Complete it now at: https://x"
        );
    }

    #[test]
    fn test_alert_messages() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();

        let (student, detail) = fixture(Some(now + Duration::hours(30)));
        let alert = build_alert(&student, &detail, now).unwrap();
        assert_eq!(alert.alert_type, AlertType::DueTomorrow);
        assert_eq!(
            notification_message(&alert),
            "Assignment 'Essay' is due tomorrow (Mar 11). Complete it at: https://x"
        );

        let (student, detail) = fixture(Some(now + Duration::hours(2)));
        let alert = build_alert(&student, &detail, now).unwrap();
        assert_eq!(
            notification_message(&alert),
            "Assignment 'Essay' is due today! Complete it at: https://x"
        );

        let (student, detail) = fixture(None);
        assert!(build_alert(&student, &detail, now).is_none());
    }
}
