use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::errors::Result;
use crate::models::progress::responses::{
    CategoryStats, InstructorProgressSummary, RecentCompletion, StudentEngagement,
};
use crate::services::access::{AuthContext, require_instructor};
use crate::storage::Storage;

use super::percentage;

#[derive(Default)]
struct CategoryTotals {
    stats: CategoryStats,
    completed_hours: i64,
}

/// 教师名下全部作业的进度汇总
///
/// 分类完成率和平均用时都由该分类的原始计数重新计算，与作业的遍历顺序无关。
pub async fn instructor_summary(
    storage: &dyn Storage,
    ctx: &AuthContext,
    recent_limit: usize,
    now: DateTime<Utc>,
) -> Result<InstructorProgressSummary> {
    let instructor = require_instructor(storage, ctx).await?;
    let assignments = storage.list_assignments_by_instructor(instructor.id).await?;
    let entries = storage.list_entries_by_instructor(instructor.id).await?;

    let mut per_assignment: HashMap<i64, Vec<_>> = HashMap::new();
    for entry in &entries {
        per_assignment
            .entry(entry.assignment_id)
            .or_default()
            .push(entry);
    }

    let mut categories: BTreeMap<String, CategoryTotals> = BTreeMap::new();
    for assignment in &assignments {
        let rows = per_assignment
            .get(&assignment.id)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let totals = categories
            .entry(assignment.category_label().to_string())
            .or_default();

        totals.stats.assignment_count += 1;
        totals.stats.student_assignment_count += rows.len() as i64;
        for entry in rows.iter().filter(|e| e.is_completed()) {
            totals.stats.completed_count += 1;
            totals.completed_hours += entry.hours_to_complete().unwrap_or(0);
        }
    }
    let category_breakdown = categories
        .into_iter()
        .map(|(name, totals)| {
            let mut stats = totals.stats;
            stats.completion_rate = percentage(stats.completed_count, stats.student_assignment_count);
            stats.average_time_to_complete_hours = if stats.completed_count > 0 {
                totals.completed_hours / stats.completed_count
            } else {
                0
            };
            (name, stats)
        })
        .collect();

    let mut completed: Vec<_> = entries
        .iter()
        .filter(|e| e.is_completed())
        .filter_map(|e| e.completed_at.map(|at| (at, e)))
        .collect();
    completed.sort_by(|a, b| b.0.cmp(&a.0));

    let total_completed = completed.len() as i64;
    let completed_hours: i64 = completed
        .iter()
        .map(|(_, e)| e.hours_to_complete().unwrap_or(0))
        .sum();

    let recent: Vec<_> = completed.iter().take(recent_limit).collect();
    let recent_student_ids: Vec<i64> = recent
        .iter()
        .map(|(_, e)| e.student_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let names: HashMap<i64, String> = storage
        .get_users_by_ids(&recent_student_ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u.username))
        .collect();
    let titles: HashMap<i64, &str> = assignments
        .iter()
        .map(|a| (a.id, a.title.as_str()))
        .collect();

    let recent_completions = recent
        .into_iter()
        .map(|(at, e)| RecentCompletion {
            student_id: e.student_id,
            student_name: names.get(&e.student_id).cloned().unwrap_or_default(),
            assignment_id: e.assignment_id,
            assignment_title: titles
                .get(&e.assignment_id)
                .map(|t| t.to_string())
                .unwrap_or_default(),
            completed_at: *at,
            time_taken_hours: e.hours_to_complete().unwrap_or(0),
        })
        .collect();

    let active_students = entries
        .iter()
        .map(|e| e.student_id)
        .collect::<HashSet<_>>()
        .len() as i64;
    let completed_since =
        |days: i64| completed.iter().filter(|(at, _)| *at >= now - Duration::days(days)).count() as i64;
    let student_engagement = StudentEngagement {
        active_students,
        average_assignments_per_student: if active_students > 0 {
            entries.len() as f64 / active_students as f64
        } else {
            0.0
        },
        completions_last_7_days: completed_since(7),
        completions_last_30_days: completed_since(30),
    };

    Ok(InstructorProgressSummary {
        total_assignments: assignments.len() as i64,
        total_student_assignments: entries.len() as i64,
        overall_completion_rate: percentage(total_completed, entries.len() as i64),
        assignments_with_due_dates: assignments.iter().filter(|a| a.due_date.is_some()).count()
            as i64,
        overdue_assignments: assignments.iter().filter(|a| a.is_overdue(now)).count() as i64,
        average_completion_time_hours: if total_completed > 0 {
            completed_hours / total_completed
        } else {
            0
        },
        category_breakdown,
        recent_completions,
        student_engagement,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::student_assignments::entities::AssignmentStatus;
    use crate::services::test_support::*;

    #[tokio::test]
    async fn test_summary_rolls_up_categories() {
        let storage = storage().await;
        let now = Utc::now();
        let alice = instructor(&storage, "teacher1").await;
        let s1 = student(&storage, "student1").await;
        let s2 = student(&storage, "student2").await;
        let s3 = student(&storage, "student3").await;

        // 两个规模不同的 poetry 作业：1/1 和 0/3，重新计算后为 25%
        let small = assignment_in(&storage, &alice, "Sonnet", "poetry", None).await;
        let large = assignment_in(&storage, &alice, "Odes", "poetry", None).await;
        let essay = assignment_in(
            &storage,
            &alice,
            "Essay",
            "",
            Some(now - Duration::days(1)),
        )
        .await;
        assign(&storage, &small, &[&s1], now - Duration::days(40)).await;
        assign(&storage, &large, &[&s1, &s2, &s3], now - Duration::days(40)).await;
        assign(&storage, &essay, &[&s2], now - Duration::days(3)).await;

        storage
            .update_student_assignment_status(
                small.id,
                s1.id,
                AssignmentStatus::Completed,
                now - Duration::days(20),
            )
            .await
            .unwrap();
        storage
            .update_student_assignment_status(
                essay.id,
                s2.id,
                AssignmentStatus::Completed,
                now - Duration::days(1),
            )
            .await
            .unwrap();

        let summary = instructor_summary(storage.as_ref(), &ctx(&alice), 10, now)
            .await
            .unwrap();
        assert_eq!(summary.total_assignments, 3);
        assert_eq!(summary.total_student_assignments, 5);
        assert_eq!(summary.overall_completion_rate, 40.0);
        assert_eq!(summary.assignments_with_due_dates, 1);
        assert_eq!(summary.overdue_assignments, 1);

        let poetry = &summary.category_breakdown["poetry"];
        assert_eq!(poetry.assignment_count, 2);
        assert_eq!(poetry.student_assignment_count, 4);
        assert_eq!(poetry.completion_rate, 25.0);
        assert_eq!(poetry.average_time_to_complete_hours, 20 * 24);
        assert_eq!(summary.category_breakdown["uncategorized"].completed_count, 1);

        assert_eq!(summary.recent_completions.len(), 2);
        assert_eq!(summary.recent_completions[0].assignment_title, "Essay");
        assert_eq!(summary.recent_completions[0].student_name, "student2");
        assert_eq!(summary.recent_completions[0].time_taken_hours, 48);

        let engagement = &summary.student_engagement;
        assert_eq!(engagement.active_students, 3);
        assert!((engagement.average_assignments_per_student - 5.0 / 3.0).abs() < 1e-9);
        assert_eq!(engagement.completions_last_7_days, 1);
        assert_eq!(engagement.completions_last_30_days, 2);
    }

    #[tokio::test]
    async fn test_recent_completions_limit() {
        let storage = storage().await;
        let now = Utc::now();
        let alice = instructor(&storage, "teacher1").await;
        let s1 = student(&storage, "student1").await;
        let a = assignment(&storage, &alice, "One", None).await;
        let b = assignment(&storage, &alice, "Two", None).await;
        assign(&storage, &a, &[&s1], now).await;
        assign(&storage, &b, &[&s1], now).await;
        for id in [a.id, b.id] {
            storage
                .update_student_assignment_status(id, s1.id, AssignmentStatus::Completed, now)
                .await
                .unwrap();
        }

        let summary = instructor_summary(storage.as_ref(), &ctx(&alice), 1, now)
            .await
            .unwrap();
        assert_eq!(summary.recent_completions.len(), 1);
    }
}
