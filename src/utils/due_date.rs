//! 截止时间解析
//!
//! 依次尝试三种格式：带时区的 RFC3339 时间、本地日期时间（精确到分钟）、
//! 本地日期（视为当天 23:59:59）。
//! 另外提供按天数计算查询窗口边界的辅助函数。

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, Utc};

use crate::errors::{Result, TrackerError};

const LOCAL_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M";
const LOCAL_DATE_FORMAT: &str = "%Y-%m-%d";

/// 查询窗口上限（天）
pub const MAX_WINDOW_DAYS: i64 = 3650;

/// 窗口天数，缺省或非正数时使用默认值，超过上限返回 Validation
pub fn window_days(days: Option<i64>, default_days: i64) -> Result<i64> {
    let days = days.filter(|d| *d > 0).unwrap_or(default_days);
    if (1..=MAX_WINDOW_DAYS).contains(&days) {
        Ok(days)
    } else {
        Err(TrackerError::validation(format!(
            "days must be between 1 and {MAX_WINDOW_DAYS}"
        )))
    }
}

/// 把 now 平移 days 天（可为负），越界时返回 Validation
pub fn offset_days(now: DateTime<Utc>, days: i64) -> Result<DateTime<Utc>> {
    Duration::try_days(days)
        .and_then(|delta| now.checked_add_signed(delta))
        .ok_or_else(|| TrackerError::validation(format!("Date window out of range: {days} days")))
}

/// 解析截止时间，空字符串表示没有截止时间
pub fn parse_due_date(input: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    let Some(raw) = input.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, LOCAL_DATETIME_FORMAT) {
        return local_to_utc(naive, raw).map(Some);
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, LOCAL_DATE_FORMAT)
        && let Some(naive) = date.and_hms_opt(23, 59, 59)
    {
        return local_to_utc(naive, raw).map(Some);
    }

    Err(TrackerError::invalid_due_date(format!(
        "Invalid due date format: {raw}"
    )))
}

fn local_to_utc(naive: NaiveDateTime, raw: &str) -> Result<DateTime<Utc>> {
    naive
        .and_local_timezone(Local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| TrackerError::invalid_due_date(format!("Nonexistent local time: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_empty_means_no_due_date() {
        assert_eq!(parse_due_date(None).unwrap(), None);
        assert_eq!(parse_due_date(Some("  ")).unwrap(), None);
    }

    #[test]
    fn test_rfc3339_with_offset() {
        let parsed = parse_due_date(Some("2025-03-01T10:00:00+02:00"))
            .unwrap()
            .unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_local_datetime_minute_precision() {
        let parsed = parse_due_date(Some("2025-03-01T10:30")).unwrap().unwrap();
        let local = parsed.with_timezone(&Local);
        assert_eq!((local.hour(), local.minute()), (10, 30));
    }

    #[test]
    fn test_date_only_is_end_of_day() {
        let parsed = parse_due_date(Some("2025-03-01")).unwrap().unwrap();
        let local = parsed.with_timezone(&Local);
        assert_eq!(local.date_naive(), NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!((local.hour(), local.minute(), local.second()), (23, 59, 59));
    }

    #[test]
    fn test_window_days_bounds() {
        assert_eq!(window_days(None, 7).unwrap(), 7);
        assert_eq!(window_days(Some(-2), 7).unwrap(), 7);
        assert_eq!(window_days(Some(MAX_WINDOW_DAYS), 7).unwrap(), MAX_WINDOW_DAYS);
        for huge in [MAX_WINDOW_DAYS + 1, 1_000_000_000, i64::MAX] {
            assert_eq!(window_days(Some(huge), 7).unwrap_err().code(), "E007");
        }
    }

    #[test]
    fn test_offset_days_overflow() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(
            offset_days(now, -1).unwrap(),
            Utc.with_ymd_and_hms(2025, 2, 28, 0, 0, 0).unwrap()
        );
        for days in [1_000_000_000, i64::MAX, i64::MIN, -1_000_000_000] {
            assert_eq!(offset_days(now, days).unwrap_err().code(), "E007");
        }
    }

    #[test]
    fn test_garbage_is_invalid_due_date() {
        let err = parse_due_date(Some("next friday")).unwrap_err();
        assert_eq!(err.code(), "E008");
    }
}
