// Completion statistics for finished tasks

use crate::models::Task;
use chrono::{Datelike, DateTime, Days, NaiveDate, TimeZone};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompletionStats {
    pub total_completed: usize,
    pub completed_today: usize,
    pub completed_this_week: usize,
}

/// Bucket completed tasks by `completed_at` relative to `now`
///
/// "Today" starts at local midnight in `now`'s time zone; the week starts at
/// midnight of the most recent Sunday. Tasks completed without a timestamp
/// only count toward the total.
pub fn completion_stats<Tz: TimeZone>(tasks: &[Task], now: &DateTime<Tz>) -> CompletionStats {
    let today = now.date_naive();
    let start_of_day = local_midnight_ms(now, today);

    let days_since_sunday = u64::from(today.weekday().num_days_from_sunday());
    let start_of_week = today
        .checked_sub_days(Days::new(days_since_sunday))
        .map(|sunday| local_midnight_ms(now, sunday))
        .unwrap_or(start_of_day);

    let mut stats = CompletionStats::default();
    for task in tasks.iter().filter(|t| t.completed) {
        stats.total_completed += 1;

        let Some(at) = task.completed_at else {
            continue;
        };
        if at >= start_of_day {
            stats.completed_today += 1;
        }
        if at >= start_of_week {
            stats.completed_this_week += 1;
        }
    }

    stats
}

fn local_midnight_ms<Tz: TimeZone>(now: &DateTime<Tz>, date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .and_then(|midnight| now.timezone().from_local_datetime(&midnight).earliest())
        .map(|dt| dt.timestamp_millis())
        // No midnight on this date in this zone (DST gap); fall back to now
        .unwrap_or_else(|| now.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use chrono::{FixedOffset, Utc};

    fn completed_at(text: &str, at: Option<i64>) -> Task {
        let mut task = Task::new(text, Priority::Medium, "general");
        task.completed = true;
        task.completed_at = at;
        task
    }

    fn ms(y: i32, m: u32, d: u32, h: u32) -> i64 {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap().timestamp_millis()
    }

    #[test]
    fn test_empty_collection() {
        let now = Utc::now();
        assert_eq!(completion_stats(&[], &now), CompletionStats::default());
    }

    #[test]
    fn test_buckets_by_day_and_week() {
        // Wednesday 2024-05-15; the week began Sunday 2024-05-12
        let now = Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap();

        let tasks = vec![
            completed_at("this morning", Some(ms(2024, 5, 15, 8))),
            completed_at("monday", Some(ms(2024, 5, 13, 10))),
            completed_at("sunday midnight", Some(ms(2024, 5, 12, 0))),
            completed_at("last saturday", Some(ms(2024, 5, 11, 23))),
            completed_at("unknown time", None),
            Task::new("still open", Priority::High, "work"),
        ];

        let stats = completion_stats(&tasks, &now);
        assert_eq!(stats.total_completed, 5);
        assert_eq!(stats.completed_today, 1);
        assert_eq!(stats.completed_this_week, 3);
    }

    #[test]
    fn test_sunday_is_start_of_week() {
        let now = Utc.with_ymd_and_hms(2024, 5, 12, 9, 0, 0).unwrap();
        let tasks = vec![
            completed_at("early sunday", Some(ms(2024, 5, 12, 1))),
            completed_at("saturday", Some(ms(2024, 5, 11, 22))),
        ];

        let stats = completion_stats(&tasks, &now);
        assert_eq!(stats.completed_today, 1);
        assert_eq!(stats.completed_this_week, 1);
    }

    #[test]
    fn test_midnight_follows_time_zone() {
        // 01:00 on May 15 at UTC+3 is still 22:00 on May 14 in UTC
        let zone = FixedOffset::east_opt(3 * 3600).unwrap();
        let now = zone.with_ymd_and_hms(2024, 5, 15, 9, 0, 0).unwrap();

        let tasks = vec![completed_at("just after local midnight", Some(ms(2024, 5, 14, 22)))];

        let stats = completion_stats(&tasks, &now);
        assert_eq!(stats.completed_today, 1);
    }
}
