//! Summary statistics over a scoped view of a dataset.

use crate::{timewindow, CalendarDataset, Scope, WeekdaySet};
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::collections::HashSet;

/// Aggregate figures for one scope. Averages and percentages are taken
/// against the scope's capacity (days inside the window that pass the
/// weekday filter), not against active days, so sparse calendars read low.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsSnapshot {
    pub active_days: usize,
    pub total_events: usize,
    pub total_minutes: i64,
    pub max_minutes: i64,
    pub capacity_days: u32,
    pub average_minutes: f64,
    pub activity_percentage: f64,
    pub longest_streak: u32,
    pub current_streak: u32,
}

/// Compute the snapshot for `dataset` restricted to `scope` and `weekdays`.
pub fn compute(dataset: &CalendarDataset, scope: &Scope, weekdays: WeekdaySet) -> StatisticsSnapshot {
    let view = timewindow::filter(dataset, Some(scope), weekdays);
    let capacity_days = scope.capacity_days(weekdays);

    if view.is_empty() {
        return StatisticsSnapshot {
            capacity_days,
            ..Default::default()
        };
    }

    let active_days = view.len();
    let total_events: usize = view.values().map(|d| d.events.len()).sum();
    let total_minutes: i64 = view.values().map(|d| d.total_minutes).sum();
    let max_minutes: i64 = view.values().map(|d| d.total_minutes).max().unwrap_or(0);

    let (average_minutes, activity_percentage) = if capacity_days > 0 {
        (
            total_minutes as f64 / capacity_days as f64,
            active_days as f64 / capacity_days as f64 * 100.0,
        )
    } else {
        (0.0, 0.0)
    };

    let mut active_dates: Vec<NaiveDate> = view
        .keys()
        .filter_map(|k| timewindow::parse_date_key(k))
        .collect();
    active_dates.sort();

    StatisticsSnapshot {
        active_days,
        total_events,
        total_minutes,
        max_minutes,
        capacity_days,
        average_minutes,
        activity_percentage,
        longest_streak: longest_streak(&active_dates),
        current_streak: current_streak(&active_dates, scope),
    }
}

/// Longest run of consecutive calendar days among the active dates.
fn longest_streak(sorted_dates: &[NaiveDate]) -> u32 {
    let mut longest = 0u32;
    let mut run = 0u32;
    let mut prev: Option<NaiveDate> = None;
    for &date in sorted_dates {
        run = match prev {
            Some(p) if date - p == Duration::days(1) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(date);
    }
    longest
}

/// Streak still running at the end of the scope. Anchored at the scope's
/// last day, clamped to today for open-ended or future windows; a streak
/// that ended the day before the anchor still counts.
fn current_streak(sorted_dates: &[NaiveDate], scope: &Scope) -> u32 {
    let today = chrono::Local::now().date_naive();
    let anchor = match scope.date_bounds() {
        Some((_, end)) => end.min(today),
        None => today,
    };

    let active: HashSet<NaiveDate> = sorted_dates.iter().copied().collect();
    let mut cursor = if active.contains(&anchor) {
        anchor
    } else if active.contains(&(anchor - Duration::days(1))) {
        anchor - Duration::days(1)
    } else {
        return 0;
    };

    let mut streak = 0u32;
    while active.contains(&cursor) {
        streak += 1;
        cursor -= Duration::days(1);
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{aggregate, CalendarEvent};
    use chrono::NaiveDateTime;

    fn event(start: &str, minutes: i64) -> CalendarEvent {
        let start = NaiveDateTime::parse_from_str(start, "%Y-%m-%d %H:%M").unwrap();
        CalendarEvent::new("event", "", "", start, start + Duration::minutes(minutes))
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_empty_dataset_is_zero_snapshot() {
        let snapshot = compute(
            &CalendarDataset::new(),
            &Scope::Year(2024),
            WeekdaySet::ALL,
        );
        assert_eq!(snapshot.active_days, 0);
        assert_eq!(snapshot.total_minutes, 0);
        assert_eq!(snapshot.average_minutes, 0.0);
        assert_eq!(snapshot.longest_streak, 0);
        assert_eq!(snapshot.capacity_days, 366);
    }

    #[test]
    fn test_longest_streak_skips_gaps() {
        let dates: Vec<NaiveDate> = ["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-05"]
            .iter()
            .map(|s| date(s))
            .collect();
        assert_eq!(longest_streak(&dates), 3);
        assert_eq!(longest_streak(&[]), 0);
    }

    #[test]
    fn test_february_month_snapshot() {
        let dataset = aggregate(vec![
            event("2024-02-01 07:00", 120),
            event("2024-02-02 07:00", 60),
            event("2024-02-03 07:00", 90),
            event("2024-02-10 07:00", 30),
            event("2024-02-11 07:00", 150),
        ]);
        let snapshot = compute(&dataset, &Scope::Month(2024, 2), WeekdaySet::ALL);
        assert_eq!(snapshot.active_days, 5);
        assert_eq!(snapshot.total_minutes, 450);
        assert_eq!(snapshot.max_minutes, 150);
        assert_eq!(snapshot.capacity_days, 29);
        assert!((snapshot.average_minutes - 450.0 / 29.0).abs() < 1e-9);
        assert!((snapshot.activity_percentage - 500.0 / 29.0).abs() < 1e-9);
        assert_eq!(snapshot.longest_streak, 3);
    }

    #[test]
    fn test_weekday_filter_shrinks_capacity() {
        // 2024-01-01 is a Monday; the week has 5 weekday slots.
        let dataset = aggregate(vec![
            event("2024-01-01 07:00", 30),
            event("2024-01-06 07:00", 30), // Saturday, filtered out
        ]);
        let snapshot = compute(&dataset, &Scope::Week(2024, 1), WeekdaySet::weekdays());
        assert_eq!(snapshot.capacity_days, 5);
        assert_eq!(snapshot.active_days, 1);
        assert!((snapshot.activity_percentage - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_current_streak_anchored_at_scope_end() {
        let dataset = aggregate(vec![
            event("2024-12-29 07:00", 30),
            event("2024-12-30 07:00", 30),
            event("2024-12-31 07:00", 30),
            event("2024-06-01 07:00", 30),
        ]);
        let snapshot = compute(&dataset, &Scope::Year(2024), WeekdaySet::ALL);
        assert_eq!(snapshot.current_streak, 3);
    }

    #[test]
    fn test_current_streak_allows_one_day_gap_at_anchor() {
        let dataset = aggregate(vec![
            event("2024-12-29 07:00", 30),
            event("2024-12-30 07:00", 30),
        ]);
        let snapshot = compute(&dataset, &Scope::Year(2024), WeekdaySet::ALL);
        assert_eq!(snapshot.current_streak, 2);

        let stale = aggregate(vec![event("2024-12-20 07:00", 30)]);
        let snapshot = compute(&stale, &Scope::Year(2024), WeekdaySet::ALL);
        assert_eq!(snapshot.current_streak, 0);
    }
}
