//! Daily aggregation of normalized events into date-keyed rollups.

use crate::{
    CalendarDataset, CalendarEvent, DayAggregate, DayRollup, HeatmapReport, IntensityScheme,
    ReportMeta, Scope, StatisticsSnapshot, WeekdaySet,
};
use std::collections::HashMap;

/// Fold a batch of events into a fresh dataset.
///
/// Totals and maxima are order-independent; the per-day event list keeps
/// parse order. Aggregation is deliberately sequential: datasets are
/// single-user calendar scale and the event list order is part of the
/// contract.
pub fn aggregate(events: Vec<CalendarEvent>) -> CalendarDataset {
    extend(&CalendarDataset::new(), events)
}

/// Fold a new event batch on top of an existing dataset, producing a new
/// dataset. The input is never mutated; this is how several files
/// contribute to one combined view.
pub fn extend(dataset: &CalendarDataset, events: Vec<CalendarEvent>) -> CalendarDataset {
    let mut merged: CalendarDataset = dataset.clone();
    for event in events {
        let key = event.date_key();
        merged
            .entry(key.clone())
            .or_insert_with(|| DayAggregate::new(key))
            .push(event);
    }
    merged
}

/// Case-insensitive substring search over event titles. Produces a derived
/// view with copied events and recomputed totals; days with no match are
/// dropped entirely.
pub fn search(dataset: &CalendarDataset, query: &str) -> CalendarDataset {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return dataset.clone();
    }

    dataset
        .iter()
        .filter_map(|(key, day)| {
            let matched: Vec<CalendarEvent> = day
                .events
                .iter()
                .filter(|e| e.title.to_lowercase().contains(&needle))
                .cloned()
                .collect();
            if matched.is_empty() {
                return None;
            }
            let mut view = DayAggregate::new(key.clone());
            for event in matched {
                view.push(event);
            }
            Some((key.clone(), view))
        })
        .collect()
}

/// Date keys in ascending order.
pub fn sorted_dates(dataset: &CalendarDataset) -> Vec<String> {
    let mut dates: Vec<String> = dataset.keys().cloned().collect();
    dates.sort();
    dates
}

/// Earliest and latest date key, if any.
pub fn date_range(dataset: &CalendarDataset) -> Option<(String, String)> {
    let min = dataset.keys().min()?.clone();
    let max = dataset.keys().max()?.clone();
    Some((min, max))
}

/// Date-sorted rollups with display levels derived from the given scheme.
/// Swapping schemes only re-derives levels, never the dataset.
pub fn day_rollups(dataset: &CalendarDataset, scheme: &IntensityScheme) -> Vec<DayRollup> {
    let mut rollups: Vec<DayRollup> = dataset
        .values()
        .map(|day| DayRollup {
            date: day.date.clone(),
            event_count: day.events.len(),
            total_minutes: day.total_minutes,
            max_minutes: day.max_minutes,
            level: scheme.level(day.total_minutes),
        })
        .collect();
    rollups.sort_by(|a, b| a.date.cmp(&b.date));
    rollups
}

/// Assemble the complete export for one dataset and view configuration.
pub fn generate_report(
    dataset: &CalendarDataset,
    scope: &Scope,
    weekdays: WeekdaySet,
    scheme: &IntensityScheme,
    processing_time_ms: u32,
) -> HeatmapReport {
    let view = crate::timewindow::filter(dataset, Some(scope), weekdays);
    let summary: StatisticsSnapshot = crate::compute(dataset, scope, weekdays);
    let days = day_rollups(&view, scheme);

    let (date_range_start, date_range_end) = date_range(&view).unwrap_or_default();

    HeatmapReport {
        meta: ReportMeta {
            generated_at: chrono::Local::now().to_rfc3339(),
            version: crate::version(),
            date_range_start,
            date_range_end,
            processing_time_ms,
        },
        summary,
        days,
    }
}

/// Per-month active-day counts for a year (index 0 = January). Feeds the
/// monthly bar display.
pub fn monthly_active_days(dataset: &CalendarDataset, year: i32) -> [u32; 12] {
    let mut months = [0u32; 12];
    let prefix = format!("{:04}-", year);
    for key in dataset.keys() {
        if let Some(rest) = key.strip_prefix(&prefix) {
            if let Some(month) = rest
                .get(0..2)
                .and_then(|m| m.parse::<usize>().ok())
                .filter(|m| (1..=12).contains(m))
            {
                months[month - 1] += 1;
            }
        }
    }
    months
}

/// Totals per event title, for the per-dataset breakdown. Sorted by total
/// duration descending.
pub fn title_totals(dataset: &CalendarDataset) -> Vec<(String, i64)> {
    let mut totals: HashMap<String, i64> = HashMap::new();
    for day in dataset.values() {
        for event in &day.events {
            *totals.entry(event.title.clone()).or_insert(0) += event.duration_minutes;
        }
    }
    let mut entries: Vec<(String, i64)> = totals.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDateTime};

    fn event(title: &str, start: &str, minutes: i64) -> CalendarEvent {
        let start = NaiveDateTime::parse_from_str(start, "%Y-%m-%d %H:%M").unwrap();
        CalendarEvent::new(title, "", "", start, start + Duration::minutes(minutes))
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(aggregate(Vec::new()).is_empty());
    }

    #[test]
    fn test_aggregate_same_day() {
        let dataset = aggregate(vec![
            event("run", "2024-01-01 07:00", 30),
            event("swim", "2024-01-01 18:00", 45),
        ]);
        assert_eq!(dataset.len(), 1);
        let day = &dataset["2024-01-01"];
        assert_eq!(day.total_minutes, 75);
        assert_eq!(day.max_minutes, 45);
        assert_eq!(day.events.len(), 2);
        // Insertion order, not time order.
        assert_eq!(day.events[0].title, "run");
        assert_eq!(day.events[1].title, "swim");
    }

    #[test]
    fn test_aggregate_order_independent_totals() {
        let a = event("run", "2024-01-01 07:00", 30);
        let b = event("swim", "2024-01-01 18:00", 45);

        let forward = aggregate(vec![a.clone(), b.clone()]);
        let backward = aggregate(vec![b, a]);

        assert_eq!(
            forward["2024-01-01"].total_minutes,
            backward["2024-01-01"].total_minutes
        );
        assert_eq!(
            forward["2024-01-01"].max_minutes,
            backward["2024-01-01"].max_minutes
        );
        // Only the event list order differs.
        assert_eq!(forward["2024-01-01"].events[0].title, "run");
        assert_eq!(backward["2024-01-01"].events[0].title, "swim");
    }

    #[test]
    fn test_extend_is_non_mutating() {
        let original = aggregate(vec![event("run", "2024-01-01 07:00", 30)]);
        let combined = extend(&original, vec![event("row", "2024-01-01 08:00", 20)]);

        assert_eq!(original["2024-01-01"].total_minutes, 30);
        assert_eq!(combined["2024-01-01"].total_minutes, 50);
        assert_eq!(combined["2024-01-01"].events.len(), 2);
    }

    #[test]
    fn test_search_copies_and_recomputes() {
        let original = aggregate(vec![
            event("Morning Run", "2024-01-01 07:00", 30),
            event("Swim", "2024-01-01 18:00", 45),
            event("Swim", "2024-01-02 18:00", 60),
        ]);

        let view = search(&original, "swim");
        assert_eq!(view.len(), 2);
        assert_eq!(view["2024-01-01"].total_minutes, 45);
        assert_eq!(view["2024-01-01"].events.len(), 1);
        assert_eq!(view["2024-01-02"].total_minutes, 60);

        // The original view is untouched.
        assert_eq!(original["2024-01-01"].total_minutes, 75);
        assert_eq!(original["2024-01-01"].events.len(), 2);
    }

    #[test]
    fn test_search_blank_query_is_identity() {
        let original = aggregate(vec![event("run", "2024-01-01 07:00", 30)]);
        let view = search(&original, "   ");
        assert_eq!(view.len(), 1);
        assert_eq!(view["2024-01-01"].total_minutes, 30);
    }

    #[test]
    fn test_search_no_match_drops_day() {
        let original = aggregate(vec![event("run", "2024-01-01 07:00", 30)]);
        assert!(search(&original, "chess").is_empty());
    }

    #[test]
    fn test_sorted_dates_and_range() {
        let dataset = aggregate(vec![
            event("b", "2024-03-05 07:00", 10),
            event("a", "2024-01-02 07:00", 10),
            event("c", "2024-12-31 07:00", 10),
        ]);
        assert_eq!(
            sorted_dates(&dataset),
            vec!["2024-01-02", "2024-03-05", "2024-12-31"]
        );
        assert_eq!(
            date_range(&dataset),
            Some(("2024-01-02".to_string(), "2024-12-31".to_string()))
        );
        assert_eq!(date_range(&CalendarDataset::new()), None);
    }

    #[test]
    fn test_day_rollups_levels_follow_scheme() {
        let dataset = aggregate(vec![
            event("short", "2024-01-01 07:00", 20),
            event("long", "2024-01-02 07:00", 400),
        ]);
        let rollups = day_rollups(&dataset, &crate::coarse_scheme());
        assert_eq!(rollups.len(), 2);
        assert_eq!(rollups[0].date, "2024-01-01");
        assert_eq!(rollups[0].level, 1);
        assert_eq!(rollups[1].level, 4);
    }

    #[test]
    fn test_generate_report_scoped() {
        let dataset = aggregate(vec![
            event("run", "2024-02-10 07:00", 90),
            event("run", "2023-02-10 07:00", 90),
        ]);
        let report = generate_report(
            &dataset,
            &Scope::Year(2024),
            WeekdaySet::ALL,
            &crate::coarse_scheme(),
            7,
        );
        assert_eq!(report.days.len(), 1);
        assert_eq!(report.days[0].date, "2024-02-10");
        assert_eq!(report.summary.active_days, 1);
        assert_eq!(report.meta.processing_time_ms, 7);
        assert_eq!(report.meta.date_range_start, "2024-02-10");
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let dataset = aggregate(vec![event("run", "2024-02-10 07:00", 90)]);
        let report = generate_report(
            &dataset,
            &Scope::Year(2024),
            WeekdaySet::ALL,
            &crate::coarse_scheme(),
            0,
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["days"][0]["eventCount"], 1);
        assert_eq!(json["days"][0]["totalMinutes"], 90);
        assert_eq!(json["summary"]["activeDays"], 1);
        assert_eq!(json["meta"]["dateRangeStart"], "2024-02-10");
    }

    #[test]
    fn test_monthly_active_days() {
        let dataset = aggregate(vec![
            event("run", "2024-01-01 07:00", 30),
            event("run", "2024-01-15 07:00", 30),
            event("run", "2024-03-02 07:00", 30),
            event("run", "2023-03-02 07:00", 30),
        ]);
        let months = monthly_active_days(&dataset, 2024);
        assert_eq!(months[0], 2);
        assert_eq!(months[1], 0);
        assert_eq!(months[2], 1);
    }

    #[test]
    fn test_title_totals_sorted_desc() {
        let dataset = aggregate(vec![
            event("run", "2024-01-01 07:00", 30),
            event("swim", "2024-01-02 07:00", 90),
            event("run", "2024-01-03 07:00", 40),
        ]);
        let totals = title_totals(&dataset);
        assert_eq!(totals[0], ("swim".to_string(), 90));
        assert_eq!(totals[1], ("run".to_string(), 70));
    }
}
