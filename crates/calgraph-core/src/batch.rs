//! Multi-source registry: several loaded calendars combined into one view.

use crate::{timewindow, CalendarDataset, Scope, WeekdaySet};
use chrono::Datelike;
use serde::Serialize;
use std::str::FromStr;

/// One loaded calendar, keyed by its source id (usually the file name).
#[derive(Debug, Clone)]
pub struct BatchSource {
    pub source_id: String,
    pub dataset: CalendarDataset,
    pub loaded_at: chrono::DateTime<chrono::Local>,
}

/// Insertion-ordered collection of sources. Adding a source under an id
/// that is already present replaces it in place, so re-loading a file is
/// idempotent.
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: Vec<BatchSource>,
}

/// Bucketing granularity for trend series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrendBucket {
    #[default]
    Day,
    Week,
    Month,
    Year,
}

impl TrendBucket {
    fn key(self, date_key: &str) -> Option<String> {
        match self {
            TrendBucket::Day => Some(date_key.to_string()),
            TrendBucket::Month => date_key.get(0..7).map(str::to_string),
            TrendBucket::Year => date_key.get(0..4).map(str::to_string),
            // Key a week by its Monday date so keys sort chronologically.
            TrendBucket::Week => {
                let date = timewindow::parse_date_key(date_key)?;
                let monday = date - chrono::Duration::days(date.weekday().num_days_from_monday() as i64);
                Some(monday.format("%Y-%m-%d").to_string())
            }
        }
    }
}

impl FromStr for TrendBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" => Ok(TrendBucket::Day),
            "week" => Ok(TrendBucket::Week),
            "month" => Ok(TrendBucket::Month),
            "year" => Ok(TrendBucket::Year),
            other => Err(format!(
                "unknown trend bucket '{}', expected day, week, month, or year",
                other
            )),
        }
    }
}

/// One point in a trend series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub bucket: String,
    pub total_minutes: i64,
    pub event_count: usize,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the source with this id.
    pub fn add(&mut self, source_id: impl Into<String>, dataset: CalendarDataset) {
        let source = BatchSource {
            source_id: source_id.into(),
            dataset,
            loaded_at: chrono::Local::now(),
        };
        match self
            .sources
            .iter_mut()
            .find(|s| s.source_id == source.source_id)
        {
            Some(existing) => *existing = source,
            None => self.sources.push(source),
        }
    }

    /// Remove a source by id. Removing an unknown id is a no-op.
    pub fn remove(&mut self, source_id: &str) -> bool {
        let before = self.sources.len();
        self.sources.retain(|s| s.source_id != source_id);
        self.sources.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn sources(&self) -> &[BatchSource] {
        &self.sources
    }

    /// All sources folded into one dataset, in registration order.
    pub fn combined(&self) -> CalendarDataset {
        let mut combined = CalendarDataset::new();
        for source in &self.sources {
            for day in source.dataset.values() {
                combined = crate::extend(&combined, day.events.clone());
            }
        }
        combined
    }

    /// Total minutes per source, sorted descending. Sources with no time in
    /// the scoped view are left out.
    pub fn category_totals(
        &self,
        scope: Option<&Scope>,
        weekdays: WeekdaySet,
    ) -> Vec<(String, i64)> {
        let mut totals: Vec<(String, i64)> = self
            .sources
            .iter()
            .filter_map(|source| {
                let view = timewindow::filter(&source.dataset, scope, weekdays);
                let total: i64 = view.values().map(|d| d.total_minutes).sum();
                (total > 0).then(|| (source.source_id.clone(), total))
            })
            .collect();
        totals.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        totals
    }

    /// Combined activity over time at the requested granularity, sorted by
    /// bucket key ascending.
    pub fn trend_series(
        &self,
        bucket: TrendBucket,
        scope: Option<&Scope>,
        weekdays: WeekdaySet,
    ) -> Vec<TrendPoint> {
        let view = timewindow::filter(&self.combined(), scope, weekdays);
        let mut buckets: std::collections::HashMap<String, (i64, usize)> =
            std::collections::HashMap::new();
        for (date_key, day) in &view {
            if let Some(key) = bucket.key(date_key) {
                let entry = buckets.entry(key).or_insert((0, 0));
                entry.0 += day.total_minutes;
                entry.1 += day.events.len();
            }
        }
        let mut series: Vec<TrendPoint> = buckets
            .into_iter()
            .map(|(bucket, (total_minutes, event_count))| TrendPoint {
                bucket,
                total_minutes,
                event_count,
            })
            .collect();
        series.sort_by(|a, b| a.bucket.cmp(&b.bucket));
        series
    }

    /// Minutes by hour of day across all sources. Each event's full
    /// duration is attributed to its start hour.
    pub fn hourly_distribution(&self, scope: Option<&Scope>, weekdays: WeekdaySet) -> [i64; 24] {
        let view = timewindow::filter(&self.combined(), scope, weekdays);
        let mut hours = [0i64; 24];
        for day in view.values() {
            for event in &day.events {
                hours[event.start_hour() as usize] += event.duration_minutes;
            }
        }
        hours
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{aggregate, CalendarEvent};
    use chrono::{Duration, NaiveDateTime};

    fn event(title: &str, start: &str, minutes: i64) -> CalendarEvent {
        let start = NaiveDateTime::parse_from_str(start, "%Y-%m-%d %H:%M").unwrap();
        CalendarEvent::new(title, "", "", start, start + Duration::minutes(minutes))
    }

    fn registry() -> SourceRegistry {
        let mut registry = SourceRegistry::new();
        registry.add(
            "work.ics",
            aggregate(vec![
                event("standup", "2024-01-01 09:00", 60),
                event("review", "2024-01-08 14:00", 90),
            ]),
        );
        registry.add(
            "gym.ics",
            aggregate(vec![event("run", "2024-01-01 18:00", 60)]),
        );
        registry
    }

    #[test]
    fn test_add_replaces_same_id() {
        let mut registry = registry();
        registry.add("gym.ics", aggregate(vec![event("swim", "2024-02-01 18:00", 45)]));
        assert_eq!(registry.len(), 2);
        let totals = registry.category_totals(None, WeekdaySet::ALL);
        assert!(totals.contains(&("gym.ics".to_string(), 45)));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut registry = registry();
        assert!(registry.remove("gym.ics"));
        assert!(!registry.remove("gym.ics"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_combined_merges_same_day_across_sources() {
        let registry = registry();
        let combined = registry.combined();
        assert_eq!(combined["2024-01-01"].total_minutes, 120);
        assert_eq!(combined["2024-01-01"].events.len(), 2);
    }

    #[test]
    fn test_category_totals_sorted_desc_excluding_zero() {
        let mut registry = registry();
        registry.add("empty.ics", CalendarDataset::new());
        let totals = registry.category_totals(None, WeekdaySet::ALL);
        assert_eq!(
            totals,
            vec![("work.ics".to_string(), 150), ("gym.ics".to_string(), 60)]
        );
    }

    #[test]
    fn test_trend_series_by_day_sums_sources() {
        let registry = registry();
        let series = registry.trend_series(TrendBucket::Day, None, WeekdaySet::ALL);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].bucket, "2024-01-01");
        assert_eq!(series[0].total_minutes, 120);
        assert_eq!(series[0].event_count, 2);
        assert_eq!(series[1].bucket, "2024-01-08");
    }

    #[test]
    fn test_trend_series_week_and_month_keys() {
        let registry = registry();
        let weeks = registry.trend_series(TrendBucket::Week, None, WeekdaySet::ALL);
        // Both dates are Mondays, so they key their own weeks.
        assert_eq!(weeks[0].bucket, "2024-01-01");
        assert_eq!(weeks[1].bucket, "2024-01-08");

        let months = registry.trend_series(TrendBucket::Month, None, WeekdaySet::ALL);
        assert_eq!(months.len(), 1);
        assert_eq!(months[0].bucket, "2024-01");
        assert_eq!(months[0].total_minutes, 210);
    }

    #[test]
    fn test_hourly_distribution_uses_start_hour() {
        let registry = registry();
        let hours = registry.hourly_distribution(None, WeekdaySet::ALL);
        assert_eq!(hours[9], 60);
        assert_eq!(hours[14], 90);
        assert_eq!(hours[18], 60);
        assert_eq!(hours.iter().sum::<i64>(), 210);
    }

    #[test]
    fn test_scoped_views() {
        let registry = registry();
        let totals = registry.category_totals(
            Some(&crate::Scope::Range(
                chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            )),
            WeekdaySet::ALL,
        );
        assert_eq!(
            totals,
            vec![("gym.ics".to_string(), 60), ("work.ics".to_string(), 60)]
        );
    }

    #[test]
    fn test_bucket_parsing() {
        assert_eq!("week".parse::<TrendBucket>().unwrap(), TrendBucket::Week);
        assert!("fortnight".parse::<TrendBucket>().is_err());
    }
}
