#![deny(clippy::all)]

mod aggregator;
mod error;
pub mod batch;
pub mod ics;
mod intensity;
pub mod scanner;
mod stats;
mod timewindow;

pub use aggregator::*;
pub use batch::{BatchSource, SourceRegistry, TrendBucket, TrendPoint};
pub use error::CalendarError;
pub use intensity::*;
pub use stats::*;
pub use timewindow::*;

use chrono::{NaiveDateTime, Timelike};
use std::collections::HashMap;

pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// One normalized calendar event. Immutable after construction; every event
/// belongs to exactly one `DayAggregate`, and derived views copy events
/// rather than aliasing them.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CalendarEvent {
    pub title: String,
    pub description: String,
    pub location: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub duration_minutes: i64,
}

impl CalendarEvent {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        location: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            location: location.into(),
            start,
            end,
            duration_minutes: (end - start).num_minutes().max(0),
        }
    }

    /// Date key derived from local calendar fields, never from a
    /// UTC-normalized instant. Two events on the same local day always
    /// share a key.
    pub fn date_key(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub fn start_hour(&self) -> u32 {
        self.start.hour()
    }
}

/// Per-date rollup of events and durations.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct DayAggregate {
    pub date: String,
    pub events: Vec<CalendarEvent>,
    pub total_minutes: i64,
    pub max_minutes: i64,
}

impl DayAggregate {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            events: Vec::new(),
            total_minutes: 0,
            max_minutes: 0,
        }
    }

    pub fn push(&mut self, event: CalendarEvent) {
        self.total_minutes = self.total_minutes.saturating_add(event.duration_minutes);
        self.max_minutes = self.max_minutes.max(event.duration_minutes);
        self.events.push(event);
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }
}

/// The central artifact: date key -> day rollup. Keys are unique, iteration
/// order is unspecified; sort on demand via `sorted_dates`.
pub type CalendarDataset = HashMap<String, DayAggregate>;

/// One day of the exported heatmap, with its display level pre-derived
/// from the active intensity scheme.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRollup {
    pub date: String,
    pub event_count: usize,
    pub total_minutes: i64,
    pub max_minutes: i64,
    pub level: u8,
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMeta {
    pub generated_at: String,
    pub version: String,
    pub date_range_start: String,
    pub date_range_end: String,
    pub processing_time_ms: u32,
}

/// Complete export of one dataset: metadata, summary statistics, and the
/// date-sorted day rollups.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HeatmapReport {
    pub meta: ReportMeta,
    pub summary: StatisticsSnapshot,
    pub days: Vec<DayRollup>,
}
