//! ICS parsing and normalization into [`CalendarEvent`] records.

use crate::{CalendarError, CalendarEvent};
use chrono::{Local, NaiveDateTime};
use icalendar::{
    parser::{read_calendar, unfold},
    CalendarDateTime, DatePerhapsTime,
};
use std::path::Path;
use tracing::{debug, warn};

/// Parse every VEVENT in an ICS document into normalized events.
///
/// Events missing DTSTART or DTEND, or with unparseable times, are skipped
/// with a warning rather than failing the whole file. A structurally broken
/// document (no parseable VCALENDAR) is an error.
pub fn parse_events(content: &str, source: &str) -> Result<Vec<CalendarEvent>, CalendarError> {
    let unfolded = unfold(content);
    let calendar = read_calendar(&unfolded).map_err(|e| CalendarError::Parse {
        path: source.to_string(),
        reason: e.to_string(),
    })?;

    let mut events = Vec::new();
    for vevent in calendar.components.iter().filter(|c| c.name == "VEVENT") {
        let title = vevent
            .find_prop("SUMMARY")
            .map(|p| p.val.to_string())
            .unwrap_or_else(|| "(No title)".to_string());

        let start = vevent
            .find_prop("DTSTART")
            .and_then(|p| DatePerhapsTime::try_from(p).ok())
            .map(to_local_naive);
        let end = vevent
            .find_prop("DTEND")
            .and_then(|p| DatePerhapsTime::try_from(p).ok())
            .map(to_local_naive);

        let (start, end) = match (start, end) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                warn!(source, %title, "skipping event without DTSTART/DTEND");
                continue;
            }
        };

        let description = vevent
            .find_prop("DESCRIPTION")
            .map(|p| p.val.to_string())
            .unwrap_or_default();
        let location = vevent
            .find_prop("LOCATION")
            .map(|p| p.val.to_string())
            .unwrap_or_default();

        events.push(CalendarEvent::new(title, description, location, start, end));
    }

    debug!(source, count = events.len(), "parsed events");
    Ok(events)
}

/// Collapse the ICS time forms onto local wall-clock time. UTC stamps are
/// converted to the local zone; floating and zoned stamps are taken at face
/// value (no tz database lookup), matching how all-day dates are handled.
fn to_local_naive(dpt: DatePerhapsTime) -> NaiveDateTime {
    match dpt {
        DatePerhapsTime::Date(d) => d.and_hms_opt(0, 0, 0).unwrap_or_default(),
        DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
            CalendarDateTime::Utc(dt) => dt.with_timezone(&Local).naive_local(),
            CalendarDateTime::Floating(naive) => naive,
            CalendarDateTime::WithTimezone { date_time, .. } => date_time,
        },
    }
}

/// Read and parse one ICS file from disk.
pub fn load_path(path: &Path) -> Result<Vec<CalendarEvent>, CalendarError> {
    let content = std::fs::read_to_string(path).map_err(|source| CalendarError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_events(&content, &path.display().to_string())
}
