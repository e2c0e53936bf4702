//! Time-window scoping: restrict a dataset to a year, month, ISO week, or
//! explicit date range, optionally intersected with a weekday subset.

use crate::CalendarDataset;
use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Subset of weekdays, indexed 0=Sunday .. 6=Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub const ALL: WeekdaySet = WeekdaySet(0b0111_1111);

    pub fn empty() -> Self {
        WeekdaySet(0)
    }

    pub fn from_indices(indices: &[u8]) -> Self {
        let mut set = WeekdaySet(0);
        for &i in indices {
            set.insert(i);
        }
        set
    }

    /// Monday through Friday.
    pub fn weekdays() -> Self {
        Self::from_indices(&[1, 2, 3, 4, 5])
    }

    /// Saturday and Sunday.
    pub fn weekend() -> Self {
        Self::from_indices(&[0, 6])
    }

    pub fn insert(&mut self, index: u8) {
        if index < 7 {
            self.0 |= 1 << index;
        }
    }

    pub fn contains_index(self, index: u8) -> bool {
        index < 7 && self.0 & (1 << index) != 0
    }

    pub fn contains(self, day: Weekday) -> bool {
        self.contains_index(day.num_days_from_sunday() as u8)
    }

    pub fn is_all(self) -> bool {
        self.0 == Self::ALL.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> u32 {
        self.0.count_ones()
    }
}

impl Default for WeekdaySet {
    fn default() -> Self {
        Self::ALL
    }
}

impl std::str::FromStr for WeekdaySet {
    type Err = String;

    /// Accepts `all`, `weekdays`, `weekend`, or a comma-separated list of
    /// day names (`sun,mon,...`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "" => return Ok(Self::ALL),
            "weekdays" => return Ok(Self::weekdays()),
            "weekend" => return Ok(Self::weekend()),
            _ => {}
        }

        let mut set = WeekdaySet::empty();
        for part in s.split(',') {
            let index = match part.trim().to_lowercase().as_str() {
                "sun" | "sunday" => 0,
                "mon" | "monday" => 1,
                "tue" | "tuesday" => 2,
                "wed" | "wednesday" => 3,
                "thu" | "thursday" => 4,
                "fri" | "friday" => 5,
                "sat" | "saturday" => 6,
                other => return Err(format!("unknown weekday '{}'", other)),
            };
            set.insert(index);
        }
        if set.is_empty() {
            return Err("weekday set is empty".to_string());
        }
        Ok(set)
    }
}

/// A time window restricting which days are considered.
/// Weeks follow ISO-8601: Monday start, week 1 is the week containing the
/// first Thursday of the year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Year(i32),
    Month(i32, u32),
    Week(i32, u32),
    Range(NaiveDate, NaiveDate),
}

impl Scope {
    /// Inclusive first and last calendar day of the scope, or `None` for an
    /// out-of-range month/week.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        match *self {
            Scope::Year(y) => Some((
                NaiveDate::from_ymd_opt(y, 1, 1)?,
                NaiveDate::from_ymd_opt(y, 12, 31)?,
            )),
            Scope::Month(y, m) => {
                let first = NaiveDate::from_ymd_opt(y, m, 1)?;
                let next = if m == 12 {
                    NaiveDate::from_ymd_opt(y + 1, 1, 1)?
                } else {
                    NaiveDate::from_ymd_opt(y, m + 1, 1)?
                };
                Some((first, next - Duration::days(1)))
            }
            Scope::Week(iso_year, iso_week) => {
                let monday = NaiveDate::from_isoywd_opt(iso_year, iso_week, Weekday::Mon)?;
                Some((monday, monday + Duration::days(6)))
            }
            Scope::Range(start, end) => {
                if start <= end {
                    Some((start, end))
                } else {
                    None
                }
            }
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.date_bounds()
            .map(|(start, end)| start <= date && date <= end)
            .unwrap_or(false)
    }

    /// Number of calendar days in the scope matching the weekday set. This
    /// is the denominator for averages and active-day percentages.
    pub fn capacity_days(&self, weekdays: WeekdaySet) -> u32 {
        let Some((start, end)) = self.date_bounds() else {
            return 0;
        };
        let mut count = 0;
        let mut day = start;
        while day <= end {
            if weekdays.contains(day.weekday()) {
                count += 1;
            }
            day += Duration::days(1);
        }
        count
    }
}

/// Parse a `YYYY-MM-DD` date key back into a calendar date.
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()
}

/// Restrict a dataset to a scope and weekday subset. Pure: the input is
/// never mutated and surviving entries are copied. Scope and weekday
/// filtering commute (set intersection).
pub fn filter(
    dataset: &CalendarDataset,
    scope: Option<&Scope>,
    weekdays: WeekdaySet,
) -> CalendarDataset {
    dataset
        .iter()
        .filter_map(|(key, day)| {
            let date = parse_date_key(key)?;
            if let Some(scope) = scope {
                if !scope.contains(date) {
                    return None;
                }
            }
            if !weekdays.contains(date.weekday()) {
                return None;
            }
            Some((key.clone(), day.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{aggregate, date_range, CalendarEvent};
    use chrono::NaiveDateTime;

    fn timed_event(start: &str, minutes: i64) -> CalendarEvent {
        let start = NaiveDateTime::parse_from_str(start, "%Y-%m-%d %H:%M").unwrap();
        CalendarEvent::new("run", "", "", start, start + Duration::minutes(minutes))
    }

    #[test]
    fn test_year_bounds() {
        let (start, end) = Scope::Year(2024).date_bounds().unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        assert_eq!(Scope::Year(2024).capacity_days(WeekdaySet::ALL), 366);
        assert_eq!(Scope::Year(2023).capacity_days(WeekdaySet::ALL), 365);
    }

    #[test]
    fn test_month_bounds_leap_february() {
        let scope = Scope::Month(2024, 2);
        let (start, end) = scope.date_bounds().unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(scope.capacity_days(WeekdaySet::ALL), 29);
    }

    #[test]
    fn test_december_bounds_cross_year() {
        let (_, end) = Scope::Month(2024, 12).date_bounds().unwrap();
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
    }

    #[test]
    fn test_invalid_month_has_zero_capacity() {
        assert_eq!(Scope::Month(2024, 13).date_bounds(), None);
        assert_eq!(Scope::Month(2024, 13).capacity_days(WeekdaySet::ALL), 0);
    }

    #[test]
    fn test_iso_week_monday_start() {
        // 2021-01-01 is a Friday; ISO week 1 of 2021 starts Monday Jan 4.
        let (start, end) = Scope::Week(2021, 1).date_bounds().unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2021, 1, 4).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2021, 1, 10).unwrap());
        assert_eq!(Scope::Week(2021, 1).capacity_days(WeekdaySet::ALL), 7);
    }

    #[test]
    fn test_weekday_capacity_over_one_week() {
        let scope = Scope::Range(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), // a Monday
            NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
        );
        assert_eq!(scope.capacity_days(WeekdaySet::weekdays()), 5);
        assert_eq!(scope.capacity_days(WeekdaySet::weekend()), 2);
        assert_eq!(scope.capacity_days(WeekdaySet::ALL), 7);
    }

    #[test]
    fn test_range_identity_law() {
        let dataset = aggregate(vec![
            timed_event("2024-03-01 08:00", 30),
            timed_event("2024-03-15 08:00", 60),
            timed_event("2024-06-02 19:00", 45),
        ]);
        let (min, max) = date_range(&dataset).unwrap();
        let scope = Scope::Range(parse_date_key(&min).unwrap(), parse_date_key(&max).unwrap());
        let view = filter(&dataset, Some(&scope), WeekdaySet::ALL);
        assert_eq!(view.len(), dataset.len());
        for (key, day) in &dataset {
            assert_eq!(view[key].total_minutes, day.total_minutes);
            assert_eq!(view[key].events.len(), day.events.len());
        }
    }

    #[test]
    fn test_filter_by_month_scope() {
        let dataset = aggregate(vec![
            timed_event("2024-02-10 08:00", 30),
            timed_event("2024-03-01 08:00", 30),
        ]);
        let view = filter(&dataset, Some(&Scope::Month(2024, 2)), WeekdaySet::ALL);
        assert_eq!(view.len(), 1);
        assert!(view.contains_key("2024-02-10"));
    }

    #[test]
    fn test_filter_by_iso_week() {
        // 2024-01-01 is a Monday, ISO week 1 of 2024.
        let dataset = aggregate(vec![
            timed_event("2024-01-01 08:00", 30),
            timed_event("2024-01-07 08:00", 30),
            timed_event("2024-01-08 08:00", 30),
        ]);
        let view = filter(&dataset, Some(&Scope::Week(2024, 1)), WeekdaySet::ALL);
        assert_eq!(view.len(), 2);
        assert!(!view.contains_key("2024-01-08"));
    }

    #[test]
    fn test_weekday_filter_commutes_with_scope() {
        let dataset = aggregate(vec![
            timed_event("2024-01-06 08:00", 30), // Saturday
            timed_event("2024-01-08 08:00", 30), // Monday
        ]);
        let scope = Scope::Month(2024, 1);
        let weekdays = WeekdaySet::weekdays();

        let scoped_first = filter(&filter(&dataset, Some(&scope), WeekdaySet::ALL), None, weekdays);
        let weekday_first = filter(&filter(&dataset, None, weekdays), Some(&scope), WeekdaySet::ALL);

        assert_eq!(scoped_first.len(), 1);
        assert_eq!(weekday_first.len(), 1);
        assert!(scoped_first.contains_key("2024-01-08"));
        assert!(weekday_first.contains_key("2024-01-08"));
    }

    #[test]
    fn test_filter_does_not_mutate_input() {
        let dataset = aggregate(vec![timed_event("2024-01-06 08:00", 30)]);
        let _ = filter(&dataset, Some(&Scope::Year(1999)), WeekdaySet::ALL);
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn test_weekday_set_parsing() {
        assert_eq!("all".parse::<WeekdaySet>().unwrap(), WeekdaySet::ALL);
        assert_eq!(
            "weekdays".parse::<WeekdaySet>().unwrap(),
            WeekdaySet::weekdays()
        );
        assert_eq!(
            "mon,wed,fri".parse::<WeekdaySet>().unwrap(),
            WeekdaySet::from_indices(&[1, 3, 5])
        );
        assert!("mon,funday".parse::<WeekdaySet>().is_err());
    }

    #[test]
    fn test_weekday_set_contains() {
        let set = WeekdaySet::weekend();
        assert!(set.contains(Weekday::Sun));
        assert!(set.contains(Weekday::Sat));
        assert!(!set.contains(Weekday::Wed));
        assert_eq!(set.len(), 2);
    }
}
