use calgraph_core::{
    CalendarDataset, DayAggregate, IntensityScheme, Scope, SourceRegistry, StatisticsSnapshot,
    WeekdaySet,
};
use chrono::{Datelike, Duration, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::settings::Settings;
use super::themes::{Theme, ThemeName};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Heatmap,
    Stats,
    Sources,
}

impl Tab {
    pub fn all() -> &'static [Tab] {
        &[Tab::Heatmap, Tab::Stats, Tab::Sources]
    }

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Heatmap => "Heatmap",
            Tab::Stats => "Stats",
            Tab::Sources => "Sources",
        }
    }

    fn next(self) -> Tab {
        let tabs = Self::all();
        let idx = tabs.iter().position(|&t| t == self).unwrap_or(0);
        tabs[(idx + 1) % tabs.len()]
    }

    fn prev(self) -> Tab {
        let tabs = Self::all();
        let idx = tabs.iter().position(|&t| t == self).unwrap_or(0);
        tabs[(idx + tabs.len() - 1) % tabs.len()]
    }
}

pub struct App {
    pub registry: SourceRegistry,
    /// Combined dataset before any title search.
    base: CalendarDataset,
    /// Dataset the views render; equals `base` with the search applied.
    pub dataset: CalendarDataset,
    pub scheme: IntensityScheme,
    pub weekdays: WeekdaySet,
    pub year: i32,
    pub selected: NaiveDate,
    pub tab: Tab,
    pub theme: Theme,
    pub settings: Settings,
    pub search_query: String,
    pub searching: bool,
    pub show_counts: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        registry: SourceRegistry,
        theme_name: ThemeName,
        scope: Scope,
        weekdays: WeekdaySet,
        scheme: IntensityScheme,
    ) -> Self {
        let base = registry.combined();
        let today = chrono::Local::now().date_naive();

        let (year, selected) = match scope.date_bounds() {
            Some((start, end)) if !(start..=end).contains(&today) => (start.year(), start),
            _ => (today.year(), today),
        };

        Self {
            registry,
            dataset: base.clone(),
            base,
            scheme,
            weekdays,
            year,
            selected,
            tab: Tab::Heatmap,
            theme: Theme::from_name(theme_name),
            settings: Settings::load(),
            search_query: String::new(),
            searching: false,
            show_counts: false,
            should_quit: false,
        }
    }

    pub fn year_scope(&self) -> Scope {
        Scope::Year(self.year)
    }

    pub fn snapshot(&self) -> StatisticsSnapshot {
        calgraph_core::compute(&self.dataset, &self.year_scope(), self.weekdays)
    }

    pub fn selected_day(&self) -> Option<&DayAggregate> {
        self.dataset
            .get(&self.selected.format("%Y-%m-%d").to_string())
    }

    pub fn on_tick(&mut self) {}

    pub fn handle_resize(&mut self, _w: u16, _h: u16) {}

    /// Returns true when the app should exit.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> bool {
        if self.searching {
            self.handle_search_key(key);
            return false;
        }

        match key.code {
            KeyCode::Esc if !self.search_query.is_empty() => {
                self.search_query.clear();
                self.apply_search();
            }
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Tab => self.tab = self.tab.next(),
            KeyCode::BackTab => self.tab = self.tab.prev(),
            KeyCode::Char('1') => self.tab = Tab::Heatmap,
            KeyCode::Char('2') => self.tab = Tab::Stats,
            KeyCode::Char('3') => self.tab = Tab::Sources,
            KeyCode::Char('t') => self.cycle_theme(),
            KeyCode::Char('s') => self.swap_scheme(),
            KeyCode::Char('w') => self.cycle_weekdays(),
            KeyCode::Char('b') => self.show_counts = !self.show_counts,
            KeyCode::Char('/') => self.searching = true,
            KeyCode::Left | KeyCode::Char('h') => self.move_selection(Duration::days(-7)),
            KeyCode::Right | KeyCode::Char('l') => self.move_selection(Duration::days(7)),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(Duration::days(-1)),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(Duration::days(1)),
            KeyCode::Char('[') => self.set_year(self.year - 1),
            KeyCode::Char(']') => self.set_year(self.year + 1),
            KeyCode::Home => {
                let today = chrono::Local::now().date_naive();
                self.selected = today;
                self.year = today.year();
            }
            _ => {}
        }
        false
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.searching = false;
                self.search_query.clear();
                self.apply_search();
            }
            KeyCode::Enter => self.searching = false,
            KeyCode::Backspace => {
                self.search_query.pop();
                self.apply_search();
            }
            KeyCode::Char(c) => {
                self.search_query.push(c);
                self.apply_search();
            }
            _ => {}
        }
    }

    fn apply_search(&mut self) {
        self.dataset = if self.search_query.trim().is_empty() {
            self.base.clone()
        } else {
            calgraph_core::search(&self.base, &self.search_query)
        };
    }

    fn swap_scheme(&mut self) {
        self.scheme = if self.scheme.name == "coarse" {
            calgraph_core::fine_scheme()
        } else {
            calgraph_core::coarse_scheme()
        };
    }

    fn cycle_weekdays(&mut self) {
        self.weekdays = if self.weekdays == WeekdaySet::ALL {
            WeekdaySet::weekdays()
        } else if self.weekdays == WeekdaySet::weekdays() {
            WeekdaySet::weekend()
        } else {
            WeekdaySet::ALL
        };
    }

    fn cycle_theme(&mut self) {
        let next = self.theme.name.next();
        self.theme = Theme::from_name(next);
        self.settings.set_theme(next);
        // Persisting the theme is best-effort; a read-only config dir
        // should not crash the view.
        let _ = self.settings.save();
    }

    /// Move the selection within the displayed year, following it across
    /// year boundaries.
    fn move_selection(&mut self, delta: Duration) {
        if let Some(next) = self.selected.checked_add_signed(delta) {
            self.selected = next;
            self.year = next.year();
        }
    }

    fn set_year(&mut self, year: i32) {
        self.year = year;
        if let Some(moved) = NaiveDate::from_ymd_opt(
            year,
            self.selected.month(),
            self.selected.day().min(28),
        ) {
            self.selected = moved;
        }
    }
}
