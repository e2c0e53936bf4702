//! GitHub-style year grid with a detail panel for the selected day.

use chrono::{Datelike, Duration, NaiveDate};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::super::app::App;
use super::widgets::{format_duration, truncate_string};

const WEEK_COLUMNS: i64 = 53;
const DAY_LABELS: [&str; 7] = ["    ", "Mon ", "    ", "Wed ", "    ", "Fri ", "    "];
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(11), Constraint::Min(0)])
        .split(area);

    render_grid(frame, app, chunks[0]);
    render_detail(frame, app, chunks[1]);
}

fn render_grid(frame: &mut Frame, app: &App, area: Rect) {
    let jan1 = match NaiveDate::from_ymd_opt(app.year, 1, 1) {
        Some(d) => d,
        None => return,
    };
    // Column 0 starts on the Sunday on or before January 1st.
    let grid_start = jan1 - Duration::days(jan1.weekday().num_days_from_sunday() as i64);

    let mut lines: Vec<Line> = vec![month_label_line(app, grid_start)];

    for row in 0..7 {
        let mut spans: Vec<Span> = vec![Span::styled(
            DAY_LABELS[row as usize],
            Style::default().fg(app.theme.muted),
        )];
        for col in 0..WEEK_COLUMNS {
            let date = grid_start + Duration::days(col * 7 + row);
            spans.push(cell(app, date));
        }
        lines.push(Line::from(spans));
    }

    lines.push(legend_line(app));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border))
        .title(format!(" {} ", app.year));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn cell<'a>(app: &App, date: NaiveDate) -> Span<'a> {
    if date.year() != app.year {
        return Span::raw("  ");
    }
    if !app.weekdays.contains(date.weekday()) {
        return Span::styled("· ", Style::default().fg(app.theme.muted));
    }

    let key = date.format("%Y-%m-%d").to_string();
    let day = app.dataset.get(&key);
    let total = day.map(|d| d.total_minutes).unwrap_or(0);
    let count = day.map(|d| d.events.len()).unwrap_or(0);
    let level = app.scheme.level(total);
    let color = app.theme.level_color(level, app.scheme.max_level());

    let mut style = Style::default().fg(color);
    if date == app.selected {
        style = style
            .bg(app.theme.foreground)
            .add_modifier(Modifier::BOLD);
    }
    if app.show_counts && count > 0 {
        return Span::styled(format!("{:<2}", count.min(9)), style);
    }
    Span::styled("██", style)
}

fn month_label_line<'a>(app: &App, grid_start: NaiveDate) -> Line<'a> {
    let mut label = vec![b' '; (4 + WEEK_COLUMNS as usize * 2) + 2];
    for col in 0..WEEK_COLUMNS {
        for row in 0..7 {
            let date = grid_start + Duration::days(col * 7 + row);
            if date.year() == app.year && date.day() == 1 {
                let name = MONTHS[date.month0() as usize];
                let at = 4 + col as usize * 2;
                label[at..at + 3].copy_from_slice(name.as_bytes());
            }
        }
    }
    Line::from(Span::styled(
        String::from_utf8_lossy(&label).into_owned(),
        Style::default().fg(app.theme.muted),
    ))
}

fn legend_line<'a>(app: &App) -> Line<'a> {
    let mut spans = vec![Span::styled("    Less ", Style::default().fg(app.theme.muted))];
    for color in app.theme.colors {
        spans.push(Span::styled("██", Style::default().fg(color)));
    }
    spans.push(Span::styled(" More", Style::default().fg(app.theme.muted)));
    Line::from(spans)
}

fn render_detail(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!(" {} ", app.selected.format("%A, %B %-d %Y"));
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border))
        .title(title);

    let mut lines: Vec<Line> = Vec::new();
    match app.selected_day() {
        Some(day) => {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{} events, ", day.events.len()),
                    Style::default().fg(app.theme.foreground),
                ),
                Span::styled(
                    format_duration(day.total_minutes),
                    Style::default()
                        .fg(app.theme.highlight)
                        .add_modifier(Modifier::BOLD),
                ),
            ]));
            lines.push(Line::raw(""));
            for event in &day.events {
                let mut text = format!(
                    "  {}  {:>7}  {}",
                    event.start.format("%H:%M"),
                    format_duration(event.duration_minutes),
                    truncate_string(&event.title, 48),
                );
                if !event.location.is_empty() {
                    text.push_str(&format!(" ({})", truncate_string(&event.location, 24)));
                }
                lines.push(Line::from(Span::styled(
                    text,
                    Style::default().fg(app.theme.foreground),
                )));
            }
        }
        None => {
            lines.push(Line::from(Span::styled(
                "No events on this day",
                Style::default().fg(app.theme.muted),
            )));
        }
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
