//! Summary statistics tab.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, Paragraph},
    Frame,
};

use super::super::app::App;
use super::widgets::format_duration;

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(42), Constraint::Min(0)])
        .split(area);

    render_summary(frame, app, chunks[0]);
    render_months(frame, app, chunks[1]);
}

fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let snapshot = app.snapshot();

    let row = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(
                format!("{:<16}", label),
                Style::default().fg(app.theme.muted),
            ),
            Span::styled(
                value,
                Style::default()
                    .fg(app.theme.foreground)
                    .add_modifier(Modifier::BOLD),
            ),
        ])
    };

    let lines = vec![
        row("Active days", format!("{} / {}", snapshot.active_days, snapshot.capacity_days)),
        row("Events", snapshot.total_events.to_string()),
        row("Total time", format_duration(snapshot.total_minutes)),
        row("Busiest day", format_duration(snapshot.max_minutes)),
        row("Daily average", format!("{:.1} min", snapshot.average_minutes)),
        row("Activity", format!("{:.1}%", snapshot.activity_percentage)),
        row("Longest streak", format!("{} days", snapshot.longest_streak)),
        row("Current streak", format!("{} days", snapshot.current_streak)),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border))
        .title(format!(" Summary {} ", app.year));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_months(frame: &mut Frame, app: &App, area: Rect) {
    let months = calgraph_core::monthly_active_days(&app.dataset, app.year);
    let data: Vec<(&str, u64)> = MONTH_LABELS
        .iter()
        .zip(months.iter())
        .map(|(label, &count)| (*label, count as u64))
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border))
                .title(" Active days by month "),
        )
        .data(&data)
        .bar_width(4)
        .bar_gap(1)
        .bar_style(Style::default().fg(app.theme.highlight))
        .value_style(
            Style::default()
                .fg(app.theme.background)
                .bg(app.theme.highlight),
        );
    frame.render_widget(chart, area);
}
