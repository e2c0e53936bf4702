//! Per-source totals and hour-of-day distribution.

use calgraph_core::TrendBucket;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, Paragraph, Sparkline},
    Frame,
};

use super::super::app::App;
use super::widgets::{format_duration, truncate_string};

pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(9),
            Constraint::Length(6),
        ])
        .split(area);

    render_totals(frame, app, chunks[0]);
    render_trend(frame, app, chunks[1]);
    render_hourly(frame, app, chunks[2]);
}

fn render_totals(frame: &mut Frame, app: &App, area: Rect) {
    let scope = app.year_scope();
    let totals = app.registry.category_totals(Some(&scope), app.weekdays);
    let grand_total: i64 = totals.iter().map(|(_, t)| t).sum();

    let mut lines: Vec<Line> = Vec::new();
    for (source, total) in &totals {
        let share = if grand_total > 0 {
            *total as f64 / grand_total as f64
        } else {
            0.0
        };
        let bar_width = (share * 24.0).round() as usize;
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:<28}", truncate_string(source, 26)),
                Style::default().fg(app.theme.foreground),
            ),
            Span::styled(
                format!("{:>9}  ", format_duration(*total)),
                Style::default()
                    .fg(app.theme.highlight)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "▆".repeat(bar_width),
                Style::default().fg(app.theme.colors[3]),
            ),
            Span::styled(
                format!(" {:.1}%", share * 100.0),
                Style::default().fg(app.theme.muted),
            ),
        ]));
    }
    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "No activity in this window",
            Style::default().fg(app.theme.muted),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border))
        .title(format!(" Sources ({}) ", app.registry.len()));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_trend(frame: &mut Frame, app: &App, area: Rect) {
    let scope = app.year_scope();
    let series = app
        .registry
        .trend_series(TrendBucket::Month, Some(&scope), app.weekdays);
    let data: Vec<(String, u64)> = series
        .iter()
        .map(|p| {
            // "2024-03" -> "03"
            let label = p.bucket.get(5..).unwrap_or(&p.bucket).to_string();
            (label, p.total_minutes.max(0) as u64)
        })
        .collect();
    let data_refs: Vec<(&str, u64)> = data.iter().map(|(l, v)| (l.as_str(), *v)).collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border))
                .title(" Minutes by month "),
        )
        .data(&data_refs)
        .bar_width(6)
        .bar_gap(1)
        .bar_style(Style::default().fg(app.theme.colors[3]))
        .value_style(
            Style::default()
                .fg(app.theme.background)
                .bg(app.theme.colors[3]),
        );
    frame.render_widget(chart, area);
}

fn render_hourly(frame: &mut Frame, app: &App, area: Rect) {
    let scope = app.year_scope();
    let hours = app.registry.hourly_distribution(Some(&scope), app.weekdays);
    let data: Vec<u64> = hours.iter().map(|&m| m.max(0) as u64).collect();

    let sparkline = Sparkline::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border))
                .title(" Busy hours (00-23) "),
        )
        .data(&data)
        .style(Style::default().fg(app.theme.highlight));
    frame.render_widget(sparkline, area);
}
