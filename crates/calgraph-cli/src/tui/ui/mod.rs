mod heatmap;
mod sources;
mod stats;
pub mod widgets;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use super::app::{App, Tab};

pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_tabs(frame, app, chunks[0]);

    match app.tab {
        Tab::Heatmap => heatmap::render(frame, app, chunks[1]),
        Tab::Stats => stats::render(frame, app, chunks[1]),
        Tab::Sources => sources::render(frame, app, chunks[1]),
    }

    render_footer(frame, app, chunks[2]);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Tab::all()
        .iter()
        .enumerate()
        .map(|(i, tab)| Line::from(format!(" {} {} ", i + 1, tab.title())))
        .collect();
    let selected = Tab::all().iter().position(|&t| t == app.tab).unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border))
                .title(format!(" calgraph {} ", app.year)),
        )
        .style(Style::default().fg(app.theme.muted))
        .highlight_style(
            Style::default()
                .fg(app.theme.highlight)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    if app.searching || !app.search_query.is_empty() {
        let cursor = if app.searching { "█" } else { "" };
        let line = Line::from(vec![
            Span::styled(" search: ", Style::default().fg(app.theme.highlight)),
            Span::raw(format!("{}{}", app.search_query, cursor)),
            Span::styled(
                if app.searching {
                    "  (enter keep, esc clear)"
                } else {
                    "  (/ edit, esc clear)"
                },
                Style::default().fg(app.theme.muted),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let hints = Line::from(vec![
        Span::styled(" q", Style::default().fg(app.theme.highlight)),
        Span::raw(" quit  "),
        Span::styled("tab", Style::default().fg(app.theme.highlight)),
        Span::raw(" switch  "),
        Span::styled("←↑↓→", Style::default().fg(app.theme.highlight)),
        Span::raw(" day  "),
        Span::styled("[ ]", Style::default().fg(app.theme.highlight)),
        Span::raw(" year  "),
        Span::styled("/", Style::default().fg(app.theme.highlight)),
        Span::raw(" search  "),
        Span::styled("s", Style::default().fg(app.theme.highlight)),
        Span::raw(format!(" scheme ({})  ", app.scheme.name)),
        Span::styled("w", Style::default().fg(app.theme.highlight)),
        Span::raw(" days  "),
        Span::styled("b", Style::default().fg(app.theme.highlight)),
        Span::raw(" counts  "),
        Span::styled("t", Style::default().fg(app.theme.highlight)),
        Span::raw(format!(" theme ({})", app.theme.name.as_str())),
    ]);
    frame.render_widget(
        Paragraph::new(hints).style(Style::default().fg(app.theme.muted)),
        area,
    );
}
