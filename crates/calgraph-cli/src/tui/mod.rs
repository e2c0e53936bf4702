mod app;
pub mod config;
mod event;
mod settings;
mod themes;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::Result;
use calgraph_core::{IntensityScheme, Scope, SourceRegistry, WeekdaySet};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use app::App;
use event::{Event, EventHandler};
use settings::Settings;
use themes::ThemeName;

pub fn run(
    registry: SourceRegistry,
    theme: &str,
    scope: Scope,
    weekdays: WeekdaySet,
    scheme: IntensityScheme,
) -> Result<()> {
    // CLI flag wins; otherwise fall back to the persisted choice.
    let theme_name = theme
        .parse::<ThemeName>()
        .unwrap_or_else(|_| Settings::load().theme_name());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(registry, theme_name, scope, weekdays, scheme);
    let mut events = EventHandler::new(Duration::from_millis(100));

    let result = run_loop(&mut terminal, &mut app, &mut events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::render(f, app))?;

        match events.next()? {
            Event::Tick => {
                app.on_tick();
            }
            Event::Key(key) => {
                if app.handle_key_event(key) {
                    break;
                }
            }
            Event::Resize(w, h) => {
                app.handle_resize(w, h);
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
