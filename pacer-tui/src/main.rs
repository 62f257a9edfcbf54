// pacer-tui/src/main.rs
use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use pacer_lib::PacerService;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::fs::OpenOptions;
use std::sync::Mutex;
use std::{
    io,
    time::{Duration, Instant},
};

mod app; // Application state
mod ui; // UI rendering logic

use crate::app::App;

const LOG_ENV_VAR: &str = "PACER_LOG";
const LOG_FILE_NAME: &str = "pacer-tui.log";
const INPUT_POLL: Duration = Duration::from_millis(250);

fn main() -> Result<()> {
    init_file_logging()?;

    let service = PacerService::initialize().context("Failed to initialize PacerService")?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(service);
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

/// Writes tracing output to a file when `PACER_LOG` is set; the terminal is busy.
fn init_file_logging() -> Result<()> {
    let Ok(filter) = std::env::var(LOG_ENV_VAR) else {
        return Ok(());
    };
    let log_dir = dirs::data_dir()
        .context("Could not determine data directory for the log file")?
        .join("pacer");
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {log_dir:?}"))?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join(LOG_FILE_NAME))
        .context("Failed to open log file")?;

    let filter = if filter.trim().is_empty() {
        "info".to_string()
    } else {
        filter
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        // Deliver any ticks that fell due before drawing
        app.on_tick(Instant::now());

        terminal.draw(|f| ui::render_ui(f, app))?;

        // Wake up for input or for the next due tick, whichever comes first
        let timeout = app
            .session
            .until_next_tick(Instant::now())
            .map_or(INPUT_POLL, |due| due.min(INPUT_POLL));
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key_event(key)?;
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
