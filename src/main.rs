use std::{io, path::PathBuf};

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use tui::{backend::CrosstermBackend, Terminal};

use jsonlquill::app::{self, App};
use jsonlquill::config::{config_dir, Settings};
use jsonlquill::logging;
use jsonlquill::theme::ThemeName;

/// Terminal editor for instruction/input/output JSONL files.
#[derive(Parser, Debug)]
#[command(name = "jsonlquill", version, about)]
struct Args {
    /// JSONL file to open on startup
    path: Option<PathBuf>,

    /// Start with the dark theme regardless of the saved setting
    #[arg(long)]
    dark: bool,
}

fn main() -> Result<(), io::Error> {
    let args = Args::parse();
    let config_dir = config_dir();

    // Logging is best effort; the editor still runs without it
    let _log_guard = match logging::init(&config_dir) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled: {e}");
            None
        }
    };
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting jsonlquill");

    let mut settings = Settings::load_from(&config_dir);
    if args.dark {
        settings.theme = ThemeName::Dark;
    }
    let mut app = App::new(settings, config_dir);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    if let Some(path) = args.path.as_deref() {
        app.open_initial(&mut terminal, path);
    }
    let result = app::run(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "terminal loop failed");
    }
    result
}
