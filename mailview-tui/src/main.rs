//! mailview-tui: terminal client for the `/api/emails` service.
//!
//! Polls the email list in the background, with vim-style navigation,
//! an inline detail view, and a compose form.

mod app;
mod handlers;
#[cfg(test)]
mod testing;
mod ui;

use std::fs::{self, OpenOptions};
use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use mailview_core::{AppConfig, AppPaths, MailBackend, MailView, ServiceClient};
use ratatui::{Terminal, backend::CrosstermBackend};

use app::App;
use handlers::{KeyAction, handle_key};

/// Event polling timeout in milliseconds.
const POLL_TIMEOUT_MS: u64 = 100;

fn main() -> Result<()> {
    let paths = AppPaths::discover(None)?;
    let config = AppConfig::load(&paths)?;
    init_logging(&paths)?;

    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    let _guard = runtime.enter();

    let client = ServiceClient::new(&config.service_url, Some(config.request_timeout()))?;
    let mut app = App::new(
        MailView::new(client, config.poll_interval()),
        &config.compose.from,
    );
    log::info!("mailview-tui starting against {}", config.service_url);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.view.mount();
    let result = run_app(&mut terminal, &mut app);
    app.view.unmount();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        log::error!("{err:?}");
        eprintln!("Error: {err}");
        return Err(err);
    }

    Ok(())
}

/// Route log output to the state-dir log file; stderr belongs to the terminal UI.
fn init_logging(paths: &AppPaths) -> Result<()> {
    fs::create_dir_all(&paths.state_dir)
        .with_context(|| format!("creating {}", paths.state_dir.display()))?;
    let log_path = paths.log_file("mailview-tui");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("opening {}", log_path.display()))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .write_style(env_logger::WriteStyle::Never)
        .try_init()
        .context("initialising logger")?;
    Ok(())
}

fn run_app<T, B>(terminal: &mut Terminal<T>, app: &mut App<B>) -> Result<()>
where
    T: ratatui::backend::Backend,
    B: MailBackend,
{
    loop {
        // Apply whatever the background requests have finished
        app.sync();

        terminal.draw(|frame| ui::draw(frame, app))?;

        if event::poll(Duration::from_millis(POLL_TIMEOUT_MS))? {
            if let Event::Key(key_event) = event::read()? {
                if key_event.kind == KeyEventKind::Press
                    && handle_key(app, KeyAction::from(key_event))
                {
                    app.should_quit = true;
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
