mod app;
mod handler;
mod tui;
mod ui;

use anyhow::Result;
use assistant_core::Config;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::App;
use tui::{EventHandler, Tui};

const LOG_FILE: &str = "assistant.log";

/// Log to a file under the cache dir; stderr belongs to the terminal UI
fn init_logging() -> Result<WorkerGuard> {
    let log_dir = dirs::cache_dir()
        .map(|p| p.join("assistant"))
        .unwrap_or_else(|| std::env::temp_dir().join("assistant"));
    std::fs::create_dir_all(&log_dir)?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(&log_dir, LOG_FILE));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "assistant_core=debug,assistant_tui=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false))
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = init_logging()?;

    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
        Config::new()
    });

    let mut events = EventHandler::new();
    let mut app = App::new(&config, events.sender());

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let result = run(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    result
}

async fn run(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
    }
    Ok(())
}
