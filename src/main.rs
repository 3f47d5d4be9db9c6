mod action;
mod app;
mod config;
mod error;
mod event;
mod feed;
mod newsapi;
mod secrets;
mod sensor;
mod source;
mod tui;
mod types;
mod ui;

use std::fs::File;
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::action::Action;
use crate::app::App;
use crate::config::Config;
use crate::event::Event;
use crate::newsapi::NewsApi;
use crate::source::NewsSource;
use crate::tui::EventHandler;

/// Browse agricultural news in the terminal
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Path to config file (default: ~/.config/harvest/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// News search endpoint, e.g. a proxy that adds the API key
    #[arg(long)]
    endpoint: Option<String>,

    /// Search terms
    #[arg(long)]
    query: Option<String>,

    /// Article language code
    #[arg(long)]
    language: Option<String>,

    /// Write logs to this file instead of the default log path
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(endpoint) = &self.endpoint {
            config.news.endpoint = endpoint.clone();
        }
        if let Some(query) = &self.query {
            config.news.query = query.clone();
        }
        if let Some(language) = &self.language {
            config.news.language = language.clone();
        }
    }
}

/// Open the log file. The terminal belongs to the TUI, so logs never go to
/// stderr; without `--log-file` they land in the default log path, or nowhere
/// if that cannot be created.
fn open_log(log_file: Option<&Path>) -> std::io::Result<Option<File>> {
    match log_file {
        Some(path) => File::create(path).map(Some),
        None => Ok(config::default_log_path().and_then(|path| {
            std::fs::create_dir_all(path.parent()?).ok()?;
            File::create(path).ok()
        })),
    }
}

fn init_logging(log: Option<File>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_layer = log.map(|file| {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(file))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(open_log(cli.log_file.as_deref())?);

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let mut config = Config::load(cli.config.as_deref());
    cli.apply(&mut config);
    config.validate()?;

    let api_key = secrets::load_api_key(&config.news)?;
    let source = NewsApi::new(&config.news, api_key)?;
    info!(source = ?source, "starting harvest");

    let result = run(Arc::new(source), &config).await;

    // Restore terminal
    tui::restore()?;

    result
}

async fn run(
    source: Arc<dyn NewsSource>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut terminal = tui::init()?;

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let mut app = App::new(source, action_tx.clone());
    app.update(Action::Resize(terminal.size()?.height));

    let tick_rate = Duration::from_millis(config.ui.tick_rate_ms);
    let render_rate = Duration::from_millis(16); // ~60fps
    let mut events = EventHandler::new(tick_rate, render_rate);

    loop {
        tokio::select! {
            Some(event) = events.next() => {
                if event.is_quit() {
                    break;
                }

                match event {
                    Event::Render => {
                        terminal.draw(|frame| ui::render(frame, &app))?;
                    }
                    _ => {
                        let action = app.handle_event(event);
                        if !matches!(action, Action::None) {
                            action_tx.send(action)?;
                        }
                    }
                }
            }
            Some(action) = action_rx.recv() => {
                app.update(action);
            }
        }

        if app.should_quit {
            break;
        }
    }

    app.shutdown();
    Ok(())
}
