mod config;
mod file_store;
mod host;
mod terminal;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use verse_core::{HostEvent, HttpVerseSource, Navigation, Presenter, ReminderStore, Scheduler};

use crate::config::CliConfig;
use crate::file_store::JsonFileStore;
use crate::host::{NativeHost, SystemClock, TerminalEvents, HELP};
use crate::terminal::{render_state, TerminalView};

#[derive(Parser)]
#[command(name = "verse-cli")]
#[command(about = "Daily Quran verses in the terminal", long_about = None)]
struct Cli {
    /// TOML config file (falls back to CONFIG_PATH, then daily-verses.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the verse at the saved reading position
    Show,

    /// Advance to the next verse and show it
    Next {
        /// Confirm sajda verses without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Run the reminder scheduler in the foreground
    Run {
        /// Treat this as a fresh install (reset position and reminders)
        #[arg(long)]
        install: bool,
    },

    /// Turn hourly reminders on or off
    Reminders { state: Toggle },

    /// Print the saved position and reminder state
    Status,
}

#[derive(Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "verse_cli=info,verse_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .or_else(|| std::env::var("CONFIG_PATH").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("daily-verses.toml"));
    let config = CliConfig::load(&config_path)?;

    match cli.command {
        Commands::Show => show(&config).await,
        Commands::Next { yes } => next(&config, yes).await,
        Commands::Run { install } => run(config, install).await,
        Commands::Reminders { state } => reminders(&config, state).await,
        Commands::Status => status(&config).await,
    }
}

fn presenter(
    config: &CliConfig,
    assume_yes: bool,
) -> Result<Presenter<HttpVerseSource, JsonFileStore, TerminalView, SystemClock>> {
    Ok(Presenter::new(
        HttpVerseSource::with_client(config.http_client()?, config.verse.api.clone()),
        JsonFileStore::new(&config.store.path),
        TerminalView::new(assume_yes),
        SystemClock,
        config.verse.api.clone(),
    ))
}

async fn show(config: &CliConfig) -> Result<()> {
    let presenter = presenter(config, false)?;
    presenter.initialize().await;
    print!("{}", render_state(&presenter.state()));

    if presenter.state().error.is_some() {
        anyhow::bail!("Failed to show verse {}", presenter.position());
    }
    Ok(())
}

async fn next(config: &CliConfig, assume_yes: bool) -> Result<()> {
    let presenter = presenter(config, assume_yes)?;
    presenter.initialize().await;
    if !presenter.is_ready() {
        print!("{}", render_state(&presenter.state()));
        anyhow::bail!("Quran metadata unavailable");
    }

    match presenter.advance().await {
        Navigation::Moved(position) => tracing::info!("Moved to {}", position),
        Navigation::Declined => println!("Staying at {}", presenter.position()),
        Navigation::Completed | Navigation::Unavailable | Navigation::Failed => {}
    }
    print!("{}", render_state(&presenter.state()));
    Ok(())
}

async fn run(config: CliConfig, install: bool) -> Result<()> {
    let store = JsonFileStore::new(&config.store.path);
    let fresh = install || !store.exists();

    let (alarm_tx, alarm_rx) = mpsc::unbounded_channel();
    let last_notification = Rc::new(RefCell::new(None));
    let client = config.http_client()?;

    let reminders = config.verse.reminders.clone();
    let host = NativeHost::new(config, client, alarm_tx, last_notification.clone());
    let scheduler = Scheduler::new(host, store, reminders);

    tracing::info!(
        "Reminder scheduler running, state in {}",
        scheduler.store().inner().path().display()
    );
    println!("{}", HELP);

    if fresh {
        scheduler.dispatch(HostEvent::Installed).await;
    }
    scheduler.dispatch(HostEvent::Startup).await;

    let mut events = TerminalEvents::new(alarm_rx, last_notification);
    scheduler.run(&mut events).await;
    Ok(())
}

async fn reminders(config: &CliConfig, state: Toggle) -> Result<()> {
    let store = ReminderStore::new(JsonFileStore::new(&config.store.path));
    let enabled = matches!(state, Toggle::On);
    store
        .set_reminders_enabled(enabled)
        .await
        .context("Failed to save reminder setting")?;
    println!("Reminders {}", if enabled { "on" } else { "off" });
    Ok(())
}

async fn status(config: &CliConfig) -> Result<()> {
    let store = ReminderStore::new(JsonFileStore::new(&config.store.path));
    let position = store.position().await.context("Failed to read position")?;
    let enabled = store
        .reminders_enabled()
        .await
        .context("Failed to read reminder setting")?;
    let last_shown = store
        .last_shown_time()
        .await
        .context("Failed to read last shown time")?
        .and_then(chrono::DateTime::<chrono::Utc>::from_timestamp_millis)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "never".to_string());

    println!("Position:   {}", position);
    println!("Reminders:  {}", if enabled { "on" } else { "off" });
    println!("Last shown: {}", last_shown);
    Ok(())
}
