//! photoqueue - inspect and maintain a persisted photo upload queue

use anyhow::Result;
use clap::{Parser, Subcommand};
use photoqueue::{BroadcastEventBus, QueueManager, QueueSettings};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Settings file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Database file, overrides the settings file
    #[arg(long)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print list sizes and outstanding work
    Status,
    /// Dump both lists as JSON
    List,
    /// Move failed uploads back to the selection
    RetryFailed,
    /// Write both lists back to the database
    Checkpoint,
    /// Delete every tracked photo
    Reset,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt::init();

    let mut settings = match &args.config {
        Some(path) => QueueSettings::load(path)?,
        None => QueueSettings::default(),
    };
    if let Some(database) = args.database {
        settings = settings.with_database_path(database)?;
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(settings, args.command))
}

async fn run(settings: QueueSettings, command: Command) -> Result<()> {
    let bus = Arc::new(BroadcastEventBus::new(settings.event_capacity));
    let queue = QueueManager::from_settings(&settings, bus).await?;

    match command {
        Command::Status => {
            println!("selected:       {}", queue.get_selected_count().await);
            println!("uploads:        {}", queue.get_uploads_count().await);
            println!("active uploads: {}", queue.get_active_uploads_count().await);
            match queue.get_next_upload().await {
                Some(next) => println!("next upload:    {}", next.id()),
                None => println!("next upload:    -"),
            }
        }
        Command::List => {
            let listing = serde_json::json!({
                "selected": queue.get_selected().await,
                "uploading": queue.get_uploading_uploads().await,
            });
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        Command::RetryFailed => {
            if queue.move_failed_to_selected().await {
                println!(
                    "Moved failed uploads back to selection ({} selected)",
                    queue.get_selected_count().await
                );
            } else {
                println!("No failed uploads");
            }
        }
        Command::Checkpoint => {
            queue.update_database().await;
            println!("Checkpoint written to {}", settings.database_path.display());
        }
        Command::Reset => {
            queue.reset().await;
            println!("Queue reset");
        }
    }

    Ok(())
}
