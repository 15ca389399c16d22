//! Sketchroom CLI client - watch and drive a shared whiteboard room

mod client;
mod messages;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sketchroom-cli")]
#[command(about = "CLI client for a Sketchroom whiteboard relay")]
#[command(version)]
struct Cli {
    /// Server URL (default: ws://localhost:3000/ws)
    #[arg(short, long, default_value = "ws://localhost:3000/ws")]
    server: String,

    /// Your display name
    #[arg(short = 'n', long, global = true)]
    name: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Join the room and print every event
    Watch {
        /// Also print cursor movements
        #[arg(long)]
        cursors: bool,
    },

    /// Send a JSON array of drawing operations as one batch
    Draw {
        /// File containing the operations
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Remove the last operation in the room
    Undo,

    /// Clear the board for everyone
    Clear,

    /// Print who is in the room and how much is drawn
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sketchroom_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Watch { cursors } => run_watch(&cli.server, cli.name, cursors).await,
        Commands::Draw { file } => run_draw(&cli.server, cli.name, &file).await,
        Commands::Undo => run_simple(&cli.server, cli.name, Action::Undo).await,
        Commands::Clear => run_simple(&cli.server, cli.name, Action::Clear).await,
        Commands::Info => run_info(&cli.server, cli.name).await,
    }
}

enum Action {
    Undo,
    Clear,
}

async fn run_watch(server: &str, name: Option<String>, cursors: bool) -> Result<()> {
    let mut client = client::RoomClient::connect(server).await?;
    let welcome = client.join(name).await?;
    println!(
        "Joined as {} ({} ops, {} online)",
        welcome.name, welcome.history_len, welcome.user_count
    );

    client
        .listen(|event| {
            let is_cursor = matches!(event, messages::ServerMessage::Cursor { .. });
            if cursors || !is_cursor {
                println!("{}", messages::describe(&event));
            }
            true
        })
        .await?;

    println!("Connection closed");
    Ok(())
}

async fn run_draw(server: &str, name: Option<String>, file: &Path) -> Result<()> {
    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("reading {}", file.display()))?;
    let ops: Vec<serde_json::Value> =
        serde_json::from_str(&text).context("expected a JSON array of operations")?;
    client::validate_ops(&ops)?;

    let mut client = client::RoomClient::connect(server).await?;
    client.join(name).await?;

    let count = ops.len();
    client.draw(ops).await?;
    client.close().await?;

    println!("Sent {} ops", count);
    Ok(())
}

async fn run_simple(server: &str, name: Option<String>, action: Action) -> Result<()> {
    let mut client = client::RoomClient::connect(server).await?;
    client.join(name).await?;

    match action {
        Action::Undo => client.undo().await?,
        Action::Clear => client.clear().await?,
    }
    client.close().await
}

async fn run_info(server: &str, name: Option<String>) -> Result<()> {
    let mut client = client::RoomClient::connect(server).await?;
    let welcome = client.join(name).await?;

    println!("Room members ({}):", welcome.user_count);
    println!("{:─<60}", "");
    for participant in &welcome.participants {
        let marker = if participant.id == welcome.self_id { " (you)" } else { "" };
        println!(
            "  {} {}{} - joined {}",
            participant.color,
            participant.name,
            marker,
            participant.joined_at.format("%H:%M:%S")
        );
    }
    println!("History: {} ops", welcome.history_len);

    client.close().await
}
