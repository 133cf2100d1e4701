//! `boardroom` binary: runs the game server.

use boardroom::{BoardroomError, BoardroomServer, DEFAULT_PORT};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Two-player turn-based board game server over WebSocket
#[derive(Parser, Debug)]
#[command(name = "boardroom")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Host to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// How many moves may queue up for one session
    #[arg(long, default_value_t = 64)]
    move_buffer: usize,
}

#[tokio::main]
async fn main() -> Result<(), BoardroomError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let server = BoardroomServer::builder()
        .bind(&format!("{}:{}", cli.host, cli.port))
        .move_buffer(cli.move_buffer)
        .build()
        .await?;
    tracing::info!(addr = %server.local_addr()?, "listening for players");

    tokio::select! {
        result = server.run() => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
            Ok(())
        }
    }
}
