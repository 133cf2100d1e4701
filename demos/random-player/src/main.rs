//! A bot that joins a Boardroom game and plays random moves.
//!
//! Start a server, then run two of these (or one plus a browser client):
//!
//! ```text
//! cargo run -p boardroom
//! cargo run -p random-player -- --delay-ms 500
//! ```

use std::time::Duration;

use boardroom_protocol::{BoardSnapshot, Cell, ClientEvent, Codec, Coord, JsonCodec, ServerEvent};
use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use rand::seq::IndexedRandom;
use tokio_tungstenite::tungstenite::Message;
use tracing_subscriber::EnvFilter;

/// Joins a game and plays a random empty cell on every turn
#[derive(Parser, Debug)]
#[command(name = "random-player")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Server WebSocket URL
    #[arg(long, default_value = "ws://127.0.0.1:10101")]
    url: String,

    /// Milliseconds to wait before each move
    #[arg(long, default_value_t = 3000)]
    delay_ms: u64,
}

/// Picks a random empty cell as `(x, y)`.
///
/// Only empty cells are candidates: the server stays silent on an illegal
/// move, so a bot that guessed an occupied cell would wait forever.
fn pick_move(board: &BoardSnapshot) -> Option<(usize, usize)> {
    let empty: Vec<(usize, usize)> = board
        .iter()
        .enumerate()
        .flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, cell)| **cell == Cell::Empty)
                .map(move |(x, _)| (x, y))
        })
        .collect();
    empty.choose(&mut rand::rng()).copied()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let delay = Duration::from_millis(cli.delay_ms);
    let codec = JsonCodec;

    let (ws, _) = tokio_tungstenite::connect_async(cli.url.as_str()).await?;
    let (mut sink, mut stream) = ws.split();
    tracing::info!(url = %cli.url, "connected, waiting for an opponent");

    let mut board: BoardSnapshot = Vec::new();

    while let Some(msg) = stream.next().await {
        let text = match msg? {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };

        let event: ServerEvent = match codec.decode(text.as_bytes()) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(error = %e, "unexpected frame from server");
                continue;
            }
        };

        match event {
            ServerEvent::GameStart => tracing::info!("game start"),
            ServerEvent::Board(snapshot) => {
                tracing::info!(board = ?snapshot, "board");
                board = snapshot;
            }
            ServerEvent::TurnStart(seat) => {
                tokio::time::sleep(delay).await;
                let Some((x, y)) = pick_move(&board) else {
                    continue;
                };
                tracing::info!(%seat, x, y, "playing");
                let frame = codec.encode(&ClientEvent::Move(Coord::from(x), Coord::from(y)))?;
                sink.send(Message::Text(String::from_utf8(frame)?.into()))
                    .await?;
            }
            ServerEvent::TurnEnd(_) => {}
            ServerEvent::GameEnd(outcome) => {
                tracing::info!(%outcome, "game end");
                break;
            }
        }
    }

    let _ = sink.close().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use boardroom_protocol::Seat;

    use super::*;

    #[test]
    fn test_pick_move_only_returns_empty_cells() {
        let mut board = vec![vec![Cell::Occupied(Seat(0)); 3]; 3];
        assert_eq!(pick_move(&board), None);

        board[2][1] = Cell::Empty;
        for _ in 0..10 {
            assert_eq!(pick_move(&board), Some((1, 2)));
        }
    }

    #[test]
    fn test_pick_move_on_empty_board_stays_in_range() {
        let board = vec![vec![Cell::Empty; 3]; 3];
        let (x, y) = pick_move(&board).unwrap();
        assert!(x < 3 && y < 3);
    }
}
