//! `BoardroomServer` builder and server loop.
//!
//! This is the entry point for running a Boardroom server. It ties
//! together all the layers: transport → protocol → game.

use std::net::SocketAddr;
use std::sync::Arc;

use boardroom_game::{Matchmaker, SessionRegistry};
use boardroom_protocol::{Codec, JsonCodec};
use boardroom_transport::{Transport, WebSocketTransport};

use crate::BoardroomError;
use crate::handler::handle_connection;

/// Port used when none is configured.
pub const DEFAULT_PORT: u16 = 10101;

/// Default capacity of each session's move queue.
const DEFAULT_MOVE_BUFFER: usize = 64;

/// Shared server state passed to each connection handler task.
///
/// The matchmaker and registry lock internally, so the state itself is
/// shared behind a plain `Arc`.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) matchmaker: Matchmaker,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a Boardroom server.
///
/// # Example
///
/// ```rust,no_run
/// use boardroom::prelude::*;
///
/// # async fn start() -> Result<(), BoardroomError> {
/// let server = BoardroomServer::builder()
///     .bind("0.0.0.0:10101")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct BoardroomServerBuilder {
    bind_addr: String,
    move_buffer: usize,
}

impl BoardroomServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: format!("127.0.0.1:{DEFAULT_PORT}"),
            move_buffer: DEFAULT_MOVE_BUFFER,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets how many moves may queue up for one session.
    pub fn move_buffer(mut self, size: usize) -> Self {
        self.move_buffer = size;
        self
    }

    /// Binds the listener and prepares the server.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<BoardroomServer, BoardroomError> {
        if self.move_buffer == 0 {
            return Err(BoardroomError::Config(
                "move buffer must hold at least one move".into(),
            ));
        }

        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let registry = Arc::new(SessionRegistry::new());
        let matchmaker =
            Matchmaker::new(Arc::clone(&registry)).with_move_buffer(self.move_buffer);
        let state = Arc::new(ServerState {
            matchmaker,
            codec: JsonCodec,
        });

        Ok(BoardroomServer {
            transport,
            registry,
            state,
        })
    }
}

impl Default for BoardroomServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Boardroom server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct BoardroomServer {
    transport: WebSocketTransport,
    registry: Arc<SessionRegistry>,
    state: Arc<ServerState<JsonCodec>>,
}

impl BoardroomServer {
    /// Creates a new builder.
    pub fn builder() -> BoardroomServerBuilder {
        BoardroomServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, BoardroomError> {
        Ok(self.transport.local_addr()?)
    }

    /// Returns the registry of live sessions.
    pub fn registry(&self) -> Arc<SessionRegistry> {
        Arc::clone(&self.registry)
    }

    /// Runs the server accept loop.
    ///
    /// Spawns a handler task for each accepted connection. A failed
    /// accept is logged and the loop keeps going. Runs until the task is
    /// dropped or the process is terminated.
    pub async fn run(mut self) -> Result<(), BoardroomError> {
        tracing::info!("Boardroom server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}

/// Serves games on `0.0.0.0:<port>` until the process ends.
///
/// # Errors
/// Port `0` is rejected with [`BoardroomError::Config`]; a port that
/// cannot be bound surfaces as [`BoardroomError::Transport`].
pub async fn serve(port: u16) -> Result<(), BoardroomError> {
    if port == 0 {
        return Err(BoardroomError::Config("no port specified".into()));
    }

    let server = BoardroomServer::builder()
        .bind(&format!("0.0.0.0:{port}"))
        .build()
        .await?;
    server.run().await
}
