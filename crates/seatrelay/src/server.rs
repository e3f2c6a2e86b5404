//! `RelayServer` builder and server loop.
//!
//! This is the entry point for running a Seatrelay server. It ties
//! together all the layers: transport → protocol → lobby → session.

use std::net::SocketAddr;
use std::sync::Arc;

use seatrelay_lobby::Lobby;
use seatrelay_protocol::{Codec, JsonCodec};
use seatrelay_transport::{Transport, WebSocketTransport};

use crate::RelayError;
use crate::handler::handle_connection;

/// Builder for configuring and starting a Seatrelay server.
///
/// # Example
///
/// ```rust,no_run
/// use seatrelay::prelude::*;
///
/// # async fn run() -> Result<(), RelayError> {
/// let server = RelayServer::builder()
///     .bind("0.0.0.0:8080")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct RelayServerBuilder<C = JsonCodec> {
    bind_addr: String,
    codec: C,
}

impl RelayServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            codec: JsonCodec,
        }
    }
}

impl<C: Codec> RelayServerBuilder<C> {
    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }

    /// Replaces the frame codec.
    pub fn codec<D: Codec>(self, codec: D) -> RelayServerBuilder<D> {
        RelayServerBuilder {
            bind_addr: self.bind_addr,
            codec,
        }
    }

    /// Binds the listener. The server accepts nothing until
    /// [`RelayServer::run`] is called.
    pub async fn build(self) -> Result<RelayServer<C>, RelayError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        Ok(RelayServer {
            transport,
            lobby: Arc::new(Lobby::new()),
            codec: Arc::new(self.codec),
        })
    }
}

impl Default for RelayServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Seatrelay server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct RelayServer<C = JsonCodec> {
    transport: WebSocketTransport,
    lobby: Arc<Lobby>,
    codec: Arc<C>,
}

impl RelayServer {
    /// Creates a new builder.
    pub fn builder() -> RelayServerBuilder {
        RelayServerBuilder::new()
    }
}

impl<C: Codec> RelayServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, RelayError> {
        Ok(self.transport.local_addr()?)
    }

    /// A handle on the server's lobby, for diagnostics.
    pub fn lobby(&self) -> Arc<Lobby> {
        Arc::clone(&self.lobby)
    }

    /// Runs the server accept loop.
    ///
    /// Spawns a handler task for each accepted connection. A failed
    /// accept is logged and the loop keeps going. Runs until the process
    /// is terminated.
    pub async fn run(mut self) -> Result<(), RelayError> {
        tracing::info!(addr = %self.local_addr()?, "seatrelay server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let lobby = Arc::clone(&self.lobby);
                    let codec = Arc::clone(&self.codec);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, lobby, codec).await {
                            tracing::debug!(error = %e, "connection ended with error");
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
