//! Process configuration, read once at startup.

use clap::Parser;

/// Command-line and environment configuration for the relay binary.
#[derive(Debug, Clone, Parser)]
#[command(name = "seatrelay", version, about = "Ephemeral game-room relay server")]
pub struct ServerConfig {
    /// Interface to listen on.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,
}

impl ServerConfig {
    /// The `host:port` string handed to the server builder.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
