//! Server configuration from flags and environment

use clap::Parser;
use std::net::SocketAddr;

#[derive(Debug, Clone, Parser)]
#[command(name = "sketchroom")]
#[command(about = "Real-time shared whiteboard relay with WebRTC signaling")]
#[command(version)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "SKETCHROOM_BIND", default_value = "0.0.0.0:3000")]
    pub bind: SocketAddr,

    /// Room that WebSocket clients join
    #[arg(long, env = "SKETCHROOM_ROOM", default_value = "main")]
    pub room: String,

    /// Cursor frames buffered per connection before new ones are dropped
    #[arg(long, env = "SKETCHROOM_CURSOR_QUEUE_DEPTH", default_value_t = 32)]
    pub cursor_queue_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 3000)),
            room: "main".to_string(),
            cursor_queue_depth: 32,
        }
    }
}
