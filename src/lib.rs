//! Sketchroom server - real-time shared whiteboard relay with WebRTC signaling

pub mod api;
pub mod config;
pub mod error;
pub mod protocol;
pub mod room;
pub mod router;
pub mod signaling;
pub mod websocket;

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::config::Config;
use crate::room::RoomManager;

/// Application state shared across handlers
pub struct AppState {
    pub rooms: RoomManager,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Arc<Self> {
        Arc::new(Self {
            rooms: RoomManager::new(),
            config,
        })
    }
}

/// Routes without middleware layers
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/ws", get(websocket::handler))
        .route("/rooms/:room_id", get(api::room_summary))
        .with_state(state)
}
