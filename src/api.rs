//! HTTP endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::room::RoomSummary;
use crate::AppState;

pub async fn health() -> &'static str {
    "ok"
}

/// Current population, history length and screen-share owner of a room
pub async fn room_summary(
    Path(room_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<RoomSummary>> {
    let room = state
        .rooms
        .get(&room_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("room {}", room_id)))?;

    Ok(Json(room.summary().await))
}
