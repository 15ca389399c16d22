//! Sketchroom server - real-time shared whiteboard relay with WebRTC signaling

use clap::Parser;
use sketchroom::config::Config;
use sketchroom::AppState;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sketchroom=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();
    let bind = config.bind;
    tracing::info!(room = %config.room, cursor_queue_depth = config.cursor_queue_depth, "Starting");

    let state = AppState::new(config);
    state.rooms.get_or_create(&state.config.room).await;

    // Build router
    let app = sketchroom::app(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
