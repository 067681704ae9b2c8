// Server module - HTTP server setup and routing
pub mod handlers;
pub mod state;

use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use votes_engine::PostVoting;

use crate::config::create_cors_layer;
use crate::errors::ApiError;
use self::state::AppState;

/// Create the Axum application router with all routes and middleware
pub fn create_app(voting: Arc<dyn PostVoting>) -> Router {
    let state = AppState { voting };

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/posts/:post_id", get(handlers::get_post))
        .route("/api/post/:post_id/upvote", get(handlers::upvote))
        .route("/api/post/:post_id/downvote", get(handlers::downvote))
        .route("/api/post/:post_id/unvote", get(handlers::unvote))
        .layer(create_cors_layer())
        .with_state(state)
}

/// Run the server on the specified address until Ctrl-C
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), ApiError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);
    info!("- Vote endpoints: http://{}/api/post/{{id}}/upvote|downvote|unvote", addr);
    info!("- Health endpoint: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
