// App state for Axum server
use std::sync::Arc;
use votes_engine::PostVoting;

#[derive(Clone)]
pub struct AppState {
    pub voting: Arc<dyn PostVoting>,
}
