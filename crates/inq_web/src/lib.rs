use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use inq_core::Result;

pub mod handlers;
pub mod state;

pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/ask", post(handlers::ask))
        .route("/api/sessions/:id", get(handlers::get_session))
        .route("/api/sessions/:id", delete(handlers::clear_session))
        .layer(cors)
        .with_state(Arc::new(state))
}

pub async fn serve(state: AppState, port: u16) -> Result<()> {
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("🌐 Chat API listening on port {}", port);
    axum::serve(listener, app)
        .await
        .map_err(|e| inq_core::Error::Io(e))?;
    Ok(())
}

pub mod prelude {
    pub use super::{create_app, AppState};
    pub use inq_core::{Answer, ChatHistory, Result};
}
