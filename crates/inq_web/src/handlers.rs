use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use inq_core::{ChatHistory, ChatTurn, SourceRef};
use crate::AppState;

const DEFAULT_SESSION: &str = "default";

/// Upstream failures surface as 502 with the error text in the body.
pub struct ApiError(inq_core::Error);

impl From<inq_core::Error> for ApiError {
    fn from(e: inq_core::Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self.0);
        (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

#[derive(Deserialize)]
pub struct AskRequest {
    pub question: String,
    pub session_id: Option<String>,
}

#[derive(Serialize)]
pub struct AskResponse {
    pub session_id: String,
    pub answer: String,
    pub sources: Vec<SourceRef>,
}

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn ask(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let session_id = request
        .session_id
        .unwrap_or_else(|| DEFAULT_SESSION.to_string());

    // Answer against a snapshot of the history so the sessions map is not
    // held locked across the hosted-API round trips.
    let history = {
        let sessions = state.sessions.read().await;
        sessions.get(&session_id).cloned().unwrap_or_default()
    };

    let answer = state.engine.ask(&request.question, &history).await?;

    {
        let mut sessions = state.sessions.write().await;
        sessions
            .entry(session_id.clone())
            .or_insert_with(ChatHistory::new)
            .push(request.question, &answer);
    }

    Ok(Json(AskResponse {
        session_id,
        answer: answer.text,
        sources: answer.sources,
    }))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Json<Vec<ChatTurn>> {
    let sessions = state.sessions.read().await;
    Json(
        sessions
            .get(&id)
            .map(|h| h.turns().to_vec())
            .unwrap_or_default(),
    )
}

pub async fn clear_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> StatusCode {
    let mut sessions = state.sessions.write().await;
    sessions.remove(&id);
    StatusCode::NO_CONTENT
}
