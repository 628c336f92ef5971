//! HTTP request handlers

use super::error::{ApiError, ApiResult};
use crate::output::console::AnswerView;
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::{get, post},
};
use ragloop_application::{AnswerQuestionInput, AnswerQuestionUseCase};
use ragloop_domain::core::string::truncate_str;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

/// Shared application state
///
/// One answer loop, and therefore one conversation, is shared by every
/// client of the server.
#[derive(Clone)]
pub struct AppState {
    pub use_case: Arc<AnswerQuestionUseCase>,
}

impl AppState {
    pub fn new(use_case: Arc<AnswerQuestionUseCase>) -> Self {
        Self { use_case }
    }
}

/// Body of `POST /ask`
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: Option<String>,
}

/// POST /ask
pub async fn ask(
    State(state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> ApiResult<Json<AnswerView>> {
    let question = match payload {
        Ok(Json(AskRequest {
            question: Some(question),
        })) if !question.trim().is_empty() => question,
        Ok(_) => {
            warn!("Empty question received");
            return Err(ApiError::no_question());
        }
        Err(rejection) => {
            warn!("Unreadable /ask body: {}", rejection.body_text());
            return Err(ApiError::no_question());
        }
    };

    info!("Received question: '{}'", truncate_str(&question, 200));

    let result = state
        .use_case
        .execute(AnswerQuestionInput::new(question))
        .await?;

    info!(
        "Successfully processed question, returned answer with {} sources",
        result.source_count
    );
    Ok(Json(AnswerView::from(&result)))
}

/// POST /clear
pub async fn clear_history(State(state): State<AppState>) -> Json<Value> {
    info!("Clear history requested");
    state.use_case.clear_history();
    Json(json!({ "status": "success", "message": "History cleared" }))
}

/// GET /health
pub async fn health_check() -> Json<Value> {
    debug!("Health check requested");
    Json(json!({ "status": "healthy", "agent": "ready" }))
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/ask", post(ask))
        .route("/clear", post(clear_history))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
