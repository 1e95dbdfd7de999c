use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::quiz::generator::{GenerateError, QuestionSource};
use crate::quiz::Question;

/// `source` is `None` when no API credential was configured at startup; the
/// server still runs and every generation request fails with a clear message.
#[derive(Clone)]
pub struct AppState {
    pub source: Option<Arc<dyn QuestionSource>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub questions: Vec<Question>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/generate-quiz", post(generate_quiz))
        .with_state(state)
}

async fn generate_quiz(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Response {
    let result = match &state.source {
        Some(source) => source.generate(&request.prompt).await,
        None => Err(GenerateError::MissingApiKey),
    };

    match result {
        Ok(questions) => (StatusCode::OK, Json(GenerateResponse { questions })).into_response(),
        Err(err) => {
            log::error!("quiz generation failed: {err}");
            let status = if err.is_auth_failure() {
                StatusCode::UNAUTHORIZED
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            let body = ErrorResponse {
                error: user_message(&err),
            };
            (status, Json(body)).into_response()
        }
    }
}

/// What the client gets to see. Raw completion text and upstream details stay
/// in the server logs.
fn user_message(err: &GenerateError) -> String {
    match err {
        GenerateError::MissingApiKey => "Missing OpenAI API key".to_string(),
        GenerateError::MalformedJson(_) | GenerateError::InvalidShape(_) => {
            "Failed to parse quiz. LLM response was not valid JSON.".to_string()
        }
        _ if err.is_auth_failure() => {
            "Invalid OpenAI API key. Check and replace it in your .env file.".to_string()
        }
        _ => "Unexpected error occurred. Check server logs.".to_string(),
    }
}
