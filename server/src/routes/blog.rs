//! Generation routes: `POST /api/v1/generate` and `POST /api/v1/chat`.

use agent::{GenerationRequest, LlmError, QuestionRequest};
use agent::relay::{ChatBody, ChatResponse, ErrorBody, GenerateBody, GenerateResponse};
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::api_key::ApiKey;
use crate::state::AppState;

const GENERATE_FAILED: &str = "Failed to generate blog post";
const CHAT_FAILED: &str = "Failed to answer question";

/// `POST /api/v1/generate`: paper text in, blog post out.
pub async fn generate(
    State(state): State<AppState>,
    ApiKey(api_key): ApiKey,
    body: Result<Json<GenerateBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return bad_body(GENERATE_FAILED, &rejection),
    };
    tracing::info!(
        chars = body.pdf_content.chars().count(),
        style = body.writing_style.name(),
        figures = body.extracted_images.len(),
        has_metadata = body.arxiv_metadata.is_some(),
        "generate request"
    );
    let request: GenerationRequest = body.into();
    match state.agent.generate_blog_post(&api_key, &request).await {
        Ok(blog_post) => Json(GenerateResponse { blog_post, success: true }).into_response(),
        Err(e) => llm_failure(GENERATE_FAILED, &e),
    }
}

/// `POST /api/v1/chat`: answer a question about a paper.
pub async fn chat(
    State(state): State<AppState>,
    ApiKey(api_key): ApiKey,
    body: Result<Json<ChatBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return bad_body(CHAT_FAILED, &rejection),
    };
    tracing::info!(question_chars = body.question.chars().count(), "chat request");
    let request: QuestionRequest = body.into();
    match state.agent.answer_question(&api_key, &request).await {
        Ok(answer) => Json(ChatResponse { answer, success: true }).into_response(),
        Err(e) => llm_failure(CHAT_FAILED, &e),
    }
}

pub(crate) fn llm_failure(context: &str, err: &LlmError) -> Response {
    tracing::warn!(code = err.error_code(), error = %err, "{context}");
    failure(format!("{context}: {err}"))
}

/// Undecodable bodies answer with the same envelope as agent failures.
fn bad_body(context: &str, rejection: &JsonRejection) -> Response {
    tracing::warn!(error = %rejection.body_text(), "{context}: bad request body");
    failure(format!("{context}: {}", rejection.body_text()))
}

fn failure(error: String) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody { error, success: false })).into_response()
}
