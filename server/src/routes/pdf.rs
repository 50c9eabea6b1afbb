//! `POST /api/v1/extract-pdf`.

use agent::relay::{ExtractPdfBody, ExtractPdfResponse};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;

use crate::pdf;

pub async fn extract_pdf(
    body: Result<Json<ExtractPdfBody>, JsonRejection>,
) -> (StatusCode, Json<ExtractPdfResponse>) {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "extract-pdf: bad request body");
            return failure(&rejection.body_text());
        }
    };
    tracing::info!(filename = %body.filename, "extract-pdf request");
    match pdf::extract_base64(&body.pdf_base64).await {
        Ok(text) => (StatusCode::OK, Json(ExtractPdfResponse { text, success: true, error: None })),
        Err(e) => {
            tracing::warn!(filename = %body.filename, error = %e, "pdf extraction failed");
            failure(&e.to_string())
        }
    }
}

fn failure(message: &str) -> (StatusCode, Json<ExtractPdfResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ExtractPdfResponse {
            text: String::new(),
            success: false,
            error: Some(format!("Failed to extract PDF text: {message}")),
        }),
    )
}
