//! PDF text extraction for `POST /api/v1/extract-pdf`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("invalid base64 payload: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error("empty PDF payload")]
    Empty,
    #[error("{0}")]
    Pdf(String),
    #[error("extraction task failed: {0}")]
    Join(String),
}

/// Decode a base64 PDF and pull out its text.
///
/// Parsing is CPU-bound and runs on the blocking pool.
///
/// # Errors
///
/// Bad base64, an empty payload, or a document the PDF reader rejects.
pub async fn extract_base64(pdf_base64: &str) -> Result<String, ExtractError> {
    let bytes = decode(pdf_base64)?;
    let size = bytes.len();
    let text = tokio::task::spawn_blocking(move || extract_text(&bytes))
        .await
        .map_err(|e| ExtractError::Join(e.to_string()))??;
    tracing::info!(bytes = size, chars = text.chars().count(), "pdf text extracted");
    Ok(text)
}

fn decode(pdf_base64: &str) -> Result<Vec<u8>, ExtractError> {
    // Accept data URLs as sent by browser file readers.
    let payload = pdf_base64
        .split_once(";base64,")
        .map_or(pdf_base64, |(_, data)| data)
        .trim();
    let bytes = STANDARD.decode(payload)?;
    if bytes.is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(bytes)
}

fn extract_text(bytes: &[u8]) -> Result<String, ExtractError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_rejects_bad_base64() {
        assert!(matches!(decode("not base64!!"), Err(ExtractError::Decode(_))));
    }

    #[test]
    fn decode_rejects_empty_payload() {
        assert!(matches!(decode(""), Err(ExtractError::Empty)));
    }

    #[test]
    fn decode_strips_data_url_prefix() {
        let encoded = STANDARD.encode(b"%PDF-1.4");
        let bytes = decode(&format!("data:application/pdf;base64,{encoded}")).unwrap();
        assert_eq!(bytes, b"%PDF-1.4");
    }

    #[tokio::test]
    async fn non_pdf_bytes_fail_extraction() {
        let encoded = STANDARD.encode(b"definitely not a pdf document");
        assert!(extract_base64(&encoded).await.is_err());
    }
}
