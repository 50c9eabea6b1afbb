//! `obsixiv chat`: question answering over one PDF.

use std::path::Path;

use agent::paper::{CLIENT_TEXT_BUDGET, truncate_chars};
use agent::relay::{ChatBody, ExtractPdfBody, RelayClient};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::CliError;
use crate::generate::{display_name, read_pdf};

const EXIT_WORDS: [&str; 2] = ["exit", "quit"];

/// A loaded paper plus the relay session used to ask about it.
pub struct ChatSession {
    relay: RelayClient,
    api_key: String,
    content: String,
    temperature: f64,
}

impl ChatSession {
    /// Extract `pdf` through the relay and keep the first
    /// [`CLIENT_TEXT_BUDGET`] characters as the chat context.
    ///
    /// # Errors
    ///
    /// Missing API key, unreadable input, and relay failures.
    pub async fn load(relay: RelayClient, api_key: impl Into<String>, pdf: &Path, temperature: f64) -> Result<Self, CliError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(CliError::MissingApiKey);
        }
        let bytes = read_pdf(pdf).await?;
        let body = ExtractPdfBody { pdf_base64: STANDARD.encode(bytes), filename: display_name(pdf) };
        let text = relay.extract_pdf(&body).await?;
        let (content, _) = truncate_chars(&text, CLIENT_TEXT_BUDGET);
        Ok(Self { content: content.to_string(), relay, api_key, temperature })
    }

    /// # Errors
    ///
    /// Relay failures.
    pub async fn ask(&self, question: &str) -> Result<String, CliError> {
        let body = ChatBody {
            pdf_content: self.content.clone(),
            question: question.to_string(),
            temperature: self.temperature,
        };
        Ok(self.relay.chat(&self.api_key, &body).await?)
    }

    /// Read questions line by line until EOF or `exit`. Relay errors are
    /// printed and the loop keeps going.
    ///
    /// # Errors
    ///
    /// Only I/O failures on `input` or `output`.
    pub async fn repl<R, W>(&self, input: R, mut output: W) -> std::io::Result<usize>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        let mut answered = 0;
        loop {
            output.write_all(b"> ").await?;
            output.flush().await?;
            let Some(line) = lines.next_line().await? else { break };
            let question = line.trim();
            if question.is_empty() {
                continue;
            }
            if EXIT_WORDS.iter().any(|w| question.eq_ignore_ascii_case(w)) {
                break;
            }
            let reply = match self.ask(question).await {
                Ok(answer) => {
                    answered += 1;
                    answer
                }
                Err(e) => format!("Chat error: {e}"),
            };
            output.write_all(format!("{reply}\n\n").as_bytes()).await?;
        }
        output.flush().await?;
        Ok(answered)
    }
}
