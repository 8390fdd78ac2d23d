//! Completion-API boundary.
//!
//! The codec never talks to the network itself; it hands a finished
//! transcript to a `CompletionClient` and gets raw reply text back. The
//! HTTP implementation lives in `client`; tests substitute a mock.

pub mod client;

pub use client::{HttpCompletionClient, MockCompletionClient};

use thiserror::Error;

use crate::models::TranscriptEntry;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Cannot reach completion endpoint at {0}")]
    Connection(String),

    #[error("Completion request timed out after {0}s")]
    Timeout(u64),

    #[error("Completion API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse completion response: {0}")]
    ResponseParsing(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

/// Abstraction over the completion call so the chat loop can be tested
/// without a network.
pub trait CompletionClient {
    fn complete(&self, transcript: &[TranscriptEntry]) -> Result<String, LlmError>;
}
