use serde::{Deserialize, Serialize};

use super::{CompletionClient, LlmError};
use crate::models::TranscriptEntry;

/// OpenAI-compatible chat-completions client. Only the latest entry
/// carries an image reference (the encoder enforces this), so at most one
/// message per request uses the multi-part content form.
pub struct HttpCompletionClient {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl HttpCompletionClient {
    pub fn new(base_url: &str, api_key: &str, model: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        }
    }
}

/// Request body for POST /chat/completions
#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    stream: bool,
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    content: WireContent,
}

#[derive(Serialize)]
#[serde(untagged)]
enum WireContent {
    Text(String),
    Parts(Vec<WirePart>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WirePart {
    Text { text: String },
    ImageUrl { image_url: WireImageUrl },
}

#[derive(Serialize)]
struct WireImageUrl {
    url: String,
}

/// Response body from POST /chat/completions
#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: String,
}

fn wire_message(entry: &TranscriptEntry) -> WireMessage {
    let content = match &entry.image_ref {
        Some(url) => WireContent::Parts(vec![
            WirePart::Text {
                text: entry.text.clone(),
            },
            WirePart::ImageUrl {
                image_url: WireImageUrl { url: url.clone() },
            },
        ]),
        None => WireContent::Text(entry.text.clone()),
    };
    WireMessage {
        role: entry.role.as_str(),
        content,
    }
}

impl CompletionClient for HttpCompletionClient {
    fn complete(&self, transcript: &[TranscriptEntry]) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = CompletionRequest {
            model: &self.model,
            messages: transcript.iter().map(wire_message).collect(),
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    LlmError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    LlmError::Timeout(self.timeout_secs)
                } else {
                    LlmError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CompletionResponse = response
            .json()
            .map_err(|e| LlmError::ResponseParsing(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| LlmError::ResponseParsing("empty choices array".to_string()))
    }
}

/// Mock completion client for testing — returns a configurable reply and
/// records the transcript it was handed.
pub struct MockCompletionClient {
    reply: String,
    pub seen: std::sync::Mutex<Vec<Vec<TranscriptEntry>>>,
}

impl MockCompletionClient {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            seen: std::sync::Mutex::new(Vec::new()),
        }
    }
}

impl CompletionClient for MockCompletionClient {
    fn complete(&self, transcript: &[TranscriptEntry]) -> Result<String, LlmError> {
        self.seen
            .lock()
            .expect("mock lock poisoned")
            .push(transcript.to_vec());
        Ok(self.reply.clone())
    }
}
