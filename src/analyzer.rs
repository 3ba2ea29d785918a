//! Semantic analysis through a locally-hosted model server.
//!
//! Talks to an OpenAI-compatible `/chat/completions` endpoint (LM Studio,
//! llama.cpp server, ...). Calls are blocking: the pipeline is deliberately
//! sequential, one model request in flight at a time.

use crate::components::{FilenameComponents, parse_model_response};
use crate::config::ServerConfig;
use crate::error::{Error, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, trace};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const PING_TIMEOUT: Duration = Duration::from_secs(5);

/// Produces [`FilenameComponents`] from file content.
///
/// The trait is the seam between the rename planner and the model backend;
/// tests substitute a canned implementation.
pub trait ComponentAnalyzer {
    /// Analyzes extracted text content.
    ///
    /// # Errors
    ///
    /// Returns a recoverable error when the backend is unreachable or its
    /// reply cannot be parsed.
    fn analyze_text(&self, content: &str, instruction: &str) -> Result<FilenameComponents>;

    /// Analyzes an image file via the vision model.
    ///
    /// # Errors
    ///
    /// Returns a recoverable error when the file cannot be read, the backend
    /// is unreachable, or its reply cannot be parsed.
    fn analyze_image(&self, path: &Path, instruction: &str) -> Result<FilenameComponents>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: MessageContent,
}

#[derive(Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Serialize)]
struct ContentPart {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<ImageUrl>,
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct ModelList {
    data: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    id: String,
}

/// Client for a local OpenAI-compatible model server.
pub struct LmClient {
    http: reqwest::blocking::Client,
    base_url: String,
    text_model: String,
    vision_model: String,
    temperature: f32,
    max_tokens: u32,
}

impl LmClient {
    /// Creates a client from the server configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(server: &ServerConfig) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: server.base_url.trim_end_matches('/').to_string(),
            text_model: server.text_model.clone(),
            vision_model: server.vision_model.clone(),
            temperature: server.temperature,
            max_tokens: server.max_tokens,
        })
    }

    /// Checks that the model server is reachable, returning the ids of the
    /// models it advertises.
    ///
    /// # Errors
    ///
    /// Returns an error when the server does not answer within a short
    /// timeout or responds with a non-success status.
    pub fn ping(&self) -> Result<Vec<String>> {
        let response = self
            .http
            .get(format!("{}/models", self.base_url))
            .timeout(PING_TIMEOUT)
            .send()?;

        if !response.status().is_success() {
            return Err(Error::analysis(format!(
                "model server returned status {}",
                response.status()
            )));
        }

        let models: ModelList = response.json()?;
        Ok(models.data.into_iter().map(|m| m.id).collect())
    }

    /// Sends a chat request and returns the first choice's content.
    fn complete(&self, model: &str, messages: Vec<ChatMessage>) -> Result<String> {
        let request = ChatRequest {
            model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        trace!("Requesting completion from {}", model);
        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .json(&request)
            .send()?;

        if !response.status().is_success() {
            return Err(Error::analysis(format!(
                "model server returned status {}",
                response.status()
            )));
        }

        let body: ChatResponse = response.json()?;
        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| Error::analysis("model response contained no choices"))
    }
}

impl ComponentAnalyzer for LmClient {
    fn analyze_text(&self, content: &str, instruction: &str) -> Result<FilenameComponents> {
        let messages = vec![
            ChatMessage {
                role: "system",
                content: MessageContent::Text(instruction.to_string()),
            },
            ChatMessage {
                role: "user",
                content: MessageContent::Text(content.to_string()),
            },
        ];

        let reply = self.complete(&self.text_model, messages)?;
        debug!("Text analysis reply: {} bytes", reply.len());
        parse_model_response(&reply)
    }

    fn analyze_image(&self, path: &Path, instruction: &str) -> Result<FilenameComponents> {
        let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
        let encoded = BASE64.encode(&bytes);
        let data_url = format!("data:{};base64,{}", image_mime_type(path), encoded);

        let messages = vec![ChatMessage {
            role: "user",
            content: MessageContent::Parts(vec![
                ContentPart {
                    kind: "text",
                    text: Some(instruction.to_string()),
                    image_url: None,
                },
                ContentPart {
                    kind: "image_url",
                    text: None,
                    image_url: Some(ImageUrl { url: data_url }),
                },
            ]),
        }];

        let reply = self.complete(&self.vision_model, messages)?;
        debug!("Image analysis reply: {} bytes", reply.len());
        parse_model_response(&reply)
    }
}

/// MIME type for an image file, by extension.
fn image_mime_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("tiff") => "image/tiff",
        // jpg, jpeg, heic and anything else is sent as JPEG, matching what
        // vision backends commonly accept as a default.
        _ => "image/jpeg",
    }
}
