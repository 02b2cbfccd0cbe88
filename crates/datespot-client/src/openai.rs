//! OpenAI chat completions client.
//!
//! Used by the enrichment stage to turn a short place description into a
//! one-line summary. The default model is `gpt-4o-mini`.
//!
//! # Examples
//!
//! ```no_run
//! use datespot_client::OpenAIClient;
//! use datespot_core::{GenerationRequest, SummaryGenerator};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenAIClient::new("sk-your-api-key")?;
//! let request = GenerationRequest {
//!     system: "You are a helpful assistant.".to_string(),
//!     user: "Summarize this place in one line.".to_string(),
//!     temperature: 0.7,
//!     max_tokens: 100,
//! };
//! let text = client.generate(&request).await?;
//! println!("{}", text);
//! # Ok(())
//! # }
//! ```

use datespot_core::error::{AppError, GenerationError};
use datespot_core::traits::{GenerationRequest, SummaryGenerator};
use datespot_core::{GenerationConfig, HttpConfig};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default chat completions endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// HTTP client for OpenAI's Chat Completions API.
///
/// Every call is a single attempt. Failures come back as
/// [`GenerationError`] and are turned into fallback text by the caller.
#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
    timeout_secs: u64,
}

/// Request body for the chat completions API
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Response from the chat completions API
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Error response from OpenAI API
#[derive(Deserialize)]
struct OpenAIError {
    error: OpenAIErrorDetail,
}

#[derive(Deserialize)]
struct OpenAIErrorDetail {
    message: String,
}

impl<'a> ChatRequest<'a> {
    fn new(model: &'a str, request: &'a GenerationRequest) -> Self {
        Self {
            model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

impl OpenAIClient {
    /// Creates a new OpenAI client with the specified API key.
    ///
    /// Uses the default model `gpt-4o-mini`.
    pub fn new(api_key: &str) -> Result<Self, AppError> {
        Self::with_model(api_key, &GenerationConfig::default().model)
    }

    /// Creates a new OpenAI client with a specific model.
    pub fn with_model(api_key: &str, model: &str) -> Result<Self, AppError> {
        Self::with_config(api_key, model, None)
    }

    /// Creates a new OpenAI client with full configuration.
    ///
    /// # Arguments
    ///
    /// * `api_key` - OpenAI API key
    /// * `model` - Model name
    /// * `endpoint` - Custom API endpoint (for Azure OpenAI or proxies)
    pub fn with_config(
        api_key: &str,
        model: &str,
        endpoint: Option<&str>,
    ) -> Result<Self, AppError> {
        if api_key.trim().is_empty() {
            return Err(AppError::ConfigError(
                "OpenAI API key must not be empty".to_string(),
            ));
        }

        let http_config = HttpConfig::default();
        let client = Client::builder()
            .timeout(http_config.timeout)
            .build()
            .map_err(|e| AppError::ClientError(e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            model: model.to_string(),
            endpoint: endpoint.unwrap_or(DEFAULT_ENDPOINT).to_string(),
            timeout_secs: http_config.timeout.as_secs(),
        })
    }

    /// Returns the model being used.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the endpoint requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends one chat completion request and returns the raw reply text.
    pub async fn complete(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let body = ChatRequest::new(&self.model, request);
        debug!(model = %self.model, endpoint = %self.endpoint, "Sending chat completion request");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout(self.timeout_secs)
                } else if e.is_connect() {
                    GenerationError::Network(format!("Cannot connect to OpenAI: {}", e))
                } else {
                    GenerationError::Client(e.to_string())
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), &error_text));
        }

        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                GenerationError::Timeout(self.timeout_secs)
            } else {
                GenerationError::Network(e.to_string())
            }
        })?;

        parse_reply(&text)
    }
}

/// Maps a non-success HTTP status to a typed error.
fn status_error(status_code: u16, body: &str) -> GenerationError {
    // Try to parse as structured OpenAI error
    let message = match serde_json::from_str::<OpenAIError>(body) {
        Ok(openai_error) => openai_error.error.message,
        Err(_) => body.to_string(),
    };

    match status_code {
        401 => GenerationError::Authentication(format!(
            "{}. Check your OPENAI_API_KEY.",
            message
        )),
        429 => GenerationError::RateLimited,
        _ => GenerationError::Api {
            status: status_code,
            message,
        },
    }
}

/// Extracts the first choice's message content from a response body.
fn parse_reply(body: &str) -> Result<String, GenerationError> {
    let response: ChatResponse = serde_json::from_str(body).map_err(|e| {
        GenerationError::MalformedResponse(format!("Failed to parse OpenAI response: {}", e))
    })?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or(GenerationError::EmptyResponse)
}

// =============================================================================
// Trait Implementation: SummaryGenerator
// =============================================================================

impl SummaryGenerator for OpenAIClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.complete(request).await
    }
}
