//! OpenAI-compatible chat completions generator.
//!
//! Sends each prompt as a single user message. Supports the public OpenAI
//! API and Azure OpenAI deployments, which differ only in URL layout and
//! authentication header.

use crate::config::{FileGeneratorConfig, GeneratorProvider};
use async_trait::async_trait;
use ragloop_application::ports::text_generator::{GenerationError, TextGenerator};
use ragloop_domain::core::string::truncate_str;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Where chat completion requests go and how they are authenticated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEndpoint {
    /// `{base_url}/v1/chat/completions` with `Authorization: Bearer`
    OpenAi { base_url: String },
    /// `{endpoint}/openai/deployments/{deployment}/chat/completions` with `api-key`
    Azure {
        endpoint: String,
        deployment: String,
        api_version: String,
    },
}

impl ChatEndpoint {
    pub fn url(&self) -> String {
        match self {
            ChatEndpoint::OpenAi { base_url } => {
                format!("{}/v1/chat/completions", base_url.trim_end_matches('/'))
            }
            ChatEndpoint::Azure {
                endpoint,
                deployment,
                api_version,
            } => format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                endpoint.trim_end_matches('/'),
                deployment,
                api_version
            ),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Extract `choices[0].message.content` from a chat completions body
pub fn parse_chat_response(body: &str) -> Result<String, GenerationError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::InvalidResponse(format!("malformed body: {}", e)))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| GenerationError::InvalidResponse("response has no message content".into()))
}

fn map_transport_error(e: reqwest::Error) -> GenerationError {
    if e.is_timeout() {
        GenerationError::Timeout
    } else if e.is_connect() {
        GenerationError::Connection(e.to_string())
    } else {
        GenerationError::RequestFailed(e.to_string())
    }
}

/// [`TextGenerator`] backed by a chat completions endpoint
pub struct OpenAiChatGenerator {
    client: reqwest::Client,
    endpoint: ChatEndpoint,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl OpenAiChatGenerator {
    pub fn new(
        endpoint: ChatEndpoint,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::Other(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.into(),
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
        })
    }

    /// Build from the `[generator]` section, resolving key and endpoint.
    pub fn from_config(config: &FileGeneratorConfig) -> Result<Self, GenerationError> {
        let api_key = config
            .resolve_api_key()
            .ok_or_else(|| GenerationError::MissingApiKey(config.api_key_env().to_string()))?;

        let endpoint = match config.parse_provider().0 {
            GeneratorProvider::OpenAi => ChatEndpoint::OpenAi {
                base_url: config.openai.base_url.clone(),
            },
            GeneratorProvider::Azure => ChatEndpoint::Azure {
                endpoint: config.azure.resolve_endpoint().ok_or_else(|| {
                    GenerationError::Other(format!(
                        "Azure endpoint missing: set generator.azure.endpoint or {}",
                        config.azure.endpoint_env
                    ))
                })?,
                deployment: config.azure.deployment.clone(),
                api_version: config.azure.api_version.clone(),
            },
        };

        Ok(Self::new(
            endpoint,
            api_key,
            config.model.clone(),
            Duration::from_secs(config.timeout_seconds),
        )?
        .with_temperature(config.temperature)
        .with_max_tokens(config.max_tokens))
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn endpoint(&self) -> &ChatEndpoint {
        &self.endpoint
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        // Azure routes by deployment; the model field is ignored there.
        let model = match self.endpoint {
            ChatEndpoint::OpenAi { .. } => Some(self.model.as_str()),
            ChatEndpoint::Azure { .. } => None,
        };
        ChatRequest {
            model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiChatGenerator {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        debug!(
            "Sending {} byte prompt to {} ({})",
            prompt.len(),
            self.model,
            self.endpoint.url()
        );

        let request = self.client.post(self.endpoint.url());
        let request = match self.endpoint {
            ChatEndpoint::OpenAi { .. } => {
                request.header("Authorization", format!("Bearer {}", self.api_key))
            }
            ChatEndpoint::Azure { .. } => request.header("api-key", &self.api_key),
        };

        let response = request
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_transport_error)?;

        if !status.is_success() {
            return Err(GenerationError::RequestFailed(format!(
                "HTTP {}: {}",
                status.as_u16(),
                truncate_str(&body, 300)
            )));
        }

        let text = parse_chat_response(&body)?;
        info!("Received {} chars from {}", text.chars().count(), self.model);
        Ok(text)
    }
}
