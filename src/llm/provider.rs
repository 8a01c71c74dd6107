use std::env;
use std::fmt;
use std::str::FromStr;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::llm::chat_runtime::{Auth, RequestFailure, RetryConfig, send_chat_request_with_retry};
use crate::llm::models::{CLAUDE_THREE_OPUS_MODEL, GPT_FOUR_TURBO_MODEL, SONAR_SMALL_ONLINE_MODEL};
use crate::llm::{anthropic, openai, perplexity};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Openai,
    Anthropic,
    Perplexity,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Self::Openai, Self::Anthropic, Self::Perplexity];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Openai => "openai",
            Self::Anthropic => "anthropic",
            Self::Perplexity => "perplexity",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Self::Openai => GPT_FOUR_TURBO_MODEL,
            Self::Anthropic => CLAUDE_THREE_OPUS_MODEL,
            Self::Perplexity => SONAR_SMALL_ONLINE_MODEL,
        }
    }

    pub fn supported_values() -> String {
        Self::ALL
            .iter()
            .map(|provider| provider.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|provider| provider.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "Invalid provider '{raw}'. Supported values: {}.",
                    Self::supported_values()
                )
            })
    }
}

pub fn endpoint(provider: Provider) -> &'static str {
    match provider {
        Provider::Openai => "https://api.openai.com/v1/chat/completions",
        Provider::Anthropic => "https://api.anthropic.com/v1/messages",
        Provider::Perplexity => "https://api.perplexity.ai/chat/completions",
    }
}

pub fn api_key_env(provider: Provider) -> &'static str {
    match provider {
        Provider::Openai => "OPENAI_API_KEY",
        Provider::Anthropic => "ANTHROPIC_API_KEY",
        Provider::Perplexity => "PERPLEXITY_API_TOKEN",
    }
}

pub fn is_api_key_present(provider: Provider) -> bool {
    env::var(api_key_env(provider))
        .ok()
        .is_some_and(|value| !value.trim().is_empty())
}

/// Prompt text with optional raw image buffers.
#[derive(Debug, Clone, Default)]
pub struct Prompt {
    pub text: String,
    pub images: Vec<Vec<u8>>,
}

impl Prompt {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            images: Vec::new(),
        }
    }

    pub fn with_images(mut self, images: Vec<Vec<u8>>) -> Self {
        self.images = images;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("role".to_string(), Value::String(self.role.clone()));
        map.insert("content".to_string(), Value::String(self.content.clone()));
        Value::Object(map)
    }
}

#[derive(Debug, Clone)]
pub struct AskOptions {
    pub system: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for AskOptions {
    fn default() -> Self {
        Self {
            system: None,
            temperature: None,
            max_tokens: None,
            timeout_secs: None,
            retries: 0,
            retry_delay_ms: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Usage {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct AskResponse {
    pub content: String,
    pub usage: Option<Usage>,
    /// Source URLs; only Perplexity fills these.
    pub citations: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{key_env} is not set in the environment")]
    MissingApiKey {
        provider: Provider,
        key_env: &'static str,
    },
    #[error("{provider} request failed: {source}")]
    Request {
        provider: Provider,
        source: reqwest::Error,
    },
    #[error("{provider} API error {status}: {body}")]
    Api {
        provider: Provider,
        status: StatusCode,
        body: String,
    },
    #[error("{provider} response body is not valid JSON: {source}")]
    Decode {
        provider: Provider,
        source: reqwest::Error,
    },
    #[error("{provider} does not accept image input")]
    ImagesUnsupported { provider: Provider },
    #[error("image #{index} is not usable: {reason}")]
    InvalidImage { index: usize, reason: String },
}

pub fn ask(
    provider: Provider,
    prompt: &Prompt,
    model: &str,
    options: AskOptions,
) -> Result<AskResponse, ProviderError> {
    match provider {
        Provider::Openai => openai::ask(prompt, model, options),
        Provider::Anthropic => anthropic::ask(prompt, model, options),
        Provider::Perplexity => perplexity::ask(prompt, model, options),
    }
}

/// Builds the JSON body `ask` would send, without touching the network.
pub fn build_request(
    provider: Provider,
    prompt: &Prompt,
    model: &str,
    options: &AskOptions,
) -> Result<Value, ProviderError> {
    match provider {
        Provider::Openai => openai::build_request(prompt, model, options),
        Provider::Anthropic => anthropic::build_request(prompt, model, options),
        Provider::Perplexity => perplexity::build_request(prompt, model, options),
    }
}

/// Sends `payload` to the provider endpoint and returns the decoded JSON body.
pub(crate) fn send(
    provider: Provider,
    payload: &Value,
    options: &AskOptions,
) -> Result<Value, ProviderError> {
    let key_env = api_key_env(provider);
    let api_key =
        env::var(key_env).map_err(|_| ProviderError::MissingApiKey { key_env, provider })?;

    send_to(endpoint(provider), provider, &api_key, payload, options)
}

pub(crate) fn send_to(
    url: &str,
    provider: Provider,
    api_key: &str,
    payload: &Value,
    options: &AskOptions,
) -> Result<Value, ProviderError> {
    let auth = match provider {
        Provider::Openai | Provider::Perplexity => Auth::Bearer(api_key),
        Provider::Anthropic => Auth::Header {
            name: "x-api-key",
            value: api_key,
            extra: &[("anthropic-version", anthropic::ANTHROPIC_VERSION)],
        },
    };

    debug!(
        provider = provider.as_str(),
        endpoint = url,
        retries = options.retries,
        "sending chat request"
    );

    let client = Client::new();
    let response = send_chat_request_with_retry(
        &client,
        url,
        auth,
        payload,
        RetryConfig {
            timeout_secs: options.timeout_secs,
            retries: options.retries,
            retry_delay_ms: options.retry_delay_ms,
        },
    )
    .map_err(|failure| match failure {
        RequestFailure::Request(source) => ProviderError::Request { provider, source },
        RequestFailure::Api { status, body } => ProviderError::Api {
            provider,
            status,
            body,
        },
    })?;

    response
        .json::<Value>()
        .map_err(|source| ProviderError::Decode { provider, source })
}

pub(crate) fn reject_images(provider: Provider, prompt: &Prompt) -> Result<(), ProviderError> {
    if prompt.images.is_empty() {
        Ok(())
    } else {
        Err(ProviderError::ImagesUnsupported { provider })
    }
}

/// Body shared by the OpenAI-compatible chat-completions endpoints.
pub(crate) fn chat_completion_request(prompt: &Prompt, model: &str, options: &AskOptions) -> Value {
    let mut messages = Vec::new();
    if let Some(system) = &options.system {
        messages.push(ChatMessage::system(system.clone()));
    }
    messages.push(ChatMessage::user(prompt.text.clone()));

    let mut payload = Map::new();
    payload.insert("model".to_string(), Value::String(model.to_string()));
    payload.insert(
        "messages".to_string(),
        Value::Array(messages.iter().map(ChatMessage::to_json).collect()),
    );
    if let Some(temperature) = options.temperature {
        payload.insert("temperature".to_string(), Value::from(temperature));
    }
    if let Some(max_tokens) = options.max_tokens {
        payload.insert("max_tokens".to_string(), Value::from(max_tokens));
    }
    Value::Object(payload)
}

/// Text of the first choice of a chat-completions payload.
///
/// Plain string content is returned unchanged; an array of content parts is
/// reduced to its `text` parts. Anything else yields an empty string.
pub(crate) fn chat_completion_text(body: &Value) -> String {
    match &body["choices"][0]["message"]["content"] {
        Value::String(text) => text.clone(),
        Value::Array(parts) => concat_text_blocks(parts),
        _ => String::new(),
    }
}

pub(crate) fn concat_text_blocks(blocks: &[Value]) -> String {
    blocks
        .iter()
        .filter(|block| block["type"].as_str() == Some("text"))
        .filter_map(|block| block["text"].as_str())
        .collect()
}

pub(crate) fn parse_usage(body: &Value) -> Option<Usage> {
    let usage = body.get("usage")?.as_object()?;
    let field = |name: &str| {
        usage
            .get(name)
            .and_then(Value::as_u64)
            .and_then(|value| u32::try_from(value).ok())
    };

    let prompt_tokens = field("prompt_tokens").or_else(|| field("input_tokens"));
    let completion_tokens = field("completion_tokens").or_else(|| field("output_tokens"));
    let total_tokens = field("total_tokens").or_else(|| match (prompt_tokens, completion_tokens) {
        (Some(prompt), Some(completion)) => prompt.checked_add(completion),
        _ => None,
    });

    Some(Usage {
        prompt_tokens,
        completion_tokens,
        total_tokens,
    })
}
