use serde_json::{Map, Value};

use crate::llm::content::UserContent;
use crate::llm::models::{ANTHROPIC_DEFAULT_MAX_TOKENS, CLAUDE_THREE_OPUS_MODEL};
use crate::llm::provider::{
    AskOptions, AskResponse, Prompt, Provider, ProviderError, concat_text_blocks, parse_usage,
    send,
};

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Sends `prompt` and `images` to Claude 3 Opus and returns the reply text.
///
/// `max_tokens` defaults to 1024 when `None`.
pub fn fetch_response(
    prompt: &str,
    images: &[Vec<u8>],
    max_tokens: Option<u32>,
) -> Result<String, ProviderError> {
    let (prompt, options) = fetch_inputs(prompt, images, max_tokens);
    let response = ask(&prompt, CLAUDE_THREE_OPUS_MODEL, options)?;
    Ok(response.content)
}

fn fetch_inputs(
    prompt: &str,
    images: &[Vec<u8>],
    max_tokens: Option<u32>,
) -> (Prompt, AskOptions) {
    let prompt = Prompt::new(prompt).with_images(images.to_vec());
    let options = AskOptions {
        max_tokens,
        ..AskOptions::default()
    };
    (prompt, options)
}

pub fn ask(prompt: &Prompt, model: &str, options: AskOptions) -> Result<AskResponse, ProviderError> {
    let payload = build_request(prompt, model, &options)?;
    let body = send(Provider::Anthropic, &payload, &options)?;
    Ok(response_from(&body))
}

pub(crate) fn response_from(body: &Value) -> AskResponse {
    AskResponse {
        content: extract_message(body),
        usage: parse_usage(body),
        citations: Vec::new(),
    }
}

pub fn build_request(
    prompt: &Prompt,
    model: &str,
    options: &AskOptions,
) -> Result<Value, ProviderError> {
    let content = UserContent::from_prompt(prompt)?;

    let mut message = Map::new();
    message.insert("role".to_string(), Value::String("user".to_string()));
    message.insert("content".to_string(), content.to_json());

    let mut payload = Map::new();
    payload.insert("model".to_string(), Value::String(model.to_string()));
    payload.insert(
        "max_tokens".to_string(),
        Value::from(options.max_tokens.unwrap_or(ANTHROPIC_DEFAULT_MAX_TOKENS)),
    );
    if let Some(system) = &options.system {
        payload.insert("system".to_string(), Value::String(system.clone()));
    }
    if let Some(temperature) = options.temperature {
        payload.insert("temperature".to_string(), Value::from(temperature));
    }
    payload.insert("messages".to_string(), Value::Array(vec![Value::Object(message)]));
    Ok(Value::Object(payload))
}

/// Concatenates the text of every `text` block in a messages-API response.
pub fn extract_message(body: &Value) -> String {
    body["content"]
        .as_array()
        .map(|blocks| concat_text_blocks(blocks))
        .unwrap_or_default()
}
