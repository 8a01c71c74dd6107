use serde_json::Value;

use crate::llm::models::GPT_FOUR_TURBO_MODEL;
use crate::llm::provider::{
    AskOptions, AskResponse, Prompt, Provider, ProviderError, chat_completion_request,
    chat_completion_text, parse_usage, reject_images, send,
};

/// Asks `model` (default `gpt-4-turbo`) a single user question.
pub fn fetch_response(prompt: &str, model: Option<&str>) -> Result<String, ProviderError> {
    let response = ask(
        &Prompt::new(prompt),
        model.unwrap_or(GPT_FOUR_TURBO_MODEL),
        AskOptions::default(),
    )?;
    Ok(response.content)
}

pub fn ask(prompt: &Prompt, model: &str, options: AskOptions) -> Result<AskResponse, ProviderError> {
    let payload = build_request(prompt, model, &options)?;
    let body = send(Provider::Openai, &payload, &options)?;
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
    reject_images(Provider::Openai, prompt)?;
    Ok(chat_completion_request(prompt, model, options))
}

/// Reply text of the first choice, or an empty string when there is none.
pub fn extract_message(body: &Value) -> String {
    chat_completion_text(body)
}
