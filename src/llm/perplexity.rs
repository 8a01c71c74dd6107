use serde_json::Value;

use crate::llm::models::SONAR_SMALL_ONLINE_MODEL;
use crate::llm::provider::{
    AskOptions, AskResponse, Prompt, Provider, ProviderError, chat_completion_request,
    chat_completion_text, parse_usage, reject_images, send,
};

/// Asks an online Sonar model; defaults to the small 32k variant.
pub fn fetch_response(user_prompt: &str, model: Option<&str>) -> Result<String, ProviderError> {
    let response = ask(
        &Prompt::new(user_prompt),
        model.unwrap_or(SONAR_SMALL_ONLINE_MODEL),
        AskOptions::default(),
    )?;
    Ok(response.content)
}

pub fn ask(prompt: &Prompt, model: &str, options: AskOptions) -> Result<AskResponse, ProviderError> {
    let payload = build_request(prompt, model, &options)?;
    let body = send(Provider::Perplexity, &payload, &options)?;
    Ok(response_from(&body))
}

pub(crate) fn response_from(body: &Value) -> AskResponse {
    AskResponse {
        content: extract_message(body),
        usage: parse_usage(body),
        citations: extract_citations(body),
    }
}

pub fn build_request(
    prompt: &Prompt,
    model: &str,
    options: &AskOptions,
) -> Result<Value, ProviderError> {
    reject_images(Provider::Perplexity, prompt)?;
    Ok(chat_completion_request(prompt, model, options))
}

pub fn extract_message(body: &Value) -> String {
    chat_completion_text(body)
}

/// URLs the online model cited; non-string entries are skipped.
pub fn extract_citations(body: &Value) -> Vec<String> {
    body["citations"]
        .as_array()
        .map(|citations| {
            citations
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
