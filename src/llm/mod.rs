//! Chat-completion clients for the supported providers.
//!
//! Every client issues one blocking request per call and reduces the
//! provider payload to the reply text.

/// Anthropic messages API helpers.
pub mod anthropic;
pub(crate) mod chat_runtime;
/// Content blocks for multimodal user messages.
pub mod content;
/// Default model identifiers.
pub mod models;
/// OpenAI chat-completions helpers.
pub mod openai;
/// Perplexity search-augmented chat helpers.
pub mod perplexity;
/// Provider-agnostic request types, errors and dispatch.
pub mod provider;
#[cfg(test)]
pub(crate) mod test_server;
