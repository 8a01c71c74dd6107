//! Helpers for calling hosted chat-completion APIs, plus the string and
//! formatting utilities used around them.

pub mod commands;
pub mod config;
pub mod llm;
pub mod logging;
pub mod utils;

pub use llm::provider::{AskOptions, AskResponse, Prompt, Provider, ProviderError, Usage};
pub use utils::{
    are_strs_similar, format_execution_time, group_by, is_falsy, is_truthy, similarity_ratio,
};
