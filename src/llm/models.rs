pub const GPT_FOUR_TURBO_MODEL: &str = "gpt-4-turbo";
pub const CLAUDE_THREE_OPUS_MODEL: &str = "claude-3-opus-20240229";
pub const SONAR_SMALL_ONLINE_MODEL: &str = "llama-3-sonar-small-32k-online";

/// Anthropic requires an explicit output budget on every request.
pub const ANTHROPIC_DEFAULT_MAX_TOKENS: u32 = 1024;
