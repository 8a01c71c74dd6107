use std::env;
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, Instant};

use clap::Args;
use serde_json::{Value, json};
use tracing::info;

use crate::config::{self, OutputMode, ProfileConfig};
use crate::llm::provider::{
    self, AskOptions, AskResponse, Prompt, Provider, endpoint, is_api_key_present,
};
use crate::utils::debug::print_if_not_empty;
use crate::utils::format_duration;

pub const BUILD_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit: ",
    env!("JOBHUNT_GIT_SHA"),
    ", built: ",
    env!("JOBHUNT_BUILD_TS"),
    ")"
);

const DEFAULT_RETRY_DELAY_MS: u64 = 500;

#[derive(Debug, Args, Clone)]
pub struct AskArgs {
    /// Prompt text; read from stdin when omitted.
    pub prompt: Option<String>,
    /// openai, anthropic or perplexity [env: JOBHUNT_PROVIDER]
    #[arg(long)]
    pub provider: Option<String>,
    /// Model id; defaults to the provider's default model [env: JOBHUNT_MODEL]
    #[arg(long)]
    pub model: Option<String>,
    /// Attach an image (anthropic only); repeatable.
    #[arg(long = "image", value_name = "PATH")]
    pub images: Vec<PathBuf>,
    #[arg(long)]
    pub system: Option<String>,
    #[arg(long)]
    pub temperature: Option<f64>,
    #[arg(long)]
    pub max_tokens: Option<u32>,
    /// Request timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,
    #[arg(long)]
    pub retries: Option<u32>,
    /// Base retry delay in milliseconds.
    #[arg(long)]
    pub retry_delay: Option<u64>,
    /// Profile name from the config file.
    #[arg(long)]
    pub profile: Option<String>,
    /// text or json
    #[arg(long)]
    pub output: Option<String>,
    /// Shorthand for `--output json`.
    #[arg(long)]
    pub json: bool,
    /// Print token usage and latency on stderr.
    #[arg(long)]
    pub show_usage: bool,
    /// Also write the output to this file.
    #[arg(long, value_name = "PATH")]
    pub save: Option<PathBuf>,
    /// Print the request instead of sending it.
    #[arg(long)]
    pub dry_run: bool,
    #[arg(long, short)]
    pub verbose: bool,
    #[arg(long, short)]
    pub quiet: bool,
    /// Print version and build metadata.
    #[arg(long)]
    pub version: bool,
}

#[derive(Debug)]
struct ResolvedAsk {
    provider: Provider,
    model: String,
    options: AskOptions,
    output: OutputMode,
    show_usage: bool,
}

pub fn run(args: AskArgs) -> Result<(), String> {
    if args.version {
        println!("jobhunt {BUILD_VERSION}");
        return Ok(());
    }

    let profile = match &args.profile {
        Some(name) => config::load_profile(name)?,
        None => ProfileConfig::default(),
    };
    let resolved = resolve(&args, &profile)?;

    info!(
        provider = resolved.provider.as_str(),
        model = %resolved.model,
        api_key_present = is_api_key_present(resolved.provider),
        images = args.images.len(),
        dry_run = args.dry_run,
        "resolved ask request"
    );

    let text = read_prompt(args.prompt.as_deref())?;
    let images = read_images(&args.images)?;
    let prompt = Prompt::new(text).with_images(images);

    let payload = provider::build_request(
        resolved.provider,
        &prompt,
        &resolved.model,
        &resolved.options,
    )
    .map_err(|err| err.to_string())?;
    crate::debug_print!("request payload: {payload}");

    let rendered = if args.dry_run {
        if resolved.show_usage && !args.quiet {
            eprintln!(
                "usage: unavailable latency: {} (dry-run)",
                format_duration(Duration::ZERO)
            );
        }
        dry_run_body(&resolved, &payload).to_string()
    } else {
        let started = Instant::now();
        let response = provider::ask(
            resolved.provider,
            &prompt,
            &resolved.model,
            resolved.options.clone(),
        )
        .map_err(|err| err.to_string())?;
        let latency = format_duration(started.elapsed());

        if resolved.show_usage && !args.quiet {
            eprintln!("{}", usage_line(&response, &latency));
        }
        render_response(&resolved, &response, &latency)
    };

    println!("{rendered}");

    if let Some(path) = &args.save {
        save_output(path, &rendered)?;
    }

    Ok(())
}

fn resolve(args: &AskArgs, profile: &ProfileConfig) -> Result<ResolvedAsk, String> {
    let provider = match (
        args.provider.as_deref(),
        env_value("JOBHUNT_PROVIDER"),
        profile.provider.as_deref(),
    ) {
        (Some(raw), _, _) => raw.parse::<Provider>()?,
        (None, Some(raw), _) => raw.parse::<Provider>().map_err(|_| {
            format!(
                "Invalid JOBHUNT_PROVIDER '{raw}'. Supported values: {}.",
                Provider::supported_values()
            )
        })?,
        (None, None, Some(raw)) => raw.parse::<Provider>()?,
        (None, None, None) => Provider::Openai,
    };

    let model = args
        .model
        .clone()
        .or_else(|| env_value("JOBHUNT_MODEL"))
        .or_else(|| profile.model.clone())
        .unwrap_or_else(|| provider.default_model().to_string());

    let temperature = pick(args.temperature, "JOBHUNT_TEMPERATURE", profile.temperature)?;
    let max_tokens = pick(args.max_tokens, "JOBHUNT_MAX_TOKENS", profile.max_tokens)?;
    let timeout_secs = pick(args.timeout, "JOBHUNT_TIMEOUT", profile.timeout)?;
    let retries = pick(args.retries, "JOBHUNT_RETRIES", profile.retries)?.unwrap_or(0);
    let retry_delay_ms = pick(args.retry_delay, "JOBHUNT_RETRY_DELAY", profile.retry_delay)?
        .unwrap_or(DEFAULT_RETRY_DELAY_MS);

    let output = if args.json {
        OutputMode::Json
    } else {
        match args.output.as_deref().or(profile.output.as_deref()) {
            Some(raw) => raw.parse::<OutputMode>()?,
            None => OutputMode::Text,
        }
    };

    Ok(ResolvedAsk {
        provider,
        model,
        options: AskOptions {
            system: args.system.clone().or_else(|| profile.system.clone()),
            temperature,
            max_tokens,
            timeout_secs,
            retries,
            retry_delay_ms,
        },
        output,
        show_usage: args.show_usage || profile.show_usage.unwrap_or(false),
    })
}

/// CLI value, then environment variable, then profile value.
fn pick<T>(cli: Option<T>, env_key: &str, profile: Option<T>) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if cli.is_some() {
        return Ok(cli);
    }
    match env_value(env_key) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|err| format!("Invalid {env_key} '{raw}': {err}")),
        None => Ok(profile),
    }
}

fn env_value(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn read_prompt(argument: Option<&str>) -> Result<String, String> {
    let text = match argument {
        Some(prompt) => prompt.to_string(),
        None => {
            let stdin = io::stdin();
            if stdin.is_terminal() {
                return Err("No prompt provided. Pass it as an argument or via stdin.".to_string());
            }
            let mut buffer = String::new();
            stdin
                .lock()
                .read_to_string(&mut buffer)
                .map_err(|err| format!("Failed to read prompt from stdin: {err}"))?;
            buffer.trim_end_matches(['\n', '\r']).to_string()
        }
    };

    if text.trim().is_empty() {
        return Err("No prompt provided. Pass it as an argument or via stdin.".to_string());
    }
    Ok(text)
}

fn read_images(paths: &[PathBuf]) -> Result<Vec<Vec<u8>>, String> {
    paths
        .iter()
        .map(|path| {
            fs::read(path)
                .map_err(|err| format!("Failed to read image '{}': {err}", path.display()))
        })
        .collect()
}

fn dry_run_body(resolved: &ResolvedAsk, payload: &Value) -> Value {
    json!({
        "dry_run": true,
        "provider": resolved.provider.as_str(),
        "model": resolved.model,
        "endpoint": endpoint(resolved.provider),
        "output": resolved.output.as_str(),
        "messages": payload["messages"],
        "request": {
            "system": resolved.options.system,
            "temperature": resolved.options.temperature,
            "max_tokens": resolved.options.max_tokens,
            "timeout_secs": resolved.options.timeout_secs,
            "retries": resolved.options.retries,
            "retry_delay_ms": resolved.options.retry_delay_ms,
        },
        "payload": payload,
    })
}

fn render_response(resolved: &ResolvedAsk, response: &AskResponse, latency: &str) -> String {
    match resolved.output {
        OutputMode::Text => {
            let mut text = response.content.clone();
            if !response.citations.is_empty() {
                text.push_str("\n\nSources:\n");
                text.push_str(&response.citations.join("\n"));
            }
            text
        }
        OutputMode::Json => json!({
            "provider": resolved.provider.as_str(),
            "model": resolved.model,
            "content": response.content,
            "usage": response.usage,
            "citations": response.citations,
            "latency": latency,
        })
        .to_string(),
    }
}

fn usage_line(response: &AskResponse, latency: &str) -> String {
    match &response.usage {
        Some(usage) => {
            let field =
                |value: Option<u32>| value.map_or_else(|| "?".to_string(), |v| v.to_string());
            format!(
                "usage: prompt={} completion={} total={} latency: {latency}",
                field(usage.prompt_tokens),
                field(usage.completion_tokens),
                field(usage.total_tokens)
            )
        }
        None => format!("usage: unavailable latency: {latency}"),
    }
}

fn save_output(path: &Path, rendered: &str) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| {
            format!(
                "Failed to create output directory '{}': {err}",
                parent.display()
            )
        })?;
    }
    fs::write(path, format!("{rendered}\n"))
        .map_err(|err| format!("Failed to write output file '{}': {err}", path.display()))?;
    print_if_not_empty([path.display()], "", "saved output to ", "");
    Ok(())
}
