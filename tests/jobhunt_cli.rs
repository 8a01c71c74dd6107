use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::{contains, is_empty};
use serde_json::{Value, json};
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

fn jobhunt_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("jobhunt"));
    cmd.env_remove("JOBHUNT_PROVIDER")
        .env_remove("JOBHUNT_MODEL")
        .env_remove("JOBHUNT_TEMPERATURE")
        .env_remove("JOBHUNT_MAX_TOKENS")
        .env_remove("JOBHUNT_TIMEOUT")
        .env_remove("JOBHUNT_RETRIES")
        .env_remove("JOBHUNT_RETRY_DELAY")
        .env_remove("JOBHUNT_CONFIG")
        .env_remove("OPENAI_API_KEY")
        .env_remove("ANTHROPIC_API_KEY")
        .env_remove("PERPLEXITY_API_TOKEN")
        .env_remove("DEBUG")
        .env_remove("RUST_LOG");
    cmd
}

fn ask_cmd() -> Command {
    let mut cmd = jobhunt_cmd();
    cmd.arg("ask");
    cmd
}

fn unique_temp_path(label: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    std::env::temp_dir().join(format!("jobhunt-test-{label}-{nanos}"))
}

fn parse_stdout_json(output: &[u8]) -> Value {
    let text = String::from_utf8(output.to_vec()).expect("stdout should be utf-8");
    serde_json::from_str(text.trim()).expect("stdout should contain valid JSON")
}

#[test]
fn dry_run_succeeds_without_api_key() {
    let assert = ask_cmd()
        .args(["--provider", "anthropic", "--dry-run", "Summarise this posting"])
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    assert_eq!(body["dry_run"], Value::Bool(true));
    assert_eq!(body["provider"], Value::String("anthropic".to_string()));
    assert_eq!(body["model"], Value::String("claude-3-opus-20240229".to_string()));
    assert_eq!(body["endpoint"], "https://api.anthropic.com/v1/messages");
    assert_eq!(body["payload"]["max_tokens"], Value::from(1024));
}

#[test]
fn provider_defaults_to_openai_with_its_default_model() {
    let assert = ask_cmd().args(["--dry-run", "hello"]).assert().success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    assert_eq!(body["provider"], Value::String("openai".to_string()));
    assert_eq!(body["model"], Value::String("gpt-4-turbo".to_string()));
    assert_eq!(body["output"], Value::String("text".to_string()));
}

#[test]
fn perplexity_uses_sonar_by_default() {
    let assert = ask_cmd()
        .args(["--provider", "perplexity", "--dry-run", "Who is hiring?"])
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    assert_eq!(
        body["model"],
        Value::String("llama-3-sonar-small-32k-online".to_string())
    );
    assert_eq!(body["endpoint"], "https://api.perplexity.ai/chat/completions");
}

#[test]
fn invalid_provider_from_env_returns_error() {
    ask_cmd()
        .env("JOBHUNT_PROVIDER", "bad")
        .args(["--dry-run", "hello"])
        .assert()
        .failure()
        .stderr(contains(
            "Invalid JOBHUNT_PROVIDER 'bad'. Supported values: openai, anthropic, perplexity.",
        ));
}

#[test]
fn argument_prompt_has_priority_over_stdin() {
    let assert = ask_cmd()
        .args(["--provider", "openai", "--dry-run", "argument prompt"])
        .write_stdin("stdin prompt")
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    let messages = body["messages"]
        .as_array()
        .expect("messages should be an array");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["role"], Value::String("user".to_string()));
    assert_eq!(
        messages[0]["content"],
        Value::String("argument prompt".to_string())
    );
}

#[test]
fn empty_stdin_prompt_is_rejected() {
    ask_cmd()
        .args(["--dry-run"])
        .write_stdin("\n")
        .assert()
        .failure()
        .stderr(contains("No prompt provided."));
}

#[test]
fn system_prompt_precedes_user_message() {
    let assert = ask_cmd()
        .args([
            "--provider",
            "perplexity",
            "--system",
            "Answer with company names only.",
            "--dry-run",
            "Who is hiring?",
        ])
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    assert_eq!(
        body["messages"],
        json!([
            {"role": "system", "content": "Answer with company names only."},
            {"role": "user", "content": "Who is hiring?"}
        ])
    );
}

#[test]
fn json_flag_overrides_output_text() {
    let assert = ask_cmd()
        .args(["--dry-run", "--output", "text", "--json", "hello"])
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    assert_eq!(body["output"], Value::String("json".to_string()));
}

#[test]
fn invalid_output_returns_error() {
    ask_cmd()
        .args(["--dry-run", "--output", "yaml", "hello"])
        .assert()
        .failure()
        .stderr(contains("Invalid output 'yaml'. Supported values: text, json."));
}

#[test]
fn profile_loads_provider_and_model_for_dry_run() {
    let config_path = unique_temp_path("config");
    fs::write(
        &config_path,
        "[profiles.research]\nprovider = \"perplexity\"\nmodel = \"sonar-pro\"\n",
    )
    .expect("config should be writable");

    let assert = ask_cmd()
        .env("JOBHUNT_CONFIG", &config_path)
        .args(["--profile", "research", "--dry-run", "hello"])
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    assert_eq!(body["provider"], Value::String("perplexity".to_string()));
    assert_eq!(body["model"], Value::String("sonar-pro".to_string()));
}

#[test]
fn profile_is_not_implicit_when_not_passed() {
    let config_path = unique_temp_path("config-no-implicit");
    fs::write(
        &config_path,
        "[profiles.default]\nprovider = \"anthropic\"\n",
    )
    .expect("config should be writable");

    let assert = ask_cmd()
        .env("JOBHUNT_CONFIG", &config_path)
        .args(["--dry-run", "hello"])
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    assert_eq!(body["provider"], Value::String("openai".to_string()));
}

#[test]
fn precedence_for_temperature_timeout_and_output_is_respected() {
    let config_path = unique_temp_path("precedence");
    fs::write(
        &config_path,
        "[profiles.claude]\nprovider = \"anthropic\"\ntemperature = 0.1\ntimeout = 7\noutput = \"json\"\n",
    )
    .expect("config should be writable");

    let env_over_profile = ask_cmd()
        .env("JOBHUNT_CONFIG", &config_path)
        .env("JOBHUNT_TEMPERATURE", "0.6")
        .env("JOBHUNT_TIMEOUT", "21")
        .args(["--profile", "claude", "--dry-run", "hello"])
        .assert()
        .success();

    let env_body = parse_stdout_json(&env_over_profile.get_output().stdout);
    assert_eq!(env_body["request"]["temperature"], json!(0.6));
    assert_eq!(env_body["request"]["timeout_secs"], Value::from(21));
    assert_eq!(env_body["output"], Value::String("json".to_string()));

    let cli_over_env = ask_cmd()
        .env("JOBHUNT_CONFIG", &config_path)
        .env("JOBHUNT_TEMPERATURE", "0.6")
        .env("JOBHUNT_TIMEOUT", "21")
        .args([
            "--profile",
            "claude",
            "--dry-run",
            "--temperature",
            "1.2",
            "--timeout",
            "33",
            "--output",
            "text",
            "hello",
        ])
        .assert()
        .success();

    let cli_body = parse_stdout_json(&cli_over_env.get_output().stdout);
    assert_eq!(cli_body["request"]["temperature"], json!(1.2));
    assert_eq!(cli_body["payload"]["temperature"], json!(1.2));
    assert_eq!(cli_body["request"]["timeout_secs"], Value::from(33));
    assert_eq!(cli_body["output"], Value::String("text".to_string()));
}

#[test]
fn invalid_numeric_env_value_returns_error() {
    ask_cmd()
        .env("JOBHUNT_MAX_TOKENS", "lots")
        .args(["--dry-run", "hello"])
        .assert()
        .failure()
        .stderr(contains("Invalid JOBHUNT_MAX_TOKENS 'lots'"));
}

#[test]
fn long_prompt_with_max_tokens_is_reflected_in_dry_run_request() {
    let prompt = "x".repeat(24_000);

    let assert = ask_cmd()
        .args(["--provider", "openai", "--dry-run", "--max-tokens", "128"])
        .write_stdin(prompt.clone())
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    let messages = body["messages"]
        .as_array()
        .expect("messages should be an array");

    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["content"], Value::String(prompt));
    assert_eq!(body["request"]["max_tokens"], Value::from(128));
    assert_eq!(body["payload"]["max_tokens"], Value::from(128));
}

#[test]
fn anthropic_dry_run_embeds_images_before_text() {
    let image_path = unique_temp_path("posting.png");
    fs::write(&image_path, PNG_BYTES).expect("image should be writable");

    let assert = ask_cmd()
        .args([
            "--provider",
            "anthropic",
            "--dry-run",
            "--image",
            image_path.to_string_lossy().as_ref(),
            "Extract the salary range",
        ])
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    let content = body["messages"][0]["content"]
        .as_array()
        .expect("content should be a block list");
    assert_eq!(content.len(), 2);
    assert_eq!(content[0]["type"], "image");
    assert_eq!(content[0]["source"]["media_type"], "image/png");
    assert_eq!(
        content[1],
        json!({"type": "text", "text": "Extract the salary range"})
    );
}

#[test]
fn images_are_rejected_for_openai() {
    let image_path = unique_temp_path("openai.png");
    fs::write(&image_path, PNG_BYTES).expect("image should be writable");

    ask_cmd()
        .args([
            "--provider",
            "openai",
            "--dry-run",
            "--image",
            image_path.to_string_lossy().as_ref(),
            "hello",
        ])
        .assert()
        .failure()
        .stderr(contains("openai does not accept image input"));
}

#[test]
fn unreadable_image_bytes_return_error() {
    let image_path = unique_temp_path("notes.txt");
    fs::write(&image_path, "not an image").expect("file should be writable");

    ask_cmd()
        .args([
            "--provider",
            "anthropic",
            "--dry-run",
            "--image",
            image_path.to_string_lossy().as_ref(),
            "hello",
        ])
        .assert()
        .failure()
        .stderr(contains("image #0 is not usable"));
}

#[test]
fn missing_image_file_returns_error() {
    let image_path = unique_temp_path("missing.png");

    ask_cmd()
        .args([
            "--provider",
            "anthropic",
            "--dry-run",
            "--image",
            image_path.to_string_lossy().as_ref(),
            "hello",
        ])
        .assert()
        .failure()
        .stderr(contains("Failed to read image"));
}

#[test]
fn missing_api_key_is_reported_before_any_request() {
    ask_cmd()
        .args(["--provider", "anthropic", "hello"])
        .assert()
        .failure()
        .stderr(contains("ANTHROPIC_API_KEY is not set in the environment"));

    ask_cmd()
        .args(["--provider", "perplexity", "hello"])
        .assert()
        .failure()
        .stderr(contains("PERPLEXITY_API_TOKEN is not set in the environment"));
}

#[test]
fn save_writes_and_overwrites_output_file() {
    let output_path = unique_temp_path("save-output").join("nested").join("out.json");

    ask_cmd()
        .args([
            "--dry-run",
            "--save",
            output_path.to_string_lossy().as_ref(),
            "first",
        ])
        .assert()
        .success();

    let first = fs::read_to_string(&output_path).expect("first output file should exist");
    assert!(first.contains("\"content\":\"first\""));

    ask_cmd()
        .args([
            "--dry-run",
            "--save",
            output_path.to_string_lossy().as_ref(),
            "second",
        ])
        .assert()
        .success();

    let second = fs::read_to_string(&output_path).expect("second output file should exist");
    assert!(second.contains("\"content\":\"second\""));
    assert!(!second.contains("\"content\":\"first\""));
}

#[test]
fn save_with_invalid_parent_path_returns_explicit_error() {
    let parent_file = unique_temp_path("save-invalid-parent");
    fs::write(&parent_file, "not a directory").expect("parent marker file should be writable");
    let output_path = parent_file.join("sub").join("out.json");

    ask_cmd()
        .args([
            "--dry-run",
            "--save",
            output_path.to_string_lossy().as_ref(),
            "hello",
        ])
        .assert()
        .failure()
        .stderr(contains("Failed to create output directory"));
}

#[test]
fn verbose_does_not_leak_api_key() {
    let secret = "anthropic-secret-value";

    ask_cmd()
        .env("ANTHROPIC_API_KEY", secret)
        .args(["--provider", "anthropic", "--dry-run", "--verbose", "hello"])
        .assert()
        .success()
        .stderr(contains("api_key_present=true").and(contains(secret).not()));
}

#[test]
fn debug_env_prints_request_payload() {
    ask_cmd()
        .env("DEBUG", "on")
        .args(["--dry-run", "hello"])
        .assert()
        .success()
        .stderr(contains("request payload:"))
        .stdout(contains("request payload:").not());

    ask_cmd()
        .env("DEBUG", "yes")
        .args(["--dry-run", "hello"])
        .assert()
        .success()
        .stderr(contains("request payload:").not());
}

#[test]
fn dry_run_show_usage_prints_unavailable() {
    ask_cmd()
        .args(["--dry-run", "--show-usage", "hello"])
        .assert()
        .success()
        .stderr(contains("usage: unavailable latency: 00:00.00 (dry-run)"));
}

#[test]
fn quiet_suppresses_show_usage_on_stderr() {
    ask_cmd()
        .args(["--dry-run", "--show-usage", "--quiet", "hello"])
        .assert()
        .success()
        .stderr(is_empty());
}

#[test]
fn quiet_suppresses_verbose_logs_on_stderr() {
    ask_cmd()
        .args(["--dry-run", "--verbose", "--quiet", "hello"])
        .assert()
        .success()
        .stderr(is_empty());
}

#[test]
fn quiet_keeps_fatal_errors_visible() {
    ask_cmd()
        .args(["--quiet", "--provider", "bard", "hello"])
        .assert()
        .failure()
        .stderr(contains("Invalid provider 'bard'."));
}

#[test]
fn version_prints_build_metadata() {
    jobhunt_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(contains("commit:").and(contains("built:")));

    ask_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(contains("commit:").and(contains("built:")));
}

#[test]
fn config_check_accepts_valid_file() {
    let config_path = unique_temp_path("check-ok");
    fs::write(
        &config_path,
        "[profiles.fast]\nprovider = \"openai\"\noutput = \"text\"\n\n[profiles.claude]\nprovider = \"anthropic\"\nmax_tokens = 2048\n",
    )
    .expect("config should be writable");

    jobhunt_cmd()
        .env("JOBHUNT_CONFIG", &config_path)
        .args(["config", "check"])
        .assert()
        .success()
        .stdout(contains("config OK:"));
}

#[test]
fn config_commands_log_through_rust_log() {
    let config_path = unique_temp_path("check-logging");
    fs::write(&config_path, "[profiles.fast]\nprovider = \"openai\"\n")
        .expect("config should be writable");

    jobhunt_cmd()
        .env("JOBHUNT_CONFIG", &config_path)
        .env("RUST_LOG", "jobhunt=debug")
        .args(["config", "check"])
        .assert()
        .success()
        .stderr(contains("reading config file"));

    jobhunt_cmd()
        .env("JOBHUNT_CONFIG", &config_path)
        .args(["config", "check"])
        .assert()
        .success()
        .stderr(is_empty());
}

#[test]
fn config_check_rejects_invalid_profile_provider() {
    let config_path = unique_temp_path("check-bad-provider");
    fs::write(&config_path, "[profiles.bad]\nprovider = \"cohere\"\n")
        .expect("config should be writable");

    jobhunt_cmd()
        .env("JOBHUNT_CONFIG", &config_path)
        .args(["config", "check", "--profile", "bad"])
        .assert()
        .failure()
        .stderr(contains("Profile 'bad': Invalid provider 'cohere'"));
}

#[test]
fn profile_file_missing_returns_explicit_error() {
    let config_path = unique_temp_path("missing-config");

    ask_cmd()
        .env("JOBHUNT_CONFIG", &config_path)
        .args(["--profile", "research", "hello"])
        .assert()
        .failure()
        .stderr(contains("Failed to read config file"));
}

#[test]
fn invalid_profile_toml_returns_parse_error() {
    let config_path = unique_temp_path("invalid-toml");
    fs::write(&config_path, "[profiles.bad\nprovider = \"openai\"")
        .expect("config should be writable");

    ask_cmd()
        .env("JOBHUNT_CONFIG", &config_path)
        .args(["--profile", "bad", "hello"])
        .assert()
        .failure()
        .stderr(contains("Failed to parse config file"));
}

#[test]
fn profile_not_found_returns_error() {
    let config_path = unique_temp_path("profile-not-found");
    fs::write(&config_path, "[profiles.other]\nprovider = \"openai\"\n")
        .expect("config should be writable");

    ask_cmd()
        .env("JOBHUNT_CONFIG", &config_path)
        .args(["--profile", "research", "hello"])
        .assert()
        .failure()
        .stderr(contains("Profile 'research' not found"));
}

#[test]
fn config_show_reports_debug_setting() {
    jobhunt_cmd()
        .env("DEBUG", "ON")
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(contains("debug: on"));
}

#[test]
fn ask_help_includes_examples() {
    ask_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("Examples:").and(contains("--dry-run --json")));
}

#[test]
fn help_mentions_completion_command() {
    jobhunt_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("completion").and(contains("Generate shell completion script")));
}

#[test]
fn completion_scripts_are_generated() {
    jobhunt_cmd()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(contains("_jobhunt").and(contains("complete")));

    jobhunt_cmd()
        .args(["completion", "fish"])
        .assert()
        .success()
        .stdout(contains("complete -c jobhunt"));
}
