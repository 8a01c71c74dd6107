use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::Deserialize;
use tracing::debug;

use crate::llm::provider::Provider;

/// Process-wide settings, read from the environment on first use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Enabled when `DEBUG` is `ON` (any case).
    pub debug: bool,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            debug: env::var("DEBUG").is_ok_and(|value| is_debug_on(&value)),
        }
    }
}

fn is_debug_on(value: &str) -> bool {
    value.eq_ignore_ascii_case("on")
}

static SETTINGS: OnceLock<Settings> = OnceLock::new();

pub fn settings() -> &'static Settings {
    SETTINGS.get_or_init(Settings::from_env)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    Json,
}

impl OutputMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output '{raw}'. Supported values: text, json.")),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProfileConfig {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub system: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub timeout: Option<u64>,
    pub retries: Option<u32>,
    pub retry_delay: Option<u64>,
    pub output: Option<String>,
    pub show_usage: Option<bool>,
}

impl ProfileConfig {
    fn validate(&self, name: &str) -> Result<(), String> {
        if let Some(provider) = &self.provider {
            provider
                .parse::<Provider>()
                .map_err(|err| format!("Profile '{name}': {err}"))?;
        }
        if let Some(output) = &self.output {
            output
                .parse::<OutputMode>()
                .map_err(|err| format!("Profile '{name}': {err}"))?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    profiles: Option<HashMap<String, ProfileConfig>>,
}

pub fn load_profile(name: &str) -> Result<ProfileConfig, String> {
    let (path, config) = read_config()?;

    let profiles = config.profiles.ok_or_else(|| {
        format!(
            "Config file '{}' does not contain a [profiles] section.",
            path.display()
        )
    })?;

    profiles.get(name).cloned().ok_or_else(|| {
        format!(
            "Profile '{}' not found in config file '{}'.",
            name,
            path.display()
        )
    })
}

/// Checks the config file parses and that profile values are valid.
///
/// With `profile`, only that profile is checked and it must exist.
pub fn validate_config(profile: Option<&str>) -> Result<PathBuf, String> {
    let (path, config) = read_config()?;
    let profiles = config.profiles.unwrap_or_default();

    match profile {
        Some(name) => {
            let selected = profiles.get(name).ok_or_else(|| {
                format!(
                    "Profile '{}' not found in config file '{}'.",
                    name,
                    path.display()
                )
            })?;
            selected.validate(name)?;
        }
        None => {
            let mut names = profiles.keys().collect::<Vec<_>>();
            names.sort();
            for name in names {
                profiles[name].validate(name)?;
            }
        }
    }

    Ok(path)
}

fn read_config() -> Result<(PathBuf, ConfigFile), String> {
    let path = config_path()?;
    debug!(path = %path.display(), "reading config file");
    let raw = fs::read_to_string(&path)
        .map_err(|err| format!("Failed to read config file '{}': {err}", path.display()))?;

    let config: ConfigFile = toml::from_str(&raw)
        .map_err(|err| format!("Failed to parse config file '{}': {err}", path.display()))?;

    Ok((path, config))
}

/// `JOBHUNT_CONFIG`, else `$XDG_CONFIG_HOME/jobhunt/config.toml`, else
/// `~/.config/jobhunt/config.toml`.
fn config_path() -> Result<PathBuf, String> {
    let non_empty = |key: &str| {
        env::var(key)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    };

    if let Some(explicit) = non_empty("JOBHUNT_CONFIG") {
        return Ok(explicit);
    }

    let config_home = non_empty("XDG_CONFIG_HOME")
        .or_else(|| non_empty("HOME").map(|home| home.join(".config")))
        .ok_or_else(|| {
            "Cannot resolve config path: set JOBHUNT_CONFIG or HOME/XDG_CONFIG_HOME.".to_string()
        })?;
    Ok(config_home.join("jobhunt").join("config.toml"))
}
