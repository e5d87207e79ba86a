//! Configuration loading and parsing for guidelint
//!
//! Provides functionality to load and parse `guidelint.toml` configuration files.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::language::Language;
use crate::violation::Severity;

pub const CONFIG_FILENAME: &str = "guidelint.toml";

const KNOWN_TOP_LEVEL_KEYS: &[&str] = &["include", "exclude", "rules"];
const KNOWN_RULES_KEYS: &[&str] = &[
    "disabled",
    "severity",
    "options",
    "javascript",
    "css",
    "html",
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid TOML in '{path}': {message}")]
    ParseError { path: PathBuf, message: String },
    #[error("Invalid options for rule '{rule}': {message}")]
    InvalidOption { rule: String, message: String },
}

impl ConfigError {
    pub fn invalid_option(rule: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidOption {
            rule: rule.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigResult {
    pub config: Config,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub rules: RulesConfig,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RulesConfig {
    /// Rule ids or names that never run.
    pub disabled: Vec<String>,
    /// Severity overrides keyed by rule id or name.
    pub severity: HashMap<String, Severity>,
    /// Per-rule option tables keyed by rule name or id.
    pub options: HashMap<String, toml::Table>,
    pub javascript: Option<bool>,
    pub css: Option<bool>,
    pub html: Option<bool>,
}

impl RulesConfig {
    pub fn language_enabled(&self, language: Language) -> bool {
        let toggle = match language {
            Language::JavaScript => self.javascript,
            Language::Css => self.css,
            Language::Html => self.html,
        };
        toggle.unwrap_or(true)
    }

    /// Typed options for a rule, or the defaults when none are configured.
    pub fn options_for<T>(&self, rule_id: &str, rule_name: &str) -> Result<T, ConfigError>
    where
        T: DeserializeOwned + Default,
    {
        let table = self.options.get(rule_name).or_else(|| {
            self.options
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(rule_id))
                .map(|(_, table)| table)
        });

        match table {
            Some(table) => toml::Value::Table(table.clone())
                .try_into()
                .map_err(|e: toml::de::Error| {
                    ConfigError::invalid_option(rule_name, e.message().to_string())
                }),
            None => Ok(T::default()),
        }
    }
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if !current.pop() {
            return None;
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    load_config_with_warnings(path).map(|result| result.config)
}

pub fn load_config_with_warnings(path: &Path) -> Result<ConfigResult, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })?;

    let warnings = detect_unknown_keys(&content);

    Ok(ConfigResult { config, warnings })
}

fn detect_unknown_keys(content: &str) -> Vec<String> {
    let mut warnings = Vec::new();

    let table: toml::Table = match content.parse() {
        Ok(t) => t,
        Err(_) => return warnings,
    };

    let known_top: HashSet<&str> = KNOWN_TOP_LEVEL_KEYS.iter().copied().collect();
    let mut keys: Vec<_> = table.keys().collect();
    keys.sort();
    for key in keys {
        if !known_top.contains(key.as_str()) {
            warnings.push(format!("Unknown config option: '{}'", key));
        }
    }

    if let Some(toml::Value::Table(rules)) = table.get("rules") {
        let known_rules: HashSet<&str> = KNOWN_RULES_KEYS.iter().copied().collect();
        let mut keys: Vec<_> = rules.keys().collect();
        keys.sort();
        for key in keys {
            if !known_rules.contains(key.as_str()) {
                warnings.push(format!("Unknown config option in [rules]: '{}'", key));
            }
        }
    }

    warnings
}

/// Load the explicit config file if given, otherwise search upwards from
/// `start_dir`. No file at all means the default configuration.
pub fn resolve_config(
    explicit: Option<&Path>,
    start_dir: &Path,
) -> Result<ConfigResult, ConfigError> {
    match explicit.map(Path::to_path_buf).or_else(|| find_config_file(start_dir)) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            load_config_with_warnings(&path)
        }
        None => Ok(ConfigResult::default()),
    }
}
