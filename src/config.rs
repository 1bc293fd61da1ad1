//! Client configuration: defaults, file loading and validation.
//!
//! The file format is a flat `key = value` subset of TOML:
//!
//! ```toml
//! connect_timeout_secs = 5
//! read_timeout_secs = 60     # slow tree reads
//! max_throttle_retries = 3
//! user_agent = "my-app/1.0"
//! feature_tags = ["birth-date-not-considered-death-declaration"]
//! log_headers = false
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::transport::{CONNECT_TIMEOUT_SECS, DEFAULT_MAX_THROTTLE_RETRIES, READ_TIMEOUT_SECS};

const APP_DIR: &str = "gedcomx-client";
const TIMEOUT_RANGE: std::ops::RangeInclusive<u64> = 1..=3600;
const RETRY_RANGE: std::ops::RangeInclusive<u64> = 0..=10;

/// Errors produced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config syntax on line {line}: expected key = value")]
    Syntax { line: usize },

    #[error("invalid `{key}` value on line {line}: {reason}")]
    InvalidValue {
        key: String,
        line: usize,
        reason: String,
    },

    #[error("unknown configuration key: '{key}' on line {line}")]
    UnknownKey { key: String, line: usize },

    #[error("invalid config value for `{key}`: {value}. Expected range: {range}")]
    OutOfRange {
        key: &'static str,
        value: u64,
        range: String,
    },
}

impl ConfigError {
    fn invalid_value(key: &str, line: usize, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            line,
            reason: reason.into(),
        }
    }
}

/// Settings applied when a client and its pipeline are built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// TCP connect timeout.
    pub connect_timeout_secs: u64,
    /// Per-request read timeout.
    pub read_timeout_secs: u64,
    /// Retries granted to one throttled exchange.
    pub max_throttle_retries: u32,
    /// Upper bound on a single `Retry-After` sleep.
    pub max_retry_after_secs: u64,
    /// Overrides the crate's default User-Agent.
    pub user_agent: Option<String>,
    /// Feature tags sent on every request; empty disables the header.
    pub feature_tags: Vec<String>,
    /// Whether the logging middleware includes headers.
    pub log_headers: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: CONNECT_TIMEOUT_SECS,
            read_timeout_secs: READ_TIMEOUT_SECS,
            max_throttle_retries: DEFAULT_MAX_THROTTLE_RETRIES,
            max_retry_after_secs: 3600,
            user_agent: None,
            feature_tags: Vec::new(),
            log_headers: true,
        }
    }
}

impl ClientConfig {
    /// Checks every numeric setting against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OutOfRange`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("connect_timeout_secs", self.connect_timeout_secs, &TIMEOUT_RANGE)?;
        check_range("read_timeout_secs", self.read_timeout_secs, &TIMEOUT_RANGE)?;
        check_range(
            "max_throttle_retries",
            u64::from(self.max_throttle_retries),
            &RETRY_RANGE,
        )?;
        check_range("max_retry_after_secs", self.max_retry_after_secs, &TIMEOUT_RANGE)?;
        Ok(())
    }
}

fn check_range(
    key: &'static str,
    value: u64,
    range: &std::ops::RangeInclusive<u64>,
) -> Result<(), ConfigError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            key,
            value,
            range: format!("{}..={}", range.start(), range.end()),
        })
    }
}

/// Resolves the default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/gedcomx-client/config.toml`
/// 2. `$HOME/.config/gedcomx-client/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config_home).join(APP_DIR).join("config.toml"));
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads the config at the default path, or defaults when there is none.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file exists but cannot be read or parsed.
pub fn load_default_config() -> Result<ClientConfig, ConfigError> {
    match resolve_default_config_path() {
        Some(path) if path.exists() => load_config(&path),
        other => {
            debug!(path = ?other, "no config file; using defaults");
            Ok(ClientConfig::default())
        }
    }
}

/// Loads and validates a config file.
///
/// # Errors
///
/// Returns [`ConfigError`] on I/O, syntax or validation failure.
pub fn load_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config_str(&raw)?;
    debug!(path = %path.display(), "loaded client config");
    Ok(config)
}

/// Parses config text on top of the defaults.
///
/// # Errors
///
/// Returns [`ConfigError`] on syntax errors, unknown keys or invalid values.
pub fn parse_config_str(raw: &str) -> Result<ClientConfig, ConfigError> {
    let mut cfg = ClientConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_no = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            return Err(ConfigError::Syntax { line: line_no });
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let invalid = |reason: &str| ConfigError::invalid_value(key, line_no, reason);

        match key {
            "connect_timeout_secs" => {
                cfg.connect_timeout_secs = parse_integer_u64(value).map_err(invalid)?;
            }
            "read_timeout_secs" => {
                cfg.read_timeout_secs = parse_integer_u64(value).map_err(invalid)?;
            }
            "max_throttle_retries" => {
                let parsed = parse_integer_u64(value).map_err(invalid)?;
                cfg.max_throttle_retries =
                    u32::try_from(parsed).map_err(|_| invalid("out of range for u32"))?;
            }
            "max_retry_after_secs" => {
                cfg.max_retry_after_secs = parse_integer_u64(value).map_err(invalid)?;
            }
            "user_agent" => {
                cfg.user_agent = Some(parse_string_literal(value).map_err(invalid)?);
            }
            "feature_tags" => {
                cfg.feature_tags = parse_string_array(value).map_err(invalid)?;
            }
            "log_headers" => {
                cfg.log_headers = parse_boolean(value).map_err(invalid)?;
            }
            unknown => {
                return Err(ConfigError::UnknownKey {
                    key: unknown.to_string(),
                    line: line_no,
                });
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String, &'static str> {
    let raw_value = raw_value.trim();
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        return Err("expected double-quoted string");
    }
    let inner = &raw_value[1..raw_value.len() - 1];
    if inner.contains('"') {
        return Err("unexpected quote inside string");
    }
    Ok(inner.to_string())
}

fn parse_string_array(raw_value: &str) -> Result<Vec<String>, &'static str> {
    let Some(inner) = raw_value
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    else {
        return Err("expected array of double-quoted strings");
    };
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }
    inner
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(parse_string_literal)
        .collect()
}

fn parse_integer_u64(raw_value: &str) -> Result<u64, &'static str> {
    let token = raw_value.trim();
    if token.is_empty() {
        return Err("expected integer value");
    }
    let value = token.parse::<i128>().map_err(|_| "expected integer value")?;
    if value < 0 {
        return Err("expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| "integer value out of range for u64")
}

fn parse_boolean(raw_value: &str) -> Result<bool, &'static str> {
    match raw_value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err("expected 'true' or 'false'"),
    }
}
