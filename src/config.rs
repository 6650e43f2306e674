//! Runtime configuration.
//!
//! Non-secret settings come from an optional `monitor.toml` next to the
//! working directory; `BOT_TOKEN` and `CHAT_ID` only ever come from the
//! environment (a `.env` file is honored). Environment variables win over
//! the file for the remaining fields.

use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

const DEFAULT_LINE_CODE: &str = "11";
const DEFAULT_STATE_PATH: &str = "state.json";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 20;
const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("Unsupported source kind '{0}' (expected 'api' or 'page')")]
    InvalidSource(String),
}

/// Which transport observes the status source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Api,
    Page,
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    source: Option<SourceKind>,
    endpoint: Option<String>,
    line_code: Option<String>,
    state_path: Option<String>,
    fetch_timeout_secs: Option<u64>,
    notify_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub source: SourceKind,
    pub endpoint: String,
    pub line_code: String,
    pub state_path: String,
    pub fetch_timeout: Duration,
    pub notify_timeout: Duration,
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
}

impl MonitorConfig {
    pub fn load(config_path: &str) -> Result<Self, ConfigError> {
        let file = if Path::new(config_path).exists() {
            let raw = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
                path: config_path.to_string(),
                source,
            })?;
            toml::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: config_path.to_string(),
                source,
            })?
        } else {
            FileConfig::default()
        };
        Self::resolve(file, |key| env::var(key).ok())
    }

    fn resolve(
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        let source = match non_empty(env("SOURCE")).as_deref() {
            Some("api") => SourceKind::Api,
            Some("page") => SourceKind::Page,
            Some(other) => return Err(ConfigError::InvalidSource(other.to_string())),
            None => file.source.unwrap_or(SourceKind::Api),
        };

        let line_code = non_empty(env("LINE_CODE"))
            .or(file.line_code)
            .unwrap_or_else(|| DEFAULT_LINE_CODE.to_string());

        let endpoint = non_empty(env("SOURCE_ENDPOINT"))
            .or(file.endpoint)
            .unwrap_or_else(|| default_endpoint(source, &line_code));

        let state_path = non_empty(env("STATE_PATH"))
            .or(file.state_path)
            .unwrap_or_else(|| DEFAULT_STATE_PATH.to_string());

        let fetch_timeout = Duration::from_secs(
            file.fetch_timeout_secs
                .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS)
                .max(1),
        );
        let notify_timeout = Duration::from_secs(
            file.notify_timeout_secs
                .unwrap_or(DEFAULT_NOTIFY_TIMEOUT_SECS)
                .max(1),
        );

        Ok(Self {
            source,
            endpoint,
            line_code,
            state_path,
            fetch_timeout,
            notify_timeout,
            bot_token: non_empty(env("BOT_TOKEN")),
            chat_id: non_empty(env("CHAT_ID")),
        })
    }
}

fn default_endpoint(source: SourceKind, line_code: &str) -> String {
    match source {
        SourceKind::Api => "https://www.diretodostrens.com.br/api/status".to_string(),
        SourceKind::Page => {
            format!("https://www.diretodostrens.com.br/?codigo={line_code}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_apply_without_file_or_environment() {
        let config = MonitorConfig::resolve(FileConfig::default(), no_env).unwrap();
        assert_eq!(config.source, SourceKind::Api);
        assert_eq!(config.line_code, "11");
        assert_eq!(config.endpoint, "https://www.diretodostrens.com.br/api/status");
        assert_eq!(config.state_path, "state.json");
        assert_eq!(config.fetch_timeout, Duration::from_secs(20));
        assert_eq!(config.notify_timeout, Duration::from_secs(15));
        assert_eq!(config.bot_token, None);
        assert_eq!(config.chat_id, None);
    }

    #[test]
    fn file_settings_are_honored() {
        let file: FileConfig = toml::from_str(
            r#"
            source = "page"
            line_code = "8"
            fetch_timeout_secs = 30
            "#,
        )
        .unwrap();
        let config = MonitorConfig::resolve(file, no_env).unwrap();
        assert_eq!(config.source, SourceKind::Page);
        assert_eq!(config.line_code, "8");
        assert_eq!(config.endpoint, "https://www.diretodostrens.com.br/?codigo=8");
        assert_eq!(config.fetch_timeout, Duration::from_secs(30));
    }

    #[test]
    fn environment_overrides_file_settings() {
        let file: FileConfig = toml::from_str(r#"line_code = "8""#).unwrap();
        let env = |key: &str| match key {
            "LINE_CODE" => Some("11".to_string()),
            "BOT_TOKEN" => Some("123:abc".to_string()),
            "CHAT_ID" => Some("42".to_string()),
            _ => None,
        };
        let config = MonitorConfig::resolve(file, env).unwrap();
        assert_eq!(config.line_code, "11");
        assert_eq!(config.bot_token.as_deref(), Some("123:abc"));
        assert_eq!(config.chat_id.as_deref(), Some("42"));
    }

    #[test]
    fn blank_credentials_count_as_absent() {
        let env = |key: &str| match key {
            "BOT_TOKEN" => Some("   ".to_string()),
            _ => None,
        };
        let config = MonitorConfig::resolve(FileConfig::default(), env).unwrap();
        assert_eq!(config.bot_token, None);
    }

    #[test]
    fn unsupported_source_kind_is_rejected() {
        let env = |key: &str| (key == "SOURCE").then(|| "browser".to_string());
        let err = MonitorConfig::resolve(FileConfig::default(), env).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSource(s) if s == "browser"));
    }
}
