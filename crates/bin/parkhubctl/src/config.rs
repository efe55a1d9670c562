//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `parkhub.toml` in the working directory (or the file named by
//! `PARKHUB_CONFIG`). Every field has a sensible default so the file is
//! optional. Environment variables take precedence over file values.

use std::fmt;

use parkhub_adapter_http_reqwest::HttpConfig;
use parkhub_adapter_socketio::SocketConfig;
use parkhub_app::services::file_storage::DEFAULT_FOLDER;
use parkhub_app::token::TokenCell;
use serde::Deserialize;

const DEFAULT_PATH: &str = "parkhub.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// REST API settings.
    pub api: HttpConfig,
    /// Real-time status feed settings.
    pub realtime: SocketConfig,
    /// Credentials.
    pub auth: AuthConfig,
    /// Image upload settings.
    pub uploads: UploadsConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Either a ready token or login credentials.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub token: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Storage folder for uploaded images.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct UploadsConfig {
    /// Sent as the multipart `path` field.
    pub folder: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `parkhub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting values fail validation.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("PARKHUB_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("PARKHUB_API_URL") {
            self.api.base_url = val;
        }
        if let Some(val) = var("PARKHUB_SOCKET_URL") {
            self.realtime.url = val;
        }
        if let Some(val) = var("PARKHUB_TOKEN") {
            self.auth.token = Some(val);
        }
        if let Some(val) = var("PARKHUB_EMAIL") {
            self.auth.email = Some(val);
        }
        if let Some(val) = var("PARKHUB_PASSWORD") {
            self.auth.password = Some(val);
        }
        if let Some(val) = var("PARKHUB_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.api.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigError::Validation(
                "api.base_url must not be empty".to_string(),
            ));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "api.base_url must be an http(s) URL, got {base_url:?}"
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "api.timeout_secs must be non-zero".to_string(),
            ));
        }
        if self.realtime.enabled {
            self.realtime
                .endpoint()
                .map_err(|err| ConfigError::Validation(err.to_string()))?;
        }
        Ok(())
    }

    /// Token cell seeded with the configured token, if any.
    #[must_use]
    pub fn token_cell(&self) -> TokenCell {
        match self.auth.token.as_deref().filter(|t| !t.is_empty()) {
            Some(token) => TokenCell::with_token(token),
            None => TokenCell::new(),
        }
    }
}

impl AuthConfig {
    /// Email and password, when both are set.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.email.as_deref(), self.password.as_deref()) {
            (Some(email), Some(password)) if !email.is_empty() => Some((email, password)),
            _ => None,
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            folder: DEFAULT_FOLDER.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "parkhubctl=info,parkhub_app=info,parkhub_adapter_socketio=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:3000/api");
        assert_eq!(config.realtime.event, "updateEstatus");
        assert_eq!(config.uploads.folder, "parking-lots");
        assert!(config.auth.token.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.api.timeout_secs, 30);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [api]
            base_url = 'https://api.example.com/api'
            timeout_secs = 5

            [realtime]
            url = 'wss://rt.example.com'
            event = 'statusChanged'
            reconnect_initial_ms = 500
            reconnect_max_ms = 8000
            enabled = false

            [auth]
            email = 'admin@example.com'
            password = 'secret'

            [uploads]
            folder = 'lots'

            [logging]
            filter = 'debug'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.api.base_url, "https://api.example.com/api");
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.realtime.event, "statusChanged");
        assert!(!config.realtime.enabled);
        assert_eq!(
            config.auth.credentials(),
            Some(("admin@example.com", "secret"))
        );
        assert_eq!(config.uploads.folder, "lots");
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.api.timeout_secs, 30);
    }

    #[test]
    fn should_apply_environment_overrides() {
        let mut config = Config::default();
        config.apply_overrides(env(&[
            ("PARKHUB_API_URL", "https://api.example.com/api"),
            ("PARKHUB_SOCKET_URL", "wss://rt.example.com"),
            ("PARKHUB_TOKEN", "jwt"),
            ("PARKHUB_LOG", "warn"),
        ]));
        assert_eq!(config.api.base_url, "https://api.example.com/api");
        assert_eq!(config.realtime.url, "wss://rt.example.com");
        assert_eq!(config.token_cell().get().as_deref(), Some("jwt"));
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn should_prefer_rust_log_over_parkhub_log() {
        let mut config = Config::default();
        config.apply_overrides(env(&[("PARKHUB_LOG", "warn"), ("RUST_LOG", "trace")]));
        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn should_reject_empty_base_url() {
        let mut config = Config::default();
        config.api.base_url = "  ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_reject_non_http_base_url() {
        let mut config = Config::default();
        config.api.base_url = "ftp://api.example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_timeout() {
        let mut config = Config::default();
        config.api.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_bad_socket_url_only_when_enabled() {
        let mut config = Config::default();
        config.realtime.url = "ftp://rt.example.com".to_string();
        assert!(config.validate().is_err());

        config.realtime.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_ignore_empty_token() {
        let mut config = Config::default();
        config.auth.token = Some(String::new());
        assert!(!config.token_cell().is_present());
    }

    #[test]
    fn should_require_both_credentials() {
        let auth = AuthConfig {
            email: Some("admin@example.com".to_string()),
            ..AuthConfig::default()
        };
        assert_eq!(auth.credentials(), None);
    }

    #[test]
    fn should_redact_secrets_in_debug_output() {
        let auth = AuthConfig {
            token: Some("jwt".to_string()),
            email: Some("admin@example.com".to_string()),
            password: Some("secret".to_string()),
        };
        let printed = format!("{auth:?}");
        assert!(!printed.contains("secret"));
        assert!(!printed.contains("jwt"));
        assert!(printed.contains("admin@example.com"));
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }
}
