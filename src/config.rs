use crate::error::AppError;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base address every API path is joined onto, without a trailing slash.
    pub api_url: String,
    /// Where the session token and cached profile are persisted.
    pub session_file: PathBuf,
    /// Per-request timeout. `None` keeps the transport default.
    pub request_timeout: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let request_timeout = match env::var("REQUEST_TIMEOUT_SECS") {
            Ok(raw) => Some(Duration::from_secs(raw.trim().parse().map_err(|_| {
                AppError::Config(format!(
                    "REQUEST_TIMEOUT_SECS must be a number of seconds, got '{}'",
                    raw
                ))
            })?)),
            Err(_) => None,
        };

        Ok(Self {
            api_url: normalize_base_url(
                &env::var("API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            ),
            session_file: env::var("SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_session_file()),
            request_timeout,
        })
    }

    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = normalize_base_url(api_url);
        self
    }

    pub fn with_session_file(mut self, session_file: impl Into<PathBuf>) -> Self {
        self.session_file = session_file.into();
        self
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn default_session_file() -> PathBuf {
    let base = env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."));
    base.join(".taskforge").join("session.json")
}
