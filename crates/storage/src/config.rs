use std::time::Duration;

use crate::error::{Result, StorageError};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the PostgREST backend.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub auth_token: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_token: auth_token.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reads `TRACKER_API_URL`, `TRACKER_API_TOKEN` and the optional
    /// `TRACKER_HTTP_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = var("TRACKER_API_URL").ok_or_else(|| {
            StorageError::Config("Cannot load TRACKER_API_URL env variable".into())
        })?;
        let auth_token = var("TRACKER_API_TOKEN").ok_or_else(|| {
            StorageError::Config("Cannot load TRACKER_API_TOKEN env variable".into())
        })?;

        let timeout_secs = match var("TRACKER_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                StorageError::Config(format!(
                    "TRACKER_HTTP_TIMEOUT_SECS must be a number, got '{}'",
                    raw
                ))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let config =
            Self::new(base_url, auth_token).with_timeout(Duration::from_secs(timeout_secs));
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(StorageError::Config("base_url is required".into()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(StorageError::Config(format!(
                "base_url must start with http:// or https://, got '{}'",
                url
            )));
        }
        if self.auth_token.trim().is_empty() {
            return Err(StorageError::Config("auth_token is required".into()));
        }
        if self.timeout.is_zero() {
            return Err(StorageError::Config("timeout must be greater than zero".into()));
        }
        Ok(())
    }

    /// Base URL without trailing slashes, so resources join as `{base}/{resource}`.
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim().trim_end_matches('/')
    }
}
