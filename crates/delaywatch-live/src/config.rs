//! Live channel configuration.

use std::time::Duration;

use crate::error::{Error, Result};

/// Push endpoint used when none is configured.
pub const DEFAULT_URL: &str = "http://localhost:3001/api/sse/delays";

/// Fixed delay before retrying a dropped connection.
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_millis(3000);

/// Configuration for a [`LiveChannel`](crate::LiveChannel).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Push endpoint URL, without the access token
    pub url: String,

    /// Backoff between a transport error and the next connect attempt
    pub reconnect_interval: Duration,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
        }
    }
}

impl ChannelConfig {
    /// Create config from environment variables, falling back to defaults
    /// for anything missing or unparseable.
    pub fn from_env() -> Self {
        Self::try_from_env().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "ignoring invalid live channel environment");
            Self::default()
        })
    }

    /// Create config from environment variables.
    ///
    /// - `DELAYWATCH_SSE_URL`: push endpoint
    /// - `DELAYWATCH_RECONNECT_MS`: backoff in milliseconds
    pub fn try_from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let url = lookup("DELAYWATCH_SSE_URL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_URL.to_string());

        let reconnect_interval = match lookup("DELAYWATCH_RECONNECT_MS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|e| Error::InvalidConfig(format!("DELAYWATCH_RECONNECT_MS={raw}: {e}")))?,
            None => DEFAULT_RECONNECT_INTERVAL,
        };

        Ok(Self {
            url,
            reconnect_interval,
        })
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    #[must_use]
    pub fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }

    /// Endpoint URL with the access token appended as a `token` query
    /// parameter.
    pub fn endpoint(&self, token: Option<&str>) -> String {
        match token {
            Some(token) => {
                let sep = if self.url.contains('?') { '&' } else { '?' };
                format!("{}{}token={}", self.url, sep, urlencoding::encode(token))
            }
            None => self.url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ChannelConfig::default();
        assert_eq!(config.url, "http://localhost:3001/api/sse/delays");
        assert_eq!(config.reconnect_interval, Duration::from_millis(3000));
    }

    #[test]
    fn env_overrides_defaults() {
        let config = ChannelConfig::from_lookup(lookup(&[
            ("DELAYWATCH_SSE_URL", "https://api.example.org/sse"),
            ("DELAYWATCH_RECONNECT_MS", "500"),
        ]))
        .unwrap();
        assert_eq!(config.url, "https://api.example.org/sse");
        assert_eq!(config.reconnect_interval, Duration::from_millis(500));
    }

    #[test]
    fn empty_env_uses_defaults() {
        let config = ChannelConfig::from_lookup(lookup(&[("DELAYWATCH_SSE_URL", "  ")])).unwrap();
        assert_eq!(config, ChannelConfig::default());
    }

    #[test]
    fn bad_interval_is_rejected() {
        let err = ChannelConfig::from_lookup(lookup(&[("DELAYWATCH_RECONNECT_MS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn endpoint_appends_encoded_token() {
        let config = ChannelConfig::default();
        assert_eq!(config.endpoint(None), DEFAULT_URL);
        assert_eq!(
            config.endpoint(Some("a b/c")),
            format!("{DEFAULT_URL}?token=a%20b%2Fc")
        );

        let config = config.with_url("https://x.test/sse?region=krk");
        assert_eq!(config.endpoint(Some("t")), "https://x.test/sse?region=krk&token=t");
    }
}
