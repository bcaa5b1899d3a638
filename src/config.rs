use crate::utils::constants::{DEFAULT_DOWNSTREAM_URL, DEFAULT_PORT};
use crate::utils::get_env::get_optional_env_var;
use crate::utils::urls::to_url;
use anyhow::{Context, Error, anyhow};
use std::time::Duration;
use url::Url;

pub const PORT_VAR: &str = "PORT";
pub const DOWNSTREAM_URL_VAR: &str = "FASTAPI_URL";
pub const DOWNSTREAM_TIMEOUT_VAR: &str = "DOWNSTREAM_TIMEOUT_SECS";

/// Process-wide settings, read once at startup and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub port: u16,
    pub downstream_base_url: Url,
    /// `None` keeps the outbound call unbounded.
    pub downstream_timeout: Option<Duration>,
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(get_optional_env_var)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup(PORT_VAR) {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("{} must be a port number, got {:?}", PORT_VAR, raw))?,
            None => DEFAULT_PORT,
        };

        let raw_url = lookup(DOWNSTREAM_URL_VAR).unwrap_or_else(|| DEFAULT_DOWNSTREAM_URL.to_string());
        let downstream_base_url = to_url(&raw_url)
            .with_context(|| format!("{} is not a valid URL: {:?}", DOWNSTREAM_URL_VAR, raw_url))?;
        if !matches!(downstream_base_url.scheme(), "http" | "https") {
            return Err(anyhow!(
                "{} must use http or https, got {:?}",
                DOWNSTREAM_URL_VAR,
                raw_url
            ));
        }

        let downstream_timeout = lookup(DOWNSTREAM_TIMEOUT_VAR)
            .map(|raw| {
                raw.parse::<u64>()
                    .map(Duration::from_secs)
                    .with_context(|| {
                        format!("{} must be a whole number of seconds, got {:?}", DOWNSTREAM_TIMEOUT_VAR, raw)
                    })
            })
            .transpose()?;

        Ok(Self {
            port,
            downstream_base_url,
            downstream_timeout,
        })
    }
}

#[cfg(test)]
mod cfg_tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = RelayConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.downstream_base_url.as_str(), "http://localhost:8000/");
        assert!(config.downstream_timeout.is_none());
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = RelayConfig::from_lookup(lookup_from(&[
            ("PORT", "8080"),
            ("FASTAPI_URL", "https://ai.internal:9000/v1"),
            ("DOWNSTREAM_TIMEOUT_SECS", "30"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.downstream_base_url.as_str(), "https://ai.internal:9000/v1");
        assert_eq!(config.downstream_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(RelayConfig::from_lookup(lookup_from(&[("PORT", "http")])).is_err());
        assert!(RelayConfig::from_lookup(lookup_from(&[("PORT", "70000")])).is_err());
        assert!(RelayConfig::from_lookup(lookup_from(&[("FASTAPI_URL", "not a url")])).is_err());
        assert!(RelayConfig::from_lookup(lookup_from(&[("FASTAPI_URL", "ftp://files.local")])).is_err());
        assert!(
            RelayConfig::from_lookup(lookup_from(&[("DOWNSTREAM_TIMEOUT_SECS", "soon")])).is_err()
        );
    }
}
