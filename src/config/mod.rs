//! Configuration management

use serde::{Deserialize, Serialize};
use std::env;

use crate::api::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// API Token (preferred authentication method)
    pub api_token: Option<String>,

    /// Global API Key (legacy)
    pub api_key: Option<String>,

    /// Email for Global API Key auth
    pub api_email: Option<String>,

    /// Origin CA user service key
    pub user_service_key: Option<String>,

    /// Default account ID
    pub account_id: Option<String>,

    /// Default zone ID
    pub zone_id: Option<String>,

    /// API base URL, without trailing slash
    pub base_url: String,

    /// Output format
    pub output_format: OutputFormat,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Compact,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "compact" => OutputFormat::Compact,
            _ => OutputFormat::Table,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn load() -> Result<Self> {
        let config = Self::load_optional();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration without checking credentials
    pub fn load_optional() -> Self {
        let non_empty = |key: &str| env::var(key).ok().filter(|v| !v.is_empty());

        Self {
            api_token: non_empty("CF_API_TOKEN"),
            api_key: non_empty("CF_API_KEY"),
            api_email: non_empty("CF_API_EMAIL"),
            user_service_key: non_empty("CF_API_USER_SERVICE_KEY"),
            account_id: non_empty("CF_ACCOUNT_ID"),
            zone_id: non_empty("CF_ZONE_ID"),
            base_url: non_empty("CF_API_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            output_format: OutputFormat::parse(&env::var("CF_OUTPUT_FORMAT").unwrap_or_default()),
        }
    }

    /// Config authenticating with an API token
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            api_token: Some(token.into()),
            base_url: DEFAULT_BASE_URL.to_string(),
            ..Default::default()
        }
    }

    /// Point the client at another API root (used against mock servers).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Exactly one credential style must be configured.
    pub fn validate(&self) -> Result<()> {
        if self.api_token.is_some() && (self.api_key.is_some() || self.api_email.is_some()) {
            return Err(Error::ApiKeysAndTokensMutuallyExclusive);
        }

        let has_key_pair = self.api_key.is_some() && self.api_email.is_some();
        if self.api_token.is_none() && !has_key_pair && self.user_service_key.is_none() {
            return Err(Error::MissingCredentials);
        }

        url::Url::parse(&self.base_url)?;
        Ok(())
    }

    /// Get the authentication headers for API requests
    pub fn auth_headers(&self) -> Vec<(&'static str, String)> {
        if let Some(ref token) = self.api_token {
            vec![("Authorization", format!("Bearer {}", token))]
        } else if let (Some(ref key), Some(ref email)) = (&self.api_key, &self.api_email) {
            vec![("X-Auth-Key", key.clone()), ("X-Auth-Email", email.clone())]
        } else if let Some(ref key) = self.user_service_key {
            vec![("X-Auth-User-Service-Key", key.clone())]
        } else {
            vec![]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_and_key_are_mutually_exclusive() {
        let config = Config {
            api_key: Some("key".into()),
            api_email: Some("me@example.com".into()),
            ..Config::with_token("token")
        };
        assert!(matches!(
            config.validate(),
            Err(Error::ApiKeysAndTokensMutuallyExclusive)
        ));
    }

    #[test]
    fn requires_some_credentials() {
        let config = Config::with_token("t");
        assert!(config.validate().is_ok());

        let config = Config {
            api_token: None,
            api_key: Some("key".into()),
            ..Config::with_token("t")
        };
        assert!(matches!(config.validate(), Err(Error::MissingCredentials)));
    }

    #[test]
    fn auth_headers_follow_credential_style() {
        assert_eq!(
            Config::with_token("abc").auth_headers(),
            vec![("Authorization", "Bearer abc".to_string())]
        );

        let config = Config {
            api_key: Some("k".into()),
            api_email: Some("e".into()),
            base_url: DEFAULT_BASE_URL.into(),
            ..Default::default()
        };
        assert_eq!(
            config.auth_headers(),
            vec![("X-Auth-Key", "k".to_string()), ("X-Auth-Email", "e".to_string())]
        );
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let config = Config::with_token("t").base_url("http://127.0.0.1:8080/");
        assert_eq!(config.base_url, "http://127.0.0.1:8080");
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let config = Config::with_token("t").base_url("not a url");
        assert!(matches!(config.validate(), Err(Error::InvalidBaseUrl(_))));
    }

    #[test]
    fn parses_output_format() {
        assert_eq!(OutputFormat::parse("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("compact"), OutputFormat::Compact);
        assert_eq!(OutputFormat::parse(""), OutputFormat::Table);
    }
}
