//! Runtime configuration loaded via OrthoConfig.
//!
//! Values come from CLI flags, `TRAVEL_*` / `GOOGLE_OAUTH_*` environment
//! variables or a config file, in that precedence. Session cookie settings
//! are handled separately by `inbound::http::session_config` because the key
//! is read from a mounted secret.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::outbound::identity::GoogleOAuthConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_LOGIN_PATH: &str = "/login";
const DEFAULT_CALLBACK_URL: &str = "http://localhost:8080/auth/google/redirect";

/// Errors raised while turning raw settings into typed configuration.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("invalid URL for {name}: {source}")]
    Url {
        name: &'static str,
        #[source]
        source: url::ParseError,
    },
    /// Only one half of the OAuth client credentials was supplied.
    #[error("GOOGLE_OAUTH_CLIENT_ID and GOOGLE_OAUTH_CLIENT_SECRET must be set together")]
    PartialGoogleCredentials,
}

/// Server settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "TRAVEL")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string. Without it accounts live in memory.
    pub database_url: Option<String>,
    /// Where the access gate sends unauthenticated browsers.
    pub login_path: Option<String>,
    /// bcrypt work factor for new hashes.
    #[ortho_config(default = 12)]
    pub bcrypt_cost: u32,
    /// Deadline for each credential store call, in milliseconds.
    #[ortho_config(default = 5000)]
    pub store_timeout_ms: u64,
}

impl ServerSettings {
    /// Configured bind address, falling back to `0.0.0.0:8080`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::BindAddr`] when the value does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|source| SettingsError::BindAddr {
            value: raw.to_owned(),
            source,
        })
    }

    pub fn login_path(&self) -> &str {
        self.login_path.as_deref().unwrap_or(DEFAULT_LOGIN_PATH)
    }

    pub const fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    /// Database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// Google OAuth client settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "GOOGLE_OAUTH")]
pub struct GoogleOAuthSettings {
    /// Set to `false` to turn federated login off even when credentials
    /// are present.
    #[ortho_config(default = true)]
    pub enabled: bool,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Redirect URI registered with Google.
    pub callback_url: Option<String>,
    pub auth_endpoint: Option<String>,
    pub token_endpoint: Option<String>,
    pub userinfo_endpoint: Option<String>,
}

fn parse_url(name: &'static str, raw: &str) -> Result<Url, SettingsError> {
    Url::parse(raw).map_err(|source| SettingsError::Url { name, source })
}

impl GoogleOAuthSettings {
    /// Provider configuration, or `None` when federated login is disabled.
    ///
    /// # Errors
    ///
    /// Fails when only one of client id and secret is set or a URL is
    /// malformed.
    pub fn to_oauth_config(&self) -> Result<Option<GoogleOAuthConfig>, SettingsError> {
        if !self.enabled {
            return Ok(None);
        }
        let present = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
        };
        let (client_id, client_secret) =
            match (present(&self.client_id), present(&self.client_secret)) {
                (Some(id), Some(secret)) => (id, secret),
                (None, None) => return Ok(None),
                _ => return Err(SettingsError::PartialGoogleCredentials),
            };

        let callback_url = parse_url(
            "GOOGLE_OAUTH_CALLBACK_URL",
            self.callback_url.as_deref().unwrap_or(DEFAULT_CALLBACK_URL),
        )?;
        let mut config = GoogleOAuthConfig::new(client_id, client_secret, callback_url)
            .map_err(|source| SettingsError::Url {
                name: "google endpoint",
                source,
            })?;
        if let Some(raw) = &self.auth_endpoint {
            config.auth_endpoint = parse_url("GOOGLE_OAUTH_AUTH_ENDPOINT", raw)?;
        }
        if let Some(raw) = &self.token_endpoint {
            config.token_endpoint = parse_url("GOOGLE_OAUTH_TOKEN_ENDPOINT", raw)?;
        }
        if let Some(raw) = &self.userinfo_endpoint {
            config.userinfo_endpoint = parse_url("GOOGLE_OAUTH_USERINFO_ENDPOINT", raw)?;
        }
        Ok(Some(config))
    }
}
