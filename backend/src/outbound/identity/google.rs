//! Reqwest-backed Google OAuth 2.0 / OpenID Connect client.
//!
//! This adapter owns transport details only: building the authorisation
//! redirect, exchanging the code at the token endpoint, fetching userinfo
//! with the access token, and mapping HTTP failures to port errors.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;
use zeroize::Zeroizing;

use super::dto::{TokenResponseDto, UserInfoDto};
use crate::domain::ports::{IdentityProviderClient, IdentityProviderError};
use crate::domain::{AuthorizationCode, FederatedProfile, OAuthState};

const DEFAULT_AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const DEFAULT_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const DEFAULT_USERINFO_ENDPOINT: &str = "https://openidconnect.googleapis.com/v1/userinfo";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const SCOPES: &str = "openid profile email";

/// Explicit client configuration injected at construction.
#[derive(Clone)]
pub struct GoogleOAuthConfig {
    /// OAuth client identifier.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: Zeroizing<String>,
    /// Redirect URI registered with Google.
    pub callback_url: Url,
    /// Authorisation endpoint.
    pub auth_endpoint: Url,
    /// Token endpoint.
    pub token_endpoint: Url,
    /// Userinfo endpoint.
    pub userinfo_endpoint: Url,
    /// Per-request timeout for token and userinfo calls.
    pub timeout: Duration,
}

impl GoogleOAuthConfig {
    /// Configuration against Google's public endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if the built-in endpoint URLs fail to parse.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        callback_url: Url,
    ) -> Result<Self, url::ParseError> {
        Ok(Self {
            client_id: client_id.into(),
            client_secret: Zeroizing::new(client_secret.into()),
            callback_url,
            auth_endpoint: Url::parse(DEFAULT_AUTH_ENDPOINT)?,
            token_endpoint: Url::parse(DEFAULT_TOKEN_ENDPOINT)?,
            userinfo_endpoint: Url::parse(DEFAULT_USERINFO_ENDPOINT)?,
            timeout: DEFAULT_TIMEOUT,
        })
    }
}

impl fmt::Debug for GoogleOAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleOAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("callback_url", &self.callback_url.as_str())
            .field("auth_endpoint", &self.auth_endpoint.as_str())
            .field("token_endpoint", &self.token_endpoint.as_str())
            .field("userinfo_endpoint", &self.userinfo_endpoint.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Google identity provider client.
pub struct GoogleIdentityProvider {
    client: Client,
    config: GoogleOAuthConfig,
}

impl GoogleIdentityProvider {
    /// Build a client with the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: GoogleOAuthConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    async fn fetch_access_token(
        &self,
        code: &AuthorizationCode,
    ) -> Result<Zeroizing<String>, IdentityProviderError> {
        let response = self
            .client
            .post(self.config.token_endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code.expose()),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.callback_url.as_str()),
            ])
            .send()
            .await
            .map_err(map_transport_error)?;
        let token: TokenResponseDto = decode_response(response).await?;
        Ok(Zeroizing::new(token.access_token))
    }

    async fn fetch_userinfo(&self, access_token: &str) -> Result<UserInfoDto, IdentityProviderError> {
        let response = self
            .client
            .get(self.config.userinfo_endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(map_transport_error)?;
        decode_response(response).await
    }
}

#[async_trait]
impl IdentityProviderClient for GoogleIdentityProvider {
    fn authorization_url(&self, state: &OAuthState) -> Url {
        build_authorization_url(&self.config, state)
    }

    async fn exchange(
        &self,
        code: &AuthorizationCode,
    ) -> Result<FederatedProfile, IdentityProviderError> {
        let access_token = self.fetch_access_token(code).await?;
        let userinfo = self.fetch_userinfo(access_token.as_str()).await?;
        userinfo
            .into_profile()
            .map_err(IdentityProviderError::invalid_profile)
    }
}

fn build_authorization_url(config: &GoogleOAuthConfig, state: &OAuthState) -> Url {
    let mut url = config.auth_endpoint.clone();
    url.query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("client_id", &config.client_id)
        .append_pair("redirect_uri", config.callback_url.as_str())
        .append_pair("scope", SCOPES)
        .append_pair("prompt", "select_account")
        .append_pair("state", state.as_str());
    url
}

async fn decode_response<T>(response: reqwest::Response) -> Result<T, IdentityProviderError>
where
    T: DeserializeOwned,
{
    let status = response.status();
    let body = response.bytes().await.map_err(map_transport_error)?;
    if !status.is_success() {
        return Err(map_status_error(status, body.as_ref()));
    }
    serde_json::from_slice(body.as_ref()).map_err(|error| {
        IdentityProviderError::decode(format!("invalid identity provider JSON: {error}"))
    })
}

fn map_transport_error(error: reqwest::Error) -> IdentityProviderError {
    IdentityProviderError::transport(error.without_url().to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> IdentityProviderError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
            IdentityProviderError::transport(message)
        }
        _ if status.is_client_error() => IdentityProviderError::rejected(message),
        _ => IdentityProviderError::transport(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
