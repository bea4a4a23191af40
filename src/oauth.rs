//! OAuth authorization-code flow against the platform
//!
//! The user opens [`OAuthClient::authorize_url`] in a browser, the platform
//! redirects back to the local callback listener with a `code`, and
//! [`OAuthClient::exchange_code`] trades it for a bearer token.

use reqwest::{Client, Url};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::api::HttpConfig;
use crate::config::ApiConfig;

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("Invalid OAuth URL: {0}")]
    InvalidUrl(String),

    #[error("Token request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Token exchange rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Failed to decode token response: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, OAuthError>;

/// Token endpoint answer
#[derive(Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime in seconds
    #[serde(default)]
    pub expires_in: Option<u64>,
}

impl TokenResponse {
    pub fn expires_after(&self) -> Option<Duration> {
        self.expires_in.map(Duration::from_secs)
    }
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"***")
            .field("token_type", &self.token_type)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "***"))
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Fresh `state` value for one authorization attempt
pub fn new_state() -> String {
    Uuid::new_v4().to_string()
}

pub struct OAuthClient {
    client: Client,
    base_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl OAuthClient {
    pub fn new(api: &ApiConfig, client_id: &str, client_secret: &str, redirect_uri: &str) -> Result<Self> {
        let http = HttpConfig::from(api);
        let client = Client::builder()
            .connect_timeout(http.connect_timeout)
            .timeout(http.request_timeout)
            .user_agent(&http.user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: api.oauth_base_url.trim_end_matches('/').to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            redirect_uri: redirect_uri.to_string(),
        })
    }

    /// Path the platform redirects to; `/` when the redirect URI has none
    pub fn callback_path(&self) -> Result<String> {
        let url = Url::parse(&self.redirect_uri)
            .map_err(|e| OAuthError::InvalidUrl(format!("{}: {}", self.redirect_uri, e)))?;
        Ok(match url.path() {
            "" => "/".to_string(),
            path => path.to_string(),
        })
    }

    /// Browser URL that starts the authorization
    pub fn authorize_url(&self, state: &str) -> Result<Url> {
        let base = format!("{}/oauth/authorize", self.base_url);
        Url::parse_with_params(
            &base,
            &[
                ("response_type", "code"),
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("state", state),
            ],
        )
        .map_err(|e| OAuthError::InvalidUrl(format!("{}: {}", base, e)))
    }

    /// Trade an authorization code for a token
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse> {
        let url = format!("{}/oauth/token", self.base_url);
        debug!(url = %url, "Exchanging authorization code");

        let form = [
            ("grant_type", "authorization_code"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
        ];

        let response = self.client.post(&url).form(&form).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), body = %body, "Token exchange rejected");
            return Err(OAuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| OAuthError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(redirect_uri: &str) -> OAuthClient {
        OAuthClient::new(&ApiConfig::default(), "client-1", "secret", redirect_uri).unwrap()
    }

    #[test]
    fn test_authorize_url_carries_parameters() {
        let url = client("http://localhost:5000/callback")
            .authorize_url("state-1")
            .unwrap();

        assert_eq!(url.host_str(), Some("hh.ru"));
        assert_eq!(url.path(), "/oauth/authorize");

        let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            params,
            vec![
                ("response_type".to_string(), "code".to_string()),
                ("client_id".to_string(), "client-1".to_string()),
                ("redirect_uri".to_string(), "http://localhost:5000/callback".to_string()),
                ("state".to_string(), "state-1".to_string()),
            ]
        );
        assert!(url.as_str().contains("redirect_uri=http%3A%2F%2Flocalhost%3A5000%2Fcallback"));
    }

    #[test]
    fn test_callback_path() {
        assert_eq!(
            client("http://localhost:5000/callback").callback_path().unwrap(),
            "/callback"
        );
        assert_eq!(client("http://localhost:5000").callback_path().unwrap(), "/");
        assert!(matches!(
            client("not a url").callback_path(),
            Err(OAuthError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_states_are_unique() {
        assert_ne!(new_state(), new_state());
    }

    #[test]
    fn test_token_response_parsing_and_masking() {
        let token: TokenResponse = serde_json::from_str(
            r#"{"access_token":"abc","token_type":"bearer","refresh_token":"def","expires_in":1209600}"#,
        )
        .unwrap();
        assert_eq!(token.access_token, "abc");
        assert_eq!(token.expires_after(), Some(Duration::from_secs(1_209_600)));

        let debug = format!("{:?}", token);
        assert!(!debug.contains("abc"));
        assert!(!debug.contains("def"));
    }
}
