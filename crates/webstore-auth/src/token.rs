use crate::{Error, Result};
use serde::Deserialize;
use webstore_core::{AccessToken, Account};

/// OAuth scope granting access to the Chrome Web Store API
pub const WEBSTORE_SCOPE: &str = "https://www.googleapis.com/auth/chromewebstore";

/// Build the consent URL the user has to visit
pub fn authorization_url(auth_url: &str, client_id: &str, redirect_uri: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("response_type", "code")
        .append_pair("scope", WEBSTORE_SCOPE)
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", redirect_uri)
        .finish();

    format!("{}?{}", auth_url, query)
}

// Raw token endpoint response; Google reports failures in-band
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

/// Client for the OAuth token endpoint
#[derive(Debug, Clone)]
pub struct TokenClient {
    http: reqwest::Client,
    token_url: String,
}

impl TokenClient {
    pub fn new(token_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), token_url)
    }

    pub fn with_client(http: reqwest::Client, token_url: impl Into<String>) -> Self {
        Self {
            http,
            token_url: token_url.into(),
        }
    }

    /// Exchange an authorization code for an access token
    pub async fn exchange_code(
        &self,
        account: &Account,
        code: &str,
        redirect_uri: &str,
    ) -> Result<AccessToken> {
        tracing::info!("Requesting access token for account '{}'", account.name);

        self.request_token(&[
            ("client_id", account.client_id.as_str()),
            ("client_secret", account.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri),
        ])
        .await
    }

    /// Trade a stored refresh token for a new access token
    pub async fn refresh(&self, account: &Account, refresh_token: &str) -> Result<AccessToken> {
        tracing::info!("Refreshing access token for account '{}'", account.name);

        self.request_token(&[
            ("client_id", account.client_id.as_str()),
            ("client_secret", account.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ])
        .await
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<AccessToken> {
        let resp = self.http.post(&self.token_url).form(form).send().await?;

        let status = resp.status();
        let body = resp.text().await?;
        tracing::debug!("Token endpoint answered {}", status);

        parse_token_response(&body)
    }
}

/// Interpret a token endpoint body.
///
/// The HTTP status is not consulted: a non-empty `error` field is the failure
/// signal, and its absence must come with an `access_token`.
pub(crate) fn parse_token_response(body: &str) -> Result<AccessToken> {
    let parsed: TokenResponse =
        serde_json::from_str(body).map_err(|_| Error::InvalidResponse(body.to_string()))?;

    if parsed.error.as_ref().is_some_and(is_present) {
        tracing::error!("Error during access token request");
        tracing::error!("{}", body);
        return Err(Error::Provider(body.to_string()));
    }

    match parsed.access_token {
        Some(token) if !token.is_empty() => Ok(AccessToken::new(token)),
        _ => Err(Error::InvalidResponse(body.to_string())),
    }
}

fn is_present(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::String(s) => !s.is_empty(),
        _ => true,
    }
}
