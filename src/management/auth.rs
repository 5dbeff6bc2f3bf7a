use reqwest::Method;

use crate::{
    Res,
    errors::Error,
    management::CredentialStore,
    spotify::transport::{ApiRequest, Transport},
    types::TokenResponse,
};

/// Hands out access tokens, exchanging the stored refresh token when needed.
///
/// Expiry is never tracked locally. A token is considered valid until the API
/// answers 401, at which point the executor asks for [`TokenManager::refresh`].
///
/// # Lookup Order
///
/// [`TokenManager::get_valid_token`] tries, in order:
/// 1. The token held in memory from an earlier call
/// 2. The `access_token` file in the data directory
/// 3. A refresh-token grant against the token endpoint
///
/// # Storage
///
/// Every token obtained through a refresh is written back to the
/// `access_token` file, so the next process starts with it. The credentials
/// record itself is read only; it is written by `tempocli auth` alone.
///
/// # Transport
///
/// The manager never owns an HTTP client. Callers pass the transport to use,
/// which in a run is the executor's rate-limited
/// [`Throttled`](crate::spotify::executor::Throttled) view, so a 429 from the
/// token endpoint is waited out like any other.
///
/// # Errors
///
/// - `Error::Configuration` - No credentials record, or one missing a field
/// - `Error::AuthProvider` - The token endpoint refused the refresh token
/// - `Error::BackoffExhausted` - The token endpoint kept rate limiting
pub struct TokenManager {
    store: CredentialStore,
    token_url: String,
    access_token: Option<String>,
}

impl TokenManager {
    pub fn new(store: CredentialStore, token_url: impl Into<String>) -> Self {
        TokenManager {
            store,
            token_url: token_url.into(),
            access_token: None,
        }
    }

    pub async fn get_valid_token(&mut self, transport: &dyn Transport) -> Res<String> {
        if let Some(token) = &self.access_token {
            return Ok(token.clone());
        }

        if let Some(token) = self.store.load_access_token().await? {
            self.access_token = Some(token.clone());
            return Ok(token);
        }

        self.refresh(transport).await
    }

    /// Exchanges the refresh token for a new access token, skipping any
    /// cached one, and persists the result.
    pub async fn refresh(&mut self, transport: &dyn Transport) -> Res<String> {
        let credentials = self.store.load_credentials().await?;

        let request = ApiRequest::new(Method::POST, &self.token_url)
            .basic_auth(&credentials.client_id, &credentials.client_secret)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", credentials.refresh_token.as_str()),
            ]);

        let response = transport.send(&request).await?;
        let body: TokenResponse = serde_json::from_str(&response.body).unwrap_or_default();

        let access_token = match body.access_token.filter(|t| !t.is_empty()) {
            Some(token) if response.status.is_success() => token,
            _ => {
                let reason = body
                    .error_description
                    .or(body.error)
                    .unwrap_or_else(|| format!("token endpoint answered {}", response.status));
                return Err(Error::AuthProvider(reason));
            }
        };

        self.store.save_access_token(&access_token).await?;
        self.access_token = Some(access_token.clone());

        Ok(access_token)
    }

    pub fn current_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }
}
