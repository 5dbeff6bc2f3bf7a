use std::{sync::Arc, time::Duration};

use reqwest::Method;
use tokio::sync::Mutex;

use crate::{
    Res,
    config::Config,
    errors::Error,
    server::start_api_server,
    spotify::{
        executor::{Silent, Throttled},
        transport::{ApiRequest, HttpTransport, Transport},
    },
    types::{Credentials, PkceState, TokenResponse},
    utils, warning,
};

/// State shared between the authorization flow and the callback handler.
pub struct AuthSession {
    pub config: Config,
    pub pkce: Mutex<Option<PkceState>>,
}

impl AuthSession {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            pkce: Mutex::new(None),
        }
    }
}

/// Runs the interactive authorization code flow (PKCE, S256).
///
/// 1. Generates the code verifier and challenge
/// 2. Starts the local callback server
/// 3. Opens the authorization URL in the browser
/// 4. Waits up to 60 seconds for the callback to complete the exchange
/// 5. Stores the credentials record and the first access token
///
/// This is the only place a refresh token gets written.
pub async fn authorize(config: Config) -> Res<()> {
    let (client_id, client_secret) = config.client_credentials()?;

    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);

    let session = Arc::new(AuthSession::new(config.clone()));
    {
        let mut lock = session.pkce.lock().await;
        *lock = Some(PkceState {
            code_verifier,
            grant: None,
        });
    }

    let server_session = Arc::clone(&session);
    tokio::spawn(async move {
        if let Err(e) = start_api_server(server_session).await {
            warning!("Callback server stopped: {}", e);
        }
    });

    let auth_url = reqwest::Url::parse_with_params(
        &config.auth_url,
        &[
            ("client_id", client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("code_challenge", code_challenge.as_str()),
            ("code_challenge_method", "S256"),
            ("scope", config.scope.as_str()),
        ],
    )
    .map_err(|e| Error::Configuration(format!("Invalid SPOTIFY_API_AUTH_URL: {}", e)))?;

    if webbrowser::open(auth_url.as_str()).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    let grant = match wait_for_grant(&session).await {
        Some(Ok(grant)) => grant,
        Some(Err(reason)) => return Err(Error::AuthProvider(reason)),
        None => {
            return Err(Error::AuthProvider(
                "authorization timed out after 60 seconds".to_string(),
            ));
        }
    };

    let refresh_token = grant.refresh_token.filter(|t| !t.is_empty()).ok_or_else(|| {
        Error::AuthProvider("token endpoint returned no refresh token".to_string())
    })?;

    let store = config.credential_store();
    store
        .save_credentials(&Credentials {
            client_id,
            client_secret,
            refresh_token,
        })
        .await?;
    if let Some(access_token) = grant.access_token {
        store.save_access_token(&access_token).await?;
    }

    Ok(())
}

async fn wait_for_grant(session: &AuthSession) -> Option<Result<TokenResponse, String>> {
    use std::time::Instant;

    let max_wait = Duration::from_secs(60);
    let start = Instant::now();

    while start.elapsed() < max_wait {
        let lock = session.pkce.lock().await;
        if let Some(grant) = lock.as_ref().and_then(|pkce| pkce.grant.clone()) {
            return Some(grant);
        }
        drop(lock);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}

/// Exchanges an authorization code for tokens.
pub async fn exchange_code(
    transport: &dyn Transport,
    config: &Config,
    code: &str,
    verifier: &str,
) -> Result<TokenResponse, String> {
    let (client_id, client_secret) = config.client_credentials().map_err(|e| e.to_string())?;

    let request = ApiRequest::new(Method::POST, &config.token_url)
        .basic_auth(&client_id, &client_secret)
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", config.redirect_uri.as_str()),
        ]);

    let response = transport
        .send(&request)
        .await
        .map_err(|e| e.to_string())?;
    let body: TokenResponse = serde_json::from_str(&response.body).map_err(|e| e.to_string())?;

    if !response.status.is_success() || body.access_token.is_none() {
        return Err(body
            .error_description
            .or(body.error)
            .unwrap_or_else(|| format!("token endpoint answered {}", response.status)));
    }

    Ok(body)
}

/// [`exchange_code`] over a real HTTP client that waits out rate limits, used
/// by the callback handler.
pub async fn exchange_code_http(
    config: &Config,
    code: &str,
    verifier: &str,
) -> Result<TokenResponse, String> {
    let transport = HttpTransport::new();
    let silent = Silent;
    let throttled = Throttled::new(&transport, &config.retry, &silent);
    exchange_code(&throttled, config, code, verifier).await
}
