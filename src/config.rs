//! Configuration management for tempocli.
//!
//! Values come from environment variables, optionally provided through a
//! `.env` file in the local data directory. They are collected once into a
//! [`Config`] that is handed to every component that needs it.
//!
//! The lookup order is:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Defaults pointing at the public Spotify endpoints

use std::{env, path::PathBuf, time::Duration};

use crate::{
    Res,
    errors::Error,
    management::CredentialStore,
    spotify::executor::RetryPolicy,
};

pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";
pub const DEFAULT_SCOPE: &str = "playlist-read-private playlist-read-collaborative user-library-read";

/// Loads environment variables from `.env` in the local data directory.
///
/// Creates the directory if needed. A missing `.env` file is not an error,
/// plain environment variables work just as well.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/tempocli/.env`
/// - macOS: `~/Library/Application Support/tempocli/.env`
/// - Windows: `%LOCALAPPDATA%/tempocli/.env`
pub async fn load_env() -> Result<(), String> {
    let mut path = default_data_dir();
    path.push(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

pub fn default_data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("tempocli");
    path
}

/// Runtime configuration, built once at startup and passed down explicitly.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub auth_url: String,
    pub token_url: String,
    pub redirect_uri: String,
    pub scope: String,
    pub server_addr: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub data_dir: PathBuf,
    pub retry: RetryPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            server_addr: DEFAULT_SERVER_ADDRESS.to_string(),
            client_id: None,
            client_secret: None,
            data_dir: default_data_dir(),
            retry: RetryPolicy::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    ///
    /// Blank values count as unset. An unparsable `TEMPOCLI_MAX_BACKOFF_STEPS`
    /// falls back to the default step count.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let mut retry = defaults.retry.clone();
        if let Some(steps) = get("TEMPOCLI_MAX_BACKOFF_STEPS").and_then(|s| s.parse().ok()) {
            retry.max_steps = steps;
        }
        if let Some(base) = get("TEMPOCLI_BACKOFF_BASE_SECS").and_then(|s| s.parse().ok()) {
            retry.base_delay = Duration::from_secs(base);
        }

        Self {
            api_url: get("SPOTIFY_API_URL").unwrap_or(defaults.api_url),
            auth_url: get("SPOTIFY_API_AUTH_URL").unwrap_or(defaults.auth_url),
            token_url: get("SPOTIFY_API_TOKEN_URL").unwrap_or(defaults.token_url),
            redirect_uri: get("SPOTIFY_API_REDIRECT_URI").unwrap_or(defaults.redirect_uri),
            scope: get("SPOTIFY_API_AUTH_SCOPE").unwrap_or(defaults.scope),
            server_addr: get("SERVER_ADDRESS").unwrap_or(defaults.server_addr),
            client_id: get("SPOTIFY_API_AUTH_CLIENT_ID"),
            client_secret: get("SPOTIFY_API_AUTH_CLIENT_SECRET"),
            data_dir: get("TEMPOCLI_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            retry,
        }
    }

    /// Client id and secret, required to start the authorization flow.
    pub fn client_credentials(&self) -> Res<(String, String)> {
        match (&self.client_id, &self.client_secret) {
            (Some(id), Some(secret)) => Ok((id.clone(), secret.clone())),
            (None, _) => Err(Error::Configuration(
                "SPOTIFY_API_AUTH_CLIENT_ID is not set.".to_string(),
            )),
            (_, None) => Err(Error::Configuration(
                "SPOTIFY_API_AUTH_CLIENT_SECRET is not set.".to_string(),
            )),
        }
    }

    pub fn credential_store(&self) -> CredentialStore {
        CredentialStore::new(self.data_dir.clone())
    }

    pub fn cache_path(&self) -> PathBuf {
        self.data_dir.join("cache").join("analysis.json")
    }
}
