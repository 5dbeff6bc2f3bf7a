use std::{io::ErrorKind, path::PathBuf};

use crate::{Res, errors::Error, types::Credentials};

const CREDENTIALS_FILE: &str = "credentials.json";
const ACCESS_TOKEN_FILE: &str = "access_token";

/// Two persisted slots: the long-lived credentials record and the raw access
/// token string.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    dir: PathBuf,
}

impl CredentialStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub async fn load_credentials(&self) -> Res<Credentials> {
        let path = self.credentials_path();
        let content = match async_fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::Configuration(format!(
                    "No stored credentials found at {}.",
                    path.display()
                )));
            }
            Err(e) => return Err(Error::Io(e)),
        };

        let credentials: Credentials = serde_json::from_str(&content).map_err(|e| {
            Error::Configuration(format!(
                "Stored credentials at {} are unreadable: {}",
                path.display(),
                e
            ))
        })?;

        if credentials.client_id.trim().is_empty() || credentials.client_secret.trim().is_empty() {
            return Err(Error::Configuration(
                "Stored credentials lack a client id or client secret.".to_string(),
            ));
        }
        if credentials.refresh_token.trim().is_empty() {
            return Err(Error::Configuration(
                "Stored credentials lack a refresh token.".to_string(),
            ));
        }

        Ok(credentials)
    }

    pub async fn save_credentials(&self, credentials: &Credentials) -> Res<()> {
        let json = serde_json::to_string_pretty(credentials)?;
        self.write(self.credentials_path(), json).await
    }

    /// Returns the cached access token, `None` when there is none yet.
    pub async fn load_access_token(&self) -> Res<Option<String>> {
        match async_fs::read_to_string(self.access_token_path()).await {
            Ok(token) => {
                let token = token.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Io(e)),
        }
    }

    pub async fn save_access_token(&self, token: &str) -> Res<()> {
        self.write(self.access_token_path(), token.to_string()).await
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.dir.join(CREDENTIALS_FILE)
    }

    pub fn access_token_path(&self) -> PathBuf {
        self.dir.join(ACCESS_TOKEN_FILE)
    }

    async fn write(&self, path: PathBuf, content: String) -> Res<()> {
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent).await?;
        }
        async_fs::write(&path, content).await?;
        Ok(())
    }
}
