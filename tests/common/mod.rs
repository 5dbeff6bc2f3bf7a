#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use reqwest::{
    StatusCode,
    header::{HeaderValue, RETRY_AFTER},
};
use serde_json::{Value, json};
use tempfile::TempDir;

use tempocli::{
    Res,
    config::Config,
    management::TokenManager,
    spotify::{
        executor::{Executor, Notifier, RetryPolicy},
        transport::{ApiRequest, ApiResponse, Transport},
    },
    types::Credentials,
};

pub const API_URL: &str = "http://catalog.test/v1";
pub const TOKEN_URL: &str = "http://accounts.test/api/token";

#[derive(Default)]
struct Script {
    routes: HashMap<String, VecDeque<ApiResponse>>,
    log: Vec<ApiRequest>,
}

/// Transport answering from per-URL queues of scripted responses.
#[derive(Clone, Default)]
pub struct FakeTransport {
    script: Arc<Mutex<Script>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, url: &str, response: ApiResponse) -> &Self {
        self.script
            .lock()
            .unwrap()
            .routes
            .entry(url.to_string())
            .or_default()
            .push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.script.lock().unwrap().log.clone()
    }

    pub fn requests_to(&self, url: &str) -> usize {
        self.requests().iter().filter(|r| r.url == url).count()
    }

    pub fn requests_containing(&self, needle: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.url.contains(needle))
            .count()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: &ApiRequest) -> Res<ApiResponse> {
        let mut script = self.script.lock().unwrap();
        script.log.push(request.clone());
        let response = script
            .routes
            .get_mut(&request.url)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| panic!("unexpected request to {}", request.url));
        Ok(response)
    }
}

/// Notifier recording every event it receives.
#[derive(Default)]
pub struct Recorder {
    pub waits: Mutex<Vec<Duration>>,
    pub countdowns: Mutex<Vec<Duration>>,
    pub refreshes: Mutex<usize>,
    pub long_waits: Mutex<Vec<Duration>>,
}

impl Notifier for Recorder {
    fn rate_limited(&self, wait: Duration, _step: u32) {
        self.waits.lock().unwrap().push(wait);
    }

    fn countdown(&self, remaining: Duration) {
        self.countdowns.lock().unwrap().push(remaining);
    }

    fn long_retry_after(&self, wait: Duration) {
        self.long_waits.lock().unwrap().push(wait);
    }

    fn token_refreshed(&self) {
        *self.refreshes.lock().unwrap() += 1;
    }
}

pub fn ok(body: Value) -> ApiResponse {
    ApiResponse::new(StatusCode::OK, body.to_string())
}

pub fn status(code: StatusCode, body: Value) -> ApiResponse {
    ApiResponse::new(code, body.to_string())
}

pub fn unauthorized() -> ApiResponse {
    status(
        StatusCode::UNAUTHORIZED,
        json!({"error": {"status": 401, "message": "The access token expired"}}),
    )
}

pub fn rate_limited(retry_after: Option<u64>) -> ApiResponse {
    let mut response = status(
        StatusCode::TOO_MANY_REQUESTS,
        json!({"error": {"status": 429, "message": "API rate limit exceeded"}}),
    );
    if let Some(secs) = retry_after {
        response
            .headers
            .insert(RETRY_AFTER, HeaderValue::from(secs));
    }
    response
}

pub fn token_granted(token: &str) -> ApiResponse {
    ok(json!({"access_token": token, "token_type": "Bearer", "expires_in": 3600}))
}

pub fn test_config(dir: &TempDir) -> Config {
    Config {
        api_url: API_URL.to_string(),
        token_url: TOKEN_URL.to_string(),
        client_id: Some("client-id".to_string()),
        client_secret: Some("client-secret".to_string()),
        data_dir: dir.path().to_path_buf(),
        ..Config::default()
    }
}

pub async fn seed_credentials(config: &Config) {
    config
        .credential_store()
        .save_credentials(&Credentials {
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            refresh_token: "refresh-me".to_string(),
        })
        .await
        .unwrap();
}

pub async fn seed_access_token(config: &Config, token: &str) {
    config
        .credential_store()
        .save_access_token(token)
        .await
        .unwrap();
}

pub fn executor(config: &Config, transport: &FakeTransport) -> Executor {
    executor_with_policy(config, transport, config.retry.clone())
}

pub fn executor_with_policy(
    config: &Config,
    transport: &FakeTransport,
    policy: RetryPolicy,
) -> Executor {
    let tokens = TokenManager::new(config.credential_store(), config.token_url.clone());
    Executor::new(Box::new(transport.clone()), tokens, policy)
}

/// Playlist/library item in the shape Spotify returns.
pub fn track_item(id: &str, name: &str, artists: &[&str]) -> Value {
    json!({
        "added_at": "2024-01-01T00:00:00Z",
        "track": {
            "id": id,
            "name": name,
            "artists": artists.iter().map(|a| json!({"name": a})).collect::<Vec<_>>(),
        }
    })
}

pub fn page(items: Vec<Value>, next: Option<&str>) -> ApiResponse {
    ok(json!({
        "items": items,
        "next": next,
        "total": null,
    }))
}
