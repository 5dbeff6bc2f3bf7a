use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::time::sleep;

use crate::{
    Res,
    errors::Error,
    management::TokenManager,
    spotify::transport::{ApiRequest, ApiResponse, Transport},
};

/// Escalation limits for rate-limited requests.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Number of 429 answers tolerated for one logical request.
    pub max_steps: u32,
    /// First wait of the exponential sequence used when `Retry-After` is absent.
    pub base_delay: Duration,
    /// `Retry-After` values above this are honoured but reported.
    pub warn_after: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_steps: 11,
            base_delay: Duration::from_secs(2),
            warn_after: Duration::from_secs(120),
        }
    }
}

/// Wait computation for consecutive 429 answers.
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: RetryPolicy,
    hits: u32,
    exponential_steps: u32,
}

impl Backoff {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            hits: 0,
            exponential_steps: 0,
        }
    }

    /// Next wait for a 429 carrying `retry_after` seconds (if any).
    ///
    /// The exponential sequence only advances when the server gives no usable
    /// `Retry-After`; every call consumes one step of the budget.
    pub fn next_wait(&mut self, retry_after: Option<u64>) -> Res<Duration> {
        if self.hits >= self.policy.max_steps {
            return Err(Error::BackoffExhausted {
                steps: self.policy.max_steps,
            });
        }
        self.hits += 1;

        match retry_after.filter(|secs| *secs > 0) {
            Some(secs) => Ok(Duration::from_secs(secs)),
            None => {
                let factor = 2u32.saturating_pow(self.exponential_steps);
                self.exponential_steps += 1;
                Ok(self.policy.base_delay.saturating_mul(factor))
            }
        }
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }
}

/// Progress hooks for the orchestrator. Every method defaults to a no-op.
pub trait Notifier: Send + Sync {
    fn rate_limited(&self, _wait: Duration, _step: u32) {}
    fn countdown(&self, _remaining: Duration) {}
    fn long_retry_after(&self, _wait: Duration) {}
    fn token_refreshed(&self) {}
    fn page_fetched(&self, _items_so_far: usize) {}
}

pub struct Silent;

impl Notifier for Silent {}

/// Sends `request` until the answer is something other than 429.
///
/// Every 429 consumes one step of `backoff`; the wait is slept in one-second
/// ticks so the notifier can show a countdown. Any other status, 401 included,
/// is handed back untouched.
pub async fn send_with_backoff(
    transport: &dyn Transport,
    request: &ApiRequest,
    backoff: &mut Backoff,
    notifier: &dyn Notifier,
) -> Res<ApiResponse> {
    loop {
        let response = transport.send(request).await?;
        if response.status != StatusCode::TOO_MANY_REQUESTS {
            return Ok(response);
        }

        let wait = backoff.next_wait(response.retry_after())?;
        if wait > backoff.policy.warn_after {
            notifier.long_retry_after(wait);
        }
        notifier.rate_limited(wait, backoff.hits());
        countdown(wait, notifier).await;
    }
}

async fn countdown(wait: Duration, notifier: &dyn Notifier) {
    let tick = Duration::from_secs(1);
    let mut remaining = wait;

    while !remaining.is_zero() {
        notifier.countdown(remaining);
        let step = remaining.min(tick);
        sleep(step).await;
        remaining -= step;
    }
}

/// [`Transport`] decorator that sleeps through rate limits but never refreshes.
///
/// Token endpoint calls go through this: a 401 from the token endpoint means
/// the grant itself is bad, so it is returned to the caller as is.
pub struct Throttled<'a> {
    inner: &'a dyn Transport,
    policy: &'a RetryPolicy,
    notifier: &'a dyn Notifier,
}

impl<'a> Throttled<'a> {
    pub fn new(inner: &'a dyn Transport, policy: &'a RetryPolicy, notifier: &'a dyn Notifier) -> Self {
        Self {
            inner,
            policy,
            notifier,
        }
    }
}

#[async_trait]
impl Transport for Throttled<'_> {
    async fn send(&self, request: &ApiRequest) -> Res<ApiResponse> {
        let mut backoff = Backoff::new(self.policy.clone());
        send_with_backoff(self.inner, request, &mut backoff, self.notifier).await
    }
}

/// Issues catalog requests, absorbing 401 and 429 answers.
///
/// Owns the [`TokenManager`] so that a rejected token can be replaced in the
/// middle of a request. Every outbound call of a run, token endpoint included,
/// passes through here.
pub struct Executor {
    transport: Box<dyn Transport>,
    tokens: TokenManager,
    policy: RetryPolicy,
    notifier: Arc<dyn Notifier>,
}

impl Executor {
    pub fn new(transport: Box<dyn Transport>, tokens: TokenManager, policy: RetryPolicy) -> Self {
        Self {
            transport,
            tokens,
            policy,
            notifier: Arc::new(Silent),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Authorized GET with token refresh enabled.
    pub async fn get(&mut self, url: &str) -> Res<ApiResponse> {
        let throttled = Throttled::new(
            self.transport.as_ref(),
            &self.policy,
            self.notifier.as_ref(),
        );
        let token = self.tokens.get_valid_token(&throttled).await?;
        self.execute(ApiRequest::get(url).bearer(token), true).await
    }

    /// Sends one logical request and returns the first answer that needs no
    /// further handling.
    ///
    /// # Arguments
    ///
    /// * `request` - The request to send; its bearer token is replaced after a refresh
    /// * `refreshable` - Whether a 401 may be answered by refreshing the access token
    ///
    /// # Returns
    ///
    /// - `Ok(ApiResponse)` - Any answer other than 429, and other than 401 when
    ///   `refreshable` is set. Error statuses (404, 5xx) are returned as answers,
    ///   callers decide what they mean.
    /// - `Err(Error::BackoffExhausted)` - More 429 answers than the policy allows
    /// - `Err(Error::AuthProvider)` - The token endpoint refused to refresh, or a
    ///   freshly refreshed token was rejected straight away
    /// - `Err(Error::Configuration)` - No stored credentials to refresh with
    /// - `Err(Error::Http)` - The request could not be sent at all
    ///
    /// # Rate Limiting
    ///
    /// - Waits `Retry-After` seconds when the header is present and non-zero
    /// - Otherwise waits the next step of the doubling sequence (2, 4, 8, ... seconds
    ///   with the default policy); the sequence only advances on this fallback
    /// - Every 429 consumes one step of the budget, shared across the whole call
    /// - Waits above [`RetryPolicy::warn_after`] are honoured and reported
    ///
    /// # Token Refresh
    ///
    /// A 401 triggers one refresh and an immediate retry. Only a 401 that
    /// follows the refresh directly is fatal; once a rate-limit wait has passed
    /// in between, the new token may have expired as well and is refreshed again.
    pub async fn execute(&mut self, mut request: ApiRequest, refreshable: bool) -> Res<ApiResponse> {
        let mut backoff = Backoff::new(self.policy.clone());
        // budget step count at the time of the last refresh
        let mut refreshed_at: Option<u32> = None;

        loop {
            let response = send_with_backoff(
                self.transport.as_ref(),
                &request,
                &mut backoff,
                self.notifier.as_ref(),
            )
            .await?;

            if response.status != StatusCode::UNAUTHORIZED || !refreshable {
                return Ok(response);
            }
            if refreshed_at == Some(backoff.hits()) {
                return Err(Error::AuthProvider(
                    "a freshly refreshed access token was rejected".to_string(),
                ));
            }

            let throttled = Throttled::new(
                self.transport.as_ref(),
                &self.policy,
                self.notifier.as_ref(),
            );
            let token = self.tokens.refresh(&throttled).await?;
            self.notifier.token_refreshed();
            request.bearer = Some(token);
            refreshed_at = Some(backoff.hits());
        }
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }
}
