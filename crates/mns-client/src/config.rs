//! Client configuration and credentials.
//!
//! The client accepts, at construction, exactly an endpoint, a set of
//! credentials, and an optional tuning configuration. It never reads
//! configuration files or the process environment; wiring those up is the
//! caller's concern.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Account credentials used to sign every outgoing request.
///
/// Immutable once constructed and owned exclusively by the transport.
#[derive(Clone)]
pub struct Credentials {
    access_id: String,
    access_key: String,
    security_token: Option<String>,
}

impl Credentials {
    /// Create credentials from an access id and access key.
    pub fn new(access_id: impl Into<String>, access_key: impl Into<String>) -> Self {
        Self {
            access_id: access_id.into(),
            access_key: access_key.into(),
            security_token: None,
        }
    }

    /// Attach a temporary STS security token.
    pub fn with_security_token(mut self, token: impl Into<String>) -> Self {
        self.security_token = Some(token.into());
        self
    }

    /// Get the access id.
    pub fn access_id(&self) -> &str {
        &self.access_id
    }

    pub(crate) fn access_key(&self) -> &str {
        &self.access_key
    }

    pub(crate) fn security_token(&self) -> Option<&str> {
        self.security_token.as_deref()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_id", &self.access_id)
            .field("access_key", &"<redacted>")
            .field(
                "security_token",
                &self.security_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Tuning configuration for client behavior.
///
/// Controls timeouts, retry behavior, and the user agent reported to the
/// service.
///
/// # Examples
///
/// ```
/// use mns_client::config::{ClientConfig, RetryPolicy};
/// use std::time::Duration;
///
/// let config = ClientConfig::default()
///     .with_request_timeout(Duration::from_secs(60))
///     .with_retry(RetryPolicy::new(3));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Request timeout, excluding any server-side long-poll wait window.
    pub request_timeout: Duration,
    /// Connection establishment timeout.
    pub connect_timeout: Duration,
    /// User agent string reported on every request.
    pub user_agent: String,
    /// Retry policy for transient failures.
    pub retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: "mns-client/0.1.0".to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Set the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

// ============================================================================
// Retry Policy
// ============================================================================

/// Retry policy for transient errors.
///
/// Controls exponential backoff retry behavior. Retries are disabled by
/// default: the service contract does not mandate client-side retries, so
/// enabling them is an explicit caller decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts.
    pub max_retries: u32,

    /// Initial delay before the first retry.
    pub initial_delay: Duration,

    /// Maximum delay between retries.
    pub max_delay: Duration,

    /// Backoff multiplier (e.g. 2.0 for doubling).
    pub backoff_multiplier: f64,

    /// Whether to add jitter to delays.
    pub use_jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            use_jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Create a retry policy allowing `max_retries` additional attempts.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Enable jitter (random variation) in retry delays.
    ///
    /// Jitter helps prevent thundering herd problems when multiple clients
    /// retry simultaneously. Adds ±25% randomization to calculated delays.
    pub fn with_jitter(mut self) -> Self {
        self.use_jitter = true;
        self
    }

    /// Disable jitter (no random variation) in retry delays.
    ///
    /// Use this for deterministic testing or when precise timing is required.
    pub fn without_jitter(mut self) -> Self {
        self.use_jitter = false;
        self
    }

    /// Calculate delay for a specific retry attempt.
    ///
    /// Uses exponential backoff with optional jitter. Attempt numbers start
    /// at 1 for the first retry; attempt 0 yields no delay.
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::from_secs(0);
        }

        let multiplier = self.backoff_multiplier.powi(attempt as i32 - 1);
        let delay_ms = (self.initial_delay.as_millis() as f64 * multiplier) as u64;
        let mut delay = Duration::from_millis(delay_ms);

        if delay > self.max_delay {
            delay = self.max_delay;
        }

        if self.use_jitter {
            use rand::Rng;
            let jitter_factor = rand::thread_rng().gen_range(0.75..=1.25);
            delay = Duration::from_millis((delay.as_millis() as f64 * jitter_factor) as u64);
        }

        delay
    }

    /// Check if another retry attempt should be made.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
