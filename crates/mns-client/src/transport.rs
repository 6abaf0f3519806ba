//! HTTP transport: request signing, sending, and reply classification.
//!
//! The transport owns the endpoint, the credentials, and the HTTP connection
//! pool. It treats operations as opaque: what to send and how to interpret a
//! success reply is delegated to the operation's request/response pair, and
//! non-success replies are mapped to typed errors via the codec. Signing
//! state is built per request, so a single transport is safe to share across
//! concurrent tasks.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use bytes::Bytes;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::Method;
use sha1::Sha1;
use url::Url;

use crate::codec;
use crate::config::{ClientConfig, Credentials};
use crate::error::MnsError;
use crate::ops::{ApiRequest, ApiResponse};

/// Wire protocol version sent with every request.
pub(crate) const MNS_API_VERSION: &str = "2015-06-06";

const CONTENT_TYPE_XML: &str = "text/xml";

// ============================================================================
// Raw Request/Response Parts
// ============================================================================

/// An operation lowered to its wire parts, ready for signing and sending.
#[derive(Debug, Clone)]
pub struct RequestParts {
    pub method: Method,
    /// Path plus query string, e.g. `/queues/orders/messages?waitseconds=30`.
    /// Doubles as the canonicalized resource in the request signature.
    pub resource: String,
    /// Operation-specific `x-mns-*` headers.
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    /// Additional server-side wait (long-poll window) to add on top of the
    /// configured request timeout.
    pub extra_wait: Option<Duration>,
}

/// A raw reply: status, lowercased headers, and body bytes.
#[derive(Debug, Clone)]
pub struct ResponseParts {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl ResponseParts {
    /// Get a reply header by its lowercased name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Request id assigned by the server.
    pub fn request_id(&self) -> Option<&str> {
        self.header("x-mns-request-id")
    }

    /// Resource URL reported on creation replies.
    pub fn location(&self) -> Option<&str> {
        self.header("location")
    }
}

/// Seam between typed operations and the wire.
///
/// Production code uses [`HttpTransport`]; tests substitute a scripted
/// implementation to exercise handles without a network.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one signed request and return the raw reply.
    async fn execute(&self, request: RequestParts) -> Result<ResponseParts, MnsError>;
}

/// Send a typed operation through a transport.
///
/// Validates client-side first (failing fast with no network call), encodes
/// the request, and decodes either the typed response or the structured
/// error body.
pub(crate) async fn send_request<R: ApiRequest>(
    transport: &dyn Transport,
    request: &R,
) -> Result<R::Response, MnsError> {
    request.validate()?;

    let parts = RequestParts {
        method: request.method(),
        resource: request.resource(),
        headers: request
            .mns_headers()
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect(),
        body: request.body()?,
        extra_wait: request.extra_wait(),
    };

    let response = transport.execute(parts).await?;
    if (200..300).contains(&response.status) {
        <R::Response as ApiResponse>::decode(&response)
    } else {
        Err(codec::decode_error(
            response.status,
            response.request_id(),
            &response.body,
        ))
    }
}

// ============================================================================
// Request Signing
// ============================================================================

/// Build the canonical string covered by the request signature.
///
/// Layout per the service contract:
/// `VERB\nContent-MD5\nContent-Type\nDate\nCanonicalizedMNSHeaders CanonicalizedResource`.
/// The Content-MD5 slot is left empty; the service accepts unsummed bodies.
pub(crate) fn string_to_sign(
    method: &Method,
    content_type: &str,
    date: &str,
    canonical_headers: &str,
    resource: &str,
) -> String {
    format!(
        "{}\n\n{}\n{}\n{}{}",
        method.as_str(),
        content_type,
        date,
        canonical_headers,
        resource
    )
}

/// Canonicalize `x-mns-*` headers: lowercased names, sorted, `name:value\n`.
pub(crate) fn canonical_mns_headers(headers: &BTreeMap<String, String>) -> String {
    headers
        .iter()
        .map(|(name, value)| format!("{}:{}\n", name, value))
        .collect()
}

/// Compute the base64 HMAC-SHA1 signature over the canonical string.
pub(crate) fn sign(access_key: &str, string_to_sign: &str) -> Result<String, MnsError> {
    type HmacSha1 = Hmac<Sha1>;

    let mut mac =
        HmacSha1::new_from_slice(access_key.as_bytes()).map_err(|_| MnsError::InvalidArgument {
            field: "access_key".to_string(),
            message: "key is not usable for signing".to_string(),
        })?;
    mac.update(string_to_sign.as_bytes());
    Ok(general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
}

// ============================================================================
// HTTP Transport
// ============================================================================

/// Production transport over HTTP(S).
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: String,
    credentials: Credentials,
    config: ClientConfig,
}

impl HttpTransport {
    /// Create a transport for the given service endpoint.
    ///
    /// # Errors
    ///
    /// Returns `MnsError::InvalidArgument` if the endpoint is not an absolute
    /// http(s) URL, or `MnsError::Transport` if the HTTP client cannot be
    /// constructed.
    pub fn new(
        endpoint: &str,
        credentials: Credentials,
        config: ClientConfig,
    ) -> Result<Self, MnsError> {
        let parsed = Url::parse(endpoint).map_err(|error| MnsError::InvalidArgument {
            field: "endpoint".to_string(),
            message: format!("not a valid URL: {}", error),
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(MnsError::InvalidArgument {
                field: "endpoint".to_string(),
                message: format!("unsupported scheme {:?}", parsed.scheme()),
            });
        }
        if parsed.host_str().is_none() {
            return Err(MnsError::InvalidArgument {
                field: "endpoint".to_string(),
                message: "missing host".to_string(),
            });
        }

        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|error| MnsError::Transport {
                message: format!("failed to create HTTP client: {}", error),
            })?;

        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            credentials,
            config,
        })
    }

    async fn attempt(&self, request: &RequestParts) -> Result<ResponseParts, MnsError> {
        let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        let content_type = if request.body.is_some() {
            CONTENT_TYPE_XML
        } else {
            ""
        };

        // Signing context is local to this call; nothing is shared across
        // concurrent requests.
        let mut mns_headers = BTreeMap::new();
        mns_headers.insert("x-mns-version".to_string(), MNS_API_VERSION.to_string());
        for (name, value) in &request.headers {
            mns_headers.insert(name.to_ascii_lowercase(), value.clone());
        }

        let canonical = canonical_mns_headers(&mns_headers);
        let to_sign = string_to_sign(
            &request.method,
            content_type,
            &date,
            &canonical,
            &request.resource,
        );
        let signature = sign(self.credentials.access_key(), &to_sign)?;

        let url = format!("{}{}", self.endpoint, request.resource);
        let timeout = self.config.request_timeout + request.extra_wait.unwrap_or_default();

        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .timeout(timeout)
            .header(
                "Authorization",
                format!("MNS {}:{}", self.credentials.access_id(), signature),
            )
            .header("Date", &date);
        for (name, value) in &mns_headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(token) = self.credentials.security_token() {
            builder = builder.header("security-token", token);
        }
        if let Some(body) = &request.body {
            builder = builder
                .header("Content-Type", content_type)
                .body(body.clone());
        }

        tracing::debug!(
            method = %request.method,
            resource = %request.resource,
            "sending request"
        );

        let response = builder
            .send()
            .await
            .map_err(|error| map_send_error(error, timeout))?;

        let status = response.status().as_u16();
        let mut headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                headers.insert(name.as_str().to_ascii_lowercase(), value.to_string());
            }
        }
        let body = response
            .bytes()
            .await
            .map_err(|error| map_send_error(error, timeout))?;

        let parts = ResponseParts {
            status,
            headers,
            body,
        };
        tracing::debug!(
            status,
            request_id = parts.request_id().unwrap_or(""),
            "received reply"
        );
        Ok(parts)
    }
}

fn map_send_error(error: reqwest::Error, timeout: Duration) -> MnsError {
    if error.is_timeout() {
        MnsError::Timeout {
            seconds: timeout.as_secs(),
        }
    } else {
        MnsError::Transport {
            message: error.to_string(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: RequestParts) -> Result<ResponseParts, MnsError> {
        let mut attempt = 0;
        loop {
            // Non-success replies come back as Ok(parts); peek at their
            // classification so throttling and internal service errors go
            // through the same retry policy as network failures.
            let error = match self.attempt(&request).await {
                Ok(response) if (200..300).contains(&response.status) => return Ok(response),
                Ok(response) => {
                    let error = codec::decode_error(
                        response.status,
                        response.request_id(),
                        &response.body,
                    );
                    if !(error.should_retry() && self.config.retry.should_retry(attempt)) {
                        return Ok(response);
                    }
                    error
                }
                Err(error) => {
                    if !(error.should_retry() && self.config.retry.should_retry(attempt)) {
                        return Err(error);
                    }
                    error
                }
            };

            let delay = error
                .retry_after()
                .unwrap_or_else(|| self.config.retry.calculate_delay(attempt + 1));
            tracing::warn!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "retrying transient failure"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoint", &self.endpoint)
            .field("credentials", &self.credentials)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
