//! Domain types for queue, topic, and message operations.
//!
//! Resource names are validated newtypes so malformed input fails fast on the
//! client, before any network call is made.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MnsError;

/// Maximum server-side long-poll wait in seconds.
pub const MAX_WAIT_SECONDS: u32 = 30;
/// Maximum number of messages in a single batch operation.
pub const MAX_BATCH_SIZE: usize = 16;
/// Maximum message delay in seconds (7 days).
pub const MAX_DELAY_SECONDS: u32 = 604_800;
/// Maximum visibility timeout in seconds (12 hours).
pub const MAX_VISIBILITY_TIMEOUT: u32 = 43_200;

pub(crate) fn validate_resource_name(field: &'static str, name: &str) -> Result<(), MnsError> {
    if name.is_empty() || name.len() > 255 {
        return Err(MnsError::InvalidArgument {
            field: field.to_string(),
            message: "must be 1-255 characters".to_string(),
        });
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(MnsError::InvalidArgument {
            field: field.to_string(),
            message: "only ASCII alphanumeric characters and hyphens allowed".to_string(),
        });
    }

    if name.starts_with('-') || name.ends_with('-') {
        return Err(MnsError::InvalidArgument {
            field: field.to_string(),
            message: "no leading or trailing hyphens".to_string(),
        });
    }

    Ok(())
}

// ============================================================================
// Core Domain Identifiers
// ============================================================================

/// Validated queue name with length and character restrictions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueueName(String);

impl QueueName {
    /// Create a new queue name with validation.
    pub fn new(name: impl Into<String>) -> Result<Self, MnsError> {
        let name = name.into();
        validate_resource_name("queue_name", &name)?;
        Ok(Self(name))
    }

    /// Get the queue name as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueueName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for QueueName {
    type Err = MnsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Validated topic name with length and character restrictions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TopicName(String);

impl TopicName {
    /// Create a new topic name with validation.
    pub fn new(name: impl Into<String>) -> Result<Self, MnsError> {
        let name = name.into();
        validate_resource_name("topic_name", &name)?;
        Ok(Self(name))
    }

    /// Get the topic name as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TopicName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TopicName {
    type Err = MnsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Server-assigned message identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(String);

impl MessageId {
    pub(crate) fn new(id: String) -> Self {
        Self(id)
    }

    /// Get the message id as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque, time-limited token returned on message receipt.
///
/// Required to delete a specific delivery or change its visibility. The
/// server invalidates a handle once the message is deleted or the handle's
/// visibility window lapses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReceiptHandle(String);

impl ReceiptHandle {
    /// Wrap a raw receipt handle string.
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    /// Get the handle as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReceiptHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Message Types
// ============================================================================

/// A message to be sent to a queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Message body. Encoded per the queue handle's base64 setting on send.
    pub body: String,
    /// Seconds the message stays invisible after being sent.
    pub delay_seconds: Option<u32>,
    /// Delivery priority, 1 (highest) to 16 (lowest).
    pub priority: Option<u8>,
}

impl Message {
    /// Create a new message with a body.
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            delay_seconds: None,
            priority: None,
        }
    }

    /// Set the delay before the message becomes visible.
    pub fn with_delay_seconds(mut self, delay_seconds: u32) -> Self {
        self.delay_seconds = Some(delay_seconds);
        self
    }

    /// Set the delivery priority (1 highest, 16 lowest).
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = Some(priority);
        self
    }

    pub(crate) fn validate(&self) -> Result<(), MnsError> {
        if let Some(delay) = self.delay_seconds {
            if delay > MAX_DELAY_SECONDS {
                return Err(MnsError::InvalidArgument {
                    field: "delay_seconds".to_string(),
                    message: format!("must be 0-{}", MAX_DELAY_SECONDS),
                });
            }
        }
        if let Some(priority) = self.priority {
            if !(1..=16).contains(&priority) {
                return Err(MnsError::InvalidArgument {
                    field: "priority".to_string(),
                    message: "must be 1-16".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Server acknowledgement for a sent or published message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    /// Server-assigned message id.
    pub message_id: MessageId,
    /// MD5 digest of the message body as stored by the server.
    pub body_md5: String,
}

/// A message received from a queue, with its processing metadata.
#[derive(Debug, Clone)]
pub struct ReceivedMessage {
    pub message_id: MessageId,
    /// Receipt handle for deleting this delivery or changing its visibility.
    pub receipt_handle: ReceiptHandle,
    pub body: String,
    pub body_md5: String,
    pub enqueue_time: Option<DateTime<Utc>>,
    /// When this delivery becomes visible to other consumers again.
    pub next_visible_time: Option<DateTime<Utc>>,
    pub first_dequeue_time: Option<DateTime<Utc>>,
    pub dequeue_count: u32,
    pub priority: Option<u8>,
}

/// A message read without removal.
///
/// Peeked messages carry no receipt handle and cannot be deleted.
#[derive(Debug, Clone)]
pub struct PeekedMessage {
    pub message_id: MessageId,
    pub body: String,
    pub body_md5: String,
    pub enqueue_time: Option<DateTime<Utc>>,
    pub first_dequeue_time: Option<DateTime<Utc>>,
    pub dequeue_count: u32,
    pub priority: Option<u8>,
}

/// Result of a visibility change: the old receipt handle is invalidated and
/// replaced by a fresh one.
#[derive(Debug, Clone)]
pub struct VisibilityReceipt {
    /// New receipt handle for the delivery.
    pub receipt_handle: ReceiptHandle,
    /// When the message becomes visible again.
    pub next_visible_time: Option<DateTime<Utc>>,
}

// ============================================================================
// Attribute Types
// ============================================================================

/// Settable queue attributes. All fields are optional; absent fields keep
/// their server-side values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueAttributes {
    /// Default delay applied to sent messages, in seconds.
    pub delay_seconds: Option<u32>,
    /// Maximum message body size in bytes.
    pub maximum_message_size: Option<u32>,
    /// How long messages are retained, in seconds.
    pub message_retention_period: Option<u32>,
    /// How long a received message stays invisible, in seconds.
    pub visibility_timeout: Option<u32>,
    /// Default server-side long-poll window for receives, in seconds.
    pub polling_wait_seconds: Option<u32>,
    /// Whether operation logging is enabled for this queue.
    pub logging_enabled: Option<bool>,
}

impl QueueAttributes {
    /// Create an empty attribute set.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay_seconds(mut self, value: u32) -> Self {
        self.delay_seconds = Some(value);
        self
    }

    pub fn with_maximum_message_size(mut self, value: u32) -> Self {
        self.maximum_message_size = Some(value);
        self
    }

    pub fn with_message_retention_period(mut self, value: u32) -> Self {
        self.message_retention_period = Some(value);
        self
    }

    pub fn with_visibility_timeout(mut self, value: u32) -> Self {
        self.visibility_timeout = Some(value);
        self
    }

    pub fn with_polling_wait_seconds(mut self, value: u32) -> Self {
        self.polling_wait_seconds = Some(value);
        self
    }

    pub fn with_logging_enabled(mut self, value: bool) -> Self {
        self.logging_enabled = Some(value);
        self
    }
}

/// Server-reported queue state and attributes.
#[derive(Debug, Clone)]
pub struct QueueMeta {
    pub queue_name: String,
    pub create_time: Option<DateTime<Utc>>,
    pub last_modify_time: Option<DateTime<Utc>>,
    pub delay_seconds: Option<u32>,
    pub maximum_message_size: Option<u32>,
    pub message_retention_period: Option<u32>,
    pub visibility_timeout: Option<u32>,
    pub polling_wait_seconds: Option<u32>,
    pub logging_enabled: Option<bool>,
    pub active_messages: Option<u64>,
    pub inactive_messages: Option<u64>,
    pub delay_messages: Option<u64>,
}

/// Settable topic attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicAttributes {
    /// Maximum message body size in bytes.
    pub maximum_message_size: Option<u32>,
    /// Whether operation logging is enabled for this topic.
    pub logging_enabled: Option<bool>,
}

impl TopicAttributes {
    /// Create an empty attribute set.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_maximum_message_size(mut self, value: u32) -> Self {
        self.maximum_message_size = Some(value);
        self
    }

    pub fn with_logging_enabled(mut self, value: bool) -> Self {
        self.logging_enabled = Some(value);
        self
    }
}

/// Server-reported topic state and attributes.
#[derive(Debug, Clone)]
pub struct TopicMeta {
    pub topic_name: String,
    pub create_time: Option<DateTime<Utc>>,
    pub last_modify_time: Option<DateTime<Utc>>,
    pub maximum_message_size: Option<u32>,
    pub message_retention_period: Option<u32>,
    pub message_count: Option<u64>,
    pub logging_enabled: Option<bool>,
}

/// Account-wide attributes, independent of any single queue or topic.
///
/// Partially settable: absent fields keep their server-side values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountAttributes {
    /// Storage bucket receiving operation logs.
    pub logging_bucket: Option<String>,
}

impl AccountAttributes {
    /// Create an empty attribute set.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_logging_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.logging_bucket = Some(bucket.into());
        self
    }
}

/// A message to be published to a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicMessage {
    /// Message body, sent as-is.
    pub body: String,
    /// Tag used for subscription-side filtering.
    pub message_tag: Option<String>,
}

impl TopicMessage {
    /// Create a new topic message with a body.
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            message_tag: None,
        }
    }

    /// Set the filter tag (1-16 characters).
    pub fn with_message_tag(mut self, tag: impl Into<String>) -> Self {
        self.message_tag = Some(tag.into());
        self
    }

    pub(crate) fn validate(&self) -> Result<(), MnsError> {
        if let Some(tag) = &self.message_tag {
            if tag.is_empty() || tag.len() > 16 {
                return Err(MnsError::InvalidArgument {
                    field: "message_tag".to_string(),
                    message: "must be 1-16 characters".to_string(),
                });
            }
        }
        Ok(())
    }
}

// ============================================================================
// Subscription Types
// ============================================================================

/// Parameters for subscribing an endpoint to a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionAttributes {
    /// Name of the subscription, unique within its topic.
    pub subscription_name: String,
    /// Endpoint receiving pushed messages.
    pub endpoint: String,
    /// Only deliver messages published with this tag.
    pub filter_tag: Option<String>,
    /// Redelivery strategy on push failure.
    pub notify_strategy: Option<NotifyStrategy>,
    /// Body format of pushed messages.
    pub notify_content_format: Option<NotifyContentFormat>,
}

impl SubscriptionAttributes {
    /// Create subscription parameters for a name and endpoint.
    pub fn new(subscription_name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            subscription_name: subscription_name.into(),
            endpoint: endpoint.into(),
            filter_tag: None,
            notify_strategy: None,
            notify_content_format: None,
        }
    }

    /// Only deliver messages published with this tag (1-16 characters).
    pub fn with_filter_tag(mut self, tag: impl Into<String>) -> Self {
        self.filter_tag = Some(tag.into());
        self
    }

    pub fn with_notify_strategy(mut self, strategy: NotifyStrategy) -> Self {
        self.notify_strategy = Some(strategy);
        self
    }

    pub fn with_notify_content_format(mut self, format: NotifyContentFormat) -> Self {
        self.notify_content_format = Some(format);
        self
    }

    pub(crate) fn validate(&self) -> Result<(), MnsError> {
        validate_resource_name("subscription_name", &self.subscription_name)?;
        if self.endpoint.is_empty() {
            return Err(MnsError::InvalidArgument {
                field: "endpoint".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if let Some(tag) = &self.filter_tag {
            if tag.is_empty() || tag.len() > 16 {
                return Err(MnsError::InvalidArgument {
                    field: "filter_tag".to_string(),
                    message: "must be 1-16 characters".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Retry strategy applied when pushing a topic message to a subscriber fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotifyStrategy {
    BackoffRetry,
    ExponentialDecayRetry,
}

impl NotifyStrategy {
    pub(crate) fn as_wire(&self) -> &'static str {
        match self {
            Self::BackoffRetry => "BACKOFF_RETRY",
            Self::ExponentialDecayRetry => "EXPONENTIAL_DECAY_RETRY",
        }
    }
}

/// Body format used when pushing topic messages to a subscriber endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotifyContentFormat {
    Xml,
    Json,
    Simplified,
}

impl NotifyContentFormat {
    pub(crate) fn as_wire(&self) -> &'static str {
        match self {
            Self::Xml => "XML",
            Self::Json => "JSON",
            Self::Simplified => "SIMPLIFIED",
        }
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
