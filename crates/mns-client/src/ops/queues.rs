//! Queue lifecycle operations: create, delete, list, attribute get/set.

use reqwest::Method;

use crate::codec::{self, bool_to_wire, XmlBuilder};
use crate::error::MnsError;
use crate::model::{QueueAttributes, QueueMeta, QueueName};
use crate::ops::{ApiRequest, ApiResponse};
use crate::transport::ResponseParts;

fn encode_queue_attributes(attributes: &QueueAttributes) -> Vec<u8> {
    let mut xml = XmlBuilder::new("Queue");
    if let Some(value) = attributes.delay_seconds {
        xml.leaf("DelaySeconds", &value.to_string());
    }
    if let Some(value) = attributes.maximum_message_size {
        xml.leaf("MaximumMessageSize", &value.to_string());
    }
    if let Some(value) = attributes.message_retention_period {
        xml.leaf("MessageRetentionPeriod", &value.to_string());
    }
    if let Some(value) = attributes.visibility_timeout {
        xml.leaf("VisibilityTimeout", &value.to_string());
    }
    if let Some(value) = attributes.polling_wait_seconds {
        xml.leaf("PollingWaitSeconds", &value.to_string());
    }
    if let Some(value) = attributes.logging_enabled {
        xml.leaf("LoggingEnabled", bool_to_wire(value));
    }
    xml.finish()
}

pub(crate) fn paging_headers(
    prefix: Option<&str>,
    marker: Option<&str>,
    number: Option<u32>,
) -> Vec<(&'static str, String)> {
    let mut headers = Vec::new();
    if let Some(prefix) = prefix {
        headers.push(("x-mns-prefix", prefix.to_string()));
    }
    if let Some(marker) = marker {
        headers.push(("x-mns-marker", marker.to_string()));
    }
    if let Some(number) = number {
        headers.push(("x-mns-ret-number", number.to_string()));
    }
    headers
}

pub(crate) fn validate_page_size(number: Option<u32>) -> Result<(), MnsError> {
    if let Some(number) = number {
        if !(1..=1000).contains(&number) {
            return Err(MnsError::InvalidArgument {
                field: "number".to_string(),
                message: "must be 1-1000".to_string(),
            });
        }
    }
    Ok(())
}

// ============================================================================
// CreateQueue
// ============================================================================

/// Create a queue with the given attributes.
///
/// Creating a queue that already exists with different attributes fails with
/// the already-exists service error.
#[derive(Debug, Clone)]
pub struct CreateQueueRequest {
    queue_name: QueueName,
    attributes: QueueAttributes,
}

impl CreateQueueRequest {
    pub fn new(queue_name: QueueName) -> Self {
        Self {
            queue_name,
            attributes: QueueAttributes::default(),
        }
    }

    pub fn with_attributes(mut self, attributes: QueueAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn queue_name(&self) -> &QueueName {
        &self.queue_name
    }
}

impl ApiRequest for CreateQueueRequest {
    type Response = CreateQueueResponse;

    fn method(&self) -> Method {
        Method::PUT
    }

    fn resource(&self) -> String {
        format!("/queues/{}", self.queue_name)
    }

    fn body(&self) -> Result<Option<Vec<u8>>, MnsError> {
        Ok(Some(encode_queue_attributes(&self.attributes)))
    }
}

/// Reply to [`CreateQueueRequest`].
#[derive(Debug, Clone)]
pub struct CreateQueueResponse {
    /// URL of the created queue, as reported by the server.
    pub queue_url: Option<String>,
}

impl ApiResponse for CreateQueueResponse {
    fn decode(parts: &ResponseParts) -> Result<Self, MnsError> {
        Ok(Self {
            queue_url: parts.location().map(str::to_string),
        })
    }
}

// ============================================================================
// DeleteQueue
// ============================================================================

/// Delete a queue and all messages in it.
#[derive(Debug, Clone)]
pub struct DeleteQueueRequest {
    queue_name: QueueName,
}

impl DeleteQueueRequest {
    pub fn new(queue_name: QueueName) -> Self {
        Self { queue_name }
    }
}

impl ApiRequest for DeleteQueueRequest {
    type Response = ();

    fn method(&self) -> Method {
        Method::DELETE
    }

    fn resource(&self) -> String {
        format!("/queues/{}", self.queue_name)
    }
}

// ============================================================================
// ListQueues
// ============================================================================

/// List queues owned by the account, with optional prefix filtering and
/// marker-based paging.
#[derive(Debug, Clone, Default)]
pub struct ListQueuesRequest {
    prefix: Option<String>,
    marker: Option<String>,
    number: Option<u32>,
}

impl ListQueuesRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only return queues whose name starts with the prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Resume listing from a marker returned by a previous page.
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    /// Maximum number of queues per page (1-1000).
    pub fn with_number(mut self, number: u32) -> Self {
        self.number = Some(number);
        self
    }
}

impl ApiRequest for ListQueuesRequest {
    type Response = ListQueuesResponse;

    fn method(&self) -> Method {
        Method::GET
    }

    fn resource(&self) -> String {
        "/queues".to_string()
    }

    fn mns_headers(&self) -> Vec<(&'static str, String)> {
        paging_headers(self.prefix.as_deref(), self.marker.as_deref(), self.number)
    }

    fn validate(&self) -> Result<(), MnsError> {
        validate_page_size(self.number)
    }
}

/// Reply to [`ListQueuesRequest`].
#[derive(Debug, Clone)]
pub struct ListQueuesResponse {
    /// Queue names on this page.
    pub queue_names: Vec<String>,
    /// Marker for the next page, absent on the last page.
    pub next_marker: Option<String>,
}

impl ApiResponse for ListQueuesResponse {
    fn decode(parts: &ResponseParts) -> Result<Self, MnsError> {
        let root = codec::parse_rooted(&parts.body, "Queues")?;
        let queue_names = root
            .children_named("Queue")
            .map(|queue| {
                queue
                    .require_text("QueueURL")
                    .map(|url| codec::name_from_url(&url).to_string())
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            queue_names,
            next_marker: root
                .child_text("NextMarker")
                .filter(|marker| !marker.is_empty())
                .map(str::to_string),
        })
    }
}

// ============================================================================
// Queue Attributes
// ============================================================================

/// Fetch the attributes and message counts of a queue.
#[derive(Debug, Clone)]
pub struct GetQueueAttributesRequest {
    queue_name: QueueName,
}

impl GetQueueAttributesRequest {
    pub fn new(queue_name: QueueName) -> Self {
        Self { queue_name }
    }
}

impl ApiRequest for GetQueueAttributesRequest {
    type Response = QueueMeta;

    fn method(&self) -> Method {
        Method::GET
    }

    fn resource(&self) -> String {
        format!("/queues/{}", self.queue_name)
    }
}

impl ApiResponse for QueueMeta {
    fn decode(parts: &ResponseParts) -> Result<Self, MnsError> {
        let root = codec::parse_rooted(&parts.body, "Queue")?;
        Ok(Self {
            queue_name: root.require_text("QueueName")?,
            create_time: root.opt_secs("CreateTime")?,
            last_modify_time: root.opt_secs("LastModifyTime")?,
            delay_seconds: root.opt_u32("DelaySeconds")?,
            maximum_message_size: root.opt_u32("MaximumMessageSize")?,
            message_retention_period: root.opt_u32("MessageRetentionPeriod")?,
            visibility_timeout: root.opt_u32("VisibilityTimeout")?,
            polling_wait_seconds: root.opt_u32("PollingWaitSeconds")?,
            logging_enabled: root.opt_bool("LoggingEnabled")?,
            active_messages: root.opt_u64("ActiveMessages")?,
            inactive_messages: root.opt_u64("InactiveMessages")?,
            delay_messages: root.opt_u64("DelayMessages")?,
        })
    }
}

/// Overwrite a queue's settable attributes; absent fields are left unchanged.
#[derive(Debug, Clone)]
pub struct SetQueueAttributesRequest {
    queue_name: QueueName,
    attributes: QueueAttributes,
}

impl SetQueueAttributesRequest {
    pub fn new(queue_name: QueueName, attributes: QueueAttributes) -> Self {
        Self {
            queue_name,
            attributes,
        }
    }
}

impl ApiRequest for SetQueueAttributesRequest {
    type Response = ();

    fn method(&self) -> Method {
        Method::PUT
    }

    fn resource(&self) -> String {
        format!("/queues/{}?metaoverride=true", self.queue_name)
    }

    fn body(&self) -> Result<Option<Vec<u8>>, MnsError> {
        Ok(Some(encode_queue_attributes(&self.attributes)))
    }
}

#[cfg(test)]
#[path = "queues_tests.rs"]
mod tests;
