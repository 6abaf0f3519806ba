//! Topic lifecycle, publish, and subscription operations.

use reqwest::Method;

use crate::codec::{self, bool_to_wire, XmlBuilder};
use crate::error::MnsError;
use crate::model::{
    validate_resource_name, SendReceipt, SubscriptionAttributes, TopicAttributes, TopicMessage,
    TopicMeta, TopicName,
};
use crate::ops::queues::{paging_headers, validate_page_size};
use crate::ops::{ApiRequest, ApiResponse};
use crate::transport::ResponseParts;

fn encode_topic_attributes(attributes: &TopicAttributes) -> Vec<u8> {
    let mut xml = XmlBuilder::new("Topic");
    if let Some(value) = attributes.maximum_message_size {
        xml.leaf("MaximumMessageSize", &value.to_string());
    }
    if let Some(value) = attributes.logging_enabled {
        xml.leaf("LoggingEnabled", bool_to_wire(value));
    }
    xml.finish()
}

// ============================================================================
// CreateTopic
// ============================================================================

/// Create a topic with the given attributes.
#[derive(Debug, Clone)]
pub struct CreateTopicRequest {
    topic_name: TopicName,
    attributes: TopicAttributes,
}

impl CreateTopicRequest {
    pub fn new(topic_name: TopicName) -> Self {
        Self {
            topic_name,
            attributes: TopicAttributes::default(),
        }
    }

    pub fn with_attributes(mut self, attributes: TopicAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn topic_name(&self) -> &TopicName {
        &self.topic_name
    }
}

impl ApiRequest for CreateTopicRequest {
    type Response = CreateTopicResponse;

    fn method(&self) -> Method {
        Method::PUT
    }

    fn resource(&self) -> String {
        format!("/topics/{}", self.topic_name)
    }

    fn body(&self) -> Result<Option<Vec<u8>>, MnsError> {
        Ok(Some(encode_topic_attributes(&self.attributes)))
    }
}

/// Reply to [`CreateTopicRequest`].
#[derive(Debug, Clone)]
pub struct CreateTopicResponse {
    /// URL of the created topic, as reported by the server.
    pub topic_url: Option<String>,
}

impl ApiResponse for CreateTopicResponse {
    fn decode(parts: &ResponseParts) -> Result<Self, MnsError> {
        Ok(Self {
            topic_url: parts.location().map(str::to_string),
        })
    }
}

// ============================================================================
// DeleteTopic
// ============================================================================

/// Delete a topic and all its subscriptions.
#[derive(Debug, Clone)]
pub struct DeleteTopicRequest {
    topic_name: TopicName,
}

impl DeleteTopicRequest {
    pub fn new(topic_name: TopicName) -> Self {
        Self { topic_name }
    }
}

impl ApiRequest for DeleteTopicRequest {
    type Response = ();

    fn method(&self) -> Method {
        Method::DELETE
    }

    fn resource(&self) -> String {
        format!("/topics/{}", self.topic_name)
    }
}

// ============================================================================
// ListTopics
// ============================================================================

/// List topics owned by the account.
#[derive(Debug, Clone, Default)]
pub struct ListTopicsRequest {
    prefix: Option<String>,
    marker: Option<String>,
    number: Option<u32>,
}

impl ListTopicsRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only return topics whose name starts with the prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Resume listing from a marker returned by a previous page.
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    /// Maximum number of topics per page (1-1000).
    pub fn with_number(mut self, number: u32) -> Self {
        self.number = Some(number);
        self
    }
}

impl ApiRequest for ListTopicsRequest {
    type Response = ListTopicsResponse;

    fn method(&self) -> Method {
        Method::GET
    }

    fn resource(&self) -> String {
        "/topics".to_string()
    }

    fn mns_headers(&self) -> Vec<(&'static str, String)> {
        paging_headers(self.prefix.as_deref(), self.marker.as_deref(), self.number)
    }

    fn validate(&self) -> Result<(), MnsError> {
        validate_page_size(self.number)
    }
}

/// Reply to [`ListTopicsRequest`].
#[derive(Debug, Clone)]
pub struct ListTopicsResponse {
    /// Topic names on this page.
    pub topic_names: Vec<String>,
    /// Marker for the next page, absent on the last page.
    pub next_marker: Option<String>,
}

impl ApiResponse for ListTopicsResponse {
    fn decode(parts: &ResponseParts) -> Result<Self, MnsError> {
        let root = codec::parse_rooted(&parts.body, "Topics")?;
        let topic_names = root
            .children_named("Topic")
            .map(|topic| {
                topic
                    .require_text("TopicURL")
                    .map(|url| codec::name_from_url(&url).to_string())
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            topic_names,
            next_marker: root
                .child_text("NextMarker")
                .filter(|marker| !marker.is_empty())
                .map(str::to_string),
        })
    }
}

// ============================================================================
// Topic Attributes
// ============================================================================

/// Fetch the attributes of a topic.
#[derive(Debug, Clone)]
pub struct GetTopicAttributesRequest {
    topic_name: TopicName,
}

impl GetTopicAttributesRequest {
    pub fn new(topic_name: TopicName) -> Self {
        Self { topic_name }
    }
}

impl ApiRequest for GetTopicAttributesRequest {
    type Response = TopicMeta;

    fn method(&self) -> Method {
        Method::GET
    }

    fn resource(&self) -> String {
        format!("/topics/{}", self.topic_name)
    }
}

impl ApiResponse for TopicMeta {
    fn decode(parts: &ResponseParts) -> Result<Self, MnsError> {
        let root = codec::parse_rooted(&parts.body, "Topic")?;
        Ok(Self {
            topic_name: root.require_text("TopicName")?,
            create_time: root.opt_secs("CreateTime")?,
            last_modify_time: root.opt_secs("LastModifyTime")?,
            maximum_message_size: root.opt_u32("MaximumMessageSize")?,
            message_retention_period: root.opt_u32("MessageRetentionPeriod")?,
            message_count: root.opt_u64("MessageCount")?,
            logging_enabled: root.opt_bool("LoggingEnabled")?,
        })
    }
}

/// Overwrite a topic's settable attributes.
#[derive(Debug, Clone)]
pub struct SetTopicAttributesRequest {
    topic_name: TopicName,
    attributes: TopicAttributes,
}

impl SetTopicAttributesRequest {
    pub fn new(topic_name: TopicName, attributes: TopicAttributes) -> Self {
        Self {
            topic_name,
            attributes,
        }
    }
}

impl ApiRequest for SetTopicAttributesRequest {
    type Response = ();

    fn method(&self) -> Method {
        Method::PUT
    }

    fn resource(&self) -> String {
        format!("/topics/{}?metaoverride=true", self.topic_name)
    }

    fn body(&self) -> Result<Option<Vec<u8>>, MnsError> {
        Ok(Some(encode_topic_attributes(&self.attributes)))
    }
}

// ============================================================================
// PublishMessage
// ============================================================================

/// Publish a message to every subscription of a topic.
#[derive(Debug, Clone)]
pub struct PublishMessageRequest {
    topic_name: TopicName,
    message: TopicMessage,
}

impl PublishMessageRequest {
    pub fn new(topic_name: TopicName, message: TopicMessage) -> Self {
        Self {
            topic_name,
            message,
        }
    }
}

impl ApiRequest for PublishMessageRequest {
    type Response = SendReceipt;

    fn method(&self) -> Method {
        Method::POST
    }

    fn resource(&self) -> String {
        format!("/topics/{}/messages", self.topic_name)
    }

    fn body(&self) -> Result<Option<Vec<u8>>, MnsError> {
        let mut xml = XmlBuilder::new("Message");
        xml.leaf("MessageBody", &self.message.body);
        xml.opt_leaf("MessageTag", self.message.message_tag.as_deref());
        Ok(Some(xml.finish()))
    }

    fn validate(&self) -> Result<(), MnsError> {
        self.message.validate()
    }
}

// ============================================================================
// Subscriptions
// ============================================================================

/// Subscribe an endpoint to a topic.
///
/// Subscribing an existing name with different parameters fails with the
/// already-exists service error.
#[derive(Debug, Clone)]
pub struct SubscribeRequest {
    topic_name: TopicName,
    attributes: SubscriptionAttributes,
}

impl SubscribeRequest {
    pub fn new(topic_name: TopicName, attributes: SubscriptionAttributes) -> Self {
        Self {
            topic_name,
            attributes,
        }
    }
}

impl ApiRequest for SubscribeRequest {
    type Response = ();

    fn method(&self) -> Method {
        Method::PUT
    }

    fn resource(&self) -> String {
        format!(
            "/topics/{}/subscriptions/{}",
            self.topic_name, self.attributes.subscription_name
        )
    }

    fn body(&self) -> Result<Option<Vec<u8>>, MnsError> {
        let mut xml = XmlBuilder::new("Subscription");
        xml.leaf("Endpoint", &self.attributes.endpoint);
        xml.opt_leaf("FilterTag", self.attributes.filter_tag.as_deref());
        xml.opt_leaf(
            "NotifyStrategy",
            self.attributes.notify_strategy.map(|s| s.as_wire()),
        );
        xml.opt_leaf(
            "NotifyContentFormat",
            self.attributes.notify_content_format.map(|f| f.as_wire()),
        );
        Ok(Some(xml.finish()))
    }

    fn validate(&self) -> Result<(), MnsError> {
        self.attributes.validate()
    }
}

/// Remove a subscription from a topic.
#[derive(Debug, Clone)]
pub struct UnsubscribeRequest {
    topic_name: TopicName,
    subscription_name: String,
}

impl UnsubscribeRequest {
    pub fn new(topic_name: TopicName, subscription_name: impl Into<String>) -> Self {
        Self {
            topic_name,
            subscription_name: subscription_name.into(),
        }
    }
}

impl ApiRequest for UnsubscribeRequest {
    type Response = ();

    fn method(&self) -> Method {
        Method::DELETE
    }

    fn resource(&self) -> String {
        format!(
            "/topics/{}/subscriptions/{}",
            self.topic_name, self.subscription_name
        )
    }

    fn validate(&self) -> Result<(), MnsError> {
        validate_resource_name("subscription_name", &self.subscription_name)
    }
}

/// List the subscriptions of a topic.
#[derive(Debug, Clone)]
pub struct ListSubscriptionsRequest {
    topic_name: TopicName,
    prefix: Option<String>,
    marker: Option<String>,
    number: Option<u32>,
}

impl ListSubscriptionsRequest {
    pub fn new(topic_name: TopicName) -> Self {
        Self {
            topic_name,
            prefix: None,
            marker: None,
            number: None,
        }
    }

    /// Only return subscriptions whose name starts with the prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Resume listing from a marker returned by a previous page.
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    /// Maximum number of subscriptions per page (1-1000).
    pub fn with_number(mut self, number: u32) -> Self {
        self.number = Some(number);
        self
    }
}

impl ApiRequest for ListSubscriptionsRequest {
    type Response = ListSubscriptionsResponse;

    fn method(&self) -> Method {
        Method::GET
    }

    fn resource(&self) -> String {
        format!("/topics/{}/subscriptions", self.topic_name)
    }

    fn mns_headers(&self) -> Vec<(&'static str, String)> {
        paging_headers(self.prefix.as_deref(), self.marker.as_deref(), self.number)
    }

    fn validate(&self) -> Result<(), MnsError> {
        validate_page_size(self.number)
    }
}

/// Reply to [`ListSubscriptionsRequest`].
#[derive(Debug, Clone)]
pub struct ListSubscriptionsResponse {
    /// Subscription names on this page.
    pub subscription_names: Vec<String>,
    /// Marker for the next page, absent on the last page.
    pub next_marker: Option<String>,
}

impl ApiResponse for ListSubscriptionsResponse {
    fn decode(parts: &ResponseParts) -> Result<Self, MnsError> {
        let root = codec::parse_rooted(&parts.body, "Subscriptions")?;
        let subscription_names = root
            .children_named("Subscription")
            .map(|subscription| {
                subscription
                    .require_text("SubscriptionURL")
                    .map(|url| codec::name_from_url(&url).to_string())
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            subscription_names,
            next_marker: root
                .child_text("NextMarker")
                .filter(|marker| !marker.is_empty())
                .map(str::to_string),
        })
    }
}

#[cfg(test)]
#[path = "topics_tests.rs"]
mod tests;
