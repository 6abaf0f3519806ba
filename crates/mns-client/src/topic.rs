//! Topic handle: publish and subscription management scoped to one topic.
//!
//! Like queue handles, topic handles are stateless references over a shared
//! transport; they do not create the topic.

use std::sync::Arc;

use crate::error::{MnsError, ServiceErrorCode};
use crate::model::{
    SendReceipt, SubscriptionAttributes, TopicAttributes, TopicMessage, TopicMeta, TopicName,
};
use crate::ops::topics::{
    GetTopicAttributesRequest, ListSubscriptionsRequest, ListSubscriptionsResponse,
    PublishMessageRequest, SetTopicAttributesRequest, SubscribeRequest, UnsubscribeRequest,
};
use crate::promise::MnsPromise;
use crate::transport::{send_request, Transport};

/// Reference to a named topic.
#[derive(Clone)]
pub struct Topic {
    transport: Arc<dyn Transport>,
    name: TopicName,
}

impl Topic {
    pub(crate) fn new(transport: Arc<dyn Transport>, name: TopicName) -> Self {
        Self { transport, name }
    }

    /// Get the topic name.
    pub fn name(&self) -> &TopicName {
        &self.name
    }

    /// Publish a message to every subscription of this topic.
    pub async fn publish_message(&self, message: TopicMessage) -> Result<SendReceipt, MnsError> {
        let request = PublishMessageRequest::new(self.name.clone(), message);
        send_request(self.transport.as_ref(), &request).await
    }

    /// Deferred variant of [`publish_message`](Self::publish_message); the
    /// request is not sent until the promise is waited on.
    pub fn publish_message_async(&self, message: TopicMessage) -> MnsPromise<SendReceipt> {
        let transport = Arc::clone(&self.transport);
        let request = PublishMessageRequest::new(self.name.clone(), message);
        MnsPromise::new(async move { send_request(transport.as_ref(), &request).await })
    }

    /// Subscribe an endpoint to this topic.
    pub async fn subscribe(&self, attributes: SubscriptionAttributes) -> Result<(), MnsError> {
        let request = SubscribeRequest::new(self.name.clone(), attributes);
        send_request(self.transport.as_ref(), &request).await
    }

    /// Remove a subscription.
    ///
    /// Removing a subscription that does not exist succeeds, so teardown
    /// paths can run unconditionally.
    pub async fn unsubscribe(&self, subscription_name: &str) -> Result<(), MnsError> {
        let request = UnsubscribeRequest::new(self.name.clone(), subscription_name);
        match send_request(self.transport.as_ref(), &request).await {
            Err(MnsError::Service(error))
                if error.code == ServiceErrorCode::SubscriptionNotExist =>
            {
                Ok(())
            }
            other => other,
        }
    }

    /// List the subscriptions of this topic, optionally filtered by prefix
    /// and paged via a marker from a previous page.
    pub async fn list_subscriptions(
        &self,
        prefix: Option<&str>,
        marker: Option<&str>,
        number: Option<u32>,
    ) -> Result<ListSubscriptionsResponse, MnsError> {
        let mut request = ListSubscriptionsRequest::new(self.name.clone());
        if let Some(prefix) = prefix {
            request = request.with_prefix(prefix);
        }
        if let Some(marker) = marker {
            request = request.with_marker(marker);
        }
        if let Some(number) = number {
            request = request.with_number(number);
        }
        send_request(self.transport.as_ref(), &request).await
    }

    /// Fetch the topic's attributes.
    pub async fn get_attributes(&self) -> Result<TopicMeta, MnsError> {
        let request = GetTopicAttributesRequest::new(self.name.clone());
        send_request(self.transport.as_ref(), &request).await
    }

    /// Overwrite the topic's settable attributes.
    pub async fn set_attributes(&self, attributes: TopicAttributes) -> Result<(), MnsError> {
        let request = SetTopicAttributesRequest::new(self.name.clone(), attributes);
        send_request(self.transport.as_ref(), &request).await
    }
}

impl std::fmt::Debug for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Topic").field("name", &self.name).finish()
    }
}

#[cfg(test)]
#[path = "topic_tests.rs"]
mod tests;
