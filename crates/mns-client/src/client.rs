//! Top-level client: queue/topic lifecycle, account attributes, and handle
//! construction.
//!
//! The client is constructed from exactly an endpoint, credentials, and an
//! optional tuning configuration; it performs no service lookup and reads no
//! configuration source of its own. All methods share one transport, so a
//! single client serves any number of concurrent tasks.

use std::sync::Arc;

use crate::config::{ClientConfig, Credentials};
use crate::error::{MnsError, ServiceErrorCode};
use crate::model::{AccountAttributes, QueueName, TopicName};
use crate::ops::account::{GetAccountAttributesRequest, SetAccountAttributesRequest};
use crate::ops::queues::{
    CreateQueueRequest, CreateQueueResponse, DeleteQueueRequest, ListQueuesRequest,
    ListQueuesResponse,
};
use crate::ops::topics::{
    CreateTopicRequest, CreateTopicResponse, DeleteTopicRequest, ListTopicsRequest,
    ListTopicsResponse,
};
use crate::promise::MnsPromise;
use crate::queue::Queue;
use crate::topic::Topic;
use crate::transport::{send_request, HttpTransport, Transport};

/// Client for one MNS account at one service endpoint.
///
/// # Examples
///
/// ```no_run
/// use mns_client::{Credentials, MnsClient, QueueName};
///
/// # async fn example() -> Result<(), mns_client::MnsError> {
/// let client = MnsClient::new(
///     "https://123456789.mns.cn-hangzhou.aliyuncs.com",
///     Credentials::new("access-id", "access-key"),
/// )?;
///
/// let queue = client.get_queue_ref(QueueName::new("orders")?, true);
/// queue.send_message(mns_client::Message::new("hello")).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MnsClient {
    transport: Arc<dyn Transport>,
}

impl MnsClient {
    /// Create a client with default tuning.
    pub fn new(endpoint: &str, credentials: Credentials) -> Result<Self, MnsError> {
        Self::with_config(endpoint, credentials, ClientConfig::default())
    }

    /// Create a client with explicit tuning configuration.
    pub fn with_config(
        endpoint: &str,
        credentials: Credentials,
        config: ClientConfig,
    ) -> Result<Self, MnsError> {
        let transport = HttpTransport::new(endpoint, credentials, config)?;
        Ok(Self {
            transport: Arc::new(transport),
        })
    }

    /// Create a client over a caller-provided transport.
    ///
    /// Intended for tests that script replies without a network.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    // ========================================================================
    // Handles
    // ========================================================================

    /// Get a queue handle for message operations.
    ///
    /// Does not create the queue. `base64` controls whether message bodies
    /// are base64-encoded on the wire for this handle.
    pub fn get_queue_ref(&self, queue_name: QueueName, base64: bool) -> Queue {
        Queue::new(Arc::clone(&self.transport), queue_name, base64)
    }

    /// Get a topic handle for publish and subscription operations.
    ///
    /// Does not create the topic.
    pub fn get_topic_ref(&self, topic_name: TopicName) -> Topic {
        Topic::new(Arc::clone(&self.transport), topic_name)
    }

    // ========================================================================
    // Queue Lifecycle
    // ========================================================================

    /// Create a queue.
    ///
    /// Fails with the already-exists service error when the name is taken
    /// with different attributes.
    pub async fn create_queue(
        &self,
        request: CreateQueueRequest,
    ) -> Result<CreateQueueResponse, MnsError> {
        send_request(self.transport.as_ref(), &request).await
    }

    /// Deferred variant of [`create_queue`](Self::create_queue); the request
    /// is not sent until the promise is waited on.
    pub fn create_queue_async(&self, request: CreateQueueRequest) -> MnsPromise<CreateQueueResponse> {
        let transport = Arc::clone(&self.transport);
        MnsPromise::new(async move { send_request(transport.as_ref(), &request).await })
    }

    /// Delete a queue and all messages in it.
    ///
    /// Succeeds even when the queue does not exist, so teardown paths can
    /// run unconditionally.
    pub async fn delete_queue(&self, queue_name: QueueName) -> Result<(), MnsError> {
        delete_queue_inner(Arc::clone(&self.transport), DeleteQueueRequest::new(queue_name)).await
    }

    /// Deferred variant of [`delete_queue`](Self::delete_queue).
    pub fn delete_queue_async(&self, queue_name: QueueName) -> MnsPromise<()> {
        MnsPromise::new(delete_queue_inner(
            Arc::clone(&self.transport),
            DeleteQueueRequest::new(queue_name),
        ))
    }

    /// List queues owned by the account.
    pub async fn list_queues(
        &self,
        request: ListQueuesRequest,
    ) -> Result<ListQueuesResponse, MnsError> {
        send_request(self.transport.as_ref(), &request).await
    }

    /// Deferred variant of [`list_queues`](Self::list_queues).
    pub fn list_queues_async(&self, request: ListQueuesRequest) -> MnsPromise<ListQueuesResponse> {
        let transport = Arc::clone(&self.transport);
        MnsPromise::new(async move { send_request(transport.as_ref(), &request).await })
    }

    // ========================================================================
    // Topic Lifecycle
    // ========================================================================

    /// Create a topic.
    ///
    /// Fails with the already-exists service error when the name is taken
    /// with different attributes.
    pub async fn create_topic(
        &self,
        request: CreateTopicRequest,
    ) -> Result<CreateTopicResponse, MnsError> {
        send_request(self.transport.as_ref(), &request).await
    }

    /// Delete a topic and all its subscriptions.
    ///
    /// Succeeds even when the topic does not exist.
    pub async fn delete_topic(&self, topic_name: TopicName) -> Result<(), MnsError> {
        let request = DeleteTopicRequest::new(topic_name);
        match send_request(self.transport.as_ref(), &request).await {
            Err(MnsError::Service(error)) if error.code == ServiceErrorCode::TopicNotExist => {
                Ok(())
            }
            other => other,
        }
    }

    /// List topics owned by the account.
    pub async fn list_topics(
        &self,
        request: ListTopicsRequest,
    ) -> Result<ListTopicsResponse, MnsError> {
        send_request(self.transport.as_ref(), &request).await
    }

    // ========================================================================
    // Account Attributes
    // ========================================================================

    /// Fetch account-wide attributes.
    pub async fn get_account_attributes(&self) -> Result<AccountAttributes, MnsError> {
        send_request(self.transport.as_ref(), &GetAccountAttributesRequest::new()).await
    }

    /// Deferred variant of [`get_account_attributes`](Self::get_account_attributes).
    pub fn get_account_attributes_async(&self) -> MnsPromise<AccountAttributes> {
        let transport = Arc::clone(&self.transport);
        MnsPromise::new(async move {
            send_request(transport.as_ref(), &GetAccountAttributesRequest::new()).await
        })
    }

    /// Overwrite account-wide attributes.
    pub async fn set_account_attributes(
        &self,
        attributes: AccountAttributes,
    ) -> Result<(), MnsError> {
        let request = SetAccountAttributesRequest::new(attributes);
        send_request(self.transport.as_ref(), &request).await
    }

    /// Deferred variant of [`set_account_attributes`](Self::set_account_attributes).
    pub fn set_account_attributes_async(&self, attributes: AccountAttributes) -> MnsPromise<()> {
        let transport = Arc::clone(&self.transport);
        let request = SetAccountAttributesRequest::new(attributes);
        MnsPromise::new(async move { send_request(transport.as_ref(), &request).await })
    }
}

async fn delete_queue_inner(
    transport: Arc<dyn Transport>,
    request: DeleteQueueRequest,
) -> Result<(), MnsError> {
    match send_request(transport.as_ref(), &request).await {
        Err(MnsError::Service(error)) if error.code == ServiceErrorCode::QueueNotExist => Ok(()),
        other => other,
    }
}

impl std::fmt::Debug for MnsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MnsClient").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
