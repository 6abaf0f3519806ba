//! # MNS Client
//!
//! Client for the Alibaba Cloud Message Service (MNS) HTTP API: queues,
//! topics, subscriptions, and account attributes.
//!
//! This library provides:
//! - Queue operations: send, long-poll receive, peek, delete, visibility
//! - Topic operations: publish, subscribe, unsubscribe
//! - Queue/topic lifecycle and account attribute management
//! - Deferred execution handles ([`MnsPromise`]) for fire-on-wait dispatch
//! - HMAC-signed requests with an explicit, opt-in retry policy
//!
//! ## Module Organization
//!
//! - [`client`] - Top-level client and handle construction
//! - [`queue`] / [`topic`] - Handles scoped to one named resource
//! - [`ops`] - Typed request/response pairs, one per wire operation
//! - [`transport`] - Request signing, sending, and the test seam
//! - [`promise`] - Deferred execution handles
//! - [`error`] - Error taxonomy for all operations
//!
//! ## Example
//!
//! ```no_run
//! use mns_client::{CreateQueueRequest, Credentials, Message, MnsClient, QueueName};
//!
//! # async fn example() -> Result<(), mns_client::MnsError> {
//! let client = MnsClient::new(
//!     "https://123456789.mns.cn-hangzhou.aliyuncs.com",
//!     Credentials::new("access-id", "access-key"),
//! )?;
//!
//! let name = QueueName::new("orders")?;
//! client.create_queue(CreateQueueRequest::new(name.clone())).await?;
//!
//! let queue = client.get_queue_ref(name, true);
//! queue.send_message(Message::new("hello")).await?;
//! if let Some(message) = queue.receive_message(Some(30)).await? {
//!     queue.delete_message(message.receipt_handle).await?;
//! }
//! # Ok(())
//! # }
//! ```

// Module declarations
pub mod client;
mod codec;
pub mod config;
pub mod error;
pub mod model;
pub mod ops;
pub mod promise;
pub mod queue;
pub mod topic;
pub mod transport;

// Re-export commonly used types at crate root for convenience
pub use client::MnsClient;
pub use config::{ClientConfig, Credentials, RetryPolicy};
pub use error::{MnsError, ServiceError, ServiceErrorCode};
pub use model::{
    AccountAttributes, Message, MessageId, NotifyContentFormat, NotifyStrategy, PeekedMessage,
    QueueAttributes, QueueMeta, QueueName, ReceiptHandle, ReceivedMessage, SendReceipt,
    SubscriptionAttributes, TopicAttributes, TopicMessage, TopicMeta, TopicName,
    VisibilityReceipt,
};
pub use ops::queues::{CreateQueueRequest, CreateQueueResponse, ListQueuesRequest, ListQueuesResponse};
pub use ops::topics::{
    CreateTopicRequest, CreateTopicResponse, ListSubscriptionsResponse, ListTopicsRequest,
    ListTopicsResponse,
};
pub use promise::MnsPromise;
pub use queue::Queue;
pub use topic::Topic;
pub use transport::{HttpTransport, RequestParts, ResponseParts, Transport};
