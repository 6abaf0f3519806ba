//! Tests for the top-level client.

use super::*;
use crate::transport::{RequestParts, ResponseParts};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

struct MockTransport {
    replies: Mutex<VecDeque<ResponseParts>>,
    requests: Mutex<Vec<RequestParts>>,
}

impl MockTransport {
    fn new(replies: Vec<ResponseParts>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn single(status: u16, body: &str) -> Arc<Self> {
        Self::new(vec![reply(status, body)])
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: RequestParts) -> Result<ResponseParts, MnsError> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| MnsError::Transport {
                message: "no scripted reply".to_string(),
            })
    }
}

fn reply(status: u16, body: &str) -> ResponseParts {
    ResponseParts {
        status,
        headers: HashMap::new(),
        body: Bytes::copy_from_slice(body.as_bytes()),
    }
}

fn reply_with_location(status: u16, location: &str) -> ResponseParts {
    let mut parts = reply(status, "");
    parts
        .headers
        .insert("location".to_string(), location.to_string());
    parts
}

fn client(transport: Arc<MockTransport>) -> MnsClient {
    MnsClient::with_transport(transport)
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_new_rejects_invalid_endpoint() {
    let result = MnsClient::new("not a url", Credentials::new("id", "key"));
    assert!(matches!(result, Err(MnsError::InvalidArgument { .. })));
}

#[test]
fn test_new_accepts_http_endpoint() {
    let result = MnsClient::new(
        "https://123456789.mns.cn-hangzhou.aliyuncs.com",
        Credentials::new("id", "key"),
    );
    assert!(result.is_ok());
}

#[test]
fn test_handles_carry_names() {
    let client = client(MockTransport::new(Vec::new()));

    let queue = client.get_queue_ref(QueueName::new("orders").unwrap(), true);
    assert_eq!(queue.name().as_str(), "orders");
    assert!(queue.uses_base64());

    let queue = client.get_queue_ref(QueueName::new("raw").unwrap(), false);
    assert!(!queue.uses_base64());

    let topic = client.get_topic_ref(TopicName::new("events").unwrap());
    assert_eq!(topic.name().as_str(), "events");
}

// ============================================================================
// Queue Lifecycle
// ============================================================================

#[tokio::test]
async fn test_create_queue_returns_location() {
    let transport = MockTransport::new(vec![reply_with_location(
        201,
        "http://acct.mns.region.aliyuncs.com/queues/orders",
    )]);
    let client = client(transport);

    let response = client
        .create_queue(CreateQueueRequest::new(QueueName::new("orders").unwrap()))
        .await
        .unwrap();
    assert_eq!(
        response.queue_url.as_deref(),
        Some("http://acct.mns.region.aliyuncs.com/queues/orders")
    );
}

#[tokio::test]
async fn test_create_queue_conflict_is_already_exists() {
    let transport = MockTransport::single(
        409,
        "<Error><Code>QueueAlreadyExist</Code><Message>taken</Message></Error>",
    );
    let client = client(transport);

    match client
        .create_queue(CreateQueueRequest::new(QueueName::new("orders").unwrap()))
        .await
    {
        Err(MnsError::Service(error)) => {
            assert_eq!(error.code, ServiceErrorCode::QueueAlreadyExists)
        }
        other => panic!("expected QueueAlreadyExist, got {:?}", other),
    }
}

#[tokio::test]
async fn test_delete_queue_is_idempotent() {
    let transport = MockTransport::new(vec![
        reply(204, ""),
        reply(
            404,
            "<Error><Code>QueueNotExist</Code><Message>gone</Message></Error>",
        ),
    ]);
    let client = client(transport);

    let name = QueueName::new("orders").unwrap();
    assert!(client.delete_queue(name.clone()).await.is_ok());
    // Deleting again after the queue is gone still succeeds.
    assert!(client.delete_queue(name).await.is_ok());
}

#[tokio::test]
async fn test_delete_queue_propagates_real_failures() {
    let transport = MockTransport::single(
        403,
        "<Error><Code>AccessDenied</Code><Message>no</Message></Error>",
    );
    let client = client(transport);

    let result = client.delete_queue(QueueName::new("orders").unwrap()).await;
    assert!(matches!(result, Err(MnsError::Service(_))));
}

#[tokio::test]
async fn test_create_delete_list_sequence_drops_name() {
    // Create, delete, then list: the listing no longer carries the deleted
    // queue name.
    let transport = MockTransport::new(vec![
        reply_with_location(201, "http://host/queues/orders"),
        reply(204, ""),
        reply(
            200,
            "<Queues><Queue><QueueURL>http://host/queues/billing</QueueURL></Queue></Queues>",
        ),
    ]);
    let client = client(transport);
    let name = QueueName::new("orders").unwrap();

    client
        .create_queue(CreateQueueRequest::new(name.clone()))
        .await
        .unwrap();
    client.delete_queue(name.clone()).await.unwrap();

    let listing = client.list_queues(ListQueuesRequest::new()).await.unwrap();
    assert!(!listing.queue_names.contains(&name.as_str().to_string()));
}

#[tokio::test]
async fn test_list_queues_pages_with_marker() {
    let transport = MockTransport::new(vec![reply(
        200,
        "<Queues>\
         <Queue><QueueURL>http://host/queues/a</QueueURL></Queue>\
         <NextMarker>marker-2</NextMarker>\
         </Queues>",
    )]);
    let client = client(transport);

    let listing = client
        .list_queues(ListQueuesRequest::new().with_prefix("a").with_number(1))
        .await
        .unwrap();
    assert_eq!(listing.queue_names, vec!["a"]);
    assert_eq!(listing.next_marker.as_deref(), Some("marker-2"));
}

// ============================================================================
// Topic Lifecycle
// ============================================================================

#[tokio::test]
async fn test_topic_lifecycle_round_trip() {
    let transport = MockTransport::new(vec![
        reply_with_location(201, "http://host/topics/events"),
        reply(
            200,
            "<Topics><Topic><TopicURL>http://host/topics/events</TopicURL></Topic></Topics>",
        ),
        reply(204, ""),
    ]);
    let client = client(transport);
    let name = TopicName::new("events").unwrap();

    let created = client
        .create_topic(CreateTopicRequest::new(name.clone()))
        .await
        .unwrap();
    assert!(created.topic_url.is_some());

    let listing = client.list_topics(ListTopicsRequest::new()).await.unwrap();
    assert_eq!(listing.topic_names, vec!["events"]);

    client.delete_topic(name).await.unwrap();
}

#[tokio::test]
async fn test_delete_topic_is_idempotent() {
    let transport = MockTransport::single(
        404,
        "<Error><Code>TopicNotExist</Code><Message>gone</Message></Error>",
    );
    let client = client(transport);

    assert!(client
        .delete_topic(TopicName::new("events").unwrap())
        .await
        .is_ok());
}

// ============================================================================
// Account Attributes
// ============================================================================

#[tokio::test]
async fn test_account_attributes_round_trip() {
    let transport = MockTransport::new(vec![
        reply(204, ""),
        reply(
            200,
            "<Account><LoggingBucket>audit-bucket</LoggingBucket></Account>",
        ),
    ]);
    let client = client(transport);

    client
        .set_account_attributes(AccountAttributes::new().with_logging_bucket("audit-bucket"))
        .await
        .unwrap();

    let attributes = client.get_account_attributes().await.unwrap();
    assert_eq!(attributes.logging_bucket.as_deref(), Some("audit-bucket"));
}

// ============================================================================
// Deferred Dispatch
// ============================================================================

#[tokio::test]
async fn test_create_queue_async_fires_on_wait() {
    let transport = MockTransport::new(vec![reply_with_location(201, "http://host/queues/orders")]);
    let client = client(Arc::clone(&transport));

    let mut promise =
        client.create_queue_async(CreateQueueRequest::new(QueueName::new("orders").unwrap()));

    // Nothing is sent until the caller resolves the handle.
    assert!(promise.is_pending());
    assert_eq!(transport.request_count(), 0);

    let response = promise.wait().await.unwrap();
    assert!(response.queue_url.is_some());
    assert_eq!(transport.request_count(), 1);
    assert!(promise.is_resolved());
}

#[tokio::test]
async fn test_delete_queue_async_converts_not_exist_during_wait() {
    let transport = MockTransport::single(
        404,
        "<Error><Code>QueueNotExist</Code><Message>gone</Message></Error>",
    );
    let client = client(transport);

    let mut promise = client.delete_queue_async(QueueName::new("orders").unwrap());
    assert!(promise.wait().await.is_ok());
}

#[tokio::test]
async fn test_get_account_attributes_async_callback_fires_exactly_once() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let transport = MockTransport::single(200, "<Account></Account>");
    let client = client(transport);

    let fired = Arc::new(AtomicUsize::new(0));
    let observer = Arc::clone(&fired);

    let mut promise = client.get_account_attributes_async();
    promise.on_complete(move |_| {
        observer.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(fired.load(Ordering::SeqCst), 0);
    promise.wait().await.unwrap();
    promise.wait().await.unwrap();
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_list_queues_async() {
    let transport = MockTransport::single(
        200,
        "<Queues><Queue><QueueURL>http://host/queues/orders</QueueURL></Queue></Queues>",
    );
    let client = client(transport);

    let mut promise = client.list_queues_async(ListQueuesRequest::new());
    let listing = promise.wait().await.unwrap();
    assert_eq!(listing.queue_names, vec!["orders"]);
}
