//! Tests for the topic handle.

use super::*;
use crate::error::ServiceError;
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
    fn single(status: u16, body: &str) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(vec![reply(status, body)].into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn recorded(&self) -> Vec<RequestParts> {
        self.requests.lock().unwrap().clone()
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

fn topic(transport: Arc<MockTransport>) -> Topic {
    Topic::new(transport, TopicName::new("events").unwrap())
}

#[tokio::test]
async fn test_publish_message() {
    let transport = MockTransport::single(
        201,
        "<Message><MessageId>id-1</MessageId><MessageBodyMD5>md5</MessageBodyMD5></Message>",
    );
    let topic = topic(Arc::clone(&transport));

    let receipt = topic
        .publish_message(TopicMessage::new("payload").with_message_tag("orders"))
        .await
        .unwrap();
    assert_eq!(receipt.message_id.as_str(), "id-1");

    let requests = transport.recorded();
    assert_eq!(requests[0].resource, "/topics/events/messages");
    let body = String::from_utf8(requests[0].body.clone().unwrap()).unwrap();
    assert!(body.contains("<MessageTag>orders</MessageTag>"));
}

#[tokio::test]
async fn test_publish_message_async_defers_until_wait() {
    let transport = MockTransport::single(
        201,
        "<Message><MessageId>id-1</MessageId><MessageBodyMD5>md5</MessageBodyMD5></Message>",
    );
    let topic = topic(Arc::clone(&transport));

    let mut promise = topic.publish_message_async(TopicMessage::new("payload"));
    assert!(transport.recorded().is_empty());

    promise.wait().await.unwrap();
    assert_eq!(transport.recorded().len(), 1);
}

#[tokio::test]
async fn test_subscribe_conflict_surfaces_already_exists() {
    let transport = MockTransport::single(
        409,
        "<Error><Code>SubscriptionAlreadyExist</Code><Message>taken</Message></Error>",
    );
    let topic = topic(transport);

    let result = topic
        .subscribe(SubscriptionAttributes::new("sub-1", "https://example.com/hook"))
        .await;
    match result {
        Err(MnsError::Service(ServiceError { code, .. })) => {
            assert_eq!(code, ServiceErrorCode::SubscriptionAlreadyExists)
        }
        other => panic!("expected SubscriptionAlreadyExist, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unsubscribe_missing_subscription_is_success() {
    let transport = MockTransport::single(
        404,
        "<Error><Code>SubscriptionNotExist</Code><Message>gone</Message></Error>",
    );
    let topic = topic(transport);

    assert!(topic.unsubscribe("sub-1").await.is_ok());
}

#[tokio::test]
async fn test_unsubscribe_other_errors_propagate() {
    let transport = MockTransport::single(
        403,
        "<Error><Code>AccessDenied</Code><Message>no</Message></Error>",
    );
    let topic = topic(transport);

    assert!(topic.unsubscribe("sub-1").await.is_err());
}

#[tokio::test]
async fn test_list_subscriptions_builds_paging() {
    let transport = MockTransport::single(
        200,
        "<Subscriptions>\
         <Subscription><SubscriptionURL>http://host/topics/events/subscriptions/sub-1</SubscriptionURL></Subscription>\
         </Subscriptions>",
    );
    let topic = topic(Arc::clone(&transport));

    let listing = topic
        .list_subscriptions(Some("sub"), None, Some(50))
        .await
        .unwrap();
    assert_eq!(listing.subscription_names, vec!["sub-1"]);

    let headers = &transport.recorded()[0].headers;
    assert!(headers.contains(&("x-mns-prefix".to_string(), "sub".to_string())));
    assert!(headers.contains(&("x-mns-ret-number".to_string(), "50".to_string())));
}

#[tokio::test]
async fn test_get_and_set_attributes() {
    let transport = MockTransport::single(
        200,
        "<Topic><TopicName>events</TopicName><MessageCount>4</MessageCount></Topic>",
    );
    let meta = topic(transport).get_attributes().await.unwrap();
    assert_eq!(meta.topic_name, "events");
    assert_eq!(meta.message_count, Some(4));

    let transport = MockTransport::single(204, "");
    let topic = topic(Arc::clone(&transport));
    topic
        .set_attributes(TopicAttributes::new().with_logging_enabled(true))
        .await
        .unwrap();
    assert_eq!(
        transport.recorded()[0].resource,
        "/topics/events?metaoverride=true"
    );
}
