//! Tests for queue lifecycle operations.

use super::*;
use bytes::Bytes;
use std::collections::HashMap;

fn response(status: u16, body: &str) -> ResponseParts {
    ResponseParts {
        status,
        headers: HashMap::new(),
        body: Bytes::copy_from_slice(body.as_bytes()),
    }
}

fn queue_name(name: &str) -> QueueName {
    QueueName::new(name).unwrap()
}

#[test]
fn test_create_queue_wire_shape() {
    let request = CreateQueueRequest::new(queue_name("orders")).with_attributes(
        QueueAttributes::new()
            .with_delay_seconds(5)
            .with_visibility_timeout(30)
            .with_logging_enabled(true),
    );

    assert_eq!(request.method(), Method::PUT);
    assert_eq!(request.resource(), "/queues/orders");

    let body = String::from_utf8(request.body().unwrap().unwrap()).unwrap();
    assert_eq!(
        body,
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <Queue xmlns=\"http://mns.aliyuncs.com/doc/v1/\">\
         <DelaySeconds>5</DelaySeconds>\
         <VisibilityTimeout>30</VisibilityTimeout>\
         <LoggingEnabled>True</LoggingEnabled>\
         </Queue>"
    );
}

#[test]
fn test_create_queue_without_attributes_sends_empty_document() {
    let request = CreateQueueRequest::new(queue_name("orders"));
    let body = String::from_utf8(request.body().unwrap().unwrap()).unwrap();
    assert!(body.ends_with("<Queue xmlns=\"http://mns.aliyuncs.com/doc/v1/\"></Queue>"));
}

#[test]
fn test_create_queue_response_reads_location() {
    let mut parts = response(201, "");
    parts.headers.insert(
        "location".to_string(),
        "http://acct.mns.region.aliyuncs.com/queues/orders".to_string(),
    );

    let decoded = CreateQueueResponse::decode(&parts).unwrap();
    assert_eq!(
        decoded.queue_url.as_deref(),
        Some("http://acct.mns.region.aliyuncs.com/queues/orders")
    );

    let decoded = CreateQueueResponse::decode(&response(204, "")).unwrap();
    assert!(decoded.queue_url.is_none());
}

#[test]
fn test_delete_queue_wire_shape() {
    let request = DeleteQueueRequest::new(queue_name("orders"));
    assert_eq!(request.method(), Method::DELETE);
    assert_eq!(request.resource(), "/queues/orders");
    assert!(request.body().unwrap().is_none());
}

#[test]
fn test_list_queues_paging_headers() {
    let request = ListQueuesRequest::new()
        .with_prefix("ord")
        .with_marker("mark")
        .with_number(20);

    assert_eq!(request.method(), Method::GET);
    assert_eq!(request.resource(), "/queues");
    assert_eq!(
        request.mns_headers(),
        vec![
            ("x-mns-prefix", "ord".to_string()),
            ("x-mns-marker", "mark".to_string()),
            ("x-mns-ret-number", "20".to_string()),
        ]
    );
}

#[test]
fn test_list_queues_rejects_bad_page_size() {
    assert!(ListQueuesRequest::new().with_number(0).validate().is_err());
    assert!(ListQueuesRequest::new().with_number(1001).validate().is_err());
    assert!(ListQueuesRequest::new().with_number(1000).validate().is_ok());
    assert!(ListQueuesRequest::new().validate().is_ok());
}

#[test]
fn test_list_queues_response_decode() {
    let body = r#"<Queues>
        <Queue><QueueURL>http://acct.mns.region.aliyuncs.com/queues/orders</QueueURL></Queue>
        <Queue><QueueURL>http://acct.mns.region.aliyuncs.com/queues/billing</QueueURL></Queue>
        <NextMarker>bmV4dA==</NextMarker>
    </Queues>"#;

    let decoded = ListQueuesResponse::decode(&response(200, body)).unwrap();
    assert_eq!(decoded.queue_names, vec!["orders", "billing"]);
    assert_eq!(decoded.next_marker.as_deref(), Some("bmV4dA=="));
}

#[test]
fn test_list_queues_response_last_page_has_no_marker() {
    let body = "<Queues><Queue><QueueURL>http://host/queues/only</QueueURL></Queue></Queues>";
    let decoded = ListQueuesResponse::decode(&response(200, body)).unwrap();
    assert_eq!(decoded.queue_names, vec!["only"]);
    assert!(decoded.next_marker.is_none());
}

#[test]
fn test_queue_meta_decode_full() {
    let body = r#"<Queue>
        <QueueName>orders</QueueName>
        <CreateTime>1250700999</CreateTime>
        <LastModifyTime>1250700999</LastModifyTime>
        <DelaySeconds>0</DelaySeconds>
        <MaximumMessageSize>65536</MaximumMessageSize>
        <MessageRetentionPeriod>345600</MessageRetentionPeriod>
        <VisibilityTimeout>30</VisibilityTimeout>
        <PollingWaitSeconds>0</PollingWaitSeconds>
        <LoggingEnabled>False</LoggingEnabled>
        <ActiveMessages>3</ActiveMessages>
        <InactiveMessages>1</InactiveMessages>
        <DelayMessages>0</DelayMessages>
    </Queue>"#;

    let meta = QueueMeta::decode(&response(200, body)).unwrap();
    assert_eq!(meta.queue_name, "orders");
    assert_eq!(meta.create_time.unwrap().timestamp(), 1250700999);
    assert_eq!(meta.maximum_message_size, Some(65536));
    assert_eq!(meta.visibility_timeout, Some(30));
    assert_eq!(meta.logging_enabled, Some(false));
    assert_eq!(meta.active_messages, Some(3));
    assert_eq!(meta.inactive_messages, Some(1));
}

#[test]
fn test_queue_meta_tolerates_absent_attributes() {
    let body = "<Queue><QueueName>orders</QueueName></Queue>";
    let meta = QueueMeta::decode(&response(200, body)).unwrap();
    assert_eq!(meta.queue_name, "orders");
    assert!(meta.create_time.is_none());
    assert!(meta.active_messages.is_none());
}

#[test]
fn test_queue_meta_requires_name() {
    let body = "<Queue><DelaySeconds>0</DelaySeconds></Queue>";
    assert!(matches!(
        QueueMeta::decode(&response(200, body)),
        Err(MnsError::Parse { .. })
    ));
}

#[test]
fn test_set_queue_attributes_wire_shape() {
    let request = SetQueueAttributesRequest::new(
        queue_name("orders"),
        QueueAttributes::new().with_visibility_timeout(60),
    );

    assert_eq!(request.method(), Method::PUT);
    assert_eq!(request.resource(), "/queues/orders?metaoverride=true");

    let body = String::from_utf8(request.body().unwrap().unwrap()).unwrap();
    assert!(body.contains("<VisibilityTimeout>60</VisibilityTimeout>"));
}
