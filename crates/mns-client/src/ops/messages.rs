//! Message-level operations scoped to one queue: send, receive, peek,
//! delete, and visibility changes.
//!
//! Message bodies pass through these types as-is; base64 handling belongs to
//! the queue handle that owns the encoding flag.

use std::time::Duration;

use reqwest::Method;

use crate::codec::{self, XmlBuilder, XmlElement};
use crate::error::MnsError;
use crate::model::{
    Message, MessageId, PeekedMessage, QueueName, ReceiptHandle, ReceivedMessage, SendReceipt,
    VisibilityReceipt, MAX_BATCH_SIZE, MAX_VISIBILITY_TIMEOUT, MAX_WAIT_SECONDS,
};
use crate::ops::{ApiRequest, ApiResponse};
use crate::transport::ResponseParts;

fn messages_resource(queue_name: &QueueName, query: &str) -> String {
    if query.is_empty() {
        format!("/queues/{}/messages", queue_name)
    } else {
        format!("/queues/{}/messages?{}", queue_name, query)
    }
}

fn encode_query(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

fn validate_wait_seconds(wait_seconds: Option<u32>) -> Result<(), MnsError> {
    if let Some(wait) = wait_seconds {
        if wait > MAX_WAIT_SECONDS {
            return Err(MnsError::InvalidArgument {
                field: "wait_seconds".to_string(),
                message: format!("must be 0-{}", MAX_WAIT_SECONDS),
            });
        }
    }
    Ok(())
}

fn validate_batch_size(field: &'static str, len: usize) -> Result<(), MnsError> {
    if len == 0 || len > MAX_BATCH_SIZE {
        return Err(MnsError::InvalidArgument {
            field: field.to_string(),
            message: format!("must contain 1-{} entries", MAX_BATCH_SIZE),
        });
    }
    Ok(())
}

fn encode_message_fields(xml: &mut XmlBuilder, message: &Message) {
    xml.leaf("MessageBody", &message.body);
    if let Some(delay) = message.delay_seconds {
        xml.leaf("DelaySeconds", &delay.to_string());
    }
    if let Some(priority) = message.priority {
        xml.leaf("Priority", &priority.to_string());
    }
}

fn decode_send_receipt(element: &XmlElement) -> Result<SendReceipt, MnsError> {
    Ok(SendReceipt {
        message_id: MessageId::new(element.require_text("MessageId")?),
        body_md5: element
            .child_text("MessageBodyMD5")
            .unwrap_or_default()
            .to_string(),
    })
}

fn decode_received(element: &XmlElement) -> Result<ReceivedMessage, MnsError> {
    Ok(ReceivedMessage {
        message_id: MessageId::new(element.require_text("MessageId")?),
        receipt_handle: ReceiptHandle::new(element.require_text("ReceiptHandle")?),
        body: element
            .child_text("MessageBody")
            .unwrap_or_default()
            .to_string(),
        body_md5: element
            .child_text("MessageBodyMD5")
            .unwrap_or_default()
            .to_string(),
        enqueue_time: element.opt_millis("EnqueueTime")?,
        next_visible_time: element.opt_millis("NextVisibleTime")?,
        first_dequeue_time: element.opt_millis("FirstDequeueTime")?,
        dequeue_count: element.opt_u32("DequeueCount")?.unwrap_or(0),
        priority: element.opt_u8("Priority")?,
    })
}

fn decode_peeked(element: &XmlElement) -> Result<PeekedMessage, MnsError> {
    Ok(PeekedMessage {
        message_id: MessageId::new(element.require_text("MessageId")?),
        body: element
            .child_text("MessageBody")
            .unwrap_or_default()
            .to_string(),
        body_md5: element
            .child_text("MessageBodyMD5")
            .unwrap_or_default()
            .to_string(),
        enqueue_time: element.opt_millis("EnqueueTime")?,
        first_dequeue_time: element.opt_millis("FirstDequeueTime")?,
        dequeue_count: element.opt_u32("DequeueCount")?.unwrap_or(0),
        priority: element.opt_u8("Priority")?,
    })
}

// ============================================================================
// SendMessage
// ============================================================================

/// Send one message to a queue.
#[derive(Debug, Clone)]
pub struct SendMessageRequest {
    queue_name: QueueName,
    message: Message,
}

impl SendMessageRequest {
    pub fn new(queue_name: QueueName, message: Message) -> Self {
        Self {
            queue_name,
            message,
        }
    }
}

impl ApiRequest for SendMessageRequest {
    type Response = SendReceipt;

    fn method(&self) -> Method {
        Method::POST
    }

    fn resource(&self) -> String {
        messages_resource(&self.queue_name, "")
    }

    fn body(&self) -> Result<Option<Vec<u8>>, MnsError> {
        let mut xml = XmlBuilder::new("Message");
        encode_message_fields(&mut xml, &self.message);
        Ok(Some(xml.finish()))
    }

    fn validate(&self) -> Result<(), MnsError> {
        self.message.validate()
    }
}

impl ApiResponse for SendReceipt {
    fn decode(parts: &ResponseParts) -> Result<Self, MnsError> {
        let root = codec::parse_rooted(&parts.body, "Message")?;
        decode_send_receipt(&root)
    }
}

// ============================================================================
// BatchSendMessage
// ============================================================================

/// Send up to 16 messages in one round trip.
#[derive(Debug, Clone)]
pub struct BatchSendMessageRequest {
    queue_name: QueueName,
    messages: Vec<Message>,
}

impl BatchSendMessageRequest {
    pub fn new(queue_name: QueueName, messages: Vec<Message>) -> Self {
        Self {
            queue_name,
            messages,
        }
    }
}

impl ApiRequest for BatchSendMessageRequest {
    type Response = Vec<SendReceipt>;

    fn method(&self) -> Method {
        Method::POST
    }

    fn resource(&self) -> String {
        messages_resource(&self.queue_name, "")
    }

    fn body(&self) -> Result<Option<Vec<u8>>, MnsError> {
        let mut xml = XmlBuilder::new("Messages");
        for message in &self.messages {
            xml.open("Message");
            encode_message_fields(&mut xml, message);
            xml.close("Message");
        }
        Ok(Some(xml.finish()))
    }

    fn validate(&self) -> Result<(), MnsError> {
        validate_batch_size("messages", self.messages.len())?;
        for message in &self.messages {
            message.validate()?;
        }
        Ok(())
    }
}

impl ApiResponse for Vec<SendReceipt> {
    fn decode(parts: &ResponseParts) -> Result<Self, MnsError> {
        let root = codec::parse_rooted(&parts.body, "Messages")?;
        root.children_named("Message").map(decode_send_receipt).collect()
    }
}

// ============================================================================
// ReceiveMessage
// ============================================================================

/// Receive one message, long-polling up to `wait_seconds` server-side.
///
/// A "no message" reply surfaces as the message-not-exist service error;
/// the queue handle maps it to an empty result.
#[derive(Debug, Clone)]
pub struct ReceiveMessageRequest {
    queue_name: QueueName,
    wait_seconds: Option<u32>,
}

impl ReceiveMessageRequest {
    pub fn new(queue_name: QueueName, wait_seconds: Option<u32>) -> Self {
        Self {
            queue_name,
            wait_seconds,
        }
    }
}

impl ApiRequest for ReceiveMessageRequest {
    type Response = ReceivedMessage;

    fn method(&self) -> Method {
        Method::GET
    }

    fn resource(&self) -> String {
        match self.wait_seconds {
            Some(wait) => messages_resource(&self.queue_name, &format!("waitseconds={}", wait)),
            None => messages_resource(&self.queue_name, ""),
        }
    }

    fn validate(&self) -> Result<(), MnsError> {
        validate_wait_seconds(self.wait_seconds)
    }

    fn extra_wait(&self) -> Option<Duration> {
        self.wait_seconds.map(|wait| Duration::from_secs(wait.into()))
    }
}

impl ApiResponse for ReceivedMessage {
    fn decode(parts: &ResponseParts) -> Result<Self, MnsError> {
        let root = codec::parse_rooted(&parts.body, "Message")?;
        decode_received(&root)
    }
}

// ============================================================================
// BatchReceiveMessage
// ============================================================================

/// Receive up to 16 messages in one round trip.
#[derive(Debug, Clone)]
pub struct BatchReceiveMessageRequest {
    queue_name: QueueName,
    number: u32,
    wait_seconds: Option<u32>,
}

impl BatchReceiveMessageRequest {
    pub fn new(
        queue_name: QueueName,
        number: u32,
        wait_seconds: Option<u32>,
    ) -> Self {
        Self {
            queue_name,
            number,
            wait_seconds,
        }
    }
}

impl ApiRequest for BatchReceiveMessageRequest {
    type Response = Vec<ReceivedMessage>;

    fn method(&self) -> Method {
        Method::GET
    }

    fn resource(&self) -> String {
        let mut query = format!("numOfMessages={}", self.number);
        if let Some(wait) = self.wait_seconds {
            query.push_str(&format!("&waitseconds={}", wait));
        }
        messages_resource(&self.queue_name, &query)
    }

    fn validate(&self) -> Result<(), MnsError> {
        validate_batch_size("number", self.number as usize)?;
        validate_wait_seconds(self.wait_seconds)
    }

    fn extra_wait(&self) -> Option<Duration> {
        self.wait_seconds.map(|wait| Duration::from_secs(wait.into()))
    }
}

impl ApiResponse for Vec<ReceivedMessage> {
    fn decode(parts: &ResponseParts) -> Result<Self, MnsError> {
        let root = codec::parse_rooted(&parts.body, "Messages")?;
        root.children_named("Message").map(decode_received).collect()
    }
}

// ============================================================================
// PeekMessage
// ============================================================================

/// Read the front message without removing it; no receipt handle is issued.
#[derive(Debug, Clone)]
pub struct PeekMessageRequest {
    queue_name: QueueName,
}

impl PeekMessageRequest {
    pub fn new(queue_name: QueueName) -> Self {
        Self { queue_name }
    }
}

impl ApiRequest for PeekMessageRequest {
    type Response = PeekedMessage;

    fn method(&self) -> Method {
        Method::GET
    }

    fn resource(&self) -> String {
        messages_resource(&self.queue_name, "peekonly=true")
    }
}

impl ApiResponse for PeekedMessage {
    fn decode(parts: &ResponseParts) -> Result<Self, MnsError> {
        let root = codec::parse_rooted(&parts.body, "Message")?;
        decode_peeked(&root)
    }
}

/// Peek up to 16 messages without removing them.
#[derive(Debug, Clone)]
pub struct BatchPeekMessageRequest {
    queue_name: QueueName,
    number: u32,
}

impl BatchPeekMessageRequest {
    pub fn new(queue_name: QueueName, number: u32) -> Self {
        Self { queue_name, number }
    }
}

impl ApiRequest for BatchPeekMessageRequest {
    type Response = Vec<PeekedMessage>;

    fn method(&self) -> Method {
        Method::GET
    }

    fn resource(&self) -> String {
        messages_resource(
            &self.queue_name,
            &format!("peekonly=true&numOfMessages={}", self.number),
        )
    }

    fn validate(&self) -> Result<(), MnsError> {
        validate_batch_size("number", self.number as usize)
    }
}

impl ApiResponse for Vec<PeekedMessage> {
    fn decode(parts: &ResponseParts) -> Result<Self, MnsError> {
        let root = codec::parse_rooted(&parts.body, "Messages")?;
        root.children_named("Message").map(decode_peeked).collect()
    }
}

// ============================================================================
// DeleteMessage
// ============================================================================

/// Delete a delivery identified by its receipt handle.
///
/// An already-deleted or expired handle fails with the invalid-receipt
/// service error, distinguishable from any transport failure.
#[derive(Debug, Clone)]
pub struct DeleteMessageRequest {
    queue_name: QueueName,
    receipt_handle: ReceiptHandle,
}

impl DeleteMessageRequest {
    pub fn new(queue_name: QueueName, receipt_handle: ReceiptHandle) -> Self {
        Self {
            queue_name,
            receipt_handle,
        }
    }
}

impl ApiRequest for DeleteMessageRequest {
    type Response = ();

    fn method(&self) -> Method {
        Method::DELETE
    }

    fn resource(&self) -> String {
        messages_resource(
            &self.queue_name,
            &format!("ReceiptHandle={}", encode_query(self.receipt_handle.as_str())),
        )
    }

    fn validate(&self) -> Result<(), MnsError> {
        if self.receipt_handle.as_str().is_empty() {
            return Err(MnsError::InvalidArgument {
                field: "receipt_handle".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Delete up to 16 deliveries in one round trip.
#[derive(Debug, Clone)]
pub struct BatchDeleteMessageRequest {
    queue_name: QueueName,
    receipt_handles: Vec<ReceiptHandle>,
}

impl BatchDeleteMessageRequest {
    pub fn new(queue_name: QueueName, receipt_handles: Vec<ReceiptHandle>) -> Self {
        Self {
            queue_name,
            receipt_handles,
        }
    }
}

impl ApiRequest for BatchDeleteMessageRequest {
    type Response = ();

    fn method(&self) -> Method {
        Method::DELETE
    }

    fn resource(&self) -> String {
        messages_resource(&self.queue_name, "")
    }

    fn body(&self) -> Result<Option<Vec<u8>>, MnsError> {
        let mut xml = XmlBuilder::new("ReceiptHandles");
        for handle in &self.receipt_handles {
            xml.leaf("ReceiptHandle", handle.as_str());
        }
        Ok(Some(xml.finish()))
    }

    fn validate(&self) -> Result<(), MnsError> {
        validate_batch_size("receipt_handles", self.receipt_handles.len())
    }
}

// ============================================================================
// ChangeMessageVisibility
// ============================================================================

/// Extend or shorten a delivery's invisibility window.
///
/// Consumes the given receipt handle and issues a fresh one.
#[derive(Debug, Clone)]
pub struct ChangeVisibilityRequest {
    queue_name: QueueName,
    receipt_handle: ReceiptHandle,
    visibility_timeout: u32,
}

impl ChangeVisibilityRequest {
    pub fn new(
        queue_name: QueueName,
        receipt_handle: ReceiptHandle,
        visibility_timeout: u32,
    ) -> Self {
        Self {
            queue_name,
            receipt_handle,
            visibility_timeout,
        }
    }
}

impl ApiRequest for ChangeVisibilityRequest {
    type Response = VisibilityReceipt;

    fn method(&self) -> Method {
        Method::PUT
    }

    fn resource(&self) -> String {
        messages_resource(
            &self.queue_name,
            &format!(
                "receiptHandle={}&visibilityTimeout={}",
                encode_query(self.receipt_handle.as_str()),
                self.visibility_timeout
            ),
        )
    }

    fn validate(&self) -> Result<(), MnsError> {
        if !(1..=MAX_VISIBILITY_TIMEOUT).contains(&self.visibility_timeout) {
            return Err(MnsError::InvalidArgument {
                field: "visibility_timeout".to_string(),
                message: format!("must be 1-{}", MAX_VISIBILITY_TIMEOUT),
            });
        }
        Ok(())
    }
}

impl ApiResponse for VisibilityReceipt {
    fn decode(parts: &ResponseParts) -> Result<Self, MnsError> {
        let root = codec::parse_rooted(&parts.body, "ChangeVisibility")?;
        Ok(Self {
            receipt_handle: ReceiptHandle::new(root.require_text("ReceiptHandle")?),
            next_visible_time: root.opt_millis("NextVisibleTime")?,
        })
    }
}

#[cfg(test)]
#[path = "messages_tests.rs"]
mod tests;
