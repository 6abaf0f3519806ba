//! Queue handle: message-level operations scoped to one named queue.
//!
//! A handle is a stateless reference: it holds the queue name, a shared
//! transport, and the body-encoding flag. It does not create the queue and
//! keeps no connection state of its own, so handles are cheap to clone and
//! safe to share across tasks.

use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};

use crate::error::{MnsError, ServiceErrorCode};
use crate::model::{
    Message, PeekedMessage, QueueAttributes, QueueMeta, QueueName, ReceiptHandle, ReceivedMessage,
    SendReceipt, VisibilityReceipt,
};
use crate::ops::messages::{
    BatchDeleteMessageRequest, BatchPeekMessageRequest, BatchReceiveMessageRequest,
    BatchSendMessageRequest, ChangeVisibilityRequest, DeleteMessageRequest, PeekMessageRequest,
    ReceiveMessageRequest, SendMessageRequest,
};
use crate::ops::queues::{GetQueueAttributesRequest, SetQueueAttributesRequest};
use crate::promise::MnsPromise;
use crate::transport::{send_request, Transport};

/// Reference to a named queue.
#[derive(Clone)]
pub struct Queue {
    transport: Arc<dyn Transport>,
    name: QueueName,
    base64: bool,
}

impl Queue {
    pub(crate) fn new(transport: Arc<dyn Transport>, name: QueueName, base64: bool) -> Self {
        Self {
            transport,
            name,
            base64,
        }
    }

    /// Get the queue name.
    pub fn name(&self) -> &QueueName {
        &self.name
    }

    /// Check whether message bodies are base64-encoded on the wire.
    pub fn uses_base64(&self) -> bool {
        self.base64
    }

    // ========================================================================
    // Send
    // ========================================================================

    /// Send one message; returns the server-assigned id and body digest.
    pub async fn send_message(&self, message: Message) -> Result<SendReceipt, MnsError> {
        let request = SendMessageRequest::new(self.name.clone(), self.encode(message));
        send_request(self.transport.as_ref(), &request).await
    }

    /// Deferred variant of [`send_message`](Self::send_message); the request
    /// is not sent until the promise is waited on.
    pub fn send_message_async(&self, message: Message) -> MnsPromise<SendReceipt> {
        let transport = Arc::clone(&self.transport);
        let request = SendMessageRequest::new(self.name.clone(), self.encode(message));
        MnsPromise::new(async move { send_request(transport.as_ref(), &request).await })
    }

    /// Send up to 16 messages in one round trip.
    pub async fn batch_send_message(
        &self,
        messages: Vec<Message>,
    ) -> Result<Vec<SendReceipt>, MnsError> {
        let request = self.batch_send_request(messages);
        send_request(self.transport.as_ref(), &request).await
    }

    /// Deferred variant of [`batch_send_message`](Self::batch_send_message).
    pub fn batch_send_message_async(&self, messages: Vec<Message>) -> MnsPromise<Vec<SendReceipt>> {
        let transport = Arc::clone(&self.transport);
        let request = self.batch_send_request(messages);
        MnsPromise::new(async move { send_request(transport.as_ref(), &request).await })
    }

    fn batch_send_request(&self, messages: Vec<Message>) -> BatchSendMessageRequest {
        let messages = messages.into_iter().map(|m| self.encode(m)).collect();
        BatchSendMessageRequest::new(self.name.clone(), messages)
    }

    // ========================================================================
    // Receive
    // ========================================================================

    /// Receive one message, long-polling up to `wait_seconds` server-side.
    ///
    /// Blocks for up to the wait window and returns `None` when no message
    /// arrived in time; the absence of a message is never an error. With
    /// `wait_seconds` unset the queue's configured polling window applies.
    pub async fn receive_message(
        &self,
        wait_seconds: Option<u32>,
    ) -> Result<Option<ReceivedMessage>, MnsError> {
        let request = ReceiveMessageRequest::new(self.name.clone(), wait_seconds);
        receive_inner(Arc::clone(&self.transport), request, self.base64).await
    }

    /// Deferred variant of [`receive_message`](Self::receive_message).
    pub fn receive_message_async(
        &self,
        wait_seconds: Option<u32>,
    ) -> MnsPromise<Option<ReceivedMessage>> {
        let request = ReceiveMessageRequest::new(self.name.clone(), wait_seconds);
        MnsPromise::new(receive_inner(
            Arc::clone(&self.transport),
            request,
            self.base64,
        ))
    }

    /// Receive up to `number` messages in one round trip.
    ///
    /// An empty queue yields an empty vector after the wait window.
    pub async fn batch_receive_message(
        &self,
        number: u32,
        wait_seconds: Option<u32>,
    ) -> Result<Vec<ReceivedMessage>, MnsError> {
        let request = BatchReceiveMessageRequest::new(self.name.clone(), number, wait_seconds);
        batch_receive_inner(Arc::clone(&self.transport), request, self.base64).await
    }

    /// Deferred variant of [`batch_receive_message`](Self::batch_receive_message).
    pub fn batch_receive_message_async(
        &self,
        number: u32,
        wait_seconds: Option<u32>,
    ) -> MnsPromise<Vec<ReceivedMessage>> {
        let request = BatchReceiveMessageRequest::new(self.name.clone(), number, wait_seconds);
        MnsPromise::new(batch_receive_inner(
            Arc::clone(&self.transport),
            request,
            self.base64,
        ))
    }

    // ========================================================================
    // Peek
    // ========================================================================

    /// Read the front message without removing it.
    ///
    /// Peeked messages carry no receipt handle and cannot be deleted.
    pub async fn peek_message(&self) -> Result<Option<PeekedMessage>, MnsError> {
        let request = PeekMessageRequest::new(self.name.clone());
        peek_inner(Arc::clone(&self.transport), request, self.base64).await
    }

    /// Deferred variant of [`peek_message`](Self::peek_message).
    pub fn peek_message_async(&self) -> MnsPromise<Option<PeekedMessage>> {
        let request = PeekMessageRequest::new(self.name.clone());
        MnsPromise::new(peek_inner(
            Arc::clone(&self.transport),
            request,
            self.base64,
        ))
    }

    /// Peek up to `number` messages without removing them.
    pub async fn batch_peek_message(&self, number: u32) -> Result<Vec<PeekedMessage>, MnsError> {
        let request = BatchPeekMessageRequest::new(self.name.clone(), number);
        batch_peek_inner(Arc::clone(&self.transport), request, self.base64).await
    }

    /// Deferred variant of [`batch_peek_message`](Self::batch_peek_message).
    pub fn batch_peek_message_async(&self, number: u32) -> MnsPromise<Vec<PeekedMessage>> {
        let request = BatchPeekMessageRequest::new(self.name.clone(), number);
        MnsPromise::new(batch_peek_inner(
            Arc::clone(&self.transport),
            request,
            self.base64,
        ))
    }

    // ========================================================================
    // Delete and Visibility
    // ========================================================================

    /// Delete the delivery identified by a receipt handle.
    ///
    /// An already-deleted or expired handle fails with the invalid-receipt
    /// service error rather than a transport failure, so callers can safely
    /// retry and then ignore that outcome.
    pub async fn delete_message(&self, receipt_handle: ReceiptHandle) -> Result<(), MnsError> {
        let request = DeleteMessageRequest::new(self.name.clone(), receipt_handle);
        send_request(self.transport.as_ref(), &request).await
    }

    /// Deferred variant of [`delete_message`](Self::delete_message).
    pub fn delete_message_async(&self, receipt_handle: ReceiptHandle) -> MnsPromise<()> {
        let transport = Arc::clone(&self.transport);
        let request = DeleteMessageRequest::new(self.name.clone(), receipt_handle);
        MnsPromise::new(async move { send_request(transport.as_ref(), &request).await })
    }

    /// Delete up to 16 deliveries in one round trip.
    pub async fn batch_delete_message(
        &self,
        receipt_handles: Vec<ReceiptHandle>,
    ) -> Result<(), MnsError> {
        let request = BatchDeleteMessageRequest::new(self.name.clone(), receipt_handles);
        send_request(self.transport.as_ref(), &request).await
    }

    /// Deferred variant of [`batch_delete_message`](Self::batch_delete_message).
    pub fn batch_delete_message_async(
        &self,
        receipt_handles: Vec<ReceiptHandle>,
    ) -> MnsPromise<()> {
        let transport = Arc::clone(&self.transport);
        let request = BatchDeleteMessageRequest::new(self.name.clone(), receipt_handles);
        MnsPromise::new(async move { send_request(transport.as_ref(), &request).await })
    }

    /// Change how long a delivery stays invisible.
    ///
    /// The given handle is consumed; the returned receipt carries the fresh
    /// handle to use for any further delete or visibility change.
    pub async fn change_message_visibility(
        &self,
        receipt_handle: ReceiptHandle,
        visibility_timeout: u32,
    ) -> Result<VisibilityReceipt, MnsError> {
        let request =
            ChangeVisibilityRequest::new(self.name.clone(), receipt_handle, visibility_timeout);
        send_request(self.transport.as_ref(), &request).await
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    /// Fetch the queue's attributes and message counts.
    pub async fn get_attributes(&self) -> Result<QueueMeta, MnsError> {
        let request = GetQueueAttributesRequest::new(self.name.clone());
        send_request(self.transport.as_ref(), &request).await
    }

    /// Overwrite the queue's settable attributes.
    pub async fn set_attributes(&self, attributes: QueueAttributes) -> Result<(), MnsError> {
        let request = SetQueueAttributesRequest::new(self.name.clone(), attributes);
        send_request(self.transport.as_ref(), &request).await
    }

    fn encode(&self, message: Message) -> Message {
        if self.base64 {
            Message {
                body: general_purpose::STANDARD.encode(message.body.as_bytes()),
                ..message
            }
        } else {
            message
        }
    }
}

impl std::fmt::Debug for Queue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Queue")
            .field("name", &self.name)
            .field("base64", &self.base64)
            .finish()
    }
}

fn is_no_message(error: &MnsError) -> bool {
    matches!(error, MnsError::Service(e) if e.code == ServiceErrorCode::MessageNotExist)
}

fn decode_body(base64: bool, body: String) -> Result<String, MnsError> {
    if !base64 {
        return Ok(body);
    }
    let bytes = general_purpose::STANDARD
        .decode(body.as_bytes())
        .map_err(|_| MnsError::Parse {
            message: "message body is not valid base64".to_string(),
        })?;
    String::from_utf8(bytes).map_err(|_| MnsError::Parse {
        message: "decoded message body is not valid UTF-8".to_string(),
    })
}

async fn receive_inner(
    transport: Arc<dyn Transport>,
    request: ReceiveMessageRequest,
    base64: bool,
) -> Result<Option<ReceivedMessage>, MnsError> {
    match send_request(transport.as_ref(), &request).await {
        Ok(mut message) => {
            message.body = decode_body(base64, message.body)?;
            Ok(Some(message))
        }
        Err(error) if is_no_message(&error) => Ok(None),
        Err(error) => Err(error),
    }
}

async fn batch_receive_inner(
    transport: Arc<dyn Transport>,
    request: BatchReceiveMessageRequest,
    base64: bool,
) -> Result<Vec<ReceivedMessage>, MnsError> {
    match send_request(transport.as_ref(), &request).await {
        Ok(messages) => messages
            .into_iter()
            .map(|mut message| {
                message.body = decode_body(base64, message.body)?;
                Ok(message)
            })
            .collect(),
        Err(error) if is_no_message(&error) => Ok(Vec::new()),
        Err(error) => Err(error),
    }
}

async fn peek_inner(
    transport: Arc<dyn Transport>,
    request: PeekMessageRequest,
    base64: bool,
) -> Result<Option<PeekedMessage>, MnsError> {
    match send_request(transport.as_ref(), &request).await {
        Ok(mut message) => {
            message.body = decode_body(base64, message.body)?;
            Ok(Some(message))
        }
        Err(error) if is_no_message(&error) => Ok(None),
        Err(error) => Err(error),
    }
}

async fn batch_peek_inner(
    transport: Arc<dyn Transport>,
    request: BatchPeekMessageRequest,
    base64: bool,
) -> Result<Vec<PeekedMessage>, MnsError> {
    match send_request(transport.as_ref(), &request).await {
        Ok(messages) => messages
            .into_iter()
            .map(|mut message| {
                message.body = decode_body(base64, message.body)?;
                Ok(message)
            })
            .collect(),
        Err(error) if is_no_message(&error) => Ok(Vec::new()),
        Err(error) => Err(error),
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
