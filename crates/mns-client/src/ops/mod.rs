//! Typed operation definitions.
//!
//! Every wire operation is a request/response pair: the request knows its
//! verb, resource, headers, and body encoding; the response knows how to
//! decode a success reply. The transport composes the two without inspecting
//! operation semantics.

pub mod account;
pub mod messages;
pub mod queues;
pub mod topics;

use std::time::Duration;

use reqwest::Method;

use crate::error::MnsError;
use crate::transport::ResponseParts;

/// A typed request: one operation, lowered to its wire form on demand.
pub trait ApiRequest: Send + Sync {
    /// Typed response produced by a success reply.
    type Response: ApiResponse;

    /// HTTP verb for this operation.
    fn method(&self) -> Method;

    /// Path plus query string; also the signature's canonicalized resource.
    fn resource(&self) -> String;

    /// Operation-specific `x-mns-*` headers.
    fn mns_headers(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Encoded XML body, when the operation carries one.
    fn body(&self) -> Result<Option<Vec<u8>>, MnsError> {
        Ok(None)
    }

    /// Client-side validation; failures never reach the network.
    fn validate(&self) -> Result<(), MnsError> {
        Ok(())
    }

    /// Server-side wait window to add on top of the request timeout.
    fn extra_wait(&self) -> Option<Duration> {
        None
    }
}

/// A typed response decoded from a success reply.
pub trait ApiResponse: Sized + Send {
    /// Decode the reply body; called only for 2xx replies.
    fn decode(parts: &ResponseParts) -> Result<Self, MnsError>;
}

/// Operations whose success reply carries no payload of interest.
impl ApiResponse for () {
    fn decode(_parts: &ResponseParts) -> Result<Self, MnsError> {
        Ok(())
    }
}
