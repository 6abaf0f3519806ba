//! Account-level attribute operations.
//!
//! Account attributes are global policy, independent of any single queue or
//! topic. Plain request/response pairs; no special state machine.

use reqwest::Method;

use crate::codec::{self, XmlBuilder};
use crate::error::MnsError;
use crate::model::AccountAttributes;
use crate::ops::{ApiRequest, ApiResponse};
use crate::transport::ResponseParts;

/// Fetch account-wide attributes.
#[derive(Debug, Clone, Default)]
pub struct GetAccountAttributesRequest;

impl GetAccountAttributesRequest {
    pub fn new() -> Self {
        Self
    }
}

impl ApiRequest for GetAccountAttributesRequest {
    type Response = AccountAttributes;

    fn method(&self) -> Method {
        Method::GET
    }

    fn resource(&self) -> String {
        "/?accountmeta=true".to_string()
    }
}

impl ApiResponse for AccountAttributes {
    fn decode(parts: &ResponseParts) -> Result<Self, MnsError> {
        let root = codec::parse_rooted(&parts.body, "Account")?;
        Ok(Self {
            logging_bucket: root
                .child_text("LoggingBucket")
                .filter(|bucket| !bucket.is_empty())
                .map(str::to_string),
        })
    }
}

/// Overwrite account-wide attributes; absent fields are left unchanged.
#[derive(Debug, Clone)]
pub struct SetAccountAttributesRequest {
    attributes: AccountAttributes,
}

impl SetAccountAttributesRequest {
    pub fn new(attributes: AccountAttributes) -> Self {
        Self { attributes }
    }
}

impl ApiRequest for SetAccountAttributesRequest {
    type Response = ();

    fn method(&self) -> Method {
        Method::PUT
    }

    fn resource(&self) -> String {
        "/?accountmeta=true".to_string()
    }

    fn body(&self) -> Result<Option<Vec<u8>>, MnsError> {
        let mut xml = XmlBuilder::new("Account");
        xml.opt_leaf("LoggingBucket", self.attributes.logging_bucket.as_deref());
        Ok(Some(xml.finish()))
    }
}

#[cfg(test)]
#[path = "account_tests.rs"]
mod tests;
