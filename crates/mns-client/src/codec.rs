//! Bidirectional mapping between typed values and the XML wire format.
//!
//! Encoding builds XML documents with escaped text content; decoding parses
//! replies into a small element tree that operation modules pick apart.
//! Malformed payloads surface as [`MnsError::Parse`], always distinguishable
//! from a structured service error.

use chrono::{DateTime, Utc};
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{MnsError, ServiceError, ServiceErrorCode};

/// XML namespace carried on every request document root.
pub(crate) const MNS_XML_NAMESPACE: &str = "http://mns.aliyuncs.com/doc/v1/";

// ============================================================================
// Encoding
// ============================================================================

/// Incremental builder for request documents.
pub(crate) struct XmlBuilder {
    buf: String,
    root: &'static str,
}

impl XmlBuilder {
    /// Start a document with the given root element.
    pub(crate) fn new(root: &'static str) -> Self {
        let mut buf = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>");
        buf.push('<');
        buf.push_str(root);
        buf.push_str(" xmlns=\"");
        buf.push_str(MNS_XML_NAMESPACE);
        buf.push_str("\">");
        Self { buf, root }
    }

    pub(crate) fn open(&mut self, tag: &str) {
        self.buf.push('<');
        self.buf.push_str(tag);
        self.buf.push('>');
    }

    pub(crate) fn close(&mut self, tag: &str) {
        self.buf.push_str("</");
        self.buf.push_str(tag);
        self.buf.push('>');
    }

    /// Append a leaf element with escaped text content.
    pub(crate) fn leaf(&mut self, tag: &str, value: &str) {
        self.open(tag);
        self.buf.push_str(&escape(value));
        self.close(tag);
    }

    /// Append a leaf element only when a value is present.
    pub(crate) fn opt_leaf(&mut self, tag: &str, value: Option<&str>) {
        if let Some(value) = value {
            self.leaf(tag, value);
        }
    }

    /// Close the root element and return the document bytes.
    pub(crate) fn finish(mut self) -> Vec<u8> {
        self.close(self.root);
        self.buf.into_bytes()
    }
}

/// Wire representation of a boolean attribute.
pub(crate) fn bool_to_wire(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

// ============================================================================
// Decoding
// ============================================================================

/// A parsed XML element: name, concatenated text content, child elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct XmlElement {
    pub(crate) name: String,
    pub(crate) text: String,
    pub(crate) children: Vec<XmlElement>,
}

impl XmlElement {
    /// First child with the given name.
    pub(crate) fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All children with the given name, in document order.
    pub(crate) fn children_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Text content of the first child with the given name.
    pub(crate) fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.as_str())
    }

    /// Text content of a child that the wire contract requires.
    pub(crate) fn require_text(&self, name: &str) -> Result<String, MnsError> {
        self.child_text(name)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .ok_or_else(|| MnsError::Parse {
                message: format!("missing <{}> in <{}> reply", name, self.name),
            })
    }

    /// Optional numeric child; present-but-malformed values are parse errors.
    pub(crate) fn opt_u32(&self, name: &str) -> Result<Option<u32>, MnsError> {
        self.opt_parsed(name)
    }

    pub(crate) fn opt_u64(&self, name: &str) -> Result<Option<u64>, MnsError> {
        self.opt_parsed(name)
    }

    pub(crate) fn opt_u8(&self, name: &str) -> Result<Option<u8>, MnsError> {
        self.opt_parsed(name)
    }

    fn opt_parsed<T: std::str::FromStr>(&self, name: &str) -> Result<Option<T>, MnsError> {
        match self.child_text(name) {
            None => Ok(None),
            Some("") => Ok(None),
            Some(text) => text.parse::<T>().map(Some).map_err(|_| MnsError::Parse {
                message: format!("invalid numeric value {:?} in <{}>", text, name),
            }),
        }
    }

    /// Optional boolean child ("True"/"False", case-insensitive).
    pub(crate) fn opt_bool(&self, name: &str) -> Result<Option<bool>, MnsError> {
        match self.child_text(name) {
            None | Some("") => Ok(None),
            Some(text) => match text.to_ascii_lowercase().as_str() {
                "true" => Ok(Some(true)),
                "false" => Ok(Some(false)),
                _ => Err(MnsError::Parse {
                    message: format!("invalid boolean value {:?} in <{}>", text, name),
                }),
            },
        }
    }

    /// Optional epoch-milliseconds timestamp child (message timestamps).
    pub(crate) fn opt_millis(&self, name: &str) -> Result<Option<DateTime<Utc>>, MnsError> {
        match self.opt_parsed::<i64>(name)? {
            None => Ok(None),
            Some(millis) => DateTime::from_timestamp_millis(millis)
                .map(Some)
                .ok_or_else(|| MnsError::Parse {
                    message: format!("timestamp {} out of range in <{}>", millis, name),
                }),
        }
    }

    /// Optional epoch-seconds timestamp child (resource attribute times).
    pub(crate) fn opt_secs(&self, name: &str) -> Result<Option<DateTime<Utc>>, MnsError> {
        match self.opt_parsed::<i64>(name)? {
            None => Ok(None),
            Some(secs) => DateTime::from_timestamp(secs, 0)
                .map(Some)
                .ok_or_else(|| MnsError::Parse {
                    message: format!("timestamp {} out of range in <{}>", secs, name),
                }),
        }
    }
}

/// Parse a reply body into an element tree.
pub(crate) fn parse_document(body: &[u8]) -> Result<XmlElement, MnsError> {
    let mut reader = Reader::from_reader(body);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    fn attach(
        element: XmlElement,
        stack: &mut [XmlElement],
        root: &mut Option<XmlElement>,
    ) -> Result<(), MnsError> {
        match stack.last_mut() {
            Some(parent) => {
                parent.children.push(element);
                Ok(())
            }
            None if root.is_none() => {
                *root = Some(element);
                Ok(())
            }
            None => Err(MnsError::Parse {
                message: "multiple root elements in reply".to_string(),
            }),
        }
    }

    loop {
        match reader.read_event() {
            Err(error) => {
                return Err(MnsError::Parse {
                    message: format!("invalid XML: {}", error),
                })
            }
            Ok(Event::Eof) => break,
            Ok(Event::Start(start)) => {
                stack.push(XmlElement {
                    name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
                    text: String::new(),
                    children: Vec::new(),
                });
            }
            Ok(Event::Empty(start)) => {
                let element = XmlElement {
                    name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
                    text: String::new(),
                    children: Vec::new(),
                };
                attach(element, &mut stack, &mut root)?;
            }
            Ok(Event::End(_)) => {
                let element = stack.pop().ok_or_else(|| MnsError::Parse {
                    message: "unbalanced closing tag in reply".to_string(),
                })?;
                attach(element, &mut stack, &mut root)?;
            }
            Ok(Event::Text(text)) => {
                let text = text.unescape().map_err(|error| MnsError::Parse {
                    message: format!("invalid XML text: {}", error),
                })?;
                if !text.trim().is_empty() {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&text);
                    }
                }
            }
            Ok(Event::CData(data)) => {
                let bytes = data.into_inner();
                let text = std::str::from_utf8(&bytes).map_err(|_| MnsError::Parse {
                    message: "CDATA section is not valid UTF-8".to_string(),
                })?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(text);
                }
            }
            // Declarations, comments, and processing instructions are noise.
            Ok(_) => {}
        }
    }

    root.ok_or_else(|| MnsError::Parse {
        message: "empty reply body".to_string(),
    })
}

/// Parse a reply body and check the root element name.
pub(crate) fn parse_rooted(body: &[u8], expected_root: &str) -> Result<XmlElement, MnsError> {
    let root = parse_document(body)?;
    if root.name != expected_root {
        return Err(MnsError::Parse {
            message: format!("expected <{}> reply, got <{}>", expected_root, root.name),
        });
    }
    Ok(root)
}

// ============================================================================
// Error Body Decoding
// ============================================================================

/// Map a non-success reply to a typed error.
///
/// The service wraps business errors in an `<Error>` document (or an
/// `<Errors>` list for batch operations, of which the first entry is
/// surfaced). Anything else is protocol drift and maps to a parse error.
pub(crate) fn decode_error(status: u16, request_id: Option<&str>, body: &[u8]) -> MnsError {
    let root = match parse_document(body) {
        Ok(root) => root,
        Err(_) => {
            return MnsError::Parse {
                message: format!("status {} with unrecognized error body", status),
            }
        }
    };

    let entry = match root.name.as_str() {
        "Error" => Some(&root),
        "Errors" => root.child("Error"),
        _ => None,
    };

    if let Some(entry) = entry {
        let code = entry
            .child_text("Code")
            .or_else(|| entry.child_text("ErrorCode"))
            .filter(|code| !code.is_empty());
        if let Some(code) = code {
            return MnsError::Service(ServiceError {
                code: ServiceErrorCode::from_code(code),
                message: entry
                    .child_text("Message")
                    .or_else(|| entry.child_text("ErrorMessage"))
                    .unwrap_or_default()
                    .to_string(),
                request_id: entry
                    .child_text("RequestId")
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
                    .or_else(|| request_id.map(str::to_string)),
                status,
            });
        }
    }

    MnsError::Parse {
        message: format!("status {} with unrecognized error body", status),
    }
}

// ============================================================================
// Shared Helpers
// ============================================================================

/// Extract a resource name from its URL form in list replies.
///
/// List replies report each resource as a full URL; only the trailing path
/// segment is the name callers work with.
pub(crate) fn name_from_url(url: &str) -> &str {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(url)
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
