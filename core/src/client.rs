//! Stateless request builder and response parser for the X-Server API.
//!
//! # Design
//! `XServerClient` holds only a `base_url`. `build_request` turns a request
//! name plus parameters into an `HttpRequest`; `parse_response` turns an
//! `HttpResponse` into the validated root `XmlNode`. The caller executes the
//! HTTP round trip in between, so both halves are deterministic.

use url::form_urlencoded;

use crate::document::XmlNode;
use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};
use crate::params::Params;

/// Root element of every X-Server response.
pub const ENVELOPE: &str = "x_server_response";

/// Synchronous, stateless client for the X-Server API.
#[derive(Debug, Clone)]
pub struct XServerClient {
    base_url: String,
}

impl XServerClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET {base_url}?op={request_name}&{params...}`, params in insertion order.
    pub fn build_request(&self, request_name: &str, params: &Params) -> HttpRequest {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query.append_pair("op", request_name);
        params.encode_into(&mut query);

        let separator = if self.base_url.contains('?') { '&' } else { '?' };
        HttpRequest {
            url: format!("{}{separator}{}", self.base_url, query.finish()),
            headers: vec![("accept".to_string(), "text/xml".to_string())],
        }
    }

    /// Validate status and envelope, returning the root element.
    pub fn parse_response(&self, response: HttpResponse) -> Result<XmlNode, TransportError> {
        if response.status != 200 {
            return Err(TransportError::Http {
                status: response.status,
                body: response.body,
            });
        }
        let root = XmlNode::parse(&response.body)?;
        check_envelope(&root)?;
        Ok(root)
    }
}

/// The root must be `x_server_response` and carry no error element.
///
/// `global_error` sits directly under the root; `local_error` sits under the
/// operation's `*_response` element.
fn check_envelope(root: &XmlNode) -> Result<(), TransportError> {
    if root.name != ENVELOPE {
        return Err(TransportError::Envelope(format!(
            "expected <{ENVELOPE}>, found <{}>",
            root.name
        )));
    }
    if let Some(error) = root.child("global_error") {
        return Err(remote_error(error));
    }
    let local = root
        .children
        .iter()
        .filter(|c| c.name.ends_with("_response"))
        .find_map(|c| c.child("local_error"));
    match local {
        Some(error) => Err(remote_error(error)),
        None => Ok(()),
    }
}

fn remote_error(node: &XmlNode) -> TransportError {
    TransportError::Remote {
        code: node.child_text("error_code").unwrap_or_default().to_string(),
        message: node.child_text("error_text").unwrap_or_default().to_string(),
    }
}
