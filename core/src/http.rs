//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! `XServerClient` builds `HttpRequest` values and parses `HttpResponse`
//! values without touching the network. `HttpTransport` (or any other host)
//! executes the round trip in between. Keeping the two halves pure lets the
//! envelope rules be tested without a server.

/// An X-Server request described as plain data. The X-Server API is
/// query-string driven, so every request is a `GET` of `url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

/// An HTTP response described as plain data.
///
/// Constructed by the host after executing an `HttpRequest`, then passed to
/// `XServerClient::parse_response`.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}
