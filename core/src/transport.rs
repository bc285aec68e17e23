//! The transport contract consumed by `ResourceService`, and its HTTP
//! implementation.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument};

use crate::client::XServerClient;
use crate::config::ServiceConfig;
use crate::document::XmlNode;
use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};
use crate::params::Params;

/// Sends a named X-Server request and returns the parsed response document.
///
/// `use_defaults` tells the transport whether the caller already merged the
/// default parameters into `params`. Implementations never inject defaults
/// themselves.
pub trait Transport {
    fn send(
        &self,
        request_name: &str,
        params: &Params,
        use_defaults: bool,
    ) -> Result<XmlNode, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(
        &self,
        request_name: &str,
        params: &Params,
        use_defaults: bool,
    ) -> Result<XmlNode, TransportError> {
        (**self).send(request_name, params, use_defaults)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(
        &self,
        request_name: &str,
        params: &Params,
        use_defaults: bool,
    ) -> Result<XmlNode, TransportError> {
        (**self).send(request_name, params, use_defaults)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(
        &self,
        request_name: &str,
        params: &Params,
        use_defaults: bool,
    ) -> Result<XmlNode, TransportError> {
        (**self).send(request_name, params, use_defaults)
    }
}

/// Blocking HTTP transport backed by `ureq`.
///
/// Non-200 statuses are returned as data so `XServerClient::parse_response`
/// decides how to report them.
#[derive(Clone)]
pub struct HttpTransport {
    client: XServerClient,
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, None)
    }

    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self {
            client: XServerClient::new(base_url),
            agent,
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::with_timeout(&config.base_url, config.timeout())
    }

    pub fn client(&self) -> &XServerClient {
        &self.client
    }

    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut call = self.agent.get(&request.url);
        for (key, value) in &request.headers {
            call = call.header(key.as_str(), value.as_str());
        }
        let mut response = call
            .call()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}

impl Transport for HttpTransport {
    #[instrument(skip(self, params), fields(params = params.len()))]
    fn send(
        &self,
        request_name: &str,
        params: &Params,
        use_defaults: bool,
    ) -> Result<XmlNode, TransportError> {
        let request = self.client.build_request(request_name, params);
        debug!(url = %request.url, "sending request");
        let response = self.execute(request)?;
        debug!(status = response.status, bytes = response.body.len(), "received response");
        self.client.parse_response(response)
    }
}
