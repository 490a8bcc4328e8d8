//! Default blocking transport over `ureq`.
//!
//! # Design
//! The agent is built with `http_status_as_error(false)` so 4xx/5xx
//! responses come back as data for the per-operation classifiers instead of
//! transport errors. Requests go through `ureq::http::Request` + `Agent::run`
//! because the endpoint surface needs methods the typed helpers do not cover
//! (`PATCH`, and the simple query's GET-with-body).
//!
//! The process-wide default transport is constructed once and shared; a
//! client that wants different TLS settings or a scripted test transport
//! injects its own via [`ClientConfig`](crate::ClientConfig) without
//! touching the shared instance.

use std::sync::{Arc, OnceLock};

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse, Transport};

/// [`Transport`] implementation backed by a blocking `ureq::Agent`.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        UreqTransport { agent }
    }

    /// Build a transport with a custom TLS configuration (e.g. a private
    /// trust root for a self-hosted server).
    pub fn with_tls_config(tls: ureq::tls::TlsConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .tls_config(tls)
            .build()
            .new_agent();
        UreqTransport { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        UreqTransport::new()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = ureq::http::Request::builder()
            .method(request.method.as_str())
            .uri(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let outbound = builder
            .body(request.body.unwrap_or_default())
            .map_err(TransportError::new)?;

        let mut response = self.agent.run(outbound).map_err(TransportError::new)?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(TransportError::new)?;

        Ok(HttpResponse { status, body })
    }
}

static DEFAULT_TRANSPORT: OnceLock<Arc<UreqTransport>> = OnceLock::new();

/// The shared default transport, constructed on first use.
///
/// Clients built without an explicit transport all hold a handle to this
/// instance. Injecting a custom transport never replaces it.
pub fn default_transport() -> Arc<dyn Transport> {
    DEFAULT_TRANSPORT
        .get_or_init(|| Arc::new(UreqTransport::new()))
        .clone()
}
