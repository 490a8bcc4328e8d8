//! HTTP request/response data and the transport seam.
//!
//! # Design
//! Requests and responses are plain owned data. Operations assemble an
//! `HttpRequest`, hand it to a [`Transport`] for exactly one blocking round
//! trip, and classify the returned `HttpResponse` by status code. Keeping
//! the transport behind a trait lets tests substitute a scripted sender
//! without touching any global state.

use crate::error::TransportError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Wire name of the method.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// An outbound HTTP request described as plain data.
///
/// The URL is absolute (base URL + rendered endpoint template + query
/// options). Headers always include `Authorization`; the body, when present,
/// is the exact byte sequence to transmit.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

/// An HTTP response with its body fully read.
///
/// The transport consumes the body stream before returning, so by the time
/// an operation classifies the status the underlying connection resources
/// are already released; the owned bytes drop with the value on every
/// branch.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Executes one synchronous HTTP round trip.
///
/// Implementations must not retry, interpret status codes, or enforce
/// deadlines of their own; any deadline comes from the transport's
/// configuration. Network-level failures of any kind surface as
/// [`TransportError`].
pub trait Transport: Send + Sync {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}
