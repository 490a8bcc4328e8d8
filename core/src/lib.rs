//! Synchronous client library for a policy server's REST API.
//!
//! # Overview
//! Covers policy CRUD, document CRUD, simple and ad-hoc queries, and
//! partial-evaluation ("compile") requests. The interesting part is the
//! dispatch layer: every operation renders a URL template, attaches the
//! bearer credential, executes one blocking round trip, and classifies the
//! response status through its own per-endpoint table. The same status
//! code deliberately means different things on different endpoints.
//!
//! # Design
//! - [`Client`] is immutable after construction and safe to share; each
//!   call is one network round trip with no retries, queuing, or internal
//!   timeouts.
//! - The HTTP executor sits behind the [`Transport`] trait. By default a
//!   shared blocking `ureq` agent is used; tests and TLS-customized callers
//!   inject their own.
//! - Errors are data: operations return a [`ClientError`] kind and nothing
//!   is logged or retried internally.
//! - Payloads are opaque `serde_json::Value` documents; the server owns
//!   the schemas.

pub mod client;
pub mod error;
pub mod http;
pub mod options;
pub mod transport;
pub mod types;

pub use client::{Client, ClientConfig};
pub use error::{ClientError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use options::QueryOptions;
pub use transport::{default_transport, UreqTransport};
pub use types::{
    CompileRequest, CompileResponse, DocumentResponse, PolicyGetResponse, PolicyListResponse,
    PolicyWriteResponse, QueryResponse,
};
