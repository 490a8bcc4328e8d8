//! Synchronous client for the policy server REST API.
//!
//! # Overview
//! Every operation follows the same four steps: render an endpoint template
//! into an absolute URL, assemble a request (auth header, content type,
//! query options, body), execute one blocking round trip through the
//! configured [`Transport`], and classify the response status into a typed
//! result or a [`ClientError`] kind.
//!
//! # Design
//! - `Client` holds only the transport handle, base URL, and token; it has
//!   no per-call mutable state and is safe to share across threads.
//! - Each operation owns its own status `match`. The same status code means
//!   different things on different endpoints (a 404 on a policy update is
//!   `NotFound`, a 404 on a conditional document overwrite is
//!   `WriteConflict`). That divergence is server semantics, so the tables
//!   are deliberately not folded into one shared mapping.
//! - Payload schemas belong to the server; decoded envelopes carry opaque
//!   `serde_json::Value` fields.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ClientError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::options::QueryOptions;
use crate::transport::default_transport;
use crate::types::{
    CompileRequest, CompileResponse, DocumentResponse, PolicyGetResponse, PolicyListResponse,
    PolicyWriteResponse, QueryResponse,
};

/// List policies.
pub const API_LIST_POLICIES: &str = "/v1/policies";
/// Get/create/update/delete a single policy.
pub const API_POLICY: &str = "/v1/policies/%s";
/// Document at a path.
pub const API_DATA: &str = "/v1/data/%s";
/// Webhook-style document ingestion. Part of the wire contract but not
/// wired to an operation here.
pub const API_DATA_WEBHOOK: &str = "/v0/data/%s";
/// Simple and ad-hoc queries.
pub const API_SIMPLE_QUERY: &str = "/";
/// Dedicated ad-hoc query endpoint. Reserved; ad-hoc queries post to
/// [`API_SIMPLE_QUERY`].
pub const API_AD_HOC_QUERY: &str = "/v1/query";
/// Partial evaluation.
pub const API_COMPILE: &str = "/v1/compile";

/// Configuration for [`Client::new`].
#[derive(Clone)]
pub struct ClientConfig {
    /// Server base URL, e.g. `http://localhost:8181`. Must be non-empty.
    pub base_url: String,
    /// Bearer credential, forwarded verbatim. May be empty; an empty token
    /// is still sent as `Bearer `.
    pub token: String,
    /// Transport override. `None` uses the shared default
    /// [`UreqTransport`](crate::transport::UreqTransport).
    pub transport: Option<Arc<dyn Transport>>,
}

/// Client for the policy server.
///
/// Immutable after construction; create one per server and reuse it for the
/// process lifetime. Concurrent calls from multiple threads are safe; the
/// only shared state is this configuration.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    base_url: String,
    token: String,
}

impl Client {
    /// Build a client from `config`, or `None` if `base_url` is empty.
    pub fn new(config: ClientConfig) -> Option<Client> {
        if config.base_url.is_empty() {
            return None;
        }
        Some(Client {
            transport: config.transport.unwrap_or_else(default_transport),
            base_url: config.base_url,
            token: config.token,
        })
    }

    /// Render `template` against positional `args` into an absolute URL.
    ///
    /// Each `%s` placeholder is replaced left to right by the corresponding
    /// argument. Supplying fewer arguments than placeholders leaves the
    /// remainder unresolved; that mismatch is a programming error, not a
    /// runtime condition. Arguments are inserted verbatim; callers must
    /// pre-sanitize identifiers containing URL-reserved characters.
    pub fn build_url(&self, template: &str, args: &[&str]) -> String {
        let mut url = format!("{}{}", self.base_url, template);
        for arg in args {
            url = url.replacen("%s", arg, 1);
        }
        url
    }

    fn request(
        &self,
        method: HttpMethod,
        url: String,
        content_type: Option<&str>,
        body: Option<Vec<u8>>,
    ) -> HttpRequest {
        let mut headers = vec![(
            "Authorization".to_string(),
            format!("Bearer {}", self.token),
        )];
        if let Some(content_type) = content_type {
            headers.push(("Content-Type".to_string(), content_type.to_string()));
        }
        HttpRequest {
            method,
            url,
            headers,
            body,
        }
    }

    fn dispatch(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        Ok(self.transport.send(request)?)
    }

    /// List all policies.
    pub fn list_policies(&self) -> Result<PolicyListResponse, ClientError> {
        let url = self.build_url(API_LIST_POLICIES, &[]);
        let request = self.request(HttpMethod::Get, url, None, None);
        let response = self.dispatch(request)?;
        match response.status {
            200 => decode(&response),
            _ => Err(server_error(response)),
        }
    }

    /// Get a single policy by id.
    pub fn get_policy(&self, policy_id: &str) -> Result<PolicyGetResponse, ClientError> {
        let url = self.build_url(API_POLICY, &[policy_id]);
        let request = self.request(HttpMethod::Get, url, None, None);
        let response = self.dispatch(request)?;
        match response.status {
            200 => decode(&response),
            404 => Err(ClientError::NotFound),
            _ => Err(server_error(response)),
        }
    }

    /// Create the policy if absent, update it otherwise. `policy` is the
    /// raw policy text, shipped as `text/plain`.
    pub fn put_policy(
        &self,
        policy_id: &str,
        policy: &str,
        opts: &QueryOptions,
    ) -> Result<PolicyWriteResponse, ClientError> {
        let mut url = self.build_url(API_POLICY, &[policy_id]);
        opts.append_policy_write(&mut url);
        let request = self.request(
            HttpMethod::Put,
            url,
            Some("text/plain"),
            Some(policy.as_bytes().to_vec()),
        );
        let response = self.dispatch(request)?;
        match response.status {
            200 => decode(&response),
            404 => Err(ClientError::NotFound),
            _ => Err(server_error(response)),
        }
    }

    /// Delete a policy by id.
    pub fn delete_policy(
        &self,
        policy_id: &str,
        opts: &QueryOptions,
    ) -> Result<PolicyWriteResponse, ClientError> {
        let mut url = self.build_url(API_POLICY, &[policy_id]);
        opts.append_policy_write(&mut url);
        let request = self.request(HttpMethod::Delete, url, None, None);
        let response = self.dispatch(request)?;
        match response.status {
            200 => decode(&response),
            400 => Err(ClientError::BadRequest),
            404 => Err(ClientError::NotFound),
            _ => Err(server_error(response)),
        }
    }

    /// Get the document at `path`.
    ///
    /// When `input` (a raw JSON text) is supplied, the call becomes a POST
    /// carrying the `{"input": <value>}` envelope. The input is inserted
    /// verbatim; the server is authoritative on its validity.
    pub fn get_document(
        &self,
        path: &str,
        input: Option<&str>,
        opts: &QueryOptions,
    ) -> Result<DocumentResponse, ClientError> {
        let mut url = self.build_url(API_DATA, &[path]);
        opts.append_document_read(&mut url);
        let (method, body) = match input {
            Some(input) => (
                HttpMethod::Post,
                Some(format!("{{\"input\": {input}}}").into_bytes()),
            ),
            None => (HttpMethod::Get, None),
        };
        let request = self.request(method, url, Some("application/json"), body);
        let response = self.dispatch(request)?;
        match response.status {
            200 => decode(&response),
            400 => Err(ClientError::BadRequest),
            404 => Err(ClientError::NotFound),
            _ => Err(server_error(response)),
        }
    }

    /// Create the document at `path` or overwrite the existing one.
    ///
    /// Returns `Ok(true)` when the write was applied (204) and `Ok(false)`
    /// when the server left the document unmodified (304). With
    /// `if_none_match` set the write carries `If-None-Match: *` and only
    /// succeeds if nothing exists at `path` yet. A 404 here is not a missing
    /// resource but a failed write pre-condition, so it maps to
    /// [`ClientError::WriteConflict`].
    pub fn put_document(
        &self,
        path: &str,
        data: &str,
        if_none_match: bool,
    ) -> Result<bool, ClientError> {
        let url = self.build_url(API_DATA, &[path]);
        let mut request = self.request(
            HttpMethod::Put,
            url,
            Some("application/json"),
            Some(data.as_bytes().to_vec()),
        );
        if if_none_match {
            request
                .headers
                .push(("If-None-Match".to_string(), "*".to_string()));
        }
        let response = self.dispatch(request)?;
        match response.status {
            204 => Ok(true),
            304 => Ok(false),
            400 => Err(ClientError::BadRequest),
            404 => Err(ClientError::WriteConflict),
            _ => Err(server_error(response)),
        }
    }

    /// Update the document at `path` with `data` (a JSON patch text).
    pub fn patch_document(&self, path: &str, data: &str) -> Result<(), ClientError> {
        let url = self.build_url(API_DATA, &[path]);
        let request = self.request(
            HttpMethod::Patch,
            url,
            Some("application/json"),
            Some(data.as_bytes().to_vec()),
        );
        let response = self.dispatch(request)?;
        match response.status {
            204 => Ok(()),
            400 => Err(ClientError::BadRequest),
            404 => Err(ClientError::NotFound),
            _ => Err(server_error(response)),
        }
    }

    /// Delete the document at `path`.
    pub fn delete_document(&self, path: &str) -> Result<(), ClientError> {
        let url = self.build_url(API_DATA, &[path]);
        let request = self.request(HttpMethod::Delete, url, None, None);
        let response = self.dispatch(request)?;
        match response.status {
            204 => Ok(()),
            404 => Err(ClientError::NotFound),
            _ => Err(server_error(response)),
        }
    }

    /// Execute a simple query against the server root.
    ///
    /// The query text rides in the GET body and the response bytes are
    /// returned as-is, undecoded.
    pub fn simple_query(&self, query: &str, opts: &QueryOptions) -> Result<Vec<u8>, ClientError> {
        let mut url = self.build_url(API_SIMPLE_QUERY, &[]);
        opts.append_simple_query(&mut url);
        let request = self.request(
            HttpMethod::Get,
            url,
            None,
            Some(query.as_bytes().to_vec()),
        );
        let response = self.dispatch(request)?;
        match response.status {
            200 => Ok(response.body),
            400 => Err(ClientError::BadRequest),
            404 => Err(ClientError::NotFound),
            _ => Err(server_error(response)),
        }
    }

    /// Execute an ad-hoc query.
    ///
    /// `query` is inserted verbatim into the `{"query": <value>}` envelope.
    /// A 501 means the server declined a `watch` request it does not
    /// support.
    pub fn adhoc_query(
        &self,
        query: &str,
        opts: &QueryOptions,
    ) -> Result<QueryResponse, ClientError> {
        let mut url = self.build_url(API_SIMPLE_QUERY, &[]);
        opts.append_adhoc_query(&mut url);
        let body = format!("{{\"query\": {query}}}").into_bytes();
        let request = self.request(HttpMethod::Post, url, Some("text/plain"), Some(body));
        let response = self.dispatch(request)?;
        match response.status {
            200 => decode(&response),
            400 => Err(ClientError::BadRequest),
            404 => Err(ClientError::NotFound),
            501 => Err(ClientError::StreamingNotImplemented),
            _ => Err(server_error(response)),
        }
    }

    /// Partially evaluate `query` with respect to `unknowns`.
    pub fn compile(
        &self,
        query: &str,
        input: Option<Value>,
        unknowns: Option<Vec<String>>,
    ) -> Result<CompileResponse, ClientError> {
        let compile_request = CompileRequest {
            query: query.to_string(),
            input,
            unknowns,
        };
        let body = serde_json::to_vec(&compile_request).map_err(ClientError::Encode)?;
        let url = self.build_url(API_COMPILE, &[]);
        let request = self.request(HttpMethod::Post, url, None, Some(body));
        let response = self.dispatch(request)?;
        match response.status {
            200 => decode(&response),
            400 => Err(ClientError::BadRequest),
            _ => Err(server_error(response)),
        }
    }
}

fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ClientError> {
    serde_json::from_slice(&response.body).map_err(ClientError::Decode)
}

fn server_error(response: HttpResponse) -> ClientError {
    ClientError::ServerError {
        status: response.status,
        body: String::from_utf8_lossy(&response.body).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::TransportError;

    struct FakeTransport {
        status: u16,
        body: Vec<u8>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl FakeTransport {
        fn new(status: u16, body: &str) -> Arc<FakeTransport> {
            Arc::new(FakeTransport {
                status,
                body: body.as_bytes().to_vec(),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn last_request(&self) -> HttpRequest {
            self.seen.lock().unwrap().last().cloned().unwrap()
        }
    }

    impl Transport for FakeTransport {
        fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.seen.lock().unwrap().push(request);
            Ok(HttpResponse {
                status: self.status,
                body: self.body.clone(),
            })
        }
    }

    fn client_with(fake: &Arc<FakeTransport>, token: &str) -> Client {
        Client::new(ClientConfig {
            base_url: "http://x".to_string(),
            token: token.to_string(),
            transport: Some(fake.clone() as Arc<dyn Transport>),
        })
        .unwrap()
    }

    #[test]
    fn new_rejects_empty_base_url() {
        assert!(Client::new(ClientConfig {
            base_url: String::new(),
            token: "t".to_string(),
            transport: None,
        })
        .is_none());
    }

    #[test]
    fn build_url_substitutes_positionally() {
        let fake = FakeTransport::new(200, "{}");
        let client = client_with(&fake, "t");
        assert_eq!(
            client.build_url(API_POLICY, &["abc"]),
            "http://x/v1/policies/abc"
        );
        assert_eq!(
            client.build_url("/v1/%s/%s", &["first", "second"]),
            "http://x/v1/first/second"
        );
    }

    #[test]
    fn build_url_leaves_unmatched_placeholders() {
        let fake = FakeTransport::new(200, "{}");
        let client = client_with(&fake, "t");
        assert_eq!(client.build_url(API_POLICY, &[]), "http://x/v1/policies/%s");
    }

    #[test]
    fn bearer_header_always_attached() {
        let fake = FakeTransport::new(200, r#"{"result": []}"#);
        let client = client_with(&fake, "secret");
        client.list_policies().unwrap();
        let req = fake.last_request();
        assert!(req
            .headers
            .contains(&("Authorization".to_string(), "Bearer secret".to_string())));
    }

    #[test]
    fn empty_token_still_sends_bearer_prefix() {
        let fake = FakeTransport::new(200, r#"{"result": []}"#);
        let client = client_with(&fake, "");
        client.list_policies().unwrap();
        let req = fake.last_request();
        assert!(req
            .headers
            .contains(&("Authorization".to_string(), "Bearer ".to_string())));
    }

    #[test]
    fn put_policy_is_text_plain_with_options_on_url() {
        let fake = FakeTransport::new(200, "{}");
        let client = client_with(&fake, "t");
        let opts = QueryOptions {
            pretty: true,
            metrics: true,
            ..Default::default()
        };
        client.put_policy("p1", "package example", &opts).unwrap();
        let req = fake.last_request();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.url, "http://x/v1/policies/p1?pretty=true&metrics=true");
        assert!(req
            .headers
            .contains(&("Content-Type".to_string(), "text/plain".to_string())));
        assert_eq!(req.body.as_deref(), Some("package example".as_bytes()));
    }

    #[test]
    fn get_document_without_input_is_a_get() {
        let fake = FakeTransport::new(200, "{}");
        let client = client_with(&fake, "t");
        client
            .get_document("servers/allow", None, &QueryOptions::default())
            .unwrap();
        let req = fake.last_request();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://x/v1/data/servers/allow");
        assert!(req.body.is_none());
    }

    #[test]
    fn get_document_with_input_posts_the_envelope() {
        let fake = FakeTransport::new(200, "{}");
        let client = client_with(&fake, "t");
        client
            .get_document("servers/allow", Some(r#"{"user": "alice"}"#), &QueryOptions::default())
            .unwrap();
        let req = fake.last_request();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(
            req.body.as_deref(),
            Some(r#"{"input": {"user": "alice"}}"#.as_bytes())
        );
    }

    #[test]
    fn get_document_watch_is_empty_valued_on_the_wire() {
        let fake = FakeTransport::new(200, "{}");
        let client = client_with(&fake, "t");
        let opts = QueryOptions {
            watch: true,
            ..Default::default()
        };
        client.get_document("a/b", None, &opts).unwrap();
        assert_eq!(fake.last_request().url, "http://x/v1/data/a/b?watch=");
    }

    #[test]
    fn put_document_sets_if_none_match_only_when_asked() {
        let fake = FakeTransport::new(204, "");
        let client = client_with(&fake, "t");

        client.put_document("a", "{}", false).unwrap();
        assert!(!fake
            .last_request()
            .headers
            .iter()
            .any(|(name, _)| name == "If-None-Match"));

        client.put_document("a", "{}", true).unwrap();
        assert!(fake
            .last_request()
            .headers
            .contains(&("If-None-Match".to_string(), "*".to_string())));
    }

    #[test]
    fn simple_query_rides_in_a_get_body_without_content_type() {
        let fake = FakeTransport::new(200, r#"{"result": {}}"#);
        let client = client_with(&fake, "t");
        let raw = client
            .simple_query("data.servers", &QueryOptions::default())
            .unwrap();
        assert_eq!(raw, br#"{"result": {}}"#);
        let req = fake.last_request();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://x/");
        assert_eq!(req.body.as_deref(), Some("data.servers".as_bytes()));
        assert!(!req.headers.iter().any(|(name, _)| name == "Content-Type"));
    }

    #[test]
    fn adhoc_query_wraps_raw_query_text() {
        let fake = FakeTransport::new(200, r#"{"result": []}"#);
        let client = client_with(&fake, "t");
        client
            .adhoc_query(r#""data.servers[i]""#, &QueryOptions::default())
            .unwrap();
        let req = fake.last_request();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(
            req.body.as_deref(),
            Some(r#"{"query": "data.servers[i]"}"#.as_bytes())
        );
        assert!(req
            .headers
            .contains(&("Content-Type".to_string(), "text/plain".to_string())));
    }

    #[test]
    fn compile_encodes_the_request_and_omits_content_type() {
        let fake = FakeTransport::new(200, "{}");
        let client = client_with(&fake, "t");
        client
            .compile(
                "input.x == 1",
                Some(serde_json::json!({"x": 1})),
                Some(vec!["data.y".to_string()]),
            )
            .unwrap();
        let req = fake.last_request();
        assert_eq!(req.url, "http://x/v1/compile");
        let body: Value = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"query": "input.x == 1", "input": {"x": 1}, "unknowns": ["data.y"]})
        );
        assert!(!req.headers.iter().any(|(name, _)| name == "Content-Type"));
    }
}
