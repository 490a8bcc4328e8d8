//! Response and request envelopes for the policy server API.
//!
//! # Design
//! The server owns the payload schemas, so every payload field is an opaque
//! `serde_json::Value`; these types only pin down the envelope (`result`,
//! `metrics`, ...) around it. Optional fields skip serialization when
//! absent so a decoded envelope re-encodes to a structurally equal
//! document.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope of `GET /v1/policies`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyListResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Vec<Value>>,
}

/// Envelope of `GET /v1/policies/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyGetResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

/// Envelope of policy writes (`PUT`/`DELETE /v1/policies/{id}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyWriteResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Value>,
}

/// Envelope of `GET /v1/data/{path}` (and its `POST`-with-input form).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Value>,
}

/// Envelope of the ad-hoc query response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Value>,
}

/// Request body of `POST /v1/compile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unknowns: Option<Vec<String>>,
}

/// Envelope of the compile response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Value>,
}
