//! In-memory policy server used by the client integration tests.
//!
//! Implements the endpoint surface the client targets, with the same status
//! codes the client's classifiers expect: 404 for unknown policies and
//! documents, 304 for a conditional overwrite of an existing document, 404
//! for a document write that collides with a non-object ancestor, 400 for
//! malformed bodies, 501 for `watch` ad-hoc queries, and 401 whenever the
//! `Authorization: Bearer` header is missing or wrong.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Default)]
pub struct Store {
    pub policies: HashMap<String, String>,
    pub documents: HashMap<String, Value>,
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
pub struct AppState {
    db: Db,
    token: String,
}

/// Build the router. `token` is the only accepted bearer credential.
pub fn app(token: &str) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(Store::default())),
        token: token.to_string(),
    };
    Router::new()
        .route("/", get(simple_query).post(adhoc_query))
        .route("/v1/policies", get(list_policies))
        .route(
            "/v1/policies/{id}",
            get(get_policy).put(put_policy).delete(delete_policy),
        )
        .route(
            "/v1/data/{*path}",
            get(get_document)
                .post(query_document)
                .put(put_document)
                .patch(patch_document)
                .delete(delete_document),
        )
        .route("/v1/compile", post(compile))
        .with_state(state)
}

pub async fn run(listener: TcpListener, token: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(token)).await
}

fn authorized(state: &AppState, headers: &HeaderMap) -> Result<(), StatusCode> {
    let expected = format!("Bearer {}", state.token);
    match headers.get(header::AUTHORIZATION) {
        Some(value) if value.to_str().ok() == Some(expected.as_str()) => Ok(()),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

/// A document write conflicts when some proper ancestor of `path` already
/// holds a non-object value.
fn write_conflict(store: &Store, path: &str) -> bool {
    let segments: Vec<&str> = path.split('/').collect();
    for end in 1..segments.len() {
        let ancestor = segments[..end].join("/");
        if let Some(value) = store.documents.get(&ancestor) {
            if !value.is_object() {
                return true;
            }
        }
    }
    false
}

async fn list_policies(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    authorized(&state, &headers)?;
    let store = state.db.read().await;
    let result: Vec<Value> = store
        .policies
        .iter()
        .map(|(id, raw)| json!({"id": id, "raw": raw}))
        .collect();
    Ok(Json(json!({"result": result})))
}

async fn get_policy(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    authorized(&state, &headers)?;
    let store = state.db.read().await;
    let raw = store.policies.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(json!({"result": {"id": id, "raw": raw}})))
}

async fn put_policy(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<Value>, StatusCode> {
    authorized(&state, &headers)?;
    if body.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    state.db.write().await.policies.insert(id, body);
    Ok(Json(json!({"result": {}})))
}

async fn delete_policy(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    authorized(&state, &headers)?;
    let mut store = state.db.write().await;
    store
        .policies
        .remove(&id)
        .map(|_| Json(json!({"result": {}})))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn get_document(
    State(state): State<AppState>,
    Path(path): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    authorized(&state, &headers)?;
    let store = state.db.read().await;
    let doc = store.documents.get(&path).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(json!({"result": doc})))
}

async fn query_document(
    State(state): State<AppState>,
    Path(path): Path<String>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<Value>, StatusCode> {
    authorized(&state, &headers)?;
    let envelope: Value = serde_json::from_str(&body).map_err(|_| StatusCode::BAD_REQUEST)?;
    if envelope.get("input").is_none() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let store = state.db.read().await;
    let doc = store.documents.get(&path).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(json!({"result": doc})))
}

async fn put_document(
    State(state): State<AppState>,
    Path(path): Path<String>,
    headers: HeaderMap,
    body: String,
) -> Result<StatusCode, StatusCode> {
    authorized(&state, &headers)?;
    let value: Value = serde_json::from_str(&body).map_err(|_| StatusCode::BAD_REQUEST)?;
    let mut store = state.db.write().await;
    if write_conflict(&store, &path) {
        return Err(StatusCode::NOT_FOUND);
    }
    let if_none_match = headers
        .get(header::IF_NONE_MATCH)
        .is_some_and(|v| v.as_bytes() == b"*");
    if if_none_match && store.documents.contains_key(&path) {
        return Ok(StatusCode::NOT_MODIFIED);
    }
    store.documents.insert(path, value);
    Ok(StatusCode::NO_CONTENT)
}

async fn patch_document(
    State(state): State<AppState>,
    Path(path): Path<String>,
    headers: HeaderMap,
    body: String,
) -> Result<StatusCode, StatusCode> {
    authorized(&state, &headers)?;
    let value: Value = serde_json::from_str(&body).map_err(|_| StatusCode::BAD_REQUEST)?;
    let mut store = state.db.write().await;
    if !store.documents.contains_key(&path) {
        return Err(StatusCode::NOT_FOUND);
    }
    store.documents.insert(path, value);
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_document(
    State(state): State<AppState>,
    Path(path): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, StatusCode> {
    authorized(&state, &headers)?;
    let mut store = state.db.write().await;
    store
        .documents
        .remove(&path)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn simple_query(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<Value>, StatusCode> {
    authorized(&state, &headers)?;
    if body.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(Json(json!({"result": {}})))
}

async fn adhoc_query(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<Value>, StatusCode> {
    authorized(&state, &headers)?;
    if params.contains_key("watch") {
        return Err(StatusCode::NOT_IMPLEMENTED);
    }
    let envelope: Value = serde_json::from_str(&body).map_err(|_| StatusCode::BAD_REQUEST)?;
    if envelope.get("query").is_none() {
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(Json(json!({"result": []})))
}

async fn compile(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<Value>, StatusCode> {
    authorized(&state, &headers)?;
    let request: Value = serde_json::from_str(&body).map_err(|_| StatusCode::BAD_REQUEST)?;
    if !request.get("query").is_some_and(Value::is_string) {
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(Json(json!({"result": {"queries": []}})))
}
