use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

/// A query as the endpoint received it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Received {
    pub method: String,
    pub query: String,
}

#[derive(Deserialize)]
pub struct QueryParams {
    pub query: Option<String>,
}

pub type Log = Arc<RwLock<Vec<Received>>>;

pub fn app() -> Router {
    let log: Log = Arc::new(RwLock::new(Vec::new()));
    Router::new()
        .route("/sparql", get(query_get).post(query_post))
        .route("/received", get(list_received))
        .route("/broken", get(broken).post(broken))
        .with_state(log)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Echo the request back as a `sparql-results+json` document with one
/// solution binding `method` and `query`.
pub fn results_for(received: &Received) -> serde_json::Value {
    serde_json::json!({
        "head": { "vars": ["method", "query"] },
        "results": {
            "bindings": [{
                "method": { "type": "literal", "value": received.method },
                "query": { "type": "literal", "value": received.query },
            }]
        }
    })
}

async fn answer(
    log: Log,
    method: &str,
    params: QueryParams,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let Some(query) = params.query.filter(|q| !q.is_empty()) else {
        return Err((StatusCode::BAD_REQUEST, "missing query parameter".to_string()));
    };
    info!(method, length = query.len(), "query received");
    let received = Received {
        method: method.to_string(),
        query,
    };
    let body = results_for(&received);
    log.write().await.push(received);
    Ok(Json(body))
}

async fn query_get(
    State(log): State<Log>,
    Query(params): Query<QueryParams>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    answer(log, "GET", params).await
}

async fn query_post(
    State(log): State<Log>,
    Form(params): Form<QueryParams>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    answer(log, "POST", params).await
}

async fn list_received(State(log): State<Log>) -> Json<Vec<Received>> {
    Json(log.read().await.clone())
}

/// Always fails with an empty body.
async fn broken() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}
