//! The response contract every engine and listener works against.
//!
//! # Design
//! Response shape is fixed up front by the [`Response`] trait instead of
//! being inspected at dispatch time. The dispatcher only needs two accessors;
//! anything richer (raw JSON, status) lives on the concrete type.

use std::sync::Arc;

use serde_json::Value;

use crate::http::HttpResponse;
use crate::types::ResponseSeed;

/// Minimal view of a response: a kind and a human-readable message.
pub trait Response: Send + Sync {
    fn message_type(&self) -> Option<&str>;

    fn message(&self) -> Option<&str>;

    fn okay(&self) -> bool {
        self.message_type() == Some("success")
    }

    /// Both accessors answer with non-empty text.
    fn is_well_formed(&self) -> bool {
        matches!(self.message_type(), Some(t) if !t.is_empty())
            && matches!(self.message(), Some(m) if !m.is_empty())
    }
}

/// Build a response from a raw HTTP answer. Used by `HttpEngine`.
pub trait DecodeResponse: Sized {
    fn from_http(response: HttpResponse) -> Self;
}

/// Caller-supplied constructor for synthesised responses.
pub type ResponseFactory<R> = Arc<dyn Fn(ResponseSeed) -> R + Send + Sync>;

/// A response carrying a decoded JSON body, e.g. `sparql-results+json`.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonResponse {
    status: Option<u16>,
    message_type: String,
    message: String,
    raw: Value,
}

impl JsonResponse {
    pub fn from_seed(seed: ResponseSeed) -> Self {
        Self {
            status: None,
            message_type: seed.message_type,
            message: seed.message,
            raw: Value::Null,
        }
    }

    /// HTTP status of the answer, if this response came off the wire.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Decoded body; `Null` when the body was absent or not JSON.
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

impl Response for JsonResponse {
    fn message_type(&self) -> Option<&str> {
        Some(&self.message_type)
    }

    fn message(&self) -> Option<&str> {
        Some(&self.message)
    }
}

impl DecodeResponse for JsonResponse {
    fn from_http(response: HttpResponse) -> Self {
        let status = response.status;
        if !response.is_success() {
            let body = response.body.trim();
            let message = if body.is_empty() {
                format!("HTTP {status}")
            } else {
                format!("HTTP {status}: {body}")
            };
            return Self {
                status: Some(status),
                message_type: "error".to_string(),
                message,
                raw: serde_json::from_str(&response.body).unwrap_or(Value::Null),
            };
        }

        match serde_json::from_str::<Value>(&response.body) {
            Ok(raw) => Self {
                status: Some(status),
                message_type: "success".to_string(),
                message: "ok".to_string(),
                raw,
            },
            Err(e) => Self {
                status: Some(status),
                message_type: "error".to_string(),
                message: format!("response body is not JSON: {e}"),
                raw: Value::Null,
            },
        }
    }
}
