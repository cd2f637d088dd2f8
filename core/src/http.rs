//! HTTP transport types shared between the client and its engines.
//!
//! # Design
//! These types describe a SPARQL request and the raw HTTP answer as plain
//! data. The client decides *what* to send (method, endpoint, payload); an
//! [`Engine`](crate::engine::Engine) decides *how* to send it. The verb
//! travels inside the request, so an engine never carries per-call state.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Queries whose full text is at least this many UTF-16 code units go out
/// as GET.
pub const GET_THRESHOLD: usize = 255;

/// HTTP method for a query request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    /// Pick the verb for a query of the given full text.
    ///
    /// Length is measured in UTF-16 code units, not bytes: most characters
    /// count once, those outside the Basic Multilingual Plane (emoji, for
    /// one) count twice.
    pub fn for_query(query: &str) -> Self {
        if query_length(query) >= GET_THRESHOLD {
            HttpMethod::Get
        } else {
            HttpMethod::Post
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// Length of `query` as compared against [`GET_THRESHOLD`].
pub fn query_length(query: &str) -> usize {
    query.encode_utf16().count()
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request payload: a single `query` field holding the full query text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPayload {
    pub query: String,
}

/// A SPARQL request described as plain data.
///
/// Built by `SparqlManager::build_query_request` and handed to an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub method: HttpMethod,
    pub endpoint: String,
    pub payload: QueryPayload,
}

/// An HTTP response described as plain data.
///
/// Produced by an engine after the round-trip, then decoded into the
/// caller's response type.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
