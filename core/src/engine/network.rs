//! Network engine built on `ureq`.
//!
//! GET carries the query as `?query=…`; POST sends it as the form field
//! `query`. HTTP status codes are returned as data and decoded into the
//! response type; only failures below HTTP (refused connection, DNS, TLS)
//! are reported without a response.

use std::fmt;
use std::marker::PhantomData;

use futures::future::BoxFuture;
use tracing::{debug, warn};

use crate::config::ManagerConfig;
use crate::engine::{Engine, Outcome};
use crate::http::{HttpMethod, HttpResponse, QueryRequest};
use crate::response::{DecodeResponse, JsonResponse, Response};
use crate::task;

pub struct HttpEngine<R = JsonResponse> {
    agent: ureq::Agent,
    headers: Vec<(String, String)>,
    _response: PhantomData<fn() -> R>,
}

impl<R> Clone for HttpEngine<R> {
    fn clone(&self) -> Self {
        Self {
            agent: self.agent.clone(),
            headers: self.headers.clone(),
            _response: PhantomData,
        }
    }
}

impl<R> fmt::Debug for HttpEngine<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpEngine")
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

impl<R> Default for HttpEngine<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> HttpEngine<R> {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self {
            agent,
            headers: Vec::new(),
            _response: PhantomData,
        }
    }

    /// Add a header sent with every request, e.g.
    /// `accept: application/sparql-results+json`.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_headers<I, N, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(n, v)| (n.into(), v.into())));
        self
    }

    /// An engine sending the configuration's `headers`.
    pub fn from_config(config: &ManagerConfig) -> Self {
        Self::new().with_headers(config.headers.iter().cloned())
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    fn round_trip(&self, request: &QueryRequest) -> Result<HttpResponse, ureq::Error> {
        let query = request.payload.query.as_str();
        let mut response = match request.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(request.endpoint.as_str()).query("query", query);
                for (name, value) in &self.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()?
            }
            HttpMethod::Post => {
                let mut builder = self.agent.post(request.endpoint.as_str());
                for (name, value) in &self.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.send_form([("query", query)])?
            }
        };

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_string()?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

impl<R> Engine<R> for HttpEngine<R>
where
    R: Response + DecodeResponse + Send + 'static,
{
    fn fetch(&self, request: &QueryRequest) -> Outcome<R> {
        debug!(method = %request.method, endpoint = %request.endpoint, "sending query");
        match self.round_trip(request) {
            Ok(http) => {
                let status = http.status;
                let response = R::from_http(http);
                if response.okay() {
                    Outcome::Success(response)
                } else {
                    debug!(status, "endpoint answered with an error");
                    Outcome::Failure(Some(response))
                }
            }
            Err(e) => {
                warn!(error = %e, endpoint = %request.endpoint, "transport error");
                Outcome::Failure(None)
            }
        }
    }

    /// The request goes out before this returns, on the current tokio
    /// runtime's blocking pool or, without one, on a dedicated thread.
    fn start(&self, request: QueryRequest) -> BoxFuture<'static, Outcome<R>> {
        let engine = self.clone();
        let running = task::spawn_blocking(move || engine.fetch(&request));
        Box::pin(async move { running.await.unwrap_or(Outcome::Failure(None)) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_accumulate_in_order() {
        let engine: HttpEngine = HttpEngine::new()
            .with_header("accept", "application/sparql-results+json")
            .with_headers([("user-agent", "sparql-manager")]);
        assert_eq!(
            engine.headers(),
            &[
                ("accept".to_string(), "application/sparql-results+json".to_string()),
                ("user-agent".to_string(), "sparql-manager".to_string()),
            ]
        );
    }

    #[test]
    fn config_headers_are_applied() {
        let config = ManagerConfig::from_toml_str(
            r#"
endpoint = "http://localhost:3000/sparql"
headers = [["accept", "application/sparql-results+json"]]
"#,
        )
        .unwrap();
        let engine: HttpEngine = HttpEngine::from_config(&config);
        assert_eq!(engine.headers(), config.headers.as_slice());
    }

    #[test]
    fn clone_keeps_headers() {
        let engine: HttpEngine = HttpEngine::new().with_header("accept", "text/csv");
        assert_eq!(engine.clone().headers(), engine.headers());
    }
}
