//! Client-side orchestration for SPARQL endpoints.
//!
//! # Overview
//! A [`SparqlManager`] holds an endpoint and a list of namespace prefixes,
//! assembles query text (optionally from a YAML template with `{{var}}`
//! bindings), picks GET or POST by the text's length, hands the request to
//! an injected [`Engine`], and publishes the outcome on a `success` or
//! `error` channel.
//!
//! # Design
//! - Engines are capabilities ([`HttpEngine`] over `ureq`,
//!   [`ScriptedEngine`] in-process); the manager never picks one by name.
//! - [`Mode`] chooses blocking `fetch` or future-returning `start`.
//! - Network failures are published and returned as responses, never as
//!   `Err`. A failure report without a usable response is replaced by one
//!   reading `"deep manager error"`.
//! - Without an engine, `query` and `template` return the assembled text.

pub mod client;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod http;
pub mod registry;
pub mod response;
pub mod store;
mod task;
pub mod template;
pub mod types;

pub use client::SparqlManager;
pub use config::ManagerConfig;
pub use dispatch::{Dispatch, Dispatcher};
pub use engine::{Engine, HttpEngine, Outcome, ScriptedEngine};
pub use error::ManagerError;
pub use http::{query_length, HttpMethod, HttpResponse, QueryPayload, QueryRequest, GET_THRESHOLD};
pub use registry::{Channel, EventRegistry, ListenerId};
pub use response::{DecodeResponse, JsonResponse, Response, ResponseFactory};
pub use store::PrefixStore;
pub use template::{TemplateDocument, TemplateExpander, TemplatePrefix};
pub use types::{render_prefixes, Mode, PrefixPair, ResponseSeed};
