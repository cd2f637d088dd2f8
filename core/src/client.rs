//! The SPARQL manager: prefix/endpoint state, query assembly, template
//! expansion and outcome dispatch behind one handle.
//!
//! # Design
//! `SparqlManager` composes its collaborators instead of inheriting them:
//! a [`PrefixStore`], an optional injected [`Engine`], a [`Dispatcher`]
//! owning the event registry, and a [`TemplateExpander`]. Sync and async
//! behaviour is selected by [`Mode`], not by separate manager types.
//!
//! Each `query` issues at most one request. The request is built by
//! [`SparqlManager::build_query_request`] without touching the network,
//! so assembly and method selection are testable on their own.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ManagerConfig;
use crate::dispatch::{Dispatch, Dispatcher};
use crate::engine::Engine;
use crate::error::ManagerError;
use crate::http::{query_length, HttpMethod, QueryPayload, QueryRequest};
use crate::registry::{Channel, EventRegistry, ListenerId};
use crate::response::{JsonResponse, Response, ResponseFactory};
use crate::store::PrefixStore;
use crate::task;
use crate::template::TemplateExpander;
use crate::types::{render_prefixes, Mode, PrefixPair, ResponseSeed};

#[derive(Debug, Clone, PartialEq, Eq)]
enum ModeSetting {
    Set(Mode),
    Unset,
    Unknown(String),
}

pub struct SparqlManager<R = JsonResponse> {
    store: PrefixStore,
    engine: Option<Arc<dyn Engine<R>>>,
    mode: ModeSetting,
    dispatcher: Arc<Dispatcher<R>>,
    templates: TemplateExpander,
}

impl<R> fmt::Debug for SparqlManager<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SparqlManager")
            .field("endpoint", &self.store.endpoint())
            .field("prefixes", &self.store.prefixes())
            .field("mode", &self.mode)
            .field("engine", &self.engine.is_some())
            .finish_non_exhaustive()
    }
}

impl SparqlManager {
    /// A manager with no endpoint, prefixes, engine or mode.
    ///
    /// `query` and `template` return the assembled text instead of sending
    /// anything.
    pub fn detached() -> Self {
        Self::assemble_parts(
            PrefixStore::default(),
            Arc::new(JsonResponse::from_seed),
            None,
            ModeSetting::Unset,
        )
    }
}

impl<R: Response + 'static> SparqlManager<R> {
    pub fn new<I, N, E, F>(
        endpoint: &str,
        prefixes: I,
        factory: F,
        engine: Arc<dyn Engine<R>>,
        mode: Option<Mode>,
    ) -> Self
    where
        I: IntoIterator<Item = (N, E)>,
        N: Into<String>,
        E: Into<String>,
        F: Fn(ResponseSeed) -> R + Send + Sync + 'static,
    {
        let mut store = PrefixStore::new(endpoint);
        store.set_prefixes(prefixes);
        let mode = mode.map_or(ModeSetting::Unset, ModeSetting::Set);
        Self::assemble_parts(store, Arc::new(factory), Some(engine), mode)
    }

    /// A manager that only assembles query text.
    pub fn without_engine<I, N, E, F>(endpoint: &str, prefixes: I, factory: F) -> Self
    where
        I: IntoIterator<Item = (N, E)>,
        N: Into<String>,
        E: Into<String>,
        F: Fn(ResponseSeed) -> R + Send + Sync + 'static,
    {
        let mut store = PrefixStore::new(endpoint);
        store.set_prefixes(prefixes);
        Self::assemble_parts(store, Arc::new(factory), None, ModeSetting::Unset)
    }

    pub fn from_config<F>(config: &ManagerConfig, factory: F, engine: Arc<dyn Engine<R>>) -> Self
    where
        F: Fn(ResponseSeed) -> R + Send + Sync + 'static,
    {
        let mut store = PrefixStore::new(config.endpoint.as_str());
        store.set_prefixes(config.prefixes.iter().cloned());
        let mode = match config.mode.as_deref() {
            None => ModeSetting::Unset,
            Some(raw) => match raw.parse::<Mode>() {
                Ok(mode) => ModeSetting::Set(mode),
                Err(_) => {
                    warn!(mode = raw, "unrecognised transport mode in configuration");
                    ModeSetting::Unknown(raw.to_string())
                }
            },
        };
        Self::assemble_parts(store, Arc::new(factory), Some(engine), mode)
    }

    fn assemble_parts(
        store: PrefixStore,
        factory: ResponseFactory<R>,
        engine: Option<Arc<dyn Engine<R>>>,
        mode: ModeSetting,
    ) -> Self {
        Self {
            store,
            engine,
            mode,
            dispatcher: Arc::new(Dispatcher::new(factory)),
            templates: TemplateExpander::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        self.store.endpoint()
    }

    /// Replace the endpoint unless `value` is empty; returns the current one.
    pub fn set_endpoint(&mut self, value: &str) -> &str {
        self.store.set_endpoint(value)
    }

    pub fn prefixes(&self) -> &[PrefixPair] {
        self.store.prefixes()
    }

    /// Replace every prefix, unless a pair is malformed.
    pub fn set_prefixes<I, N, E>(&mut self, pairs: I) -> &[PrefixPair]
    where
        I: IntoIterator<Item = (N, E)>,
        N: Into<String>,
        E: Into<String>,
    {
        self.store.set_prefixes(pairs)
    }

    /// Append a prefix unless either half is empty.
    pub fn add_prefix(&mut self, name: &str, expansion: &str) -> &[PrefixPair] {
        self.store.add_prefix(name, expansion)
    }

    /// `None` when unset or unrecognised.
    pub fn mode(&self) -> Option<Mode> {
        match self.mode {
            ModeSetting::Set(mode) => Some(mode),
            _ => None,
        }
    }

    pub fn registry(&self) -> &EventRegistry<R> {
        self.dispatcher.registry()
    }

    pub fn register<L>(&self, channel: Channel, listener: L) -> ListenerId
    where
        L: Fn(&R) + Send + Sync + 'static,
    {
        self.registry().subscribe(channel, listener)
    }

    pub fn unregister(&self, channel: Channel, id: ListenerId) -> bool {
        self.registry().unsubscribe(channel, id)
    }

    /// Prefix declarations followed by `body`, with the verb chosen by
    /// the full text's length.
    pub fn build_query_request(&self, body: &str) -> QueryRequest {
        let mut query = render_prefixes(self.store.prefixes());
        query.push_str(body);
        let method = HttpMethod::for_query(&query);
        debug!(%method, length = query_length(&query), "assembled query");
        QueryRequest {
            method,
            endpoint: self.store.endpoint().to_string(),
            payload: QueryPayload { query },
        }
    }

    /// Send `body`, with the stored prefixes prepended, to the endpoint.
    ///
    /// Sync mode blocks and returns [`Dispatch::Ready`]; async mode returns
    /// [`Dispatch::Pending`] with the request already under way. Either way
    /// the response has been published on its channel by the time the
    /// caller sees it, and in async mode it is published even if the
    /// `Dispatch` is dropped. Without an engine the assembled text comes
    /// back as [`Dispatch::Assembled`].
    pub fn query(&self, body: &str) -> Result<Dispatch<R>, ManagerError> {
        let request = self.build_query_request(body);
        let Some(engine) = &self.engine else {
            return Ok(Dispatch::Assembled(request.payload.query));
        };

        match &self.mode {
            ModeSetting::Set(Mode::Sync) => {
                let outcome = engine.fetch(&request);
                Ok(Dispatch::Ready(self.dispatcher.settle(outcome)))
            }
            ModeSetting::Set(Mode::Async) => {
                let pending = engine.start(request);
                let dispatcher = Arc::clone(&self.dispatcher);
                let settled = task::spawn(async move { dispatcher.settle(pending.await) });
                let dispatcher = Arc::clone(&self.dispatcher);
                Ok(Dispatch::Pending(Box::pin(async move {
                    match settled.await {
                        Some(response) => response,
                        None => dispatcher.deep_error(),
                    }
                })))
            }
            ModeSetting::Unset => Err(ManagerError::ModeNotSet),
            ModeSetting::Unknown(raw) => Err(ManagerError::UnknownMode(raw.clone())),
        }
    }

    /// Expand a template document with `bindings` and send its query.
    pub fn template<B: Serialize>(&self, template_text: &str, bindings: &B) -> Result<Dispatch<R>, ManagerError> {
        let body = self.templates.expand(template_text, bindings)?;
        self.query(&body)
    }

    pub fn register_template(&mut self, name: &str, template_text: &str) -> Result<(), ManagerError> {
        self.templates.register(name, template_text)
    }

    pub fn load_template_file(&mut self, name: &str, path: impl AsRef<Path>) -> Result<(), ManagerError> {
        self.templates.register_file(name, path)
    }

    /// Like [`template`](Self::template), for a registered template.
    pub fn named_template<B: Serialize>(&self, name: &str, bindings: &B) -> Result<Dispatch<R>, ManagerError> {
        let body = self.templates.expand_named(name, bindings)?;
        self.query(&body)
    }
}
