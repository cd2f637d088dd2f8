//! Turns an engine's completion report into a published event.
//!
//! # Design
//! Each round-trip settles exactly once: a success is forwarded unchanged
//! to the `success` channel; a failure is forwarded to the `error` channel,
//! after a missing or malformed report has been replaced by a response
//! built from [`ResponseSeed::deep_error`]. The dispatcher never starts
//! I/O. It runs wherever the engine completes: on the calling thread in
//! sync mode, on a background task in async mode.

use std::fmt;

use futures::future::BoxFuture;
use tracing::{debug, warn};

use crate::engine::Outcome;
use crate::registry::{Channel, EventRegistry};
use crate::response::{Response, ResponseFactory};
use crate::types::ResponseSeed;

pub struct Dispatcher<R> {
    registry: EventRegistry<R>,
    factory: ResponseFactory<R>,
}

impl<R> fmt::Debug for Dispatcher<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl<R: Response> Dispatcher<R> {
    pub fn new(factory: ResponseFactory<R>) -> Self {
        Self {
            registry: EventRegistry::new(),
            factory,
        }
    }

    pub fn registry(&self) -> &EventRegistry<R> {
        &self.registry
    }

    /// A fresh `"deep manager error"` response from the caller's factory.
    /// Nothing is published.
    pub fn deep_error(&self) -> R {
        (self.factory)(ResponseSeed::deep_error())
    }

    pub fn on_success(&self, response: R) -> R {
        let notified = self.registry.publish(Channel::Success, &response);
        debug!(notified, "published success");
        response
    }

    pub fn on_failure(&self, response: Option<R>) -> R {
        let response = match response {
            Some(r) if r.is_well_formed() => r,
            _ => {
                warn!("transport reported a failure without a usable response");
                self.deep_error()
            }
        };
        let notified = self.registry.publish(Channel::Error, &response);
        debug!(notified, message = response.message(), "published error");
        response
    }

    pub fn settle(&self, outcome: Outcome<R>) -> R {
        match outcome {
            Outcome::Success(response) => self.on_success(response),
            Outcome::Failure(response) => self.on_failure(response),
        }
    }
}

/// What `query` and `template` hand back.
pub enum Dispatch<R> {
    /// Sync mode: the settled response.
    Ready(R),
    /// Async mode: resolves to the settled response.
    Pending(BoxFuture<'static, R>),
    /// No engine configured: the assembled query text.
    Assembled(String),
}

impl<R> Dispatch<R> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Dispatch::Pending(_))
    }

    pub fn into_ready(self) -> Option<R> {
        match self {
            Dispatch::Ready(response) => Some(response),
            _ => None,
        }
    }

    pub fn into_assembled(self) -> Option<String> {
        match self {
            Dispatch::Assembled(query) => Some(query),
            _ => None,
        }
    }

    /// Wait for the response. `None` when nothing was sent.
    pub async fn resolve(self) -> Option<R> {
        match self {
            Dispatch::Ready(response) => Some(response),
            Dispatch::Pending(pending) => Some(pending.await),
            Dispatch::Assembled(_) => None,
        }
    }
}

impl<R: fmt::Debug> fmt::Debug for Dispatch<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dispatch::Ready(response) => f.debug_tuple("Ready").field(response).finish(),
            Dispatch::Pending(_) => f.write_str("Pending(..)"),
            Dispatch::Assembled(query) => f.debug_tuple("Assembled").field(query).finish(),
        }
    }
}
