//! Transport engines: the capability that actually talks to an endpoint.
//!
//! # Design
//! An engine exposes a blocking primitive (`fetch`) and a non-blocking one
//! (`start`). Both report completion as an [`Outcome`] instead of calling
//! back into the manager; the manager's dispatcher turns that report into
//! a published event. Engines are injected, never chosen by name.
//!
//! - [`HttpEngine`] speaks HTTP through `ureq`.
//! - [`ScriptedEngine`] replays queued outcomes in-process for tests.

pub mod network;
pub mod scripted;

use futures::future::BoxFuture;

use crate::http::QueryRequest;

pub use self::network::HttpEngine;
pub use self::scripted::ScriptedEngine;

/// How a single round-trip ended, as reported by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<R> {
    Success(R),
    /// The engine may or may not have a response to show for the failure.
    Failure(Option<R>),
}

pub trait Engine<R>: Send + Sync {
    /// Perform the request, blocking until it completes.
    fn fetch(&self, request: &QueryRequest) -> Outcome<R>;

    /// Begin the request and return a future for its outcome.
    ///
    /// The request is under way before this returns; dropping the future
    /// must not cancel it.
    fn start(&self, request: QueryRequest) -> BoxFuture<'static, Outcome<R>>;
}
