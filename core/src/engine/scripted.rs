//! In-process engine that replays queued outcomes.
//!
//! Every request is recorded, in order, whether it came through `fetch` or
//! `start`. Once the script runs dry the engine reports `Failure(None)`,
//! the same thing a dead network would look like.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use futures::future::{self, BoxFuture};

use crate::engine::{Engine, Outcome};
use crate::http::QueryRequest;

pub struct ScriptedEngine<R> {
    script: Mutex<VecDeque<Outcome<R>>>,
    requests: Mutex<Vec<QueryRequest>>,
}

impl<R> fmt::Debug for ScriptedEngine<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedEngine")
            .field("requests", &self.requests())
            .finish_non_exhaustive()
    }
}

impl<R> Default for ScriptedEngine<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> ScriptedEngine<R> {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue the outcome for the next unanswered request.
    pub fn push(&self, outcome: Outcome<R>) -> &Self {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(outcome);
        self
    }

    pub fn push_success(&self, response: R) -> &Self {
        self.push(Outcome::Success(response))
    }

    pub fn push_failure(&self, response: Option<R>) -> &Self {
        self.push(Outcome::Failure(response))
    }

    /// Requests seen so far, oldest first.
    pub fn requests(&self) -> Vec<QueryRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last_request(&self) -> Option<QueryRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    fn answer(&self, request: QueryRequest) -> Outcome<R> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(Outcome::Failure(None))
    }
}

impl<R: Send + 'static> Engine<R> for ScriptedEngine<R> {
    fn fetch(&self, request: &QueryRequest) -> Outcome<R> {
        self.answer(request.clone())
    }

    fn start(&self, request: QueryRequest) -> BoxFuture<'static, Outcome<R>> {
        Box::pin(future::ready(self.answer(request)))
    }
}
