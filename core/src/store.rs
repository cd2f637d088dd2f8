//! Endpoint and prefix state for a manager.
//!
//! Invalid input is a silent no-op: an empty endpoint, an empty prefix half,
//! or a replacement list holding any such pair leaves the store untouched.
//! Every setter hands back the current value so callers can check whether
//! their change landed.

use tracing::debug;

use crate::types::PrefixPair;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixStore {
    endpoint: String,
    prefixes: Vec<PrefixPair>,
}

impl PrefixStore {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            prefixes: Vec::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Replace the endpoint unless `value` is empty. No URL validation.
    pub fn set_endpoint(&mut self, value: &str) -> &str {
        if value.is_empty() {
            debug!("ignoring empty endpoint");
        } else {
            self.endpoint = value.to_string();
        }
        &self.endpoint
    }

    pub fn prefixes(&self) -> &[PrefixPair] {
        &self.prefixes
    }

    /// Replace the whole prefix list.
    ///
    /// If any pair has an empty half, nothing changes.
    pub fn set_prefixes<I, N, E>(&mut self, pairs: I) -> &[PrefixPair]
    where
        I: IntoIterator<Item = (N, E)>,
        N: Into<String>,
        E: Into<String>,
    {
        let replacement: Option<Vec<PrefixPair>> = pairs
            .into_iter()
            .map(|(name, expansion)| PrefixPair::new(name, expansion))
            .collect();
        match replacement {
            Some(prefixes) => self.prefixes = prefixes,
            None => debug!("ignoring prefix list with a malformed pair"),
        }
        &self.prefixes
    }

    /// Append one pair unless either half is empty.
    pub fn add_prefix(&mut self, name: &str, expansion: &str) -> &[PrefixPair] {
        match PrefixPair::new(name, expansion) {
            Some(pair) => self.prefixes.push(pair),
            None => debug!(name, expansion, "ignoring malformed prefix"),
        }
        &self.prefixes
    }
}
