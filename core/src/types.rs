//! Value types shared across the manager: prefix pairs, transport mode and
//! response seeds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ManagerError;

/// A namespace abbreviation and the IRI it expands to.
///
/// Both halves are non-empty; `new` refuses anything else, so a stored pair
/// is always well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PrefixPair {
    name: String,
    expansion: String,
}

impl PrefixPair {
    pub fn new(name: impl Into<String>, expansion: impl Into<String>) -> Option<Self> {
        let name = name.into();
        let expansion = expansion.into();
        if name.is_empty() || expansion.is_empty() {
            return None;
        }
        Some(Self { name, expansion })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expansion(&self) -> &str {
        &self.expansion
    }

    pub fn as_tuple(&self) -> (&str, &str) {
        (&self.name, &self.expansion)
    }

    /// Append the `PREFIX name:expansion ` clause to `out`.
    pub fn render_into(&self, out: &mut String) {
        render_clause(out, &self.name, &self.expansion);
    }
}

impl fmt::Display for PrefixPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PREFIX {}:{} ", self.name, self.expansion)
    }
}

/// Write one prefix declaration clause. Trailing space included.
pub(crate) fn render_clause(out: &mut String, name: &str, expansion: &str) {
    out.push_str("PREFIX ");
    out.push_str(name);
    out.push(':');
    out.push_str(expansion);
    out.push(' ');
}

/// Concatenate the declaration clauses for `pairs`, in order.
pub fn render_prefixes(pairs: &[PrefixPair]) -> String {
    let mut out = String::new();
    for pair in pairs {
        pair.render_into(&mut out);
    }
    out
}

/// Whether a call blocks for its response or hands back a future.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Sync,
    Async,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Sync => "sync",
            Mode::Async => "async",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ManagerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sync" => Ok(Mode::Sync),
            "async" => Ok(Mode::Async),
            other => Err(ManagerError::UnknownMode(other.to_string())),
        }
    }
}

/// Seed handed to the caller's response constructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseSeed {
    pub message_type: String,
    pub message: String,
}

impl ResponseSeed {
    pub const DEEP_ERROR_MESSAGE: &'static str = "deep manager error";

    /// Seed for the response that replaces a malformed or missing failure
    /// report.
    pub fn deep_error() -> Self {
        Self {
            message_type: "error".to_string(),
            message: Self::DEEP_ERROR_MESSAGE.to_string(),
        }
    }
}
