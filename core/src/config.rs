//! TOML configuration for a manager and its HTTP engine.
//!
//! ```toml
//! endpoint = "https://query.wikidata.org/sparql"
//! mode = "async"
//! prefixes = [
//!     ["wd", "<http://www.wikidata.org/entity/>"],
//!     ["wdt", "<http://www.wikidata.org/prop/direct/>"],
//! ]
//! headers = [["accept", "application/sparql-results+json"]]
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::ManagerError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManagerConfig {
    pub endpoint: String,
    #[serde(default)]
    pub prefixes: Vec<(String, String)>,
    /// Kept as text; an unknown value is reported when a query is made.
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
}

impl ManagerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ManagerError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ManagerError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
