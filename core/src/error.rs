//! Error types for the SPARQL manager.
//!
//! # Design
//! Only programmer-error-class problems become `Err`: a missing or unknown
//! transport mode, a template that does not expand into a well-formed
//! document, or configuration that cannot be read. Network failures never
//! show up here; they are published on the `error` channel and returned as
//! a response.

use thiserror::Error;

/// Errors returned by `SparqlManager` and its configuration loader.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// `query`/`template` was called on a client whose mode was never set.
    #[error("transport mode not set; expected \"sync\" or \"async\"")]
    ModeNotSet,

    /// The configured mode string is neither `sync` nor `async`.
    #[error("unknown transport mode {0:?}; expected \"sync\" or \"async\"")]
    UnknownMode(String),

    /// Variable substitution failed to render the template text.
    #[error("template expansion failed: {0}")]
    Template(#[from] handlebars::RenderError),

    /// A named template could not be compiled at registration.
    #[error("template does not compile: {0}")]
    TemplateSyntax(#[from] handlebars::TemplateError),

    /// No template was registered under this name.
    #[error("no template registered as {0:?}")]
    UnknownTemplate(String),

    /// The expanded template is not a `{prefixes, query}` document.
    #[error("template document is malformed: {0}")]
    Document(#[from] serde_yaml::Error),

    /// The configuration text is not valid TOML for `ManagerConfig`.
    #[error("configuration could not be parsed: {0}")]
    Config(#[from] toml::de::Error),

    /// A configuration or template file could not be read.
    #[error("file could not be read: {0}")]
    Io(#[from] std::io::Error),
}
