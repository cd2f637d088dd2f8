//! Query templates: a YAML document carrying prefixes and a query body,
//! with `{{var}}` placeholders filled in before the document is parsed.
//!
//! ```yaml
//! prefixes:
//!   - prefix: wdt
//!     expansion: <http://www.wikidata.org/prop/direct/>
//! query: |
//!   SELECT ?rtcl WHERE { ?rtcl wdt:P698 "{{pmid}}". }
//! ```
//!
//! Substitution runs over the whole document text. Unbound variables
//! expand to nothing, and nothing is HTML-escaped, so IRIs and quoted
//! literals come through intact. The mustache forms `{{&var}}` and
//! `{{{var}}}` are accepted and behave like `{{var}}`.

use std::borrow::Cow;
use std::path::Path;

use handlebars::Handlebars;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ManagerError;
use crate::types::render_clause;

/// One entry of the document's `prefixes` sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplatePrefix {
    pub prefix: String,
    pub expansion: String,
}

/// The parsed form of an expanded template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDocument {
    /// May be absent or null; must be a sequence otherwise.
    #[serde(default)]
    pub prefixes: Option<Vec<TemplatePrefix>>,
    pub query: String,
}

impl TemplateDocument {
    pub fn parse(text: &str) -> Result<Self, ManagerError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Prefix declarations in document order, followed by the query.
    pub fn assemble(&self) -> String {
        let mut out = String::new();
        for p in self.prefixes.iter().flatten() {
            render_clause(&mut out, &p.prefix, &p.expansion);
        }
        out.push_str(&self.query);
        out
    }
}

/// Rewrite mustache's `{{&var}}` into `{{var}}`, which handlebars knows.
fn plain_tags(text: &str) -> Cow<'_, str> {
    if text.contains("{{&") {
        Cow::Owned(text.replace("{{&", "{{"))
    } else {
        Cow::Borrowed(text)
    }
}

#[derive(Debug)]
pub struct TemplateExpander {
    engine: Handlebars<'static>,
}

impl Default for TemplateExpander {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateExpander {
    pub fn new() -> Self {
        let mut engine = Handlebars::new();
        engine.register_escape_fn(handlebars::no_escape);
        Self { engine }
    }

    /// Fill in `bindings` and parse the result as a template document.
    pub fn render<B: Serialize>(&self, text: &str, bindings: &B) -> Result<TemplateDocument, ManagerError> {
        let expanded = self.engine.render_template(&plain_tags(text), bindings)?;
        TemplateDocument::parse(&expanded)
    }

    /// Expand `text` all the way to query text: prefixes, then body.
    pub fn expand<B: Serialize>(&self, text: &str, bindings: &B) -> Result<String, ManagerError> {
        Ok(self.render(text, bindings)?.assemble())
    }

    /// Store `text` under `name`. Fails if it does not compile.
    pub fn register(&mut self, name: &str, text: &str) -> Result<(), ManagerError> {
        self.engine.register_template_string(name, plain_tags(text))?;
        debug!(name, "registered template");
        Ok(())
    }

    pub fn register_file(&mut self, name: &str, path: impl AsRef<Path>) -> Result<(), ManagerError> {
        let text = std::fs::read_to_string(path)?;
        self.register(name, &text)
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.engine.has_template(name)
    }

    pub fn expand_named<B: Serialize>(&self, name: &str, bindings: &B) -> Result<String, ManagerError> {
        if !self.engine.has_template(name) {
            return Err(ManagerError::UnknownTemplate(name.to_string()));
        }
        let expanded = self.engine.render(name, bindings)?;
        Ok(TemplateDocument::parse(&expanded)?.assemble())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const PMID_TEMPLATE: &str = r#"prefixes:
  - prefix: wd
    expansion: <http://www.wikidata.org/entity/>
  - prefix: wdt
    expansion: <http://www.wikidata.org/prop/direct/>
query: |
  SELECT ?rtcl WHERE { ?rtcl wdt:P698 "{{pmid}}". }
"#;

    fn bindings(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn expands_prefixes_then_query() {
        let out = TemplateExpander::new()
            .expand(PMID_TEMPLATE, &bindings(&[("pmid", "999")]))
            .unwrap();
        assert_eq!(
            out,
            "PREFIX wd:<http://www.wikidata.org/entity/> \
             PREFIX wdt:<http://www.wikidata.org/prop/direct/> \
             SELECT ?rtcl WHERE { ?rtcl wdt:P698 \"999\". }\n"
        );
    }

    #[test]
    fn unbound_variable_expands_to_nothing() {
        let out = TemplateExpander::new()
            .expand(PMID_TEMPLATE, &bindings(&[]))
            .unwrap();
        assert!(out.contains(r#"wdt:P698 "". }"#));
    }

    #[test]
    fn substituted_values_are_not_escaped() {
        let text = "query: SELECT * WHERE { GRAPH {{graph}} { ?s ?p ?o } }\n";
        let out = TemplateExpander::new()
            .expand(text, &bindings(&[("graph", "<http://model.geneontology.org/1>")]))
            .unwrap();
        assert_eq!(
            out,
            "SELECT * WHERE { GRAPH <http://model.geneontology.org/1> { ?s ?p ?o } }"
        );
    }

    #[test]
    fn mustache_unescaped_forms_are_accepted() {
        let text = "query: ASK { {{&s}} {{& p}} {{{o}}} }\n";
        let b = bindings(&[("s", "<urn:s>"), ("p", "<urn:p>"), ("o", "\"a&b\"")]);

        let out = TemplateExpander::new().expand(text, &b).unwrap();
        assert_eq!(out, "ASK { <urn:s> <urn:p> \"a&b\" }");

        let mut expander = TemplateExpander::new();
        expander.register("amp", text).unwrap();
        assert_eq!(expander.expand_named("amp", &b).unwrap(), out);
    }

    #[test]
    fn prefixes_are_optional() {
        let doc = TemplateDocument::parse("query: ASK {}\n").unwrap();
        assert!(doc.prefixes.is_none());
        assert_eq!(doc.assemble(), "ASK {}");

        let doc = TemplateDocument::parse("prefixes:\nquery: ASK {}\n").unwrap();
        assert_eq!(doc.assemble(), "ASK {}");
    }

    #[test]
    fn missing_query_is_a_document_error() {
        let err = TemplateExpander::new()
            .expand("prefixes: []\n", &bindings(&[]))
            .unwrap_err();
        assert!(matches!(err, ManagerError::Document(_)));
    }

    #[test]
    fn non_sequence_prefixes_is_a_document_error() {
        let err = TemplateDocument::parse("prefixes: wd\nquery: ASK {}\n").unwrap_err();
        assert!(matches!(err, ManagerError::Document(_)));
    }

    #[test]
    fn named_templates_expand_like_inline_ones() {
        let mut expander = TemplateExpander::new();
        expander.register("pmid", PMID_TEMPLATE).unwrap();
        assert!(expander.is_registered("pmid"));

        let b = bindings(&[("pmid", "42")]);
        assert_eq!(
            expander.expand_named("pmid", &b).unwrap(),
            expander.expand(PMID_TEMPLATE, &b).unwrap()
        );
    }

    #[test]
    fn unknown_name_is_reported() {
        let err = TemplateExpander::new()
            .expand_named("nope", &bindings(&[]))
            .unwrap_err();
        assert!(matches!(err, ManagerError::UnknownTemplate(ref n) if n == "nope"));
    }

    #[test]
    fn broken_template_is_refused_at_registration() {
        let mut expander = TemplateExpander::new();
        let err = expander.register("bad", "query: {{#if}}").unwrap_err();
        assert!(matches!(err, ManagerError::TemplateSyntax(_)));
        assert!(!expander.is_registered("bad"));
    }
}
