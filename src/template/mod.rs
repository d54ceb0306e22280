//! Template rendering
//!
//! A [`Template`] is parsed once and can be rendered against any number of
//! contexts. Rendering is total: markers that can't be resolved are either
//! kept verbatim (variables, unmatched markers) or dropped (repeated blocks
//! and flag conditionals whose key is missing). See [`resolver`] for the pass
//! order.
//!
//! # Example
//!
//! ```rust
//! use reading_questions::{Context, Template};
//!
//! let template = Template::parse("{{#each items}}[{{this}}]{{/each}}");
//! let ctx = Context::new().with("items", vec!["a", "b", "c"]);
//! assert_eq!(template.render(&ctx), "[a][b][c]");
//! ```

mod lint;
pub mod resolver;

pub use lint::{KeyUsage, UnresolvedKey};

use crate::context::Context;
use crate::error::Diagnostic;
use crate::parser::{self, Node, Spanned};

/// A parsed template
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    source: String,
    nodes: Vec<Spanned<Node>>,
}

impl Template {
    /// Parse template source; never fails
    pub fn parse(source: impl Into<String>) -> Self {
        let source = source.into();
        let nodes = parser::parse(&source);
        Self { source, nodes }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn nodes(&self) -> &[Spanned<Node>] {
        &self.nodes
    }

    /// Resolve every marker against `ctx`
    pub fn render(&self, ctx: &Context) -> String {
        let nodes = resolver::substitute(self.nodes.clone(), ctx);
        let nodes = resolver::expand(nodes, ctx);
        let nodes = resolver::resolve_flags(nodes, ctx);

        let mut out = String::with_capacity(self.source.len());
        resolver::write(&nodes, &self.source, &mut out);
        out
    }

    /// Structural problems that rendering works around
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        lint::check(self)
    }

    /// Keys this template references that `ctx` doesn't supply usefully
    pub fn unresolved(&self, ctx: &Context) -> Vec<UnresolvedKey> {
        lint::unresolved(self, ctx)
    }
}
