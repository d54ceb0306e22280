//! Template checks for authors.
//!
//! Rendering never fails, so mistakes in a template show up only as odd
//! output. These checks point at them: markers that didn't pair up, unknown
//! markers, item markers with no item, and context keys a template expects
//! but wasn't given.

use std::collections::BTreeSet;
use std::fmt;

use crate::context::Context;
use crate::error::Diagnostic;
use crate::parser::ast::{Guard, Node, Spanned, Verbatim};

use super::Template;

/// How a template uses a key the context does not satisfy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum KeyUsage {
    /// `{{key}}` without a scalar value
    Variable,
    /// `{{#each key}}` without a sequence value
    Sequence,
    /// `{{#if key}}` with no value at all
    Flag,
}

/// A key referenced by the template but not supplied in a usable form
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct UnresolvedKey {
    pub usage: KeyUsage,
    pub key: String,
}

impl fmt::Display for UnresolvedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.usage {
            KeyUsage::Variable => write!(f, "variable `{}` is left unresolved", self.key),
            KeyUsage::Sequence => write!(f, "repeated block `{}` renders empty", self.key),
            KeyUsage::Flag => write!(f, "flag `{}` is treated as false", self.key),
        }
    }
}

/// Run all structural checks on a parsed template.
pub fn check(template: &Template) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    check_nodes(template.nodes(), template.source(), false, &mut diagnostics);
    diagnostics
}

fn check_nodes(
    nodes: &[Spanned<Node>],
    source: &str,
    in_each: bool,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let marker = |span: &std::ops::Range<usize>| source.get(span.clone()).unwrap_or_default().to_string();

    for spanned in nodes {
        let span = spanned.span.clone();
        match &spanned.node {
            Node::Verbatim(Verbatim::UnknownTag) => diagnostics.push(Diagnostic::UnknownMarker {
                marker: marker(&span),
                span,
            }),
            Node::Verbatim(Verbatim::UnclosedBlock) => diagnostics.push(Diagnostic::UnclosedBlock {
                marker: marker(&span),
                span,
            }),
            Node::Verbatim(Verbatim::StrayClose) => diagnostics.push(Diagnostic::StrayClose {
                marker: marker(&span),
                span,
            }),
            Node::Verbatim(Verbatim::TooDeep) => diagnostics.push(Diagnostic::NestingTooDeep {
                marker: marker(&span),
                span,
            }),
            Node::Item if !in_each => diagnostics.push(Diagnostic::OutsideEach {
                marker: marker(&span),
                span,
            }),
            Node::If(block) => {
                if !in_each && matches!(block.guard, Guard::ItemEquals(_)) {
                    diagnostics.push(Diagnostic::OutsideEach {
                        marker: marker(&block.open),
                        span: block.open.clone(),
                    });
                }
                check_nodes(&block.body, source, in_each, diagnostics);
            }
            Node::Each(block) => check_nodes(&block.body, source, true, diagnostics),
            Node::Text(_) | Node::Variable(_) | Node::Item => {}
        }
    }
}

/// Keys the template references that `ctx` leaves to a fallback.
///
/// A flag key that is present but empty is a deliberate "false" and is not
/// reported. Results are sorted and deduplicated.
pub fn unresolved(template: &Template, ctx: &Context) -> Vec<UnresolvedKey> {
    let mut found = BTreeSet::new();
    collect_unresolved(template.nodes(), ctx, &mut found);
    found.into_iter().collect()
}

fn collect_unresolved(nodes: &[Spanned<Node>], ctx: &Context, found: &mut BTreeSet<UnresolvedKey>) {
    for spanned in nodes {
        match &spanned.node {
            Node::Variable(key) if ctx.scalar(key).is_none() => {
                found.insert(UnresolvedKey {
                    usage: KeyUsage::Variable,
                    key: key.clone(),
                });
            }
            Node::Each(block) => {
                if ctx.sequence(&block.key).is_none() {
                    found.insert(UnresolvedKey {
                        usage: KeyUsage::Sequence,
                        key: block.key.clone(),
                    });
                }
                collect_unresolved(&block.body, ctx, found);
            }
            Node::If(block) => {
                if let Guard::Flag(key) = &block.guard {
                    if ctx.get(key).is_none() {
                        found.insert(UnresolvedKey {
                            usage: KeyUsage::Flag,
                            key: key.clone(),
                        });
                    }
                }
                collect_unresolved(&block.body, ctx, found);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_template_has_no_diagnostics() {
        let template =
            Template::parse(r#"{{a}} {{#each xs}}{{#if (eq this "v")}}{{this}}{{/if}}{{/each}}"#);
        assert!(template.diagnostics().is_empty());
    }

    #[test]
    fn test_reports_each_problem_kind() {
        let template = Template::parse("{{#each xs}} {{/if}} {{this}} {{#bogus}}");
        let diagnostics = template.diagnostics();
        assert_eq!(diagnostics.len(), 4, "{:?}", diagnostics);
        assert!(matches!(&diagnostics[0], Diagnostic::UnclosedBlock { marker, .. } if marker == "{{#each xs}}"));
        assert!(matches!(&diagnostics[1], Diagnostic::StrayClose { marker, .. } if marker == "{{/if}}"));
        assert!(matches!(&diagnostics[2], Diagnostic::OutsideEach { .. }));
        assert!(matches!(&diagnostics[3], Diagnostic::UnknownMarker { marker, .. } if marker == "{{#bogus}}"));
    }

    #[test]
    fn test_trailing_unclosed_flag_is_reported() {
        let template = Template::parse("texte {{#if f}}");
        assert!(matches!(
            template.diagnostics().as_slice(),
            [Diagnostic::UnclosedBlock { span, .. }] if *span == (6..15)
        ));
    }

    #[test]
    fn test_nesting_too_deep_is_reported() {
        let depth = crate::parser::MAX_DEPTH + 1;
        let source = format!("{}x{}", "{{#if a}}".repeat(depth), "{{/if}}".repeat(depth));
        let template = Template::parse(source);
        let diagnostics = template.diagnostics();
        assert_eq!(diagnostics.len(), 2, "{:?}", diagnostics);
        assert!(matches!(&diagnostics[0], Diagnostic::NestingTooDeep { marker, .. } if marker == "{{#if a}}"));
        assert!(matches!(&diagnostics[1], Diagnostic::NestingTooDeep { marker, .. } if marker == "{{/if}}"));
    }

    #[test]
    fn test_equality_guard_outside_each() {
        let template = Template::parse(r#"{{#if (eq this "x")}}y{{/if}}"#);
        assert!(matches!(
            template.diagnostics().as_slice(),
            [Diagnostic::OutsideEach { .. }]
        ));
    }

    #[test]
    fn test_unresolved_keys() {
        let template = Template::parse(
            "{{name}} {{name}} {{#each xs}}{{this}}{{/each}} {{#if shown}}{{/if}} {{#if hidden}}{{/if}}",
        );
        let ctx = Context::new().with("hidden", "");
        let missing = template.unresolved(&ctx);
        assert_eq!(
            missing,
            vec![
                UnresolvedKey {
                    usage: KeyUsage::Variable,
                    key: "name".to_string()
                },
                UnresolvedKey {
                    usage: KeyUsage::Sequence,
                    key: "xs".to_string()
                },
                UnresolvedKey {
                    usage: KeyUsage::Flag,
                    key: "shown".to_string()
                },
            ]
        );
        assert_eq!(missing[1].to_string(), "repeated block `xs` renders empty");
    }
}
