//! Render passes - resolve markers against a context
//!
//! Rendering runs three passes over the parsed tree, strictly in order:
//!
//! 1. [`substitute`] replaces variable markers whose key holds a scalar.
//! 2. [`expand`] replaces repeated blocks with one copy of their body per item,
//!    binding `{{this}}` and equality conditionals to that item.
//! 3. [`resolve_flags`] keeps or drops flag conditionals, including those that
//!    pass 2 copied out of repeated blocks.
//!
//! Passes only ever turn markers into text, and text is never parsed again,
//! so a value that happens to look like a marker is emitted as-is.

use crate::context::Context;
use crate::parser::ast::{Guard, IfBlock, Node, Spanned};

type Nodes = Vec<Spanned<Node>>;

/// Pass 1: fill variable markers from scalar values
///
/// Missing keys and keys holding a sequence leave the marker in place. A
/// scalar named `this` fills every `{{this}}`, repeated blocks included.
pub fn substitute(nodes: Nodes, ctx: &Context) -> Nodes {
    nodes
        .into_iter()
        .map(|Spanned { node, span }| {
            let node = match node {
                Node::Variable(name) => match ctx.scalar(&name) {
                    Some(value) => Node::Text(value.to_string()),
                    None => Node::Variable(name),
                },
                Node::Item => match ctx.scalar("this") {
                    Some(value) => Node::Text(value.to_string()),
                    None => Node::Item,
                },
                Node::Each(mut block) => {
                    block.body = substitute(block.body, ctx);
                    Node::Each(block)
                }
                Node::If(mut block) => {
                    block.body = substitute(block.body, ctx);
                    Node::If(block)
                }
                other => other,
            };
            Spanned::new(node, span)
        })
        .collect()
}

/// Pass 2: expand repeated blocks
///
/// A block whose key is missing or not a sequence expands to nothing.
pub fn expand(nodes: Nodes, ctx: &Context) -> Nodes {
    let mut out = Vec::with_capacity(nodes.len());
    for Spanned { node, span } in nodes {
        match node {
            Node::Each(block) => {
                let Some(items) = ctx.sequence(&block.key) else {
                    continue;
                };
                for item in items {
                    let instance = bind_item(block.body.clone(), &item.to_string());
                    // The instance may hold nested repeated blocks of its own
                    out.extend(expand(instance, ctx));
                }
            }
            Node::If(mut block) => {
                block.body = expand(block.body, ctx);
                out.push(Spanned::new(Node::If(block), span));
            }
            other => out.push(Spanned::new(other, span)),
        }
    }
    out
}

/// Bind one repeated-block item into a copy of the block body
fn bind_item(nodes: Nodes, item: &str) -> Nodes {
    let mut out = Vec::with_capacity(nodes.len());
    for Spanned { node, span } in nodes {
        match node {
            Node::Item => out.push(Spanned::new(Node::Text(item.to_string()), span)),
            Node::If(IfBlock {
                guard: Guard::ItemEquals(literal),
                body,
                ..
            }) => {
                if literal == item {
                    out.extend(bind_item(body, item));
                }
            }
            Node::If(mut block) => {
                block.body = bind_item(std::mem::take(&mut block.body), item);
                out.push(Spanned::new(Node::If(block), span));
            }
            // Nested repeated blocks bind their own items
            other => out.push(Spanned::new(other, span)),
        }
    }
    out
}

/// Pass 3: keep truthy flag conditionals unwrapped, drop the rest
///
/// Equality conditionals that survived pass 2 sit outside any repeated block
/// and are left alone.
pub fn resolve_flags(nodes: Nodes, ctx: &Context) -> Nodes {
    let mut out = Vec::with_capacity(nodes.len());
    for Spanned { node, span } in nodes {
        match node {
            Node::If(IfBlock {
                guard: Guard::Flag(key),
                body,
                ..
            }) => {
                if ctx.is_truthy(&key) {
                    out.extend(resolve_flags(body, ctx));
                }
            }
            Node::If(mut block) => {
                block.body = resolve_flags(std::mem::take(&mut block.body), ctx);
                out.push(Spanned::new(Node::If(block), span));
            }
            Node::Each(mut block) => {
                block.body = resolve_flags(std::mem::take(&mut block.body), ctx);
                out.push(Spanned::new(Node::Each(block), span));
            }
            other => out.push(Spanned::new(other, span)),
        }
    }
    out
}

/// Write resolved nodes; anything still unresolved is copied from `source`
pub fn write(nodes: &[Spanned<Node>], source: &str, out: &mut String) {
    let raw = |span: &std::ops::Range<usize>| source.get(span.clone()).unwrap_or_default();

    for spanned in nodes {
        match &spanned.node {
            Node::Text(text) => out.push_str(text),
            Node::Each(block) => {
                out.push_str(raw(&block.open));
                write(&block.body, source, out);
                out.push_str(raw(&block.close));
            }
            Node::If(block) => {
                out.push_str(raw(&block.open));
                write(&block.body, source, out);
                out.push_str(raw(&block.close));
            }
            Node::Variable(_) | Node::Item | Node::Verbatim(_) => out.push_str(raw(&spanned.span)),
        }
    }
}
