//! Syntax tree for prompt templates

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// AST node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// What decides whether a conditional block is kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    /// `{{#if key}}` - kept when the key is truthy
    Flag(String),
    /// `{{#if (eq this "literal")}}` - kept for repeated-block items equal to the literal
    ItemEquals(String),
}

/// A single piece of a template
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Literal text, emitted as-is
    Text(String),
    /// `{{name}}`
    Variable(String),
    /// `{{this}}` - the current repeated-block item
    Item,
    /// `{{#each key}} ... {{/each}}`
    Each(EachBlock),
    /// `{{#if guard}} ... {{/if}}`
    If(IfBlock),
    /// A marker that is written back exactly as it appears in the source
    Verbatim(Verbatim),
}

/// Repeated block bound to a sequence key
#[derive(Debug, Clone, PartialEq)]
pub struct EachBlock {
    pub key: String,
    /// Span of the opening marker
    pub open: Span,
    pub body: Vec<Spanned<Node>>,
    /// Span of the closing marker
    pub close: Span,
}

/// Conditional block
#[derive(Debug, Clone, PartialEq)]
pub struct IfBlock {
    pub guard: Guard,
    pub open: Span,
    pub body: Vec<Spanned<Node>>,
    pub close: Span,
}

/// Why a marker ended up verbatim
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbatim {
    /// Braces around content that isn't a known marker
    UnknownTag,
    /// Block opener with no matching end marker
    UnclosedBlock,
    /// End marker with no opener
    StrayClose,
    /// Block nested deeper than [`MAX_DEPTH`](crate::parser::MAX_DEPTH), or its end marker
    TooDeep,
}

impl Node {
    /// Child nodes, for blocks
    pub fn children(&self) -> &[Spanned<Node>] {
        match self {
            Node::Each(block) => &block.body,
            Node::If(block) => &block.body,
            _ => &[],
        }
    }
}
