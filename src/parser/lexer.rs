//! Lexer for prompt templates using logos

use logos::Logos;

use crate::parser::ast::{Guard, Span, Verbatim};

#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token {
    /// Anything between `{{` and `}}`, classified by its content
    #[regex(r"\{\{[^{}]*\}\}", |lex| Tag::classify(lex.slice()))]
    Tag(Tag),

    // A lone brace is plain text; `{{` without a closing `}}` lexes as two of these
    #[regex(r"[^{]+", |lex| lex.slice().to_string())]
    #[token("{", |lex| lex.slice().to_string())]
    Text(String),
}

/// The meaning of a `{{ ... }}` marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    /// `{{name}}`
    Variable(String),
    /// `{{this}}`
    Item,
    /// `{{#each key}}`
    EachOpen(String),
    /// `{{/each}}`
    EachClose,
    /// `{{#if key}}` or `{{#if (eq this "literal")}}`
    IfOpen(Guard),
    /// `{{/if}}`
    IfClose,
    /// Well-formed braces around content we don't understand
    Unknown,
    /// A block marker the pairing pass left without a partner
    Unpaired(Verbatim),
}

impl Tag {
    /// Classify a complete `{{ ... }}` slice
    pub fn classify(slice: &str) -> Tag {
        let inner = slice
            .strip_prefix("{{")
            .and_then(|s| s.strip_suffix("}}"))
            .unwrap_or(slice)
            .trim();

        match inner {
            "this" => return Tag::Item,
            "/each" => return Tag::EachClose,
            "/if" => return Tag::IfClose,
            _ => {}
        }

        if let Some(rest) = keyword_argument(inner, "#each") {
            return if is_key(rest) {
                Tag::EachOpen(rest.to_string())
            } else {
                Tag::Unknown
            };
        }

        if let Some(rest) = keyword_argument(inner, "#if") {
            return match parse_guard(rest) {
                Some(guard) => Tag::IfOpen(guard),
                None => Tag::Unknown,
            };
        }

        if is_key(inner) {
            Tag::Variable(inner.to_string())
        } else {
            Tag::Unknown
        }
    }
}

/// Strip `keyword` followed by at least one whitespace character
fn keyword_argument<'a>(input: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = input.strip_prefix(keyword)?;
    if rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}

/// Parse the guard of an `#if`: either a key or `(eq this "literal")`
fn parse_guard(input: &str) -> Option<Guard> {
    if let Some(expr) = input.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        let rest = keyword_argument(expr.trim(), "eq")?;
        let literal = keyword_argument(rest, "this")?;
        return unquote(literal).map(|lit| Guard::ItemEquals(lit.to_string()));
    }

    is_key(input).then(|| Guard::Flag(input.to_string()))
}

fn unquote(input: &str) -> Option<&str> {
    ['"', '\''].into_iter().find_map(|quote| {
        input
            .strip_prefix(quote)
            .and_then(|s| s.strip_suffix(quote))
            .filter(|s| !s.contains(quote))
    })
}

/// Context keys: identifier-like, dots and dashes allowed after the first char
fn is_key(input: &str) -> bool {
    let mut chars = input.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Lex input string into tokens with spans
///
/// Never drops input: anything logos refuses is handed on as text.
pub fn lex(input: &str) -> impl Iterator<Item = (Token, Span)> + '_ {
    Token::lexer(input).spanned().map(move |(tok, span)| {
        let tok = tok.unwrap_or_else(|_| Token::Text(input[span.clone()].to_string()));
        (tok, span)
    })
}
