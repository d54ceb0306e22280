//! Pair block openers with their end markers before the grammar runs
//!
//! The grammar only ever sees blocks that close, nested no deeper than
//! [`MAX_DEPTH`]. Every other block marker is rewritten to
//! [`Tag::Unpaired`] here, in two linear passes over the tokens.

use crate::parser::ast::{Span, Verbatim};
use crate::parser::lexer::{Tag, Token};

/// Deepest block nesting that is rendered; deeper blocks stay verbatim
pub const MAX_DEPTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Each,
    If,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Open(Kind),
    Close(Kind),
}

fn role(token: &Token) -> Option<Role> {
    match token {
        Token::Tag(Tag::EachOpen(_)) => Some(Role::Open(Kind::Each)),
        Token::Tag(Tag::IfOpen(_)) => Some(Role::Open(Kind::If)),
        Token::Tag(Tag::EachClose) => Some(Role::Close(Kind::Each)),
        Token::Tag(Tag::IfClose) => Some(Role::Close(Kind::If)),
        _ => None,
    }
}

/// Rewrite block markers that can't form a block into [`Tag::Unpaired`]
///
/// An end marker closes the nearest open block of its kind; blocks opened
/// after that one and still open are left unclosed. An end marker with no
/// open block of its kind is stray.
pub fn pair_blocks(tokens: &mut [(Token, Span)]) {
    let mut partner: Vec<Option<usize>> = vec![None; tokens.len()];
    let mut open: Vec<(usize, Kind)> = Vec::new();
    let (mut open_each, mut open_if) = (0usize, 0usize);

    for i in 0..tokens.len() {
        match role(&tokens[i].0) {
            Some(Role::Open(kind)) => {
                match kind {
                    Kind::Each => open_each += 1,
                    Kind::If => open_if += 1,
                }
                open.push((i, kind));
            }
            Some(Role::Close(kind)) => {
                let pending = match kind {
                    Kind::Each => open_each,
                    Kind::If => open_if,
                };
                if pending == 0 {
                    continue;
                }
                while let Some((j, opened)) = open.pop() {
                    match opened {
                        Kind::Each => open_each -= 1,
                        Kind::If => open_if -= 1,
                    }
                    if opened == kind {
                        partner[i] = Some(j);
                        partner[j] = Some(i);
                        break;
                    }
                }
            }
            None => {}
        }
    }

    // Depth counts rendered blocks only, so unclosed openers don't push
    // later blocks past the limit
    let mut depth = 0;
    for i in 0..tokens.len() {
        let reason = match (role(&tokens[i].0), partner[i]) {
            (None, _) => continue,
            (Some(Role::Open(_)), Some(_)) if depth < MAX_DEPTH => {
                depth += 1;
                continue;
            }
            (Some(Role::Open(_)), Some(close)) => {
                tokens[close].0 = Token::Tag(Tag::Unpaired(Verbatim::TooDeep));
                Verbatim::TooDeep
            }
            (Some(Role::Open(_)), None) => Verbatim::UnclosedBlock,
            (Some(Role::Close(_)), Some(_)) => {
                depth -= 1;
                continue;
            }
            (Some(Role::Close(_)), None) => Verbatim::StrayClose,
        };
        tokens[i].0 = Token::Tag(Tag::Unpaired(reason));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::lex;

    fn paired(input: &str) -> Vec<Option<Verbatim>> {
        let mut tokens: Vec<_> = lex(input).collect();
        pair_blocks(&mut tokens);
        tokens
            .iter()
            .map(|(t, _)| match t {
                Token::Tag(Tag::Unpaired(reason)) => Some(*reason),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_balanced_blocks_are_untouched() {
        assert_eq!(
            paired("{{#each xs}}{{#if f}}a{{/if}}{{/each}}"),
            vec![None, None, None, None, None]
        );
    }

    #[test]
    fn test_unclosed_and_stray() {
        assert_eq!(
            paired("{{/each}}{{#if a}}x"),
            vec![Some(Verbatim::StrayClose), Some(Verbatim::UnclosedBlock), None]
        );
    }

    #[test]
    fn test_close_leaves_inner_opener_unclosed() {
        assert_eq!(
            paired("{{#if a}}{{#each b}}{{/if}}{{/each}}"),
            vec![
                None,
                Some(Verbatim::UnclosedBlock),
                None,
                Some(Verbatim::StrayClose),
            ]
        );
    }

    #[test]
    fn test_depth_limit_marks_both_markers() {
        let depth = MAX_DEPTH + 1;
        let input = format!("{}x{}", "{{#if a}}".repeat(depth), "{{/if}}".repeat(depth));
        let marks = paired(&input);

        assert!(marks[..MAX_DEPTH].iter().all(Option::is_none));
        assert_eq!(marks[MAX_DEPTH], Some(Verbatim::TooDeep));
        // innermost end marker follows the text token
        assert_eq!(marks[MAX_DEPTH + 2], Some(Verbatim::TooDeep));
        assert!(marks[MAX_DEPTH + 3..].iter().all(Option::is_none));
    }

    #[test]
    fn test_unclosed_openers_do_not_count_toward_depth() {
        let input = format!("{}{{{{#if b}}}}y{{{{/if}}}}", "{{#if a}}".repeat(MAX_DEPTH * 2));
        let marks = paired(&input);
        assert!(marks[..MAX_DEPTH * 2]
            .iter()
            .all(|m| *m == Some(Verbatim::UnclosedBlock)));
        assert!(marks[MAX_DEPTH * 2..].iter().all(Option::is_none));
    }
}
