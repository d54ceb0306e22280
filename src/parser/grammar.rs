//! Parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::parser::ast::*;
use crate::parser::lexer::{Tag, Token};
use crate::parser::pairing::pair_blocks;

/// Parse template source into a tree of spanned nodes
///
/// The grammar accepts every token sequence: markers that don't pair up are
/// kept as [`Node::Verbatim`], so this never fails.
pub fn parse(input: &str) -> Vec<Spanned<Node>> {
    let len = input.len();

    // Create a logos lexer and pair block markers up front, so the grammar
    // below never has to backtrack out of a block
    let mut tokens: Vec<_> = crate::parser::lexer::lex(input).collect();
    pair_blocks(&mut tokens);
    let token_iter = tokens.into_iter().map(|(tok, span)| (tok, span.into()));

    // Turn the token iterator into a stream that chumsky can use
    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    match template_parser().parse(token_stream).into_result() {
        Ok(nodes) => nodes,
        Err(_) if len == 0 => Vec::new(),
        Err(_) => vec![Spanned::new(Node::Text(input.to_string()), 0..len)],
    }
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn template_parser<'a, I>(
) -> impl Parser<'a, I, Vec<Spanned<Node>>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let node = recursive(|node| {
        let body = node.repeated().collect::<Vec<_>>();

        let each_block = select! { Token::Tag(Tag::EachOpen(key)) => key }
            .map_with(|key, e| (key, span_range(&e.span())))
            .then(body.clone())
            .then(just(Token::Tag(Tag::EachClose)).map_with(|_, e| span_range(&e.span())))
            .map(|(((key, open), body), close)| {
                Node::Each(EachBlock {
                    key,
                    open,
                    body,
                    close,
                })
            });

        let if_block = select! { Token::Tag(Tag::IfOpen(guard)) => guard }
            .map_with(|guard, e| (guard, span_range(&e.span())))
            .then(body)
            .then(just(Token::Tag(Tag::IfClose)).map_with(|_, e| span_range(&e.span())))
            .map(|(((guard, open), body), close)| {
                Node::If(IfBlock {
                    guard,
                    open,
                    body,
                    close,
                })
            });

        let leaf = select! {
            Token::Text(s) => Node::Text(s),
            Token::Tag(Tag::Variable(name)) => Node::Variable(name),
            Token::Tag(Tag::Item) => Node::Item,
            Token::Tag(Tag::Unknown) => Node::Verbatim(Verbatim::UnknownTag),
            Token::Tag(Tag::Unpaired(reason)) => Node::Verbatim(reason),
        };

        choice((each_block, if_block, leaf))
            .map_with(|n, e| Spanned::new(n, span_range(&e.span())))
            .boxed()
    });

    node.repeated().collect().then_ignore(end())
}
