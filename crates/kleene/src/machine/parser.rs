use super::diagnostics::Diagnostic;
use super::program::{Instruction, Program, Word};
use super::value::{Value, unescape};
use chumsky::{input::ValueInput, prelude::*};

mod lexer;
pub use lexer::{Token, lexer};

pub use chumsky::prelude::{Input, Parser};

/// Deepest `{ }` nesting a description may have. Parsing and execution
/// both recurse per block level.
pub const MAX_NESTING: usize = 64;

pub type Span = SimpleSpan;
pub type ParseError<'code, T> = Rich<'code, T, Span>;

#[derive(Debug, Clone)]
pub struct Spanned<T> {
    pub span: Span,
    pub node: T,
}

pub fn parser<'code, I>()
-> impl Parser<'code, I, Program, extra::Err<ParseError<'code, Token<'code>>>> + Clone
where
    I: ValueInput<'code, Token = Token<'code>, Span = Span>,
{
    recursive(|block| {
        let literal = select! {
            Token::Number(number) => Value::Int(number),
            Token::True => Value::Bool(true),
            Token::False => Value::Bool(false),
        };

        let text = select! { Token::Text(raw) => raw }.try_map(|raw: &str, span| {
            unescape(raw)
                .map(Value::from)
                .map_err(|reason| ParseError::custom(span, reason))
        });

        let push = literal.or(text).map(Instruction::Push);

        let word = select! { Token::Word(name) => name }.try_map(|name: &str, span| {
            Word::from_name(name)
                .map(Instruction::Word)
                .ok_or_else(|| ParseError::custom(span, format!("Unknown word '{name}'")))
        });

        let braced = block.delimited_by(
            just(Token::BracketCurlyOpen),
            just(Token::BracketCurlyClose),
        );

        let conditional = just(Token::If)
            .ignore_then(braced.clone())
            .then_ignore(just(Token::Else))
            .then(braced)
            .map(|(then, otherwise)| Instruction::If { then, otherwise });

        choice((push, word, conditional))
            .repeated()
            .collect::<Vec<_>>()
            .map(Program::new)
    })
}

/// Parses a description. Comments are dropped; lexer errors stop before parsing.
pub fn parse(source_code: &str) -> Result<Program, Vec<Diagnostic>> {
    let (tokens, errors) = lexer().parse(source_code).into_output_errors();
    if !errors.is_empty() {
        return Err(errors.iter().map(Diagnostic::from_rich).collect());
    }
    let Some(mut tokens) = tokens else {
        return Err(vec![Diagnostic::new(0..0, "No tokens from lexer")]);
    };

    tokens.retain(|spanned_token| !matches!(spanned_token.node, Token::Comment(_)));
    check_nesting(&tokens)?;

    let end = source_code.len();
    let (program, errors) = parser()
        .parse(
            tokens
                .as_slice()
                .map((end..end).into(), |Spanned { node, span }| (node, span)),
        )
        .into_output_errors();
    if !errors.is_empty() {
        return Err(errors.iter().map(Diagnostic::from_rich).collect());
    }
    program.ok_or_else(|| vec![Diagnostic::new(0..end, "No program from parser")])
}

fn check_nesting(tokens: &[Spanned<Token<'_>>]) -> Result<(), Vec<Diagnostic>> {
    let mut depth = 0usize;
    for token in tokens {
        match token.node {
            Token::BracketCurlyOpen => {
                depth += 1;
                if depth > MAX_NESTING {
                    return Err(vec![Diagnostic::new(
                        token.span.into_range(),
                        format!("Blocks nested deeper than {MAX_NESTING} levels"),
                    )]);
                }
            }
            Token::BracketCurlyClose => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}
