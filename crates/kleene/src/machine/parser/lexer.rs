use super::{ParseError, Spanned};
use chumsky::prelude::*;
use std::borrow::Cow;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token<'code> {
    BracketCurlyOpen,
    BracketCurlyClose,
    Comment(&'code str),
    Number(i64),
    // Raw literal body, escapes are resolved by the parser
    Text(&'code str),
    Word(&'code str),
    If,
    Else,
    True,
    False,
}

impl<'code> Token<'code> {
    pub fn into_cow_str(self) -> Cow<'code, str> {
        match self {
            Self::BracketCurlyOpen => "{".into(),
            Self::BracketCurlyClose => "}".into(),
            Self::Comment(comment) => comment.into(),
            Self::Number(number) => number.to_string().into(),
            Self::Text(text) => format!("\"{text}\"").into(),
            Self::Word(word) => word.into(),
            Self::If => "if".into(),
            Self::Else => "else".into(),
            Self::True => "true".into(),
            Self::False => "false".into(),
        }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.into_cow_str())
    }
}

pub fn lexer<'code>()
-> impl Parser<'code, &'code str, Vec<Spanned<Token<'code>>>, extra::Err<ParseError<'code, char>>> {
    let bracket = choice((
        just('{').to(Token::BracketCurlyOpen),
        just('}').to(Token::BracketCurlyClose),
    ));

    let comment = just("--")
        .ignore_then(none_of("\r\n").repeated())
        .to_slice()
        .map(Token::Comment);

    let number = just('-')
        .or_not()
        .then(text::int(10))
        .to_slice()
        .try_map(|number: &str, span| {
            number
                .parse()
                .map(Token::Number)
                .map_err(|_| ParseError::custom(span, format!("Integer '{number}' does not fit in 64 bits")))
        });

    let text = just('"')
        .ignore_then(
            choice((
                just('\\').then(any()).ignored(),
                none_of("\\\"").ignored(),
            ))
            .repeated()
            .to_slice(),
        )
        .then_ignore(just('"'))
        .map(Token::Text);

    let identifier = text::ascii::ident().map(|identifier: &str| match identifier {
        "if" => Token::If,
        "else" => Token::Else,
        "true" => Token::True,
        "false" => Token::False,
        word => Token::Word(word),
    });

    let token = choice((bracket, comment, number, text, identifier));

    token
        .map_with(|token, extra| Spanned {
            node: token,
            span: extra.span(),
        })
        .padded()
        .recover_with(skip_then_retry_until(any().ignored(), end()))
        .repeated()
        .collect()
        .padded()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chumsky::prelude::Parser;

    fn tokens(code: &str) -> Vec<Token<'_>> {
        let result = lexer().parse(code);
        result.output().unwrap().iter().map(|t| t.node).collect()
    }

    #[test]
    fn test_words_and_literals() {
        assert_eq!(
            tokens("dup -3 \"x\" true if { } else { }"),
            vec![
                Token::Word("dup"),
                Token::Number(-3),
                Token::Text("x"),
                Token::True,
                Token::If,
                Token::BracketCurlyOpen,
                Token::BracketCurlyClose,
                Token::Else,
                Token::BracketCurlyOpen,
                Token::BracketCurlyClose,
            ]
        );
    }

    #[test]
    fn test_text_keeps_escapes_raw() {
        assert_eq!(tokens(r#""a \"quoted\" word""#), vec![Token::Text(r#"a \"quoted\" word"#)]);
    }

    #[test]
    fn test_comment_runs_to_end_of_line() {
        assert_eq!(
            tokens("-- push one\n1"),
            vec![Token::Comment("-- push one"), Token::Number(1)]
        );
    }

    #[test]
    fn test_blank_input() {
        assert!(tokens("  \n ").is_empty());
    }

    #[test]
    fn test_unknown_character_is_an_error() {
        let (_, errors) = lexer().parse("dup @ drop").into_output_errors();
        assert!(!errors.is_empty());
    }
}
