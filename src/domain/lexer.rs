//! Program lexer.
//!
//! Converts source text into a token list terminated by a single `Eof` token.
//! Offsets are character positions, not bytes. The first character outside
//! the grammar aborts the whole pass.

use crate::domain::error::LangError;
use crate::domain::span::Span;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Literal(f64),
    Reference(String),
    LParen,
    RParen,
    Equals,
    Pipe,
    Let,
    In,
    Eof,
}

impl TokenKind {
    /// Short name used in parser diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Literal(_) => "literal",
            TokenKind::Reference(_) => "reference",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Equals => "=",
            TokenKind::Pipe => "|>",
            TokenKind::Let => "let",
            TokenKind::In => "in",
            TokenKind::Eof => "eof",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
}

impl Lexer {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn advance_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
    }

    fn advance_if(&mut self, pred: impl Fn(char) -> bool) -> bool {
        if self.peek().is_some_and(pred) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn text(&self, start: usize) -> String {
        self.chars[start..self.pos].iter().collect()
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            span: Span::new(start, self.pos),
        }
    }

    fn skip_comment(&mut self) {
        self.advance_while(|c| c != '\n' && c != '\r');
    }

    fn read_identifier(&mut self, start: usize) -> Token {
        self.advance_while(is_ident_continue);
        let kind = match self.text(start).as_str() {
            "let" => TokenKind::Let,
            "in" => TokenKind::In,
            name => TokenKind::Reference(name.to_string()),
        };
        self.token(kind, start)
    }

    /// Read a signed decimal with optional fraction and exponent.
    ///
    /// Text that is not a valid number (`-`, `.`, `1e`) is rejected at its
    /// first character rather than read as a NaN literal.
    fn read_number(&mut self, start: usize) -> Result<Token, LangError> {
        self.advance_if(is_sign);
        self.advance_while(|c| c.is_ascii_digit());
        if self.advance_if(|c| c == '.') {
            self.advance_while(|c| c.is_ascii_digit());
        }
        if self.advance_if(|c| c == 'e' || c == 'E') {
            self.advance_if(is_sign);
            self.advance_while(|c| c.is_ascii_digit());
        }

        let text = self.text(start);
        match text.parse::<f64>() {
            Ok(value) => Ok(self.token(TokenKind::Literal(value), start)),
            Err(_) => Err(LangError::Character {
                value: self.chars[start],
                span: Span::at(start),
            }),
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>, LangError> {
        loop {
            let start = self.pos;
            let Some(ch) = self.peek() else {
                return Ok(None);
            };

            match ch {
                ' ' | '\t' | '\n' | '\r' => {
                    self.advance();
                }
                '#' => {
                    self.advance();
                    self.skip_comment();
                }
                '(' | ')' | '=' => {
                    self.advance();
                    let kind = match ch {
                        '(' => TokenKind::LParen,
                        ')' => TokenKind::RParen,
                        _ => TokenKind::Equals,
                    };
                    return Ok(Some(self.token(kind, start)));
                }
                '|' if self.peek_at(1) == Some('>') => {
                    self.pos += 2;
                    return Ok(Some(self.token(TokenKind::Pipe, start)));
                }
                c if is_ident_start(c) => return Ok(Some(self.read_identifier(start))),
                c if c.is_ascii_digit() || c == '.' || is_sign(c) => {
                    return self.read_number(start).map(Some);
                }
                c => {
                    return Err(LangError::Character {
                        value: c,
                        span: Span::at(start),
                    });
                }
            }
        }
    }

    fn tokenize(mut self) -> Result<Vec<Token>, LangError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        tokens.push(self.token(TokenKind::Eof, self.pos));
        Ok(tokens)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_lowercase() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

fn is_sign(c: char) -> bool {
    c == '+' || c == '-'
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, LangError> {
    Lexer::new(input).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn empty_input_is_just_eof() {
        let tokens = tokenize("").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
        assert_eq!(tokens[0].span, Span::new(0, 0));
    }

    #[test]
    fn application_tokens() {
        assert_eq!(
            kinds("add 1 2"),
            vec![
                TokenKind::Reference("add".into()),
                TokenKind::Literal(1.0),
                TokenKind::Literal(2.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn keywords_and_punctuation() {
        assert_eq!(
            kinds("let x = (a) in x |> f"),
            vec![
                TokenKind::Let,
                TokenKind::Reference("x".into()),
                TokenKind::Equals,
                TokenKind::LParen,
                TokenKind::Reference("a".into()),
                TokenKind::RParen,
                TokenKind::In,
                TokenKind::Reference("x".into()),
                TokenKind::Pipe,
                TokenKind::Reference("f".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn keyword_prefix_is_identifier() {
        assert_eq!(
            kinds("lets inner"),
            vec![
                TokenKind::Reference("lets".into()),
                TokenKind::Reference("inner".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn number_forms() {
        assert_eq!(
            kinds("-1 +2.5 .5 3. 1e3 2.5E-2"),
            vec![
                TokenKind::Literal(-1.0),
                TokenKind::Literal(2.5),
                TokenKind::Literal(0.5),
                TokenKind::Literal(3.0),
                TokenKind::Literal(1000.0),
                TokenKind::Literal(0.025),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn identifiers_with_digits_and_underscores() {
        assert_eq!(
            kinds("rolling_max _x ema20"),
            vec![
                TokenKind::Reference("rolling_max".into()),
                TokenKind::Reference("_x".into()),
                TokenKind::Reference("ema20".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        let tokens = tokenize("# name\n# more |> $ stuff\n1 # trailing").unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].kind, TokenKind::Literal(1.0));
        assert_eq!(tokens[0].span, Span::new(25, 26));
    }

    #[test]
    fn spans_cover_consumed_characters() {
        let tokens = tokenize("  mean  price |> 20.5").unwrap();
        assert_eq!(tokens[0].span, Span::new(2, 6));
        assert_eq!(tokens[1].span, Span::new(8, 13));
        assert_eq!(tokens[2].span, Span::new(14, 16));
        assert_eq!(tokens[3].span, Span::new(17, 21));
        assert_eq!(tokens[4].span, Span::new(21, 21));
    }

    #[test]
    fn spans_count_characters_not_bytes() {
        let tokens = tokenize("# é\nx").unwrap();
        assert_eq!(tokens[0].span, Span::new(4, 5));
    }

    #[test]
    fn invalid_character_fails() {
        let err = tokenize("add 1 $").unwrap_err();
        assert_eq!(
            err,
            LangError::Character {
                value: '$',
                span: Span::new(6, 7),
            }
        );
    }

    #[test]
    fn uppercase_is_invalid() {
        let err = tokenize("Price").unwrap_err();
        assert!(matches!(err, LangError::Character { value: 'P', .. }));
    }

    #[test]
    fn lone_bar_is_invalid() {
        let err = tokenize("x | f").unwrap_err();
        assert!(matches!(err, LangError::Character { value: '|', span } if span.start == 2));
    }

    #[test]
    fn lone_sign_is_invalid() {
        let err = tokenize("sub x - 1").unwrap_err();
        assert!(matches!(err, LangError::Character { value: '-', span } if span.start == 6));
    }

    #[test]
    fn dangling_exponent_is_invalid() {
        let err = tokenize("1e").unwrap_err();
        assert!(matches!(err, LangError::Character { value: '1', .. }));
    }

    #[test]
    fn lone_dot_is_invalid() {
        let err = tokenize("add .").unwrap_err();
        assert!(matches!(err, LangError::Character { value: '.', span } if span.start == 4));
    }
}
