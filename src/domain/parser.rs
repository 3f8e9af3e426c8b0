//! Program parser.
//!
//! Recursive descent over the token list with one token of lookahead:
//!
//! ```text
//! program     := expression EOF
//! expression  := let | pipeline
//! let         := "let" reference "=" expression "in" expression
//! pipeline    := application ("|>" application)*
//! application := atom atom*        (head must be a reference to take arguments)
//! atom        := literal | reference | "(" expression ")"
//! ```
//!
//! `x |> f a` is rewritten to `f x a` while parsing.

use crate::domain::ast::{Expression, ExpressionKind};
use crate::domain::error::LangError;
use crate::domain::lexer::{self, Token, TokenKind};
use crate::domain::span::Span;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            let end = tokens.last().map(|t| t.span.end).unwrap_or(0);
            tokens.push(Token {
                kind: TokenKind::Eof,
                span: Span::new(end, end),
            });
        }
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn is(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(kind)
    }

    fn is_atom_start(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Literal(_) | TokenKind::Reference(_) | TokenKind::LParen
        )
    }

    fn error(token: &Token, want: &str, context: &str) -> LangError {
        LangError::Token {
            want: want.to_string(),
            got: token.kind.describe().to_string(),
            context: context.to_string(),
            span: token.span,
        }
    }

    fn expect(&mut self, kind: TokenKind, context: &str) -> Result<Token, LangError> {
        if self.is(&kind) {
            Ok(self.advance())
        } else {
            Err(Self::error(self.peek(), kind.describe(), context))
        }
    }

    fn expect_reference(&mut self, context: &str) -> Result<(String, Span), LangError> {
        let token = self.expect(TokenKind::Reference(String::new()), context)?;
        match token.kind {
            TokenKind::Reference(name) => Ok((name, token.span)),
            _ => Err(Self::error(&token, "reference", context)),
        }
    }

    fn parse_grouped(&mut self) -> Result<Expression, LangError> {
        let lparen = self.advance();
        let expr = self.parse_expression()?;
        let rparen = self.expect(TokenKind::RParen, "parenthesized expression")?;
        Ok(expr.with_span(lparen.span.merge(rparen.span)))
    }

    fn parse_atom(&mut self) -> Result<Expression, LangError> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Literal(value) => {
                self.advance();
                Ok(Expression::literal(value, token.span))
            }
            TokenKind::Reference(name) => {
                self.advance();
                Ok(Expression::reference(name, token.span))
            }
            TokenKind::LParen => self.parse_grouped(),
            _ => Err(Self::error(
                &token,
                "reference, literal or \"(\"",
                "atomic expression",
            )),
        }
    }

    fn parse_application(&mut self) -> Result<Expression, LangError> {
        let head = self.parse_atom()?;
        let ExpressionKind::Reference(name) = &head.kind else {
            return Ok(head);
        };

        let mut args = Vec::new();
        while self.is_atom_start() {
            args.push(self.parse_atom()?);
        }

        match args.last() {
            None => Ok(head),
            Some(last) => {
                let span = head.span.merge(last.span);
                Ok(Expression::application(name.clone(), args, span))
            }
        }
    }

    fn parse_pipeline(&mut self) -> Result<Expression, LangError> {
        let mut left = self.parse_application()?;
        while self.is(&TokenKind::Pipe) {
            let pipe = self.advance();
            let right = self.parse_application()?;
            let span = left.span.merge(right.span);
            left = match right.kind {
                ExpressionKind::Reference(name) => Expression::application(name, vec![left], span),
                ExpressionKind::Application { name, args } => {
                    let mut piped = Vec::with_capacity(args.len() + 1);
                    piped.push(left);
                    piped.extend(args);
                    Expression::application(name, piped, span)
                }
                _ => {
                    return Err(LangError::Token {
                        want: "reference or application".to_string(),
                        got: right.describe().to_string(),
                        context: "pipeline".to_string(),
                        span: pipe.span,
                    });
                }
            };
        }
        Ok(left)
    }

    fn parse_let(&mut self) -> Result<Expression, LangError> {
        let keyword = self.advance();
        let (name, _) = self.expect_reference("let expression")?;
        self.expect(TokenKind::Equals, "let expression")?;
        let value = self.parse_expression()?;
        self.expect(TokenKind::In, "let expression")?;
        let body = self.parse_expression()?;
        let span = keyword.span.merge(body.span);
        Ok(Expression::let_in(name, value, body, span))
    }

    fn parse_expression(&mut self) -> Result<Expression, LangError> {
        if self.is(&TokenKind::Let) {
            self.parse_let()
        } else {
            self.parse_pipeline()
        }
    }

    fn parse(&mut self) -> Result<Expression, LangError> {
        let expr = self.parse_expression()?;
        self.expect(TokenKind::Eof, "program")?;
        Ok(expr)
    }
}

/// Parse a token list produced by [`lexer::tokenize`].
pub fn parse_tokens(tokens: Vec<Token>) -> Result<Expression, LangError> {
    Parser::new(tokens).parse()
}

/// Tokenize and parse source text in one step.
pub fn parse(input: &str) -> Result<Expression, LangError> {
    parse_tokens(lexer::tokenize(input)?)
}
