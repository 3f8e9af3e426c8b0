//! Program AST data structures.
//!
//! - `Expression`: a node plus the span of source text it was parsed from
//! - `ExpressionKind`: literal, reference, application and let variants
//!
//! Pipelines and parentheses have no node of their own; the parser rewrites
//! them into applications and widened spans.

use crate::domain::span::Span;

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    Literal(f64),
    Reference(String),
    Application {
        name: String,
        args: Vec<Expression>,
    },
    Let {
        name: String,
        value: Box<Expression>,
        body: Box<Expression>,
    },
}

impl Expression {
    pub fn new(kind: ExpressionKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn literal(value: f64, span: Span) -> Self {
        Self::new(ExpressionKind::Literal(value), span)
    }

    pub fn reference(name: impl Into<String>, span: Span) -> Self {
        Self::new(ExpressionKind::Reference(name.into()), span)
    }

    pub fn application(name: impl Into<String>, args: Vec<Expression>, span: Span) -> Self {
        Self::new(
            ExpressionKind::Application {
                name: name.into(),
                args,
            },
            span,
        )
    }

    pub fn let_in(name: impl Into<String>, value: Expression, body: Expression, span: Span) -> Self {
        Self::new(
            ExpressionKind::Let {
                name: name.into(),
                value: Box::new(value),
                body: Box::new(body),
            },
            span,
        )
    }

    /// Same node, span replaced. Used for parenthesised groups.
    pub fn with_span(self, span: Span) -> Self {
        Self { span, ..self }
    }

    /// Diagnostic name of the node kind.
    pub fn describe(&self) -> &'static str {
        match self.kind {
            ExpressionKind::Literal(_) => "literal",
            ExpressionKind::Reference(_) => "reference",
            ExpressionKind::Application { .. } => "application",
            ExpressionKind::Let { .. } => "let",
        }
    }

    /// Number of nodes in the tree rooted here.
    pub fn size(&self) -> usize {
        match &self.kind {
            ExpressionKind::Literal(_) | ExpressionKind::Reference(_) => 1,
            ExpressionKind::Application { args, .. } => {
                1 + args.iter().map(Expression::size).sum::<usize>()
            }
            ExpressionKind::Let { value, body, .. } => 1 + value.size() + body.size(),
        }
    }
}
