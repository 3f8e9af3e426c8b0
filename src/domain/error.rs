//! Domain error types.

use crate::domain::span::Span;

/// A front-end failure: lexing, parsing or lowering a program.
///
/// The `Display` output is the user-facing message; every variant except
/// [`LangError::Eval`] carries the span of the offending source text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LangError {
    #[error("Unexpected character '{value}' at position {}", start_of(.span))]
    Character { value: char, span: Span },

    #[error("Expected {want} but got '{got}'{} at position {span}", in_context(.context))]
    Token {
        want: String,
        got: String,
        context: String,
        span: Span,
    },

    #[error("Unknown reference '{name}' at position {span}")]
    Reference { name: String, span: Span },

    #[error(
        "Application on '{name}' expects {want} argument{} but got {got} at position {span}",
        plural(.want)
    )]
    Application {
        name: String,
        want: usize,
        got: usize,
        span: Span,
    },

    #[error(transparent)]
    Eval(#[from] EvalError),
}

fn start_of(span: &Span) -> usize {
    span.start
}

fn in_context(context: &str) -> String {
    if context.is_empty() {
        String::new()
    } else {
        format!(" in {context}")
    }
}

fn plural(count: &usize) -> &'static str {
    if *count == 1 { "" } else { "s" }
}

impl LangError {
    pub fn span(&self) -> Option<Span> {
        match self {
            LangError::Character { span, .. }
            | LangError::Token { span, .. }
            | LangError::Reference { span, .. }
            | LangError::Application { span, .. } => Some(*span),
            LangError::Eval(_) => None,
        }
    }

    /// Format the error with the offending source line and a caret underline.
    pub fn display_with_context(&self, source: &str) -> String {
        let Some(span) = self.span() else {
            return self.to_string();
        };

        let mut line_start = 0;
        let mut line = "";
        let mut offset = 0;
        for text in source.split('\n') {
            let width = text.chars().count();
            line = text;
            line_start = offset;
            if span.start <= offset + width {
                break;
            }
            offset += width + 1;
        }

        let column = span.start.saturating_sub(line_start);
        let visible = line.trim_end_matches('\r').chars().count();
        let width = span.len().clamp(1, visible.saturating_sub(column).max(1));
        let caret = " ".repeat(column) + &"^".repeat(width);
        format!(
            "{line}\n{caret}\n{err}",
            line = line.trim_end_matches('\r'),
            caret = caret,
            err = self
        )
    }
}

/// A malformed instruction list reached the evaluator.
///
/// Programs produced by lowering against the same registry never trigger
/// these; they guard hand-built or mismatched programs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("program has no instructions")]
    EmptyProgram,

    #[error("instruction {index} uses operand {operand}, which does not precede it")]
    ForwardReference { index: usize, operand: usize },

    #[error("instruction {index} names unknown builtin '{name}'")]
    UnknownBuiltin { index: usize, name: String },

    #[error("instruction {index} uses '{name}' as a {expected}, but it is not one")]
    KindMismatch {
        index: usize,
        name: String,
        expected: &'static str,
    },

    #[error("instruction {index} calls '{name}' with {got} operands, expected {want}")]
    Arity {
        index: usize,
        name: String,
        want: usize,
        got: usize,
    },
}

/// Top-level error type for tradelang.
#[derive(Debug, thiserror::Error)]
pub enum TradelangError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Lang(#[from] LangError),

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("input series '{field}' has {actual} samples, expected {expected}")]
    InputShape {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("insufficient data for {instrument}: have {samples} samples, need {minimum}")]
    InsufficientData {
        instrument: String,
        samples: usize,
        minimum: usize,
    },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TradelangError> for std::process::ExitCode {
    fn from(err: &TradelangError) -> Self {
        let code: u8 = match err {
            TradelangError::Io(_) | TradelangError::Report { .. } => 1,
            TradelangError::ConfigParse { .. }
            | TradelangError::ConfigMissing { .. }
            | TradelangError::ConfigInvalid { .. } => 2,
            TradelangError::Data { .. }
            | TradelangError::InputShape { .. }
            | TradelangError::InsufficientData { .. } => 3,
            TradelangError::Lang(_) => 4,
        };
        std::process::ExitCode::from(code)
    }
}
