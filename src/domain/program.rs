//! Source-to-Value entry points.

use crate::domain::builtins::Builtins;
use crate::domain::error::LangError;
use crate::domain::input::InputValues;
use crate::domain::ir::Program;
use crate::domain::value::Value;
use crate::domain::{eval, lower, parser};
use tracing::debug;

/// Lex, parse and lower `source` without evaluating it.
pub fn check(source: &str, builtins: &Builtins) -> Result<Program, LangError> {
    let ast = parser::parse(source)?;
    let program = lower::lower(&ast, builtins)?;
    debug!(nodes = ast.size(), commands = program.len(), "program lowered");
    Ok(program)
}

/// Compile `source` and bind it to `inputs`.
///
/// Names are resolved against `builtins`; evaluation runs against a copy of
/// it overlaid with the input Values, so `builtins` itself is never touched.
pub fn evaluate(source: &str, builtins: &Builtins, inputs: &InputValues) -> Result<Value, LangError> {
    let program = check(source, builtins)?;
    let bound = builtins.with_inputs(inputs);
    Ok(eval::eval(&program, &bound)?)
}
