//! IR evaluation.
//!
//! One forward pass builds a [`Value`] per command. No numbers are computed
//! here: literals become constants, references copy the bound Value, and
//! applications hand earlier Values to the builtin's constructor.

use crate::domain::builtins::{Builtin, Builtins};
use crate::domain::error::EvalError;
use crate::domain::ir::{Command, Program};
use crate::domain::value::Value;

/// Build the Value of `program`'s last command against a bound registry.
pub fn eval(program: &Program, builtins: &Builtins) -> Result<Value, EvalError> {
    program.verify()?;

    let mut values: Vec<Value> = Vec::with_capacity(program.len());
    for (index, command) in program.commands.iter().enumerate() {
        let value = match command {
            Command::Literal(x) => Value::constant(*x),

            Command::Reference(name) => match builtins.get(name) {
                Some(Builtin::Reference { value, .. }) => value.clone(),
                Some(Builtin::Function { .. }) => {
                    return Err(EvalError::KindMismatch {
                        index,
                        name: name.clone(),
                        expected: "reference",
                    });
                }
                None => {
                    return Err(EvalError::UnknownBuiltin {
                        index,
                        name: name.clone(),
                    });
                }
            },

            Command::Application { name, args } => match builtins.get(name) {
                Some(Builtin::Function { arity, func, .. }) => {
                    if *arity != args.len() {
                        return Err(EvalError::Arity {
                            index,
                            name: name.clone(),
                            want: *arity,
                            got: args.len(),
                        });
                    }
                    let operands: Vec<Value> = args.iter().map(|&a| values[a].clone()).collect();
                    func(&operands)
                }
                Some(Builtin::Reference { .. }) => {
                    return Err(EvalError::KindMismatch {
                        index,
                        name: name.clone(),
                        expected: "function",
                    });
                }
                None => {
                    return Err(EvalError::UnknownBuiltin {
                        index,
                        name: name.clone(),
                    });
                }
            },
        };
        values.push(value);
    }

    values.pop().ok_or(EvalError::EmptyProgram)
}
