//! Lowering from AST to the flat IR.
//!
//! Names resolve against a scope of already-emitted command indices. Every
//! reference builtin is emitted up front and bound in the root scope, so user
//! `let` bindings shadow builtins exactly like they shadow each other. Callees
//! of applications resolve against the registry itself, never the scope.

use crate::domain::ast::{Expression, ExpressionKind};
use crate::domain::builtins::{Builtin, Builtins};
use crate::domain::error::LangError;
use crate::domain::ir::{Command, Program};
use std::collections::HashMap;

type Scope = HashMap<String, usize>;

struct Lowerer<'a> {
    builtins: &'a Builtins,
    program: Program,
}

impl<'a> Lowerer<'a> {
    fn new(builtins: &'a Builtins) -> Self {
        Self {
            builtins,
            program: Program::new(),
        }
    }

    fn builtin_scope(&mut self) -> Scope {
        let mut scope = Scope::new();
        for (name, builtin) in self.builtins.iter() {
            if let Builtin::Reference { .. } = builtin {
                let id = self.program.push(Command::Reference(name.to_string()));
                scope.insert(name.to_string(), id);
            }
        }
        scope
    }

    fn lower(&mut self, expr: &Expression, scope: &Scope) -> Result<usize, LangError> {
        match &expr.kind {
            ExpressionKind::Literal(value) => Ok(self.program.push(Command::Literal(*value))),

            ExpressionKind::Reference(name) => {
                scope
                    .get(name)
                    .copied()
                    .ok_or_else(|| LangError::Reference {
                        name: name.clone(),
                        span: expr.span,
                    })
            }

            ExpressionKind::Application { name, args } => {
                let Some(builtin) = self.builtins.get(name) else {
                    return Err(LangError::Reference {
                        name: name.clone(),
                        span: expr.span,
                    });
                };
                let want = builtin.arity();
                if !builtin.is_function() || args.len() != want {
                    return Err(LangError::Application {
                        name: name.clone(),
                        want,
                        got: args.len(),
                        span: expr.span,
                    });
                }

                let ids = args
                    .iter()
                    .map(|arg| self.lower(arg, scope))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(self.program.push(Command::Application {
                    name: name.clone(),
                    args: ids,
                }))
            }

            ExpressionKind::Let { name, value, body } => {
                let value_id = self.lower(value, scope)?;
                let mut inner = scope.clone();
                inner.insert(name.clone(), value_id);
                self.lower(body, &inner)
            }
        }
    }
}

/// Lower `expr` against `builtins`, resolving names and checking arity.
///
/// The returned program's last command is the value of `expr`.
pub fn lower(expr: &Expression, builtins: &Builtins) -> Result<Program, LangError> {
    let mut lowerer = Lowerer::new(builtins);
    let scope = lowerer.builtin_scope();
    let root = lowerer.lower(expr, &scope)?;

    // A bare reference resolves to an existing command; the result must be last.
    if root + 1 != lowerer.program.len() {
        let command = lowerer.program.commands[root].clone();
        lowerer.program.push(command);
    }
    Ok(lowerer.program)
}
