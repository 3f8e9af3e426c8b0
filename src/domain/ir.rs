//! Flat intermediate representation.
//!
//! A [`Program`] is an append-only list of [`Command`]s. Operands are indices
//! of earlier commands, so the list is topologically ordered and a single
//! forward pass evaluates it. The last command is the result.

use crate::domain::error::EvalError;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Literal(f64),
    /// Bound value of a reference builtin.
    Reference(String),
    /// Function builtin applied to earlier commands.
    Application { name: String, args: Vec<usize> },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub commands: Vec<Command>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command and return its index.
    pub fn push(&mut self, command: Command) -> usize {
        self.commands.push(command);
        self.commands.len() - 1
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Index of the result command.
    pub fn result(&self) -> Option<usize> {
        self.commands.len().checked_sub(1)
    }

    /// Check that the program is non-empty and every operand precedes its user.
    pub fn verify(&self) -> Result<(), EvalError> {
        if self.commands.is_empty() {
            return Err(EvalError::EmptyProgram);
        }
        for (index, command) in self.commands.iter().enumerate() {
            if let Command::Application { args, .. } = command {
                if let Some(&operand) = args.iter().find(|&&a| a >= index) {
                    return Err(EvalError::ForwardReference { index, operand });
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Literal(v) => write!(f, "literal {v}"),
            Command::Reference(name) => write!(f, "reference {name}"),
            Command::Application { name, args } => {
                write!(f, "apply {name}")?;
                for a in args {
                    write!(f, " %{a}")?;
                }
                Ok(())
            }
        }
    }
}

/// Numbered listing, one command per line.
impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, command) in self.commands.iter().enumerate() {
            writeln!(f, "%{i} = {command}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(name: &str, args: &[usize]) -> Command {
        Command::Application {
            name: name.into(),
            args: args.to_vec(),
        }
    }

    #[test]
    fn push_returns_index() {
        let mut p = Program::new();
        assert_eq!(p.result(), None);
        assert_eq!(p.push(Command::Literal(1.0)), 0);
        assert_eq!(p.push(Command::Literal(2.0)), 1);
        assert_eq!(p.push(app("add", &[0, 1])), 2);
        assert_eq!(p.result(), Some(2));
        assert!(p.verify().is_ok());
    }

    #[test]
    fn empty_program_fails_verify() {
        assert_eq!(Program::new().verify(), Err(EvalError::EmptyProgram));
    }

    #[test]
    fn self_reference_fails_verify() {
        let p = Program {
            commands: vec![Command::Literal(1.0), app("neg", &[1])],
        };
        assert_eq!(
            p.verify(),
            Err(EvalError::ForwardReference {
                index: 1,
                operand: 1
            })
        );
    }

    #[test]
    fn forward_reference_fails_verify() {
        let p = Program {
            commands: vec![app("neg", &[1]), Command::Literal(1.0)],
        };
        assert!(matches!(
            p.verify(),
            Err(EvalError::ForwardReference { index: 0, .. })
        ));
    }

    #[test]
    fn listing() {
        let p = Program {
            commands: vec![
                Command::Reference("price".into()),
                Command::Literal(20.0),
                app("mean", &[0, 1]),
            ],
        };
        assert_eq!(
            p.to_string(),
            "%0 = reference price\n%1 = literal 20\n%2 = apply mean %0 %1\n"
        );
    }
}
