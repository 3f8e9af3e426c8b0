//! Core domain types and logic.
//!
//! Language front end: [`span`], [`lexer`], [`ast`], [`parser`], [`lower`].
//! Runtime: [`value`], [`builtins`], [`ir`], [`eval`], [`program`].
//! Simulation: [`input`], [`backtest`], [`metrics`].

pub mod ast;
pub mod backtest;
pub mod builtins;
pub mod config_validation;
pub mod docstrings;
pub mod error;
pub mod eval;
pub mod input;
pub mod ir;
pub mod lexer;
pub mod lower;
pub mod metrics;
pub mod parser;
pub mod program;
pub mod span;
pub mod value;
