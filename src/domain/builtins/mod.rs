//! Builtin registry.
//!
//! The registry maps every name a program may use to a [`Builtin`]:
//! - `Builtin::Reference`: a zero-argument [`Value`] (inputs and constants)
//! - `Builtin::Function`: an n-ary constructor of Values from argument Values
//!
//! [`Builtins::standard`] builds the fixed vocabulary once. The table is
//! shared behind an `Arc` and never mutated; [`Builtins::with_inputs`] returns
//! a new registry whose input references read live data through an override
//! layer.

pub mod arithmetic;
pub mod logic;
pub mod time_series;

use crate::domain::input::InputValues;
use crate::domain::value::Value;
use rand::Rng;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Constructs the result Value from exactly `arity` argument Values.
pub type BuiltinFn = fn(&[Value]) -> Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Inputs,
    Constants,
    Arithmetic,
    Logic,
    TimeSeries,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Inputs,
        Category::Constants,
        Category::Arithmetic,
        Category::Logic,
        Category::TimeSeries,
    ];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Inputs => "Inputs",
            Category::Constants => "Constants",
            Category::Arithmetic => "Arithmetic",
            Category::Logic => "Logic",
            Category::TimeSeries => "Time Series",
        };
        f.write_str(s)
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "inputs" => Ok(Category::Inputs),
            "constants" => Ok(Category::Constants),
            "arithmetic" => Ok(Category::Arithmetic),
            "logic" => Ok(Category::Logic),
            "time_series" => Ok(Category::TimeSeries),
            other => Err(format!(
                "unknown category '{other}' (expected inputs, constants, arithmetic, logic, time_series)"
            )),
        }
    }
}

#[derive(Clone)]
pub enum Builtin {
    Reference {
        value: Value,
        doc: &'static str,
        category: Category,
    },
    Function {
        arity: usize,
        arg_names: &'static [&'static str],
        func: BuiltinFn,
        doc: &'static str,
        category: Category,
    },
}

impl Builtin {
    pub fn reference(value: Value, doc: &'static str, category: Category) -> Self {
        Builtin::Reference {
            value,
            doc,
            category,
        }
    }

    pub fn function(arity: usize, func: BuiltinFn, doc: &'static str, category: Category) -> Self {
        Builtin::Function {
            arity,
            arg_names: &[],
            func,
            doc,
            category,
        }
    }

    pub fn with_arg_names(self, names: &'static [&'static str]) -> Self {
        match self {
            Builtin::Function {
                arity,
                func,
                doc,
                category,
                ..
            } => Builtin::Function {
                arity,
                arg_names: names,
                func,
                doc,
                category,
            },
            reference => reference,
        }
    }

    /// Declared argument count; references take none.
    pub fn arity(&self) -> usize {
        match self {
            Builtin::Reference { .. } => 0,
            Builtin::Function { arity, .. } => *arity,
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Builtin::Function { .. })
    }

    pub fn doc(&self) -> &'static str {
        match self {
            Builtin::Reference { doc, .. } | Builtin::Function { doc, .. } => doc,
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Builtin::Reference { category, .. } | Builtin::Function { category, .. } => *category,
        }
    }
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Builtin::Reference { category, .. } => f
                .debug_struct("Reference")
                .field("category", category)
                .finish_non_exhaustive(),
            Builtin::Function {
                arity, category, ..
            } => f
                .debug_struct("Function")
                .field("arity", arity)
                .field("category", category)
                .finish_non_exhaustive(),
        }
    }
}

/// Documentation row for help output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinDoc {
    pub name: &'static str,
    pub arity: usize,
    pub arg_names: Vec<&'static str>,
    pub doc: &'static str,
    pub category: Category,
}

const DEFAULT_ARG_NAMES: [&str; 4] = ["x", "y", "z", "w"];

/// Names of the input references that [`Builtins::with_inputs`] rebinds.
pub const INPUT_FIELDS: [&str; 6] = ["price", "volume", "open", "close", "high", "low"];

struct Table {
    entries: Vec<(&'static str, Builtin)>,
    index: HashMap<&'static str, usize>,
}

impl Table {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn insert(&mut self, name: &'static str, builtin: Builtin) {
        match self.index.get(name) {
            Some(&i) => self.entries[i].1 = builtin,
            None => {
                self.index.insert(name, self.entries.len());
                self.entries.push((name, builtin));
            }
        }
    }
}

/// Registration target handed to the category modules.
pub struct Registrar<'a> {
    table: &'a mut Table,
}

impl Registrar<'_> {
    pub fn add(&mut self, name: &'static str, builtin: Builtin) -> &mut Self {
        self.table.insert(name, builtin);
        self
    }
}

/// Immutable name → builtin mapping.
#[derive(Clone)]
pub struct Builtins {
    table: Arc<Table>,
    overrides: HashMap<&'static str, Builtin>,
}

impl Builtins {
    /// The full standard vocabulary with unbound (zero) inputs.
    pub fn standard() -> Self {
        let mut table = Table::new();
        {
            let mut reg = Registrar { table: &mut table };
            register_inputs(&mut reg);
            register_constants(&mut reg);
            arithmetic::register(&mut reg);
            logic::register(&mut reg);
            time_series::register(&mut reg);
        }
        Self {
            table: Arc::new(table),
            overrides: HashMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Builtin> {
        if let Some(b) = self.overrides.get(name) {
            return Some(b);
        }
        self.table
            .index
            .get(name)
            .map(|&i| &self.table.entries[i].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.table.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.entries.is_empty()
    }

    /// Entries in declaration order, overrides applied.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Builtin)> + '_ {
        self.table
            .entries
            .iter()
            .map(|(name, b)| (*name, self.overrides.get(name).unwrap_or(b)))
    }

    /// New registry with the input references bound to `inputs`.
    ///
    /// The receiver is left untouched and the base table is shared.
    pub fn with_inputs(&self, inputs: &InputValues) -> Self {
        let mut next = self.clone();
        for (name, value) in inputs.fields() {
            next.override_reference(name, value.clone());
        }
        next
    }

    fn override_reference(&mut self, name: &'static str, value: Value) {
        if let Some(Builtin::Reference { doc, category, .. }) = self.get(name).cloned() {
            self.overrides
                .insert(name, Builtin::reference(value, doc, category));
        }
    }

    pub fn docs(&self) -> Vec<BuiltinDoc> {
        self.iter()
            .map(|(name, b)| {
                let arg_names = match b {
                    Builtin::Function {
                        arity, arg_names, ..
                    } if arg_names.is_empty() => {
                        DEFAULT_ARG_NAMES[..(*arity).min(DEFAULT_ARG_NAMES.len())].to_vec()
                    }
                    Builtin::Function { arg_names, .. } => arg_names.to_vec(),
                    Builtin::Reference { .. } => Vec::new(),
                };
                BuiltinDoc {
                    name,
                    arity: b.arity(),
                    arg_names,
                    doc: b.doc(),
                    category: b.category(),
                }
            })
            .collect()
    }
}

impl Default for Builtins {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for Builtins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builtins")
            .field("entries", &self.table.entries.len())
            .field("overrides", &self.overrides.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn register_inputs(reg: &mut Registrar<'_>) {
    let zero = || Value::constant(0.0);
    reg.add("price", Builtin::reference(zero(), "current price", Category::Inputs))
        .add("volume", Builtin::reference(zero(), "current volume", Category::Inputs))
        .add("open", Builtin::reference(zero(), "current open", Category::Inputs))
        .add("close", Builtin::reference(zero(), "current close", Category::Inputs))
        .add("high", Builtin::reference(zero(), "current high", Category::Inputs))
        .add("low", Builtin::reference(zero(), "current low", Category::Inputs))
        .add(
            "time",
            Builtin::reference(
                Value::from_fn(|t| t as f64),
                "sample index (0 is latest)",
                Category::Inputs,
            ),
        );
}

fn register_constants(reg: &mut Registrar<'_>) {
    reg.add(
        "random",
        Builtin::reference(
            Value::from_fn(|_| rand::thread_rng().r#gen::<f64>()),
            "random number in [0, 1)",
            Category::Constants,
        ),
    )
    .add(
        "pi",
        Builtin::reference(Value::constant(std::f64::consts::PI), "pi constant", Category::Constants),
    )
    .add(
        "e",
        Builtin::reference(Value::constant(std::f64::consts::E), "euler constant", Category::Constants),
    );
}

/// Pointwise Value from a unary numeric function.
pub(crate) fn map1(args: &[Value], f: fn(f64) -> f64) -> Value {
    args[0].map(f)
}

/// Pointwise Value from a binary numeric function.
pub(crate) fn map2(args: &[Value], f: fn(f64, f64) -> f64) -> Value {
    args[0].zip_with(&args[1], f)
}

/// Pointwise Value from a ternary numeric function.
pub(crate) fn map3(args: &[Value], f: fn(f64, f64, f64) -> f64) -> Value {
    let (a, b, c) = (args[0].clone(), args[1].clone(), args[2].clone());
    Value::from_fn(move |t| f(a.at(t), b.at(t), c.at(t)))
}
