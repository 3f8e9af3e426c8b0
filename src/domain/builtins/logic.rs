//! Comparison and boolean builtins. True is 1, false is 0, and any value
//! other than 0 (NaN included) is truthy.

use super::{Builtin, BuiltinFn, Category, Registrar, map1, map2};
use crate::domain::value::Value;

const IF_ARGS: &[&str] = &["c", "a", "b"];

fn f(arity: usize, func: BuiltinFn, doc: &'static str) -> Builtin {
    Builtin::function(arity, func, doc, Category::Logic)
}

fn truth(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

pub fn register(reg: &mut Registrar<'_>) {
    reg.add("lt", f(2, |a| map2(a, |x, y| truth(x < y)), "x < y"))
        .add("lte", f(2, |a| map2(a, |x, y| truth(x <= y)), "x <= y"))
        .add("gt", f(2, |a| map2(a, |x, y| truth(x > y)), "x > y"))
        .add("gte", f(2, |a| map2(a, |x, y| truth(x >= y)), "x >= y"))
        .add("eq", f(2, |a| map2(a, |x, y| truth(x == y)), "x == y"))
        .add("neq", f(2, |a| map2(a, |x, y| truth(x != y)), "x != y"))
        .add(
            "and",
            f(2, |a| map2(a, |x, y| truth(x != 0.0 && y != 0.0)), "logical and"),
        )
        .add(
            "or",
            f(2, |a| map2(a, |x, y| truth(x != 0.0 || y != 0.0)), "logical or"),
        )
        .add("not", f(1, |a| map1(a, |x| truth(x == 0.0)), "logical not"))
        .add(
            "if",
            f(3, select, "if c then a else b").with_arg_names(IF_ARGS),
        );
}

/// Reads only the chosen branch at each offset.
fn select(args: &[Value]) -> Value {
    let (c, a, b) = (args[0].clone(), args[1].clone(), args[2].clone());
    Value::from_fn(move |t| if c.at(t) != 0.0 { a.at(t) } else { b.at(t) })
}
