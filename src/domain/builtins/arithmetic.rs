//! Pointwise arithmetic builtins.

use super::{Builtin, BuiltinFn, Category, Registrar, map1, map2, map3};

const CLAMP_ARGS: &[&str] = &["x", "lo", "hi"];

fn f(arity: usize, func: BuiltinFn, doc: &'static str) -> Builtin {
    Builtin::function(arity, func, doc, Category::Arithmetic)
}

pub fn register(reg: &mut Registrar<'_>) {
    reg.add("add", f(2, |a| map2(a, |x, y| x + y), "add two numbers"))
        .add("sub", f(2, |a| map2(a, |x, y| x - y), "subtract y from x"))
        .add("mul", f(2, |a| map2(a, |x, y| x * y), "multiply two numbers"))
        .add("div", f(2, |a| map2(a, |x, y| x / y), "divide x by y"))
        .add("neg", f(1, |a| map1(a, |x| -x), "negate x"))
        .add("abs", f(1, |a| map1(a, f64::abs), "absolute value"))
        .add("sign", f(1, |a| map1(a, sign), "sign of x (-1, 0, 1)"))
        .add("min", f(2, |a| map2(a, nan_min), "minimum of x and y"))
        .add("max", f(2, |a| map2(a, nan_max), "maximum of x and y"))
        .add(
            "clamp",
            f(3, |a| map3(a, clamp), "clamp x to [lo, hi]").with_arg_names(CLAMP_ARGS),
        )
        .add("sqrt", f(1, |a| map1(a, f64::sqrt), "square root"))
        .add("exp", f(1, |a| map1(a, f64::exp), "e raised to x"))
        .add("log", f(1, |a| map1(a, f64::ln), "natural logarithm"))
        .add("pow", f(2, |a| map2(a, f64::powf), "x raised to y"))
        .add("floor", f(1, |a| map1(a, f64::floor), "round down"))
        .add("ceil", f(1, |a| map1(a, f64::ceil), "round up"))
        .add("round", f(1, |a| map1(a, round_half_up), "round to nearest integer"))
        .add("mod", f(2, |a| map2(a, |x, y| x % y), "remainder of x / y"))
        .add("sin", f(1, |a| map1(a, f64::sin), "sine"))
        .add("cos", f(1, |a| map1(a, f64::cos), "cosine"))
        .add("tan", f(1, |a| map1(a, f64::tan), "tangent"));
}

/// -1, 0 or 1; signed zeros and NaN pass through.
fn sign(x: f64) -> f64 {
    if x == 0.0 || x.is_nan() { x } else { x.signum() }
}

/// Nearest integer, halves toward positive infinity.
fn round_half_up(x: f64) -> f64 {
    let floor = x.floor();
    if x - floor >= 0.5 { floor + 1.0 } else { floor }
}

// f64::min/max drop a NaN operand; these keep it.
fn nan_min(x: f64, y: f64) -> f64 {
    if x.is_nan() || y.is_nan() { f64::NAN } else { x.min(y) }
}

fn nan_max(x: f64, y: f64) -> f64 {
    if x.is_nan() || y.is_nan() { f64::NAN } else { x.max(y) }
}

fn clamp(x: f64, lo: f64, hi: f64) -> f64 {
    nan_min(nan_max(x, lo), hi)
}
