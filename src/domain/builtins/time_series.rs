//! Windowed time-series builtins.
//!
//! Every function here takes its window length `n` as a Value read at the
//! current offset. The window at offset `t` is the samples `t, t+1, ..,
//! t+n-1`, newest first. Aggregates stop at the first non-finite sample and
//! return NaN. Window lengths are capped at [`MAX_WINDOW`], which bounds the
//! work per sample even when the operand stays finite past the history
//! (constants, `time`, derived Values).

use super::{Builtin, BuiltinFn, Category, Registrar};
use crate::domain::value::Value;

/// Longest window any time-series builtin will read.
pub const MAX_WINDOW: usize = 100_000;

const SERIES_ARGS: &[&str] = &["x", "n"];
const X_ARG: &[&str] = &["x"];

fn f(arity: usize, func: BuiltinFn, doc: &'static str) -> Builtin {
    let names = if arity == 2 { SERIES_ARGS } else { X_ARG };
    Builtin::function(arity, func, doc, Category::TimeSeries).with_arg_names(names)
}

pub fn register(reg: &mut Registrar<'_>) {
    reg.add("lag", f(2, lag, "value lagged by n samples"))
        .add("diff", f(2, diff, "x - lag x n"))
        .add("sum", f(2, |a| windowed(a, 1, sum), "rolling sum over n samples"))
        .add("mean", f(2, |a| windowed(a, 1, mean), "rolling mean over n samples"))
        .add(
            "stdev",
            f(2, |a| windowed(a, 1, stdev), "rolling standard deviation over n samples"),
        )
        .add(
            "rolling_min",
            f(2, |a| windowed(a, 1, rolling_min), "rolling minimum over n samples"),
        )
        .add(
            "rolling_max",
            f(2, |a| windowed(a, 1, rolling_max), "rolling maximum over n samples"),
        )
        .add(
            "ema",
            f(2, |a| windowed(a, 1, ema), "exponential moving average over n samples"),
        )
        .add("zscore", f(2, |a| windowed(a, 1, zscore), "z-score over n samples"))
        .add("returns", f(1, returns, "simple return"))
        .add("log_returns", f(1, log_returns, "log return"));
}

/// Window length from a raw Value sample: rounded to nearest, floored at
/// `min` and capped at [`MAX_WINDOW`]. NaN, infinities and negatives all give
/// `min`.
pub fn window_len(n: f64, min: usize) -> usize {
    if n.is_finite() && n > min as f64 {
        (n.round() as usize).clamp(min, MAX_WINDOW)
    } else {
        min
    }
}

/// Builds a Value that reads `n` at each offset and hands the series, the
/// offset and the window length to `agg`.
fn windowed(args: &[Value], min: usize, agg: fn(&Value, usize, usize) -> f64) -> Value {
    let (x, n) = (args[0].clone(), args[1].clone());
    Value::from_fn(move |t| agg(&x, t, window_len(n.at(t), min)))
}

/// Samples of the window, newest first. `None` once a non-finite sample is hit.
fn samples(x: &Value, t: usize, k: usize) -> impl Iterator<Item = Option<f64>> + '_ {
    (0..k).map(move |i| {
        let v = x.at(t.saturating_add(i));
        v.is_finite().then_some(v)
    })
}

fn lag(args: &[Value]) -> Value {
    let (x, n) = (args[0].clone(), args[1].clone());
    Value::from_fn(move |t| x.at(t.saturating_add(window_len(n.at(t), 0))))
}

fn diff(args: &[Value]) -> Value {
    let (x, n) = (args[0].clone(), args[1].clone());
    Value::from_fn(move |t| {
        let k = window_len(n.at(t), 0);
        x.at(t) - x.at(t.saturating_add(k))
    })
}

fn sum(x: &Value, t: usize, k: usize) -> f64 {
    samples(x, t, k)
        .try_fold(0.0, |acc, v| v.map(|v| acc + v))
        .unwrap_or(f64::NAN)
}

fn mean(x: &Value, t: usize, k: usize) -> f64 {
    sum(x, t, k) / k as f64
}

/// Running mean and sum of squared deviations over the window.
struct Welford {
    count: usize,
    mean: f64,
    m2: f64,
}

impl Welford {
    fn over(x: &Value, t: usize, k: usize) -> Option<Self> {
        let mut w = Welford {
            count: 0,
            mean: 0.0,
            m2: 0.0,
        };
        for v in samples(x, t, k) {
            let v = v?;
            w.count += 1;
            let delta = v - w.mean;
            w.mean += delta / w.count as f64;
            w.m2 += delta * (v - w.mean);
        }
        Some(w)
    }

    fn population_sd(&self) -> f64 {
        if self.count == 0 {
            return f64::NAN;
        }
        (self.m2 / self.count as f64).sqrt()
    }
}

fn stdev(x: &Value, t: usize, k: usize) -> f64 {
    Welford::over(x, t, k).map_or(f64::NAN, |w| w.population_sd())
}

fn zscore(x: &Value, t: usize, k: usize) -> f64 {
    let current = x.at(t);
    let Some(w) = Welford::over(x, t, k) else {
        return f64::NAN;
    };
    let sd = w.population_sd();
    if sd == 0.0 { 0.0 } else { (current - w.mean) / sd }
}

fn rolling_min(x: &Value, t: usize, k: usize) -> f64 {
    samples(x, t, k)
        .try_fold(f64::INFINITY, |acc, v| v.map(|v| acc.min(v)))
        .unwrap_or(f64::NAN)
}

fn rolling_max(x: &Value, t: usize, k: usize) -> f64 {
    samples(x, t, k)
        .try_fold(f64::NEG_INFINITY, |acc, v| v.map(|v| acc.max(v)))
        .unwrap_or(f64::NAN)
}

/// Seeded with the oldest sample of the window, folded toward the newest.
fn ema(x: &Value, t: usize, k: usize) -> f64 {
    let alpha = 2.0 / (k as f64 + 1.0);
    let seed = x.at(t.saturating_add(k - 1));
    if !seed.is_finite() {
        return f64::NAN;
    }
    let mut acc = seed;
    for i in (0..k - 1).rev() {
        let v = x.at(t.saturating_add(i));
        if !v.is_finite() {
            return f64::NAN;
        }
        acc = alpha * v + (1.0 - alpha) * acc;
    }
    acc
}

fn returns(args: &[Value]) -> Value {
    let x = args[0].clone();
    Value::from_fn(move |t| {
        let prev = x.at(t.saturating_add(1));
        if prev == 0.0 { 0.0 } else { (x.at(t) - prev) / prev }
    })
}

fn log_returns(args: &[Value]) -> Value {
    let x = args[0].clone();
    Value::from_fn(move |t| {
        let prev = x.at(t.saturating_add(1));
        if prev == 0.0 { 0.0 } else { (x.at(t) / prev).ln() }
    })
}
