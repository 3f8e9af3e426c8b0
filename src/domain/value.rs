//! Lazy numeric values.
//!
//! A [`Value`] is a total function from a sample offset to a number. Offset 0
//! is the latest sample and larger offsets reach further into the past. Reads
//! that fall outside the available history return NaN instead of failing.

use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub struct Value(Arc<dyn Fn(usize) -> f64 + Send + Sync>);

impl Value {
    pub fn from_fn(f: impl Fn(usize) -> f64 + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn constant(x: f64) -> Self {
        Self::from_fn(move |_| x)
    }

    /// View of an oldest-first series: offset `t` reads element `len - 1 - t`.
    pub fn from_series(series: Arc<[f64]>) -> Self {
        Self::from_fn(move |t| {
            let len = series.len();
            if t < len { series[len - 1 - t] } else { f64::NAN }
        })
    }

    #[inline]
    pub fn at(&self, t: usize) -> f64 {
        (self.0)(t)
    }

    /// Pointwise unary map.
    pub fn map(&self, f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        let x = self.clone();
        Self::from_fn(move |t| f(x.at(t)))
    }

    /// Pointwise combination of two values.
    pub fn zip_with(&self, other: &Value, f: impl Fn(f64, f64) -> f64 + Send + Sync + 'static) -> Self {
        let (a, b) = (self.clone(), other.clone());
        Self::from_fn(move |t| f(a.at(t), b.at(t)))
    }

    /// Evaluate over the last `len` samples, oldest first.
    pub fn materialize(&self, len: usize) -> Vec<f64> {
        (0..len).map(|i| self.at(len - 1 - i)).collect()
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Value").field(&self.at(0)).finish()
    }
}
