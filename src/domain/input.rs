//! Market input series and their Value views.

use crate::domain::builtins::INPUT_FIELDS;
use crate::domain::error::TradelangError;
use crate::domain::value::Value;
use chrono::NaiveDate;
use std::sync::Arc;

/// One dated OHLCV sample as read from a data source.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

/// Six equal-length arrays, oldest sample first.
#[derive(Debug, Clone, PartialEq)]
pub struct InputSeries {
    pub price: Arc<[f64]>,
    pub volume: Arc<[f64]>,
    pub open: Arc<[f64]>,
    pub close: Arc<[f64]>,
    pub high: Arc<[f64]>,
    pub low: Arc<[f64]>,
}

impl InputSeries {
    pub fn new(
        price: Vec<f64>,
        volume: Vec<f64>,
        open: Vec<f64>,
        close: Vec<f64>,
        high: Vec<f64>,
        low: Vec<f64>,
    ) -> Result<Self, TradelangError> {
        let expected = price.len();
        for (field, len) in [
            ("volume", volume.len()),
            ("open", open.len()),
            ("close", close.len()),
            ("high", high.len()),
            ("low", low.len()),
        ] {
            if len != expected {
                return Err(TradelangError::InputShape {
                    field,
                    expected,
                    actual: len,
                });
            }
        }
        Ok(Self {
            price: price.into(),
            volume: volume.into(),
            open: open.into(),
            close: close.into(),
            high: high.into(),
            low: low.into(),
        })
    }

    /// Series from bars in the given order; price is the typical price.
    pub fn from_bars(bars: &[Bar]) -> Self {
        let column = |f: fn(&Bar) -> f64| -> Arc<[f64]> { bars.iter().map(f).collect() };
        Self {
            price: column(Bar::typical_price),
            volume: column(|b| b.volume),
            open: column(|b| b.open),
            close: column(|b| b.close),
            high: column(|b| b.high),
            low: column(|b| b.low),
        }
    }

    pub fn len(&self) -> usize {
        self.price.len()
    }

    pub fn is_empty(&self) -> bool {
        self.price.is_empty()
    }

    pub fn values(&self) -> InputValues {
        InputValues::from_arrays(
            self.price.clone(),
            self.volume.clone(),
            self.open.clone(),
            self.close.clone(),
            self.high.clone(),
            self.low.clone(),
        )
    }
}

/// Lazy views over an [`InputSeries`], one per input builtin.
#[derive(Debug, Clone)]
pub struct InputValues {
    pub price: Value,
    pub volume: Value,
    pub open: Value,
    pub close: Value,
    pub high: Value,
    pub low: Value,
}

impl InputValues {
    pub fn from_arrays(
        price: Arc<[f64]>,
        volume: Arc<[f64]>,
        open: Arc<[f64]>,
        close: Arc<[f64]>,
        high: Arc<[f64]>,
        low: Arc<[f64]>,
    ) -> Self {
        Self {
            price: Value::from_series(price),
            volume: Value::from_series(volume),
            open: Value::from_series(open),
            close: Value::from_series(close),
            high: Value::from_series(high),
            low: Value::from_series(low),
        }
    }

    /// All inputs reading a constant zero.
    pub fn zeros() -> Self {
        let zero = Value::constant(0.0);
        Self {
            price: zero.clone(),
            volume: zero.clone(),
            open: zero.clone(),
            close: zero.clone(),
            high: zero.clone(),
            low: zero,
        }
    }

    /// `(builtin name, value)` pairs in registry order.
    pub fn fields(&self) -> [(&'static str, &Value); 6] {
        let [p, v, o, c, h, l] = INPUT_FIELDS;
        [
            (p, &self.price),
            (v, &self.volume),
            (o, &self.open),
            (c, &self.close),
            (h, &self.high),
            (l, &self.low),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, high: f64, low: f64, close: f64) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high,
            low,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn typical_price() {
        let b = bar(15, 110.0, 90.0, 105.0);
        let expected = (110.0 + 90.0 + 105.0) / 3.0;
        assert!((b.typical_price() - expected).abs() < f64::EPSILON);
    }

    #[test]
    fn new_rejects_unequal_lengths() {
        let err = InputSeries::new(
            vec![1.0, 2.0],
            vec![1.0, 2.0],
            vec![1.0, 2.0],
            vec![1.0, 2.0],
            vec![1.0],
            vec![1.0, 2.0],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TradelangError::InputShape {
                field: "high",
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn from_bars_uses_typical_price() {
        let series = InputSeries::from_bars(&[bar(1, 12.0, 9.0, 10.0), bar(2, 15.0, 12.0, 12.0)]);
        assert_eq!(series.len(), 2);
        assert!((series.price[1] - 13.0).abs() < f64::EPSILON);
        assert_eq!(&*series.close, &[10.0, 12.0]);
    }

    #[test]
    fn values_read_newest_first() {
        let series = InputSeries::from_bars(&[bar(1, 12.0, 9.0, 10.0), bar(2, 15.0, 12.0, 12.0)]);
        let values = series.values();
        assert_eq!(values.close.at(0), 12.0);
        assert_eq!(values.close.at(1), 10.0);
        assert!(values.close.at(2).is_nan());
    }

    #[test]
    fn fields_follow_builtin_names() {
        let names: Vec<&str> = InputValues::zeros().fields().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, INPUT_FIELDS.to_vec());
    }
}
