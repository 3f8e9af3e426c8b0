//! Sampling frequency and annualised metrics.

use crate::domain::backtest::BacktestMetrics;
use chrono::TimeDelta;
use std::fmt;
use std::str::FromStr;

const SECONDS_PER_YEAR: f64 = 365.25 * 24.0 * 60.0 * 60.0;
const MONTHS_PER_YEAR: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrequencyUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
}

impl FrequencyUnit {
    fn suffix(self) -> &'static str {
        match self {
            FrequencyUnit::Seconds => "s",
            FrequencyUnit::Minutes => "m",
            FrequencyUnit::Hours => "h",
            FrequencyUnit::Days => "d",
            FrequencyUnit::Weeks => "w",
            FrequencyUnit::Months => "mo",
        }
    }

    /// Length of one unit in seconds, a mean month for `Months`.
    fn seconds(self) -> f64 {
        match self {
            FrequencyUnit::Seconds => 1.0,
            FrequencyUnit::Minutes => 60.0,
            FrequencyUnit::Hours => 3_600.0,
            FrequencyUnit::Days => 86_400.0,
            FrequencyUnit::Weeks => 604_800.0,
            FrequencyUnit::Months => SECONDS_PER_YEAR / MONTHS_PER_YEAR,
        }
    }
}

/// Sampling period of an input series, written `<amount><unit>`, e.g. `15m`,
/// `1d`, `3mo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frequency {
    pub amount: u32,
    pub unit: FrequencyUnit,
}

impl Frequency {
    pub const DAILY: Frequency = Frequency {
        amount: 1,
        unit: FrequencyUnit::Days,
    };

    /// Fixed-length period. Months have no fixed length and return `None`.
    pub fn period(&self) -> Option<TimeDelta> {
        let n = i64::from(self.amount);
        match self.unit {
            FrequencyUnit::Seconds => TimeDelta::try_seconds(n),
            FrequencyUnit::Minutes => TimeDelta::try_minutes(n),
            FrequencyUnit::Hours => TimeDelta::try_hours(n),
            FrequencyUnit::Days => TimeDelta::try_days(n),
            FrequencyUnit::Weeks => TimeDelta::try_weeks(n),
            FrequencyUnit::Months => None,
        }
    }

    /// Samples per year: 365.25 days for fixed units, twelve months otherwise.
    pub fn periods_per_year(&self) -> f64 {
        let amount = f64::from(self.amount);
        match self.unit {
            FrequencyUnit::Months => MONTHS_PER_YEAR / amount,
            unit => SECONDS_PER_YEAR / (amount * unit.seconds()),
        }
    }
}

impl Default for Frequency {
    fn default() -> Self {
        Self::DAILY
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.unit.suffix())
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let (digits, suffix) = s.split_at(split);
        if digits.is_empty() {
            return Err(format!("'{s}' must start with a number"));
        }
        let amount: u32 = digits
            .parse()
            .map_err(|e| format!("'{s}' has an invalid amount: {e}"))?;
        if amount == 0 {
            return Err(format!("'{s}' must have an amount above zero"));
        }
        let unit = match suffix {
            "s" => FrequencyUnit::Seconds,
            "m" => FrequencyUnit::Minutes,
            "h" => FrequencyUnit::Hours,
            "d" => FrequencyUnit::Days,
            "w" => FrequencyUnit::Weeks,
            "mo" => FrequencyUnit::Months,
            other => return Err(format!("'{s}' has unknown unit '{other}' (use s, m, h, d, w, mo)")),
        };
        Ok(Frequency { amount, unit })
    }
}

/// Compound a total return over `periods` samples to a yearly rate.
///
/// `None` for a non-finite return or zero periods. Terminal wealth at or
/// below zero reports -1.
pub fn annualize_return(total_return: f64, periods: usize, frequency: Frequency) -> Option<f64> {
    if !total_return.is_finite() || periods == 0 {
        return None;
    }
    if 1.0 + total_return <= 0.0 {
        return Some(-1.0);
    }
    let exponent = frequency.periods_per_year() / periods as f64;
    Some((1.0 + total_return).powf(exponent) - 1.0)
}

/// Scale a per-sample Sharpe ratio to a yearly one.
pub fn annualize_sharpe(sharpe: Option<f64>, frequency: Frequency) -> Option<f64> {
    sharpe
        .filter(|s| s.is_finite())
        .map(|s| s * frequency.periods_per_year().sqrt())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnualizedMetrics {
    pub annualized_return: Option<f64>,
    pub annualized_sharpe: Option<f64>,
}

impl AnnualizedMetrics {
    /// `periods` is the number of return steps, one less than the sample count.
    pub fn compute(metrics: &BacktestMetrics, periods: usize, frequency: Frequency) -> Self {
        Self {
            annualized_return: annualize_return(metrics.total_return, periods, frequency),
            annualized_sharpe: annualize_sharpe(metrics.sharpe, frequency),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn freq(s: &str) -> Frequency {
        s.parse().unwrap()
    }

    #[test]
    fn parse_units() {
        assert_eq!(freq("15m"), Frequency { amount: 15, unit: FrequencyUnit::Minutes });
        assert_eq!(freq("1d"), Frequency::DAILY);
        assert_eq!(freq("3mo").unit, FrequencyUnit::Months);
        assert_eq!(freq("2w").to_string(), "2w");
    }

    #[test]
    fn parse_rejects_bad_input() {
        for bad in ["", "d", "0d", "1y", "1 d", "-1d", "1.5h", "1D"] {
            assert!(bad.parse::<Frequency>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn periods_per_year() {
        assert!((freq("1d").periods_per_year() - 365.25).abs() < 1e-9);
        assert!((freq("1w").periods_per_year() - 365.25 / 7.0).abs() < 1e-9);
        assert!((freq("1h").periods_per_year() - 365.25 * 24.0).abs() < 1e-9);
        assert!((freq("1mo").periods_per_year() - 12.0).abs() < 1e-9);
        assert!((freq("3mo").periods_per_year() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn largest_amounts_keep_their_unit() {
        let max = f64::from(u32::MAX);
        for (unit, seconds) in [("s", 1.0), ("m", 60.0), ("h", 3_600.0), ("d", 86_400.0), ("w", 604_800.0)] {
            let f = freq(&format!("{}{unit}", u32::MAX));
            assert!(f.period().is_some(), "{f} has no period");
            let expected = SECONDS_PER_YEAR / (max * seconds);
            assert!((f.periods_per_year() - expected).abs() <= expected * 1e-12, "{f}");
        }
        let weeks = freq("20000000w");
        assert!((weeks.periods_per_year() - 365.25 / (7.0 * 20_000_000.0)).abs() < 1e-15);
    }

    #[test]
    fn period_lengths() {
        assert_eq!(freq("90s").period(), TimeDelta::try_seconds(90));
        assert_eq!(freq("2h").period(), TimeDelta::try_hours(2));
        assert_eq!(freq("1mo").period(), None);
    }

    #[test]
    fn annualize_one_year_of_daily_returns() {
        // 365.25 periods of daily data span one year, so the rate is unchanged.
        let r = annualize_return(0.1, 365, Frequency::DAILY).unwrap();
        assert!((r - (1.1f64.powf(365.25 / 365.0) - 1.0)).abs() < 1e-12);
        let monthly = annualize_return(0.1, 12, freq("1mo")).unwrap();
        assert!((monthly - 0.1).abs() < 1e-12);
    }

    #[test]
    fn annualize_edge_cases() {
        assert_eq!(annualize_return(f64::NAN, 10, Frequency::DAILY), None);
        assert_eq!(annualize_return(0.1, 0, Frequency::DAILY), None);
        assert_eq!(annualize_return(-1.0, 10, Frequency::DAILY), Some(-1.0));
        assert_eq!(annualize_return(-2.0, 10, Frequency::DAILY), Some(-1.0));
    }

    #[test]
    fn annualize_sharpe_scales_by_sqrt() {
        let s = annualize_sharpe(Some(0.1), freq("1mo")).unwrap();
        assert!((s - 0.1 * 12f64.sqrt()).abs() < 1e-12);
        assert_eq!(annualize_sharpe(None, Frequency::DAILY), None);
        assert_eq!(annualize_sharpe(Some(f64::INFINITY), Frequency::DAILY), None);
    }

    #[test]
    fn compute_from_backtest_metrics() {
        let m = BacktestMetrics {
            total_return: 0.0,
            max_drawdown: 0.0,
            volatility: 0.0,
            sharpe: None,
        };
        let a = AnnualizedMetrics::compute(&m, 99, Frequency::DAILY);
        assert_eq!(a.annualized_return, Some(0.0));
        assert_eq!(a.annualized_sharpe, None);
    }
}
