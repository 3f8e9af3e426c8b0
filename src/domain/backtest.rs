//! Backtest engine.
//!
//! A program's output Value is read as a target position in [-1, 1] at every
//! sample. The position held over a step is the one chosen at the previous
//! sample; changing position costs `cost_rate` per unit of turnover.

use crate::domain::input::InputSeries;
use crate::domain::value::Value;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BacktestMetrics {
    /// Final equity minus one.
    pub total_return: f64,
    /// Most negative `equity / peak - 1`; zero or below.
    pub max_drawdown: f64,
    /// Population standard deviation of step returns.
    pub volatility: f64,
    /// Mean step return over volatility, per step. `None` when volatility is 0.
    pub sharpe: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    /// Equity per sample, oldest first, starting at 1.
    pub equity: Vec<f64>,
    /// Clamped position per sample, oldest first.
    pub positions: Vec<f64>,
    pub metrics: BacktestMetrics,
}

/// Clamp to [-1, 1]; non-finite positions are flat.
fn clamp_position(x: f64) -> f64 {
    if x.is_finite() { x.clamp(-1.0, 1.0) } else { 0.0 }
}

/// Running mean and M2 of step returns.
#[derive(Default)]
struct Welford {
    count: usize,
    mean: f64,
    m2: f64,
}

impl Welford {
    fn push(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
    }

    fn population_sd(&self) -> f64 {
        if self.count > 1 {
            (self.m2 / self.count as f64).sqrt()
        } else {
            0.0
        }
    }
}

pub fn run_backtest(input: &InputSeries, output: &Value, cost_rate: f64) -> BacktestResult {
    let price = &input.price;
    let n = price.len();
    let positions: Vec<f64> = output.materialize(n).into_iter().map(clamp_position).collect();
    let cost_rate = if cost_rate.is_finite() {
        cost_rate.max(0.0)
    } else {
        0.0
    };

    let mut equity_curve = Vec::with_capacity(n);
    if n == 0 {
        return BacktestResult {
            equity: equity_curve,
            positions,
            metrics: BacktestMetrics {
                total_return: 0.0,
                max_drawdown: 0.0,
                volatility: 0.0,
                sharpe: None,
            },
        };
    }

    let mut equity = 1.0;
    let mut peak = 1.0;
    let mut max_drawdown = 0.0_f64;
    let mut stats = Welford::default();
    equity_curve.push(equity);

    for i in 1..n {
        let held = positions[i - 1];
        let price_return = (price[i] - price[i - 1]) / price[i - 1];
        let price_return = if price_return.is_finite() {
            price_return
        } else {
            0.0
        };
        let turnover = (positions[i] - held).abs();
        let step = held * price_return - cost_rate * turnover;

        equity *= 1.0 + step;
        equity_curve.push(equity);
        stats.push(step);

        if equity > peak {
            peak = equity;
        }
        let drawdown = equity / peak - 1.0;
        if drawdown < max_drawdown {
            max_drawdown = drawdown;
        }
    }

    let volatility = stats.population_sd();
    let metrics = BacktestMetrics {
        total_return: equity - 1.0,
        max_drawdown,
        volatility,
        sharpe: (volatility > 0.0).then(|| stats.mean / volatility),
    };
    debug!(
        samples = n,
        total_return = metrics.total_return,
        max_drawdown = metrics.max_drawdown,
        volatility = metrics.volatility,
        "backtest complete"
    );

    BacktestResult {
        equity: equity_curve,
        positions,
        metrics,
    }
}
