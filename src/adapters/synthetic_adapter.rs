//! Deterministic synthetic market.
//!
//! The same instrument id always yields the same series: the id is hashed
//! with 32-bit FNV-1a and the hash seeds a 32-bit linear congruential
//! generator that drives a small random walk.

use crate::domain::error::TradelangError;
use crate::domain::input::InputSeries;
use crate::ports::data_port::{DataPort, InputRequest};
use tracing::debug;

const FNV_OFFSET: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;
const LCG_MULTIPLIER: u32 = 1_664_525;
const LCG_INCREMENT: u32 = 1_013_904_223;

const START_CLOSE: f64 = 100.0;
const MIN_CLOSE: f64 = 0.1;
const MAX_DRIFT: f64 = 0.01;
const MAX_SWING: f64 = 0.02;
const BASE_VOLUME: f64 = 800.0;
const VOLUME_RANGE: f64 = 600.0;

/// FNV-1a over the UTF-16 code units of `id`.
fn hash_seed(id: &str) -> u32 {
    id.encode_utf16().fold(FNV_OFFSET, |hash, unit| {
        (hash ^ u32::from(unit)).wrapping_mul(FNV_PRIME)
    })
}

struct Lcg {
    state: u32,
}

impl Lcg {
    fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Uniform in [0, 1).
    fn next_f64(&mut self) -> f64 {
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        f64::from(self.state) / 4_294_967_296.0
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SyntheticAdapter;

impl SyntheticAdapter {
    pub fn new() -> Self {
        Self
    }

    pub fn simulate(instrument: &str, limit: usize) -> InputSeries {
        let mut rand = Lcg::new(hash_seed(instrument));
        let mut price = Vec::with_capacity(limit);
        let mut open = Vec::with_capacity(limit);
        let mut close = Vec::with_capacity(limit);
        let mut high = Vec::with_capacity(limit);
        let mut low = Vec::with_capacity(limit);
        let mut volume = Vec::with_capacity(limit);

        let mut last_close = START_CLOSE;
        for _ in 0..limit {
            let drift = (rand.next_f64() - 0.5) * MAX_DRIFT;
            let next_close = (last_close * (1.0 + drift)).max(MIN_CLOSE);
            let next_open = last_close;
            let swing = ((rand.next_f64() - 0.5) * MAX_SWING).abs();
            let next_high = next_open.max(next_close) * (1.0 + swing);
            let next_low = next_open.min(next_close) * (1.0 - swing);
            let next_volume = BASE_VOLUME + rand.next_f64() * VOLUME_RANGE;

            price.push((next_high + next_low + next_close) / 3.0);
            open.push(next_open);
            close.push(next_close);
            high.push(next_high);
            low.push(next_low);
            volume.push(next_volume);

            last_close = next_close;
        }

        InputSeries {
            price: price.into(),
            volume: volume.into(),
            open: open.into(),
            close: close.into(),
            high: high.into(),
            low: low.into(),
        }
    }
}

impl DataPort for SyntheticAdapter {
    fn fetch_input(&self, request: &InputRequest) -> Result<InputSeries, TradelangError> {
        let series = Self::simulate(&request.instrument, request.limit);
        debug!(instrument = %request.instrument, samples = series.len(), "synthetic input generated");
        Ok(series)
    }
}
