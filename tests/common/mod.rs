#![allow(dead_code)]

use std::cell::Cell;
use std::collections::HashMap;
use tradelang::domain::config_validation::{InputSource, RunConfig};
use tradelang::domain::error::TradelangError;
use tradelang::domain::input::InputSeries;
use tradelang::domain::metrics::Frequency;
use tradelang::ports::data_port::{DataPort, InputRequest};

pub struct MockDataPort {
    pub data: HashMap<String, InputSeries>,
    pub errors: HashMap<String, String>,
    pub fetches: Cell<usize>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            fetches: Cell::new(0),
        }
    }

    pub fn with_prices(mut self, instrument: &str, prices: &[f64]) -> Self {
        self.data.insert(instrument.to_string(), series(prices));
        self
    }

    pub fn with_error(mut self, instrument: &str, reason: &str) -> Self {
        self.errors
            .insert(instrument.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_input(&self, request: &InputRequest) -> Result<InputSeries, TradelangError> {
        self.fetches.set(self.fetches.get() + 1);
        if let Some(reason) = self.errors.get(&request.instrument) {
            return Err(TradelangError::Data {
                reason: reason.clone(),
            });
        }
        self.data
            .get(&request.instrument)
            .cloned()
            .ok_or_else(|| TradelangError::Data {
                reason: format!("unknown instrument {}", request.instrument),
            })
    }

    fn list_instruments(&self) -> Result<Vec<String>, TradelangError> {
        let mut names: Vec<String> = self.data.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

/// Series whose every field equals `prices`.
pub fn series(prices: &[f64]) -> InputSeries {
    let p = prices.to_vec();
    InputSeries::new(p.clone(), p.clone(), p.clone(), p.clone(), p.clone(), p)
        .expect("equal lengths")
}

/// Geometric walk: each step multiplies the price by `1 + step`.
pub fn trending(start: f64, step: f64, len: usize) -> Vec<f64> {
    std::iter::successors(Some(start), |p| Some(p * (1.0 + step)))
        .take(len)
        .collect()
}

pub fn make_run_config(instrument: &str) -> RunConfig {
    RunConfig {
        source: InputSource::Synthetic,
        instrument: instrument.to_string(),
        limit: 500,
        frequency: Frequency::DAILY,
        cost_rate: 0.0,
        log_level: "info".to_string(),
    }
}
