//! Run configuration validation.
//!
//! Reads every key a `run` needs, applies defaults, and rejects bad values
//! before any data is fetched.

use crate::domain::error::TradelangError;
use crate::domain::metrics::Frequency;
use crate::ports::config_port::ConfigPort;
use std::path::PathBuf;

pub const DEFAULT_LIMIT: usize = 500;
pub const MIN_LIMIT: usize = 2;
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Synthetic,
    Csv { data_dir: PathBuf },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub source: InputSource,
    pub instrument: String,
    pub limit: usize,
    pub frequency: Frequency,
    pub cost_rate: f64,
    pub log_level: String,
}

pub fn validate_run_config(config: &dyn ConfigPort) -> Result<RunConfig, TradelangError> {
    Ok(RunConfig {
        source: validate_source(config)?,
        instrument: validate_instrument(config)?,
        limit: validate_limit(config)?,
        frequency: validate_frequency(config)?,
        cost_rate: validate_cost_rate(config)?,
        log_level: log_level(config),
    })
}

/// `[logging] level`, or the default filter.
pub fn log_level(config: &dyn ConfigPort) -> String {
    non_empty(config.get_string("logging", "level"))
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> TradelangError {
    TradelangError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn missing(section: &str, key: &str) -> TradelangError {
    TradelangError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn validate_source(config: &dyn ConfigPort) -> Result<InputSource, TradelangError> {
    let source = non_empty(config.get_string("input", "source"))
        .unwrap_or_else(|| "synthetic".to_string());
    match source.to_lowercase().as_str() {
        "synthetic" => Ok(InputSource::Synthetic),
        "csv" => match non_empty(config.get_string("input", "data_dir")) {
            Some(dir) => Ok(InputSource::Csv {
                data_dir: PathBuf::from(dir),
            }),
            None => Err(missing("input", "data_dir")),
        },
        other => Err(invalid(
            "input",
            "source",
            format!("unknown source '{other}', expected synthetic or csv"),
        )),
    }
}

fn validate_instrument(config: &dyn ConfigPort) -> Result<String, TradelangError> {
    non_empty(config.get_string("input", "instrument")).ok_or_else(|| missing("input", "instrument"))
}

fn validate_limit(config: &dyn ConfigPort) -> Result<usize, TradelangError> {
    let value = config
        .get_int("input", "limit")
        .map_err(|e| invalid("input", "limit", e))?;
    match value {
        None => Ok(DEFAULT_LIMIT),
        Some(n) if n >= MIN_LIMIT as i64 => usize::try_from(n)
            .map_err(|_| invalid("input", "limit", "limit is too large")),
        Some(_) => Err(invalid(
            "input",
            "limit",
            format!("limit must be at least {MIN_LIMIT}"),
        )),
    }
}

fn validate_frequency(config: &dyn ConfigPort) -> Result<Frequency, TradelangError> {
    match non_empty(config.get_string("input", "frequency")) {
        None => Ok(Frequency::default()),
        Some(s) => s.parse().map_err(|e: String| invalid("input", "frequency", e)),
    }
}

fn validate_cost_rate(config: &dyn ConfigPort) -> Result<f64, TradelangError> {
    let value = config
        .get_double("backtest", "cost_rate")
        .map_err(|e| invalid("backtest", "cost_rate", e))?
        .unwrap_or(0.0);
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(
            "backtest",
            "cost_rate",
            "cost_rate must be a non-negative number",
        ));
    }
    Ok(value)
}
