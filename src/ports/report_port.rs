//! Report output port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::TradelangError;
use crate::domain::input::InputSeries;
use std::path::Path;

/// Port for writing a backtest's per-sample results.
pub trait ReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        input: &InputSeries,
        output_path: &Path,
    ) -> Result<(), TradelangError>;
}
