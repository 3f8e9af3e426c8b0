//! Equity curve report as CSV.
//!
//! Columns: `index,price,position,equity`, one row per sample, oldest first.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::TradelangError;
use crate::domain::input::InputSeries;
use crate::ports::report_port::ReportPort;
use std::path::Path;
use tracing::info;

#[derive(Debug, Default, Clone, Copy)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

fn report_err(e: impl std::fmt::Display) -> TradelangError {
    TradelangError::Report {
        reason: e.to_string(),
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        input: &InputSeries,
        output_path: &Path,
    ) -> Result<(), TradelangError> {
        let rows = result.equity.len();
        if input.len() != rows || result.positions.len() != rows {
            return Err(report_err(format!(
                "length mismatch: {} prices, {} positions, {} equity points",
                input.len(),
                result.positions.len(),
                rows
            )));
        }

        let mut writer = csv::Writer::from_path(output_path).map_err(report_err)?;
        writer
            .write_record(["index", "price", "position", "equity"])
            .map_err(report_err)?;
        for i in 0..rows {
            writer
                .write_record([
                    i.to_string(),
                    input.price[i].to_string(),
                    result.positions[i].to_string(),
                    result.equity[i].to_string(),
                ])
                .map_err(report_err)?;
        }
        writer.flush()?;

        info!(path = %output_path.display(), rows, "report written");
        Ok(())
    }
}
