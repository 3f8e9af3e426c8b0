//! CSV file data adapter.
//!
//! Each instrument lives in `<base_path>/<instrument>.csv` with the header
//! `date,open,high,low,close,volume` and ISO dates.

use crate::domain::error::TradelangError;
use crate::domain::input::{Bar, InputSeries};
use crate::ports::data_port::{DataPort, InputRequest};
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, instrument: &str) -> PathBuf {
        self.base_path.join(format!("{instrument}.csv"))
    }

    fn read_bars(&self, instrument: &str) -> Result<Vec<Bar>, TradelangError> {
        let path = self.csv_path(instrument);
        let content = fs::read_to_string(&path).map_err(|e| TradelangError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for (row, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| TradelangError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;
            let line = row + 2;

            let date_str = field(&record, 0, "date", line)?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                TradelangError::Data {
                    reason: format!("line {line}: invalid date '{date_str}': {e}"),
                }
            })?;

            bars.push(Bar {
                date,
                open: number(&record, 1, "open", line)?,
                high: number(&record, 2, "high", line)?,
                low: number(&record, 3, "low", line)?,
                close: number(&record, 4, "close", line)?,
                volume: number(&record, 5, "volume", line)?,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

fn field<'r>(
    record: &'r csv::StringRecord,
    index: usize,
    name: &str,
    line: usize,
) -> Result<&'r str, TradelangError> {
    record
        .get(index)
        .map(str::trim)
        .ok_or_else(|| TradelangError::Data {
            reason: format!("line {line}: missing {name} column"),
        })
}

fn number(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    line: usize,
) -> Result<f64, TradelangError> {
    let raw = field(record, index, name, line)?;
    raw.parse().map_err(|e| TradelangError::Data {
        reason: format!("line {line}: invalid {name} value '{raw}': {e}"),
    })
}

impl DataPort for CsvAdapter {
    fn fetch_input(&self, request: &InputRequest) -> Result<InputSeries, TradelangError> {
        let bars = self.read_bars(&request.instrument)?;
        let skip = bars.len().saturating_sub(request.limit);
        if bars.len() < request.limit {
            warn!(
                instrument = %request.instrument,
                available = bars.len(),
                requested = request.limit,
                "fewer samples than requested"
            );
        }
        debug!(instrument = %request.instrument, samples = bars.len() - skip, "csv input loaded");
        Ok(InputSeries::from_bars(&bars[skip..]))
    }

    fn list_instruments(&self) -> Result<Vec<String>, TradelangError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| TradelangError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut instruments = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| TradelangError::Data {
                reason: format!("directory entry error: {}", e),
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "csv") {
                if let Some(stem) = path.file_stem() {
                    instruments.push(stem.to_string_lossy().into_owned());
                }
            }
        }

        instruments.sort();
        Ok(instruments)
    }
}
