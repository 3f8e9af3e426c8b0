//! Data access port trait.

use crate::domain::error::TradelangError;
use crate::domain::input::InputSeries;
use crate::domain::metrics::Frequency;

/// What to fetch: the most recent `limit` samples of `instrument`.
#[derive(Debug, Clone, PartialEq)]
pub struct InputRequest {
    pub instrument: String,
    pub limit: usize,
    pub frequency: Frequency,
}

pub trait DataPort {
    fn fetch_input(&self, request: &InputRequest) -> Result<InputSeries, TradelangError>;

    /// Instruments this source can serve. Empty when any id is accepted.
    fn list_instruments(&self) -> Result<Vec<String>, TradelangError> {
        Ok(Vec::new())
    }
}
