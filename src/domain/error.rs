use thiserror::Error;

use super::{ContaminantLevels, WaterSource};

/// Purification failures
///
/// Every variant is raised before any state is mutated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PurifyError {
    #[error("Insufficient battery: {level_wh:.2}Wh is below the {min_wh:.2}Wh operating floor")]
    InsufficientBattery { level_wh: f64, min_wh: f64 },
    #[error("Invalid water source: {0}")]
    InvalidSource(String),
    #[error("Input contaminants required for {water_source} source")]
    MissingInputContaminants { water_source: WaterSource },
    #[error("Contaminants exceed safety thresholds: {output:?}")]
    ContaminantsExceedSafetyThresholds { output: ContaminantLevels },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl PurifyError {
    /// Output map of a failed safety check, if that is what this is.
    pub fn unsafe_output(&self) -> Option<&ContaminantLevels> {
        match self {
            PurifyError::ContaminantsExceedSafetyThresholds { output } => Some(output),
            _ => None,
        }
    }
}
