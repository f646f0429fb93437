use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::PurifyError;

/// Operating mode selected by the operator
///
/// The mode scales how much energy a liter of purified water costs and how
/// aggressively the filter removes contaminants.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum OperatingMode {
    Eco,
    #[default]
    Standard,
    HighPerformance,
}

/// Per-mode scaling factors
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModeMultipliers {
    /// Divides the energy required per liter (higher = more efficient)
    pub energy: f64,
    /// Scales the kinetic removal exponent (higher = more aggressive)
    pub removal: f64,
}

/// Indexed by `OperatingMode as usize`.
const MODE_TABLE: [ModeMultipliers; 3] = [
    ModeMultipliers { energy: 0.8, removal: 0.9 },
    ModeMultipliers { energy: 1.0, removal: 1.0 },
    ModeMultipliers { energy: 1.3, removal: 1.05 },
];

impl OperatingMode {
    pub fn multipliers(self) -> ModeMultipliers {
        MODE_TABLE[self as usize]
    }
}

/// Raw water feeding the purifier
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WaterSource {
    Seawater,
    #[default]
    Contaminated,
    /// Atmospheric water harvesting
    Air,
}

impl WaterSource {
    /// Liquid feeds go through the contaminant kinetics and safety check.
    pub fn is_liquid(self) -> bool {
        matches!(self, WaterSource::Seawater | WaterSource::Contaminated)
    }

    /// Extra energy cost for desalination.
    pub fn energy_factor(self) -> f64 {
        match self {
            WaterSource::Seawater => 1.5,
            _ => 1.0,
        }
    }
}

impl std::str::FromStr for WaterSource {
    type Err = PurifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "seawater" => Ok(WaterSource::Seawater),
            "contaminated" => Ok(WaterSource::Contaminated),
            "air" => Ok(WaterSource::Air),
            _ => Err(PurifyError::InvalidSource(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    #[rstest]
    #[case(OperatingMode::Eco, 0.8, 0.9)]
    #[case(OperatingMode::Standard, 1.0, 1.0)]
    #[case(OperatingMode::HighPerformance, 1.3, 1.05)]
    fn test_mode_multipliers(#[case] mode: OperatingMode, #[case] energy: f64, #[case] removal: f64) {
        let m = mode.multipliers();
        assert_eq!(m.energy, energy);
        assert_eq!(m.removal, removal);
    }

    #[test]
    fn test_mode_parse_and_display() {
        assert_eq!("high_performance".parse::<OperatingMode>().unwrap(), OperatingMode::HighPerformance);
        assert_eq!("ECO".parse::<OperatingMode>().unwrap(), OperatingMode::Eco);
        assert!("turbo".parse::<OperatingMode>().is_err());
        for mode in OperatingMode::iter() {
            assert_eq!(mode.to_string().parse::<OperatingMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_unknown_source_is_invalid() {
        let err = "river".parse::<WaterSource>().unwrap_err();
        assert!(matches!(err, PurifyError::InvalidSource(ref s) if s == "river"));
        assert_eq!("Seawater".parse::<WaterSource>().unwrap(), WaterSource::Seawater);
    }

    #[test]
    fn test_source_properties() {
        assert!(WaterSource::Seawater.is_liquid());
        assert!(WaterSource::Contaminated.is_liquid());
        assert!(!WaterSource::Air.is_liquid());
        assert_eq!(WaterSource::Seawater.energy_factor(), 1.5);
        assert_eq!(WaterSource::Contaminated.energy_factor(), 1.0);
        assert_eq!(WaterSource::default(), WaterSource::Contaminated);
    }
}
