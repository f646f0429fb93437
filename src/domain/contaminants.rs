//! Contaminant catalogue and per-contaminant treatment parameters.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Contaminant name -> concentration (source-specific units)
pub type ContaminantLevels = BTreeMap<String, f64>;

pub const SALT: &str = "salt";
pub const BACTERIA: &str = "bacteria";
pub const HEAVY_METALS: &str = "heavy_metals";
pub const DEBRIS: &str = "debris";
pub const INSECTS: &str = "insects";

/// Reaction rate applied to contaminants missing from the catalogue
pub const DEFAULT_REACTION_RATE: f64 = 0.1;

/// Treatment parameters for one contaminant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContaminantProfile {
    /// First-order removal rate constant (1/h)
    pub reaction_rate: f64,
    /// Nominal removal efficiency of a fresh filter (0-1)
    pub removal_efficiency: f64,
    /// Maximum concentration allowed in output water
    pub safety_threshold: f64,
}

impl ContaminantProfile {
    pub const fn new(reaction_rate: f64, removal_efficiency: f64, safety_threshold: f64) -> Self {
        Self {
            reaction_rate,
            removal_efficiency,
            safety_threshold,
        }
    }
}

/// The five contaminants the device is rated for.
pub fn default_profiles() -> BTreeMap<String, ContaminantProfile> {
    [
        (SALT, ContaminantProfile::new(0.1, 0.99, 0.5)),
        (BACTERIA, ContaminantProfile::new(0.3, 0.9999, 1.0)),
        (HEAVY_METALS, ContaminantProfile::new(0.15, 0.98, 0.01)),
        (DEBRIS, ContaminantProfile::new(0.5, 0.999, 0.1)),
        // Any insect matter in output water is unsafe
        (INSECTS, ContaminantProfile::new(1.0, 1.0, 0.0)),
    ]
    .into_iter()
    .map(|(name, profile)| (name.to_string(), profile))
    .collect()
}

/// Convenience constructor for contaminant maps.
pub fn levels<'a, I>(pairs: I) -> ContaminantLevels
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalogue() {
        let profiles = default_profiles();
        assert_eq!(profiles.len(), 5);
        assert_eq!(profiles[INSECTS].safety_threshold, 0.0);
        assert!(profiles.values().all(|p| p.reaction_rate > 0.0));
        assert!(profiles
            .values()
            .all(|p| (0.0..=1.0).contains(&p.removal_efficiency)));
    }

    #[test]
    fn test_levels_helper() {
        let l = levels([(SALT, 35.0), (DEBRIS, 1.0)]);
        assert_eq!(l.len(), 2);
        assert_eq!(l[SALT], 35.0);
    }
}
