//! # Purification Pipeline
//!
//! Turns battery energy into drinking water from one of three sources.
//!
//! ## Liquid sources (seawater, contaminated fresh water)
//!
//! Contaminants follow first-order removal kinetics over the filter residence
//! time, scaled by filter health, water temperature and the operating mode:
//!
//! ```text
//! surviving = exp(-k * t_res * health * temp_factor * mode_removal)
//! output    = input * surviving
//! removal   = 1 - surviving
//! ```
//!
//! Output water is verified against the safety thresholds before any energy or
//! filter life is spent. Production is the smallest of the pipe velocity limit,
//! the filter rating, the energy budget above the battery floor and the filter
//! life remaining.
//!
//! ## Air source
//!
//! Atmospheric extraction scales with relative humidity and is treated as
//! contaminant-free.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::battery::{BatteryState, REFERENCE_TEMP_C};
use crate::config::DeviceConfig;
use crate::domain::{ContaminantLevels, OperatingMode, PurifyError, WaterSource};

const GRAVITY: f64 = 9.81;
/// Filtration kinetics loss per °C above reference (unclamped)
const KINETIC_TEMP_COEFF: f64 = 0.003;
/// Extraction yield per % relative humidity (L/h)
const AIR_YIELD_PER_HUMIDITY: f64 = 0.1;
const AIR_TEMP_COEFF: f64 = 0.002;
/// Condenser energy per liter before mode scaling
const AIR_ENERGY_PER_LITER_WH: f64 = 1.0;

/// Filter wear
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    /// Cumulative liters processed; never decreases
    pub usage_liters: f64,
}

impl FilterState {
    /// Fraction of filter life remaining (0-1)
    pub fn health(&self, cfg: &DeviceConfig) -> f64 {
        (1.0 - self.usage_liters / cfg.filter_capacity_liters).max(0.0)
    }

    pub fn remaining_liters(&self, cfg: &DeviceConfig) -> f64 {
        (cfg.filter_capacity_liters - self.usage_liters).max(0.0)
    }
}

/// One purification request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurifyRequest {
    pub source: WaterSource,
    pub input_contaminants: Option<ContaminantLevels>,
    /// Relative humidity (%), air source only
    pub humidity: Option<f64>,
    pub temperature_c: f64,
}

impl PurifyRequest {
    pub fn new(source: WaterSource) -> Self {
        Self {
            source,
            input_contaminants: None,
            humidity: None,
            temperature_c: REFERENCE_TEMP_C,
        }
    }

    pub fn liquid(source: WaterSource, input_contaminants: ContaminantLevels) -> Self {
        Self::new(source).with_contaminants(input_contaminants)
    }

    pub fn air(humidity: f64) -> Self {
        Self::new(WaterSource::Air).with_humidity(humidity)
    }

    pub fn with_contaminants(mut self, input_contaminants: ContaminantLevels) -> Self {
        self.input_contaminants = Some(input_contaminants);
        self
    }

    pub fn with_humidity(mut self, humidity: f64) -> Self {
        self.humidity = Some(humidity);
        self
    }

    pub fn with_temperature(mut self, temperature_c: f64) -> Self {
        self.temperature_c = temperature_c;
        self
    }
}

/// Successful purification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurifyOutcome {
    pub water_produced_liters: f64,
    pub energy_used_wh: f64,
    pub output_contaminants: ContaminantLevels,
}

/// Filtration kinetics temperature factor; may go negative at extreme heat.
pub fn kinetic_temp_factor(temperature_c: f64) -> f64 {
    1.0 - KINETIC_TEMP_COEFF * (temperature_c - REFERENCE_TEMP_C)
}

/// Velocity-limited flow through the feed pipe.
///
/// Simplified Darcy-Weisbach form without fluid density.
pub fn pipe_flow_rate(cfg: &DeviceConfig) -> f64 {
    (2.0 * cfg.pipe_diameter_m * GRAVITY * cfg.pressure_diff_pa
        / (cfg.friction_factor * cfg.pipe_length_m))
        .sqrt()
}

/// Contaminant levels after one pass through the filter
pub fn output_contaminants(
    cfg: &DeviceConfig,
    input: &ContaminantLevels,
    filter_health: f64,
    temperature_c: f64,
    removal_multiplier: f64,
) -> ContaminantLevels {
    let exposure = cfg.residence_time_h()
        * filter_health
        * kinetic_temp_factor(temperature_c)
        * removal_multiplier;

    input
        .iter()
        .map(|(name, &level)| {
            // Surviving fraction taken directly; 1 - (1 - x) rounds small x to zero
            let surviving = (-cfg.reaction_rate(name) * exposure).exp();
            debug!(contaminant = %name, removal = 1.0 - surviving, "removal fraction");
            (name.clone(), level * surviving)
        })
        .collect()
}

/// Fail if any contaminant is above its threshold.
pub fn verify_safety(cfg: &DeviceConfig, output: &ContaminantLevels) -> Result<(), PurifyError> {
    let unsafe_water = output
        .iter()
        .any(|(name, &level)| level > cfg.safety_threshold(name));
    if unsafe_water {
        return Err(PurifyError::ContaminantsExceedSafetyThresholds {
            output: output.clone(),
        });
    }
    Ok(())
}

/// Run one purification step.
///
/// All checks run before `battery` or `filter` is touched; on error neither
/// is modified.
pub fn purify(
    cfg: &DeviceConfig,
    battery: &mut BatteryState,
    filter: &mut FilterState,
    mode: OperatingMode,
    req: &PurifyRequest,
) -> Result<PurifyOutcome, PurifyError> {
    battery.ensure_operable(cfg)?;

    let multipliers = mode.multipliers();
    let (rate_limit, energy_per_liter, output) = if req.source.is_liquid() {
        let input = req
            .input_contaminants
            .as_ref()
            .filter(|c| !c.is_empty())
            .ok_or(PurifyError::MissingInputContaminants {
                water_source: req.source,
            })?;

        let energy_per_liter = cfg.energy_per_liter_wh * req.source.energy_factor() / multipliers.energy;
        let output = output_contaminants(
            cfg,
            input,
            filter.health(cfg),
            req.temperature_c,
            multipliers.removal,
        );
        debug!(source = %req.source, ?output, "contaminant kinetics");
        verify_safety(cfg, &output)?;

        (pipe_flow_rate(cfg), energy_per_liter, output)
    } else {
        let humidity = req.humidity.ok_or_else(|| {
            PurifyError::InvalidArgument("humidity is required for air source".into())
        })?;
        if !humidity.is_finite() || humidity < 0.0 {
            return Err(PurifyError::InvalidArgument(format!(
                "humidity must be a non-negative percentage, got {humidity}"
            )));
        }

        let extraction_rate = humidity
            * AIR_YIELD_PER_HUMIDITY
            * (1.0 - AIR_TEMP_COEFF * (req.temperature_c - REFERENCE_TEMP_C));
        let output: ContaminantLevels = cfg.contaminants.keys().map(|k| (k.clone(), 0.0)).collect();

        (extraction_rate, AIR_ENERGY_PER_LITER_WH / multipliers.energy, output)
    };

    let max_water = battery.available_wh(cfg) / energy_per_liter;
    let water_produced = rate_limit
        .min(cfg.filtration_rate_lph)
        .min(max_water)
        .min(filter.remaining_liters(cfg))
        .max(0.0);
    let energy_used = water_produced * energy_per_liter;

    battery.draw(cfg, energy_used)?;
    filter.usage_liters += water_produced;

    Ok(PurifyOutcome {
        water_produced_liters: water_produced,
        energy_used_wh: energy_used,
        output_contaminants: output,
    })
}
