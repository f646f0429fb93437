//! # Battery Model
//!
//! Solar charging of the device battery with thermal derating of the panel and a
//! Peukert-law adjustment of usable capacity.
//!
//! ## Charging Model
//!
//! ```text
//! temp_factor        = max(0.7, 1 - 0.005 * (T - 25))
//! energy_generated   = P_panel * eta * hours * intensity * temp_factor
//! discharge_rate     = energy_generated / hours / I_rated
//! effective_capacity = C_nominal * (I_rated / discharge_rate)^(k - 1)
//! ```
//!
//! A high implied charging rate shrinks the usable capacity. When the effective
//! capacity drops below the current level the charge call returns a negative
//! value and the level falls to the effective capacity. That is kept as part of
//! the model rather than clamped.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DeviceConfig;
use crate::domain::PurifyError;

/// Nominal operating temperature of the panel (°C)
pub const REFERENCE_TEMP_C: f64 = 25.0;
/// Panel efficiency loss per °C above reference
const PANEL_TEMP_COEFF: f64 = 0.005;
/// Derating never drops the panel below 70% of rated output
const MIN_PANEL_FACTOR: f64 = 0.7;

/// Conditions for one charging period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChargeConditions {
    pub sunlight_hours: f64,
    /// Fraction of rated irradiance (1.0 = full sun)
    pub light_intensity: f64,
    pub temperature_c: f64,
}

impl ChargeConditions {
    pub fn new(sunlight_hours: f64) -> Self {
        Self {
            sunlight_hours,
            light_intensity: 1.0,
            temperature_c: REFERENCE_TEMP_C,
        }
    }

    pub fn with_intensity(mut self, light_intensity: f64) -> Self {
        self.light_intensity = light_intensity;
        self
    }

    pub fn with_temperature(mut self, temperature_c: f64) -> Self {
        self.temperature_c = temperature_c;
        self
    }
}

/// Result of a charging period
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChargeOutcome {
    /// Net change in stored energy (may be negative, see module docs)
    pub energy_added_wh: f64,
    pub energy_generated_wh: f64,
    pub effective_capacity_wh: f64,
}

impl ChargeOutcome {
    fn idle(capacity_wh: f64) -> Self {
        Self {
            energy_added_wh: 0.0,
            energy_generated_wh: 0.0,
            effective_capacity_wh: capacity_wh,
        }
    }
}

/// Panel thermal derating factor
pub fn thermal_derating(temperature_c: f64) -> f64 {
    (1.0 - PANEL_TEMP_COEFF * (temperature_c - REFERENCE_TEMP_C)).max(MIN_PANEL_FACTOR)
}

/// Energy the panel delivers over a charging period (Wh)
pub fn solar_energy_wh(cfg: &DeviceConfig, hours: f64, light_intensity: f64, temperature_c: f64) -> f64 {
    cfg.solar_panel_power_w
        * cfg.solar_efficiency
        * hours
        * light_intensity
        * thermal_derating(temperature_c)
}

/// Usable capacity under the implied charging rate (Peukert's law)
pub fn peukert_effective_capacity(cfg: &DeviceConfig, energy_generated_wh: f64, hours: f64) -> f64 {
    let discharge_rate = energy_generated_wh / hours / cfg.rated_current_a;
    cfg.battery_capacity_wh * (cfg.rated_current_a / discharge_rate).powf(cfg.peukert_constant - 1.0)
}

/// Mutable battery state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatteryState {
    pub level_wh: f64,
    /// Equivalent charge cycles (one per 24 sunlight-hours)
    pub cycles: f64,
}

impl BatteryState {
    /// A new unit ships half charged.
    pub fn fresh(cfg: &DeviceConfig) -> Self {
        Self {
            level_wh: cfg.battery_capacity_wh / 2.0,
            cycles: 0.0,
        }
    }

    /// Charge from the panel. Never fails; zero or negative sunlight is a no-op.
    ///
    /// Negative light intensity is treated as darkness. With no energy generated
    /// the effective capacity is unbounded, so the level stays where it is while
    /// the cycle counter still advances.
    pub fn charge(&mut self, cfg: &DeviceConfig, cond: ChargeConditions) -> ChargeOutcome {
        if cond.sunlight_hours <= 0.0 {
            return ChargeOutcome::idle(cfg.battery_capacity_wh);
        }

        // Negative irradiance is meaningless and would turn the Peukert ratio into NaN
        let intensity = cond.light_intensity.max(0.0);
        let energy_generated = solar_energy_wh(cfg, cond.sunlight_hours, intensity, cond.temperature_c);
        let effective_capacity = peukert_effective_capacity(cfg, energy_generated, cond.sunlight_hours);

        let charge_added = (effective_capacity - self.level_wh).min(energy_generated);
        self.level_wh = effective_capacity.min(self.level_wh + charge_added);
        self.cycles += cond.sunlight_hours / 24.0;

        debug!(
            energy_generated_wh = energy_generated,
            effective_capacity_wh = effective_capacity,
            charge_added_wh = charge_added,
            level_wh = self.level_wh,
            "battery charge step"
        );

        ChargeOutcome {
            energy_added_wh: charge_added,
            energy_generated_wh: energy_generated,
            effective_capacity_wh: effective_capacity,
        }
    }

    /// Energy available above the operating floor
    pub fn available_wh(&self, cfg: &DeviceConfig) -> f64 {
        self.level_wh - cfg.min_battery_level_wh()
    }

    pub fn ensure_operable(&self, cfg: &DeviceConfig) -> Result<(), PurifyError> {
        let min_wh = cfg.min_battery_level_wh();
        if self.level_wh < min_wh {
            return Err(PurifyError::InsufficientBattery {
                level_wh: self.level_wh,
                min_wh,
            });
        }
        Ok(())
    }

    /// Draw energy; rejected without mutation if it would cross the floor.
    pub fn draw(&mut self, cfg: &DeviceConfig, energy_wh: f64) -> Result<(), PurifyError> {
        let min_wh = cfg.min_battery_level_wh();
        // Tolerate float dust from available_wh / per_liter * per_liter
        if self.level_wh - energy_wh < min_wh - 1e-9 {
            return Err(PurifyError::InsufficientBattery {
                level_wh: self.level_wh,
                min_wh,
            });
        }
        self.level_wh = (self.level_wh - energy_wh).max(min_wh);
        Ok(())
    }
}
