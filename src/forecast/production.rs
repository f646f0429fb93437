//! Closed-form daily approximations used by the batch forecast.
//!
//! These are deliberately coarser than the step model in
//! [`crate::simulation`]: no Peukert capacity adjustment, no mode
//! multipliers, no filter-health scaling and no flow or energy caps. Forecast
//! totals therefore overstate what repeated `charge`/`purify` calls deliver.

use crate::config::DeviceConfig;
use crate::domain::WaterSource;
use crate::simulation::battery::solar_energy_wh;

/// Fraction of relative humidity converted to water per Wh
const AIR_YIELD_PER_WH: f64 = 0.1;

/// Panel energy for one day at full intensity (Wh)
pub fn daily_energy_wh(cfg: &DeviceConfig, sunlight_hours: f64, temperature_c: f64) -> f64 {
    solar_energy_wh(cfg, sunlight_hours, 1.0, temperature_c)
}

/// Water one day's energy buys (L)
///
/// The humidity yield only applies when the source is air and humidity is
/// known; anything else is costed at the liquid energy rate.
pub fn daily_water_liters(
    cfg: &DeviceConfig,
    energy_wh: f64,
    source: WaterSource,
    humidity: Option<f64>,
) -> f64 {
    match (source, humidity) {
        (WaterSource::Air, Some(h)) => energy_wh * AIR_YIELD_PER_WH * (h / 100.0),
        _ => energy_wh / (cfg.energy_per_liter_wh * source.energy_factor()),
    }
}
