use anyhow::{Context, Result};
use figment::{providers::{Env, Format, Toml}, Figment};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

use crate::domain::{default_profiles, ContaminantProfile};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    pub filter: String,
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self { filter: "info".into(), json: true }
    }
}

/// Physical and engineering constants of one purification unit
///
/// Built once and never mutated; every simulation step borrows it.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DeviceConfig {
    #[validate(range(exclusive_min = 0.0))]
    pub solar_panel_power_w: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub solar_efficiency: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub battery_capacity_wh: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub filtration_rate_lph: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub energy_per_liter_wh: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub filter_capacity_liters: f64,

    /// Peukert exponent (1.0 = ideal battery)
    #[validate(range(min = 1.0))]
    pub peukert_constant: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub rated_current_a: f64,
    /// Operating floor as a fraction of nominal capacity
    #[validate(range(min = 0.0, max = 1.0))]
    pub min_battery_fraction: f64,

    #[validate(range(exclusive_min = 0.0))]
    pub pipe_diameter_m: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub pipe_length_m: f64,
    pub pressure_diff_pa: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub friction_factor: f64,

    pub filter_weibull: WeibullParams,
    pub battery_weibull: WeibullParams,

    pub contaminants: BTreeMap<String, ContaminantProfile>,
}

/// Two-parameter Weibull distribution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeibullParams {
    pub shape: f64,
    pub scale: f64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self::new(50.0, 0.2, 100.0, 10.0, 0.5, 1000.0)
    }
}

impl DeviceConfig {
    /// Build a device from its six physical ratings; engineering constants take
    /// their standard values.
    pub fn new(
        solar_panel_power_w: f64,
        solar_efficiency: f64,
        battery_capacity_wh: f64,
        filtration_rate_lph: f64,
        energy_per_liter_wh: f64,
        filter_capacity_liters: f64,
    ) -> Self {
        Self {
            solar_panel_power_w,
            solar_efficiency,
            battery_capacity_wh,
            filtration_rate_lph,
            energy_per_liter_wh,
            filter_capacity_liters,
            peukert_constant: 1.2,
            rated_current_a: 10.0,
            min_battery_fraction: 0.1,
            pipe_diameter_m: 0.05,
            pipe_length_m: 10.0,
            pressure_diff_pa: 100_000.0,
            friction_factor: 0.02,
            filter_weibull: WeibullParams { shape: 2.0, scale: 1500.0 },
            battery_weibull: WeibullParams { shape: 1.5, scale: 500.0 },
            contaminants: default_profiles(),
        }
    }

    pub fn min_battery_level_wh(&self) -> f64 {
        self.battery_capacity_wh * self.min_battery_fraction
    }

    /// Hours water spends in the filter bed
    pub fn residence_time_h(&self) -> f64 {
        self.filter_capacity_liters / self.filtration_rate_lph
    }

    pub fn reaction_rate(&self, contaminant: &str) -> f64 {
        self.contaminants
            .get(contaminant)
            .map(|p| p.reaction_rate)
            .unwrap_or(crate::domain::DEFAULT_REACTION_RATE)
    }

    /// Unlisted contaminants must be fully removed.
    pub fn safety_threshold(&self, contaminant: &str) -> f64 {
        self.contaminants
            .get(contaminant)
            .map(|p| p.safety_threshold)
            .unwrap_or(0.0)
    }

    pub fn removal_efficiencies(&self) -> BTreeMap<String, f64> {
        self.contaminants
            .iter()
            .map(|(k, p)| (k.clone(), p.removal_efficiency))
            .collect()
    }

    pub fn safety_thresholds(&self) -> BTreeMap<String, f64> {
        self.contaminants
            .iter()
            .map(|(k, p)| (k.clone(), p.safety_threshold))
            .collect()
    }

    pub fn validated(self) -> Result<Self> {
        self.validate().context("invalid device configuration")?;
        if self.filter_weibull.scale <= 0.0 || self.battery_weibull.scale <= 0.0 {
            anyhow::bail!("Weibull scale parameters must be positive");
        }
        Ok(self)
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Toml::file("config/default.toml"))
            .merge(Env::prefixed("PURIFIER__").split("__"));
        let mut cfg: Config = figment.extract()?;
        cfg.device = cfg.device.validated()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = DeviceConfig::default().validated().unwrap();
        assert_eq!(cfg.min_battery_level_wh(), 10.0);
        assert_eq!(cfg.residence_time_h(), 100.0);
        assert_eq!(cfg.contaminants.len(), 5);
    }

    #[test]
    fn test_rejects_bad_efficiency() {
        let mut cfg = DeviceConfig::default();
        cfg.solar_efficiency = 1.5;
        assert!(cfg.validated().is_err());
    }

    #[test]
    fn test_rejects_zero_filter_capacity() {
        let cfg = DeviceConfig::new(50.0, 0.2, 100.0, 10.0, 0.5, 0.0);
        assert!(cfg.validated().is_err());
    }

    #[test]
    fn test_unlisted_contaminant_lookups() {
        let cfg = DeviceConfig::default();
        assert_eq!(cfg.reaction_rate("microplastics"), 0.1);
        assert_eq!(cfg.safety_threshold("microplastics"), 0.0);
        assert_eq!(cfg.reaction_rate("salt"), 0.1);
        assert_eq!(cfg.safety_thresholds()["heavy_metals"], 0.01);
    }

    #[test]
    fn test_load_from_toml_and_env() {
        figment::Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file(
                "config/default.toml",
                r#"
                [device]
                solar_panel_power_w = 80.0
                battery_capacity_wh = 200.0
                "#,
            )?;
            jail.set_env("PURIFIER__DEVICE__FILTRATION_RATE_LPH", "12.5");

            let cfg = Config::load().map_err(|e| e.to_string())?;
            assert_eq!(cfg.device.solar_panel_power_w, 80.0);
            assert_eq!(cfg.device.battery_capacity_wh, 200.0);
            assert_eq!(cfg.device.filtration_rate_lph, 12.5);
            assert_eq!(cfg.device.solar_efficiency, 0.2);
            Ok(())
        });
    }
}
