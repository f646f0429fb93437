//! # Purification Device
//!
//! Aggregate of one battery, one filter, the operator-selected mode and the
//! event log. Configuration is fixed at construction; all mutation goes through
//! [`Device::charge`], [`Device::purify`] and [`Device::set_operating_mode`].
//!
//! The device is single-writer. Callers driving it from several threads must
//! wrap it in a lock and hold it for the duration of each call.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use super::battery::{BatteryState, ChargeConditions, ChargeOutcome};
use super::event_log::EventLog;
use super::purification::{self, FilterState, PurifyOutcome, PurifyRequest};
use crate::config::DeviceConfig;
use crate::domain::{ContaminantLevels, OperatingMode, PurifyError, WaterSource};
use crate::forecast::{ForecastEngine, ForecastRequest, ProductionForecast};
use crate::maintenance::{self, MaintenanceReport};

/// Everything that changes while the simulation runs
#[derive(Debug, Clone, Serialize)]
pub struct DeviceState {
    pub battery: BatteryState,
    pub filter: FilterState,
    pub mode: OperatingMode,
    pub log: EventLog,
}

impl DeviceState {
    pub fn fresh(cfg: &DeviceConfig) -> Self {
        Self {
            battery: BatteryState::fresh(cfg),
            filter: FilterState::default(),
            mode: OperatingMode::default(),
            log: EventLog::new(),
        }
    }
}

/// Snapshot returned by [`Device::status`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceStatus {
    pub battery_level_wh: f64,
    pub filter_usage_liters: f64,
    pub operating_mode: OperatingMode,
}

#[derive(Debug, Clone)]
pub struct Device {
    config: DeviceConfig,
    state: DeviceState,
}

impl Device {
    /// Build a fresh unit. The configuration is validated first, so a device
    /// never runs with a zero filter capacity or an out-of-range efficiency.
    pub fn new(config: DeviceConfig) -> Result<Self> {
        let config = config.validated()?;
        let state = DeviceState::fresh(&config);
        Ok(Self { config, state })
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn event_log(&self) -> &EventLog {
        &self.state.log
    }

    pub fn battery_level_wh(&self) -> f64 {
        self.state.battery.level_wh
    }

    pub fn battery_cycles(&self) -> f64 {
        self.state.battery.cycles
    }

    pub fn filter_usage_liters(&self) -> f64 {
        self.state.filter.usage_liters
    }

    pub fn filter_health(&self) -> f64 {
        self.state.filter.health(&self.config)
    }

    pub fn filter_health_percent(&self) -> f64 {
        self.filter_health() * 100.0
    }

    pub fn operating_mode(&self) -> OperatingMode {
        self.state.mode
    }

    pub fn set_operating_mode(&mut self, mode: OperatingMode) {
        if mode != self.state.mode {
            info!(from = %self.state.mode, to = %mode, "operating mode changed");
        }
        self.state.mode = mode;
    }

    pub fn status(&self) -> DeviceStatus {
        DeviceStatus {
            battery_level_wh: self.state.battery.level_wh,
            filter_usage_liters: self.state.filter.usage_liters,
            operating_mode: self.state.mode,
        }
    }

    /// Charge from the panel and return the energy added (Wh).
    pub fn charge(&mut self, conditions: ChargeConditions) -> f64 {
        self.charge_detailed(conditions).energy_added_wh
    }

    pub fn charge_detailed(&mut self, conditions: ChargeConditions) -> ChargeOutcome {
        let outcome = self.state.battery.charge(&self.config, conditions);
        if conditions.sunlight_hours <= 0.0 {
            return outcome;
        }

        info!(
            energy_added_wh = outcome.energy_added_wh,
            level_wh = self.state.battery.level_wh,
            temperature_c = conditions.temperature_c,
            "battery charged"
        );
        self.state.log.record(
            "Battery charged",
            json!({
                "energy_added": outcome.energy_added_wh,
                "temperature": conditions.temperature_c,
            }),
        );
        outcome
    }

    /// Purify water and return `(liters, output contaminants)`.
    pub fn purify(&mut self, request: &PurifyRequest) -> Result<(f64, ContaminantLevels), PurifyError> {
        self.purify_detailed(request)
            .map(|o| (o.water_produced_liters, o.output_contaminants))
    }

    pub fn purify_detailed(&mut self, request: &PurifyRequest) -> Result<PurifyOutcome, PurifyError> {
        let result = purification::purify(
            &self.config,
            &mut self.state.battery,
            &mut self.state.filter,
            self.state.mode,
            request,
        );

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(source = %request.source, error = %e, "purification rejected");
                return Err(e);
            }
        };

        info!(
            source = %request.source,
            water_produced_l = outcome.water_produced_liters,
            energy_used_wh = outcome.energy_used_wh,
            "water purified"
        );
        self.state.log.record(
            "Water purified",
            json!({
                "source": request.source,
                "water_produced": outcome.water_produced_liters,
                "energy_used": outcome.energy_used_wh,
                "output_contaminants": outcome.output_contaminants,
            }),
        );
        Ok(outcome)
    }

    /// Purify from a source given by name.
    ///
    /// The battery floor is checked before the name is resolved.
    pub fn purify_named(
        &mut self,
        source: &str,
        input_contaminants: Option<ContaminantLevels>,
        humidity: Option<f64>,
        temperature_c: f64,
    ) -> Result<(f64, ContaminantLevels), PurifyError> {
        self.state.battery.ensure_operable(&self.config)?;
        let source: WaterSource = source.parse()?;

        let request = PurifyRequest {
            source,
            input_contaminants,
            humidity,
            temperature_c,
        };
        self.purify(&request)
    }

    pub fn maintenance_check(&self) -> MaintenanceReport {
        maintenance::maintenance_check(
            &self.config,
            self.state.filter.usage_liters,
            self.state.battery.cycles,
        )
    }

    pub fn forecast_production(&self, request: &ForecastRequest) -> ProductionForecast {
        ForecastEngine::new(&self.config).forecast(
            request,
            self.state.battery.level_wh,
            self.filter_health_percent(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{levels, DEBRIS, SALT};

    #[test]
    fn test_fresh_device() {
        let device = Device::new(DeviceConfig::default()).unwrap();
        let status = device.status();
        assert_eq!(status.battery_level_wh, 50.0);
        assert_eq!(status.filter_usage_liters, 0.0);
        assert_eq!(status.operating_mode, OperatingMode::Standard);
        assert!(device.event_log().is_empty());
        assert_eq!(device.filter_health_percent(), 100.0);
    }

    #[test]
    fn test_rejects_invalid_config() {
        assert!(Device::new(DeviceConfig::new(50.0, 0.2, 100.0, 10.0, 0.5, 0.0)).is_err());

        let mut cfg = DeviceConfig::default();
        cfg.solar_efficiency = 1.5;
        assert!(Device::new(cfg).is_err());
    }

    #[test]
    fn test_charge_logs_event() {
        let mut device = Device::new(DeviceConfig::default()).unwrap();
        let added = device.charge(ChargeConditions::new(5.0).with_temperature(30.0));

        assert!((added - 48.75).abs() < 1e-9);
        let entry = device.event_log().last().unwrap();
        assert_eq!(entry.event, "Battery charged");
        assert_eq!(entry.details["temperature"], 30.0);
    }

    #[test]
    fn test_idle_charge_not_logged() {
        let mut device = Device::new(DeviceConfig::default()).unwrap();
        assert_eq!(device.charge(ChargeConditions::new(0.0)), 0.0);
        assert!(device.event_log().is_empty());
    }

    #[test]
    fn test_purify_logs_only_success() {
        let mut device = Device::new(DeviceConfig::default()).unwrap();

        let err = device.purify(&PurifyRequest::new(WaterSource::Air)).unwrap_err();
        assert!(matches!(err, PurifyError::InvalidArgument(_)));
        assert!(device.event_log().is_empty());

        let (liters, out) = device
            .purify(&PurifyRequest::liquid(
                WaterSource::Contaminated,
                levels([(SALT, 2.0), (DEBRIS, 0.5)]),
            ))
            .unwrap();
        assert!(liters > 0.0);
        assert_eq!(out.len(), 2);

        let entry = device.event_log().last().unwrap();
        assert_eq!(entry.event, "Water purified");
        assert_eq!(entry.details["source"], "contaminated");
        assert_eq!(entry.details["water_produced"], liters);
    }

    #[test]
    fn test_mode_changes_energy_cost() {
        let input = levels([(SALT, 2.0)]);
        let mut eco = Device::new(DeviceConfig::default()).unwrap();
        eco.set_operating_mode(OperatingMode::Eco);
        let mut hp = Device::new(DeviceConfig::default()).unwrap();
        hp.set_operating_mode(OperatingMode::HighPerformance);

        let req = PurifyRequest::liquid(WaterSource::Contaminated, input);
        let eco_out = eco.purify_detailed(&req).unwrap();
        let hp_out = hp.purify_detailed(&req).unwrap();

        assert_eq!(eco_out.water_produced_liters, hp_out.water_produced_liters);
        assert!(hp_out.energy_used_wh < eco_out.energy_used_wh);
        assert!(hp.battery_level_wh() > eco.battery_level_wh());
    }

    #[test]
    fn test_purify_named() {
        let mut device = Device::new(DeviceConfig::default()).unwrap();

        let err = device.purify_named("lake", None, None, 25.0).unwrap_err();
        assert_eq!(err, PurifyError::InvalidSource("lake".into()));

        let (liters, _) = device.purify_named("air", None, Some(70.0), 25.0).unwrap();
        assert!((liters - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_low_battery_wins_over_bad_source_name() {
        let mut cfg = DeviceConfig::default();
        cfg.min_battery_fraction = 0.9;
        let mut device = Device::new(cfg).unwrap();

        let err = device.purify_named("lake", None, None, 25.0).unwrap_err();
        assert!(matches!(err, PurifyError::InsufficientBattery { .. }));
    }

    #[test]
    fn test_maintenance_tracks_counters() {
        let mut device = Device::new(DeviceConfig::default()).unwrap();
        device.charge(ChargeConditions::new(12.0));
        device.purify(&PurifyRequest::air(80.0)).unwrap();

        let report = device.maintenance_check();
        assert_eq!(report.filter_usage, device.filter_usage_liters());
        assert_eq!(report.battery_cycles, 0.5);
        assert!(report.filter_failure_probability > 0.0);
        assert!(report.battery_failure_probability > 0.0);
    }
}
