//! Maintenance forecasting
//!
//! Filter and battery wear are scored with independent two-parameter Weibull
//! failure models:
//! - filter: liters processed
//! - battery: equivalent charge cycles

use serde::Serialize;
use std::collections::BTreeSet;
use strum::Display;

use crate::config::{DeviceConfig, WeibullParams};

/// Failure probability above which replacement is due soon
pub const SOON_THRESHOLD: f64 = 0.5;
/// Failure probability above which replacement is urgent
pub const URGENT_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MaintenanceFlag {
    FilterReplacementSoon,
    FilterReplacementUrgent,
    BatteryReplacementSoon,
    BatteryReplacementUrgent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaintenanceReport {
    pub filter_usage: f64,
    pub battery_cycles: f64,
    pub maintenance_flags: BTreeSet<MaintenanceFlag>,
    pub filter_failure_probability: f64,
    pub battery_failure_probability: f64,
}

impl MaintenanceReport {
    pub fn needs_attention(&self) -> bool {
        !self.maintenance_flags.is_empty()
    }
}

/// Weibull cumulative failure probability `1 - exp(-(x/scale)^shape)`
pub fn weibull_cdf(x: f64, shape: f64, scale: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    1.0 - (-(x / scale).powf(shape)).exp()
}

impl WeibullParams {
    pub fn failure_probability(&self, x: f64) -> f64 {
        weibull_cdf(x, self.shape, self.scale)
    }
}

fn flag_for(probability: f64, soon: MaintenanceFlag, urgent: MaintenanceFlag) -> Option<MaintenanceFlag> {
    if probability > URGENT_THRESHOLD {
        Some(urgent)
    } else if probability > SOON_THRESHOLD {
        Some(soon)
    } else {
        None
    }
}

/// Score wear counters. Pure; no state is touched.
pub fn maintenance_check(cfg: &DeviceConfig, filter_usage: f64, battery_cycles: f64) -> MaintenanceReport {
    let filter_p = cfg.filter_weibull.failure_probability(filter_usage);
    let battery_p = cfg.battery_weibull.failure_probability(battery_cycles);

    let maintenance_flags = [
        flag_for(
            filter_p,
            MaintenanceFlag::FilterReplacementSoon,
            MaintenanceFlag::FilterReplacementUrgent,
        ),
        flag_for(
            battery_p,
            MaintenanceFlag::BatteryReplacementSoon,
            MaintenanceFlag::BatteryReplacementUrgent,
        ),
    ]
    .into_iter()
    .flatten()
    .collect();

    MaintenanceReport {
        filter_usage,
        battery_cycles,
        maintenance_flags,
        filter_failure_probability: filter_p,
        battery_failure_probability: battery_p,
    }
}
