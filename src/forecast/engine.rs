use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{daily_energy_wh, daily_water_liters};
use crate::config::DeviceConfig;
use crate::domain::WaterSource;
use crate::simulation::battery::REFERENCE_TEMP_C;

/// Multi-day production forecast under constant average conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub days: usize,
    pub avg_sunlight_hours: f64,
    pub avg_temperature_c: f64,
    pub source: WaterSource,
    pub humidity: Option<f64>,
}

impl ForecastRequest {
    pub fn new(days: usize, avg_sunlight_hours: f64) -> Self {
        Self {
            days,
            avg_sunlight_hours,
            avg_temperature_c: REFERENCE_TEMP_C,
            source: WaterSource::Contaminated,
            humidity: None,
        }
    }

    pub fn with_temperature(mut self, avg_temperature_c: f64) -> Self {
        self.avg_temperature_c = avg_temperature_c;
        self
    }

    pub fn with_source(mut self, source: WaterSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_humidity(mut self, humidity: f64) -> Self {
        self.humidity = Some(humidity);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionForecast {
    pub total_liters: f64,
    pub average_liters: f64,
    pub daily_liters: Vec<f64>,
    /// Current battery level; the forecast does not project it
    pub end_battery_level_wh: f64,
    /// Current filter health; the forecast does not project it
    pub end_filter_health_percent: f64,
}

/// Batch evaluator over per-day condition series
pub struct ForecastEngine<'a> {
    config: &'a DeviceConfig,
}

impl<'a> ForecastEngine<'a> {
    pub fn new(config: &'a DeviceConfig) -> Self {
        Self { config }
    }

    /// Evaluate per-day series of sunlight hours and temperatures.
    pub fn daily_production(
        &self,
        sunlight: &[f64],
        temperature: &[f64],
        source: WaterSource,
        humidity: Option<f64>,
    ) -> Vec<f64> {
        sunlight
            .iter()
            .zip(temperature)
            .map(|(&hours, &temp)| {
                let energy = daily_energy_wh(self.config, hours, temp);
                daily_water_liters(self.config, energy, source, humidity)
            })
            .collect()
    }

    /// Project `days` of production. Reads nothing from, and writes nothing to,
    /// the device; the current battery level and filter health are passed
    /// through to the result.
    pub fn forecast(
        &self,
        req: &ForecastRequest,
        battery_level_wh: f64,
        filter_health_percent: f64,
    ) -> ProductionForecast {
        let sunlight = vec![req.avg_sunlight_hours; req.days];
        let temperature = vec![req.avg_temperature_c; req.days];

        let daily_liters = self.daily_production(&sunlight, &temperature, req.source, req.humidity);
        let total_liters: f64 = daily_liters.iter().sum();
        let average_liters = if daily_liters.is_empty() {
            0.0
        } else {
            total_liters / daily_liters.len() as f64
        };

        debug!(days = req.days, total_liters, source = %req.source, "production forecast");

        ProductionForecast {
            total_liters,
            average_liters,
            daily_liters,
            end_battery_level_wh: battery_level_wh,
            end_filter_health_percent: filter_health_percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_week_forecast() {
        let cfg = DeviceConfig::default();
        let engine = ForecastEngine::new(&cfg);

        let f = engine.forecast(&ForecastRequest::new(7, 6.0), 50.0, 100.0);

        assert_eq!(f.daily_liters.len(), 7);
        assert!(f.daily_liters.iter().all(|&d| (d - 120.0).abs() < 1e-9));
        assert!((f.total_liters - 840.0).abs() < 1e-9);
        assert!((f.average_liters - 120.0).abs() < 1e-9);
        assert_eq!(f.end_battery_level_wh, 50.0);
        assert_eq!(f.end_filter_health_percent, 100.0);
    }

    #[test]
    fn test_air_forecast() {
        let cfg = DeviceConfig::default();
        let req = ForecastRequest::new(3, 6.0)
            .with_source(WaterSource::Air)
            .with_humidity(80.0)
            .with_temperature(35.0);
        let f = ForecastEngine::new(&cfg).forecast(&req, 42.0, 90.0);

        let energy = 50.0 * 0.2 * 6.0 * 0.95;
        assert!((f.daily_liters[0] - energy * 0.1 * 0.8).abs() < 1e-9);
        assert_eq!(f.end_battery_level_wh, 42.0);
    }

    #[test]
    fn test_zero_days() {
        let cfg = DeviceConfig::default();
        let f = ForecastEngine::new(&cfg).forecast(&ForecastRequest::new(0, 6.0), 50.0, 100.0);
        assert!(f.daily_liters.is_empty());
        assert_eq!(f.total_liters, 0.0);
        assert_eq!(f.average_liters, 0.0);
    }

    proptest! {
        #[test]
        fn prop_total_is_sum_and_average_is_mean(
            days in 1usize..60,
            sun in 0.0f64..14.0,
            temp in -20.0f64..60.0,
        ) {
            let cfg = DeviceConfig::default();
            let req = ForecastRequest::new(days, sun).with_temperature(temp);
            let f = ForecastEngine::new(&cfg).forecast(&req, 50.0, 100.0);

            let sum: f64 = f.daily_liters.iter().sum();
            prop_assert_eq!(f.daily_liters.len(), days);
            prop_assert!((f.total_liters - sum).abs() < 1e-9);
            prop_assert!((f.average_liters - f.total_liters / days as f64).abs() < 1e-9);
        }
    }
}
