use anyhow::Result;
use solar_purifier::{config, simulation, telemetry};
use solar_purifier::domain::{levels, WaterSource, BACTERIA, DEBRIS, SALT};
use solar_purifier::forecast::ForecastRequest;
use config::Config;
use simulation::{ChargeConditions, Device, PurifyRequest};
use tracing::{info, warn};

fn main() -> Result<()> {
    let cfg = Config::load()?;
    telemetry::init_tracing(&cfg.telemetry);

    let mut device = Device::new(cfg.device.clone())?;
    info!(status = ?device.status(), "starting Solar Purifier simulation");

    device.charge(ChargeConditions::new(6.0).with_temperature(30.0));

    let request = PurifyRequest::liquid(
        WaterSource::Seawater,
        levels([(SALT, 35.0), (DEBRIS, 1.0), (BACTERIA, 50.0)]),
    );
    if let Err(e) = device.purify(&request) {
        warn!(error = %e, "seawater run failed");
    }
    if let Err(e) = device.purify(&PurifyRequest::air(65.0)) {
        warn!(error = %e, "air run failed");
    }

    let forecast = device.forecast_production(&ForecastRequest::new(7, 6.0).with_temperature(28.0));
    let report = device.maintenance_check();

    println!("{}", serde_json::to_string_pretty(&device.status())?);
    println!("{}", serde_json::to_string_pretty(&report)?);
    println!("{}", serde_json::to_string_pretty(&forecast)?);
    print!("{}", device.event_log().to_json_lines()?);
    Ok(())
}
