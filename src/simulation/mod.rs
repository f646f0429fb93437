//! # Device Simulation Module
//!
//! Stateful models of a solar-powered, battery-buffered water purifier.
//!
//! ## Components
//!
//! - **Battery**: Solar charging with thermal derating and Peukert capacity adjustment
//! - **Purification**: Contaminant kinetics, safety verification and water production
//! - **Event log**: Append-only record of successful operations
//! - **Device**: Aggregate that owns the state above and applies the operating mode
//!
//! ## Usage
//!
//! ```rust
//! use solar_purifier::config::DeviceConfig;
//! use solar_purifier::domain::{levels, WaterSource};
//! use solar_purifier::simulation::{ChargeConditions, Device, PurifyRequest};
//!
//! let mut device = Device::new(DeviceConfig::default()).unwrap();
//! device.charge(ChargeConditions::new(6.0).with_temperature(30.0));
//!
//! let request = PurifyRequest::liquid(WaterSource::Contaminated, levels([("salt", 2.0)]));
//! let (liters, _output) = device.purify(&request).unwrap();
//! assert!(liters > 0.0);
//! ```

pub mod battery;
pub mod device;
pub mod event_log;
pub mod purification;

pub use battery::{BatteryState, ChargeConditions, ChargeOutcome};
pub use device::{Device, DeviceState, DeviceStatus};
pub use event_log::{EventLog, LogEntry};
pub use purification::{FilterState, PurifyOutcome, PurifyRequest};
