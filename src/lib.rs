//! Energy and water-treatment simulation for a solar-powered, battery-buffered
//! water purification unit.

pub mod config;
pub mod domain;
pub mod forecast;
pub mod maintenance;
pub mod simulation;
pub mod telemetry;
