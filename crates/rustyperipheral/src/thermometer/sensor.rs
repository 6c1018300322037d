//! Temperature sources

use crate::error::{PeripheralError, Result};
use rand::Rng;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

/// Default Linux thermal zone exposing the CPU temperature
pub const DEFAULT_THERMAL_ZONE: &str = "/sys/class/thermal/thermal_zone0/temp";

/// Simulated readings are drawn from [32.00, 70.00) °C in 0.01 steps
const SIMULATED_MIN_CENTI: i32 = 3200;
const SIMULATED_MAX_CENTI: i32 = 7000;

/// Source of temperature readings in degrees Celsius
pub trait TemperatureSensor: Send + Sync {
    fn read_celsius(&self) -> Result<f64>;
}

/// Reads a sysfs thermal zone (millidegrees Celsius)
#[derive(Debug, Clone)]
pub struct ThermalZoneSensor {
    path: PathBuf,
}

impl ThermalZoneSensor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for ThermalZoneSensor {
    fn default() -> Self {
        Self::new(DEFAULT_THERMAL_ZONE)
    }
}

impl TemperatureSensor for ThermalZoneSensor {
    fn read_celsius(&self) -> Result<f64> {
        let raw = fs::read_to_string(&self.path).map_err(|e| {
            PeripheralError::SensorUnavailable(format!("{}: {}", self.path.display(), e))
        })?;

        let millidegrees: i64 = raw.trim().parse().map_err(|e| {
            PeripheralError::SensorUnavailable(format!(
                "{} does not contain an integer: {}",
                self.path.display(),
                e
            ))
        })?;

        Ok(millidegrees as f64 / 1000.0)
    }
}

/// Random readings for boards without a usable sensor
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedSensor;

impl TemperatureSensor for SimulatedSensor {
    fn read_celsius(&self) -> Result<f64> {
        let centi = rand::thread_rng().gen_range(SIMULATED_MIN_CENTI..SIMULATED_MAX_CENTI);
        Ok(f64::from(centi) / 100.0)
    }
}

/// Tries `primary` and falls back to `fallback` when it fails
pub struct FallbackSensor {
    primary: Box<dyn TemperatureSensor>,
    fallback: Box<dyn TemperatureSensor>,
}

impl FallbackSensor {
    pub fn new(primary: Box<dyn TemperatureSensor>, fallback: Box<dyn TemperatureSensor>) -> Self {
        Self { primary, fallback }
    }
}

impl TemperatureSensor for FallbackSensor {
    fn read_celsius(&self) -> Result<f64> {
        match self.primary.read_celsius() {
            Ok(celsius) => Ok(celsius),
            Err(e) => {
                warn!(error = %e, "primary temperature sensor failed, using fallback");
                self.fallback.read_celsius()
            }
        }
    }
}

/// Which sensor a peripheral reads from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorSource {
    /// Thermal zone only; failures surface as `SensorUnavailable`
    ThermalZone(PathBuf),
    /// Random readings only
    Simulated,
    /// Thermal zone, with simulated readings when it cannot be read
    ThermalZoneOrSimulated(PathBuf),
}

impl SensorSource {
    pub fn build(&self) -> Arc<dyn TemperatureSensor> {
        match self {
            SensorSource::ThermalZone(path) => Arc::new(ThermalZoneSensor::new(path.clone())),
            SensorSource::Simulated => Arc::new(SimulatedSensor),
            SensorSource::ThermalZoneOrSimulated(path) => Arc::new(FallbackSensor::new(
                Box::new(ThermalZoneSensor::new(path.clone())),
                Box::new(SimulatedSensor),
            )),
        }
    }
}

impl Default for SensorSource {
    fn default() -> Self {
        SensorSource::ThermalZone(PathBuf::from(DEFAULT_THERMAL_ZONE))
    }
}
