//! Peripheral configuration

use crate::thermometer::SensorSource;
use std::time::Duration;

/// Generic Sensor appearance (category 0x015, sub-category 0)
pub const APPEARANCE_DEFAULT: u16 = 1344;

/// Default interval between temperature notifications
pub const DEFAULT_NOTIFY_INTERVAL: Duration = Duration::from_secs(2);

/// Peripheral configuration
#[derive(Debug, Clone)]
pub struct PeripheralConfig {
    /// Suffix of the advertisement object path
    pub advertisement_index: u32,
    /// Advertised local name
    pub local_name: String,
    /// Advertised appearance
    pub appearance: u16,
    /// Ask the daemon to include the TX power level, unset by default
    pub include_tx_power: Option<bool>,
    /// Interval between periodic temperature notifications
    pub notify_interval: Duration,
    /// Where temperature readings come from
    pub sensor: SensorSource,
}

impl Default for PeripheralConfig {
    fn default() -> Self {
        Self {
            advertisement_index: 0,
            local_name: "Thermometer".to_string(),
            appearance: APPEARANCE_DEFAULT,
            include_tx_power: None,
            notify_interval: DEFAULT_NOTIFY_INTERVAL,
            sensor: SensorSource::default(),
        }
    }
}
