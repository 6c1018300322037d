//! Temperature unit preference

use super::temperature::TemperatureBehavior;
use crate::error::{PeripheralError, Result};
use crate::gatt::{CharacteristicBehavior, CharacteristicHandle, WriteOptions};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Unit the temperature is reported in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Celsius,
    Fahrenheit,
}

impl Unit {
    /// ASCII code sent on the wire
    pub fn as_byte(&self) -> u8 {
        match self {
            Unit::Celsius => b'C',
            Unit::Fahrenheit => b'F',
        }
    }

    fn from_byte(byte: u8) -> Self {
        if byte == b'F' {
            Unit::Fahrenheit
        } else {
            Unit::Celsius
        }
    }

    /// Convert a Celsius reading into this unit
    pub fn convert(&self, celsius: f64) -> f64 {
        match self {
            Unit::Celsius => celsius,
            Unit::Fahrenheit => celsius * 1.8 + 32.0,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_byte() as char)
    }
}

/// Shared unit state, Celsius initially
#[derive(Debug)]
pub struct UnitPreference {
    unit: AtomicU8,
}

impl UnitPreference {
    pub fn new(unit: Unit) -> Self {
        Self {
            unit: AtomicU8::new(unit.as_byte()),
        }
    }

    pub fn get(&self) -> Unit {
        Unit::from_byte(self.unit.load(Ordering::Acquire))
    }

    /// Store `unit` and return the previous one
    fn replace(&self, unit: Unit) -> Unit {
        Unit::from_byte(self.unit.swap(unit.as_byte(), Ordering::AcqRel))
    }
}

impl Default for UnitPreference {
    fn default() -> Self {
        Self::new(Unit::Celsius)
    }
}

/// Read/write behavior of the unit characteristic
pub struct UnitPreferenceBehavior {
    unit: Arc<UnitPreference>,
    temperature: Arc<TemperatureBehavior>,
}

impl UnitPreferenceBehavior {
    /// Unit characteristic that pushes `temperature` when the unit changes
    pub fn new(unit: Arc<UnitPreference>, temperature: Arc<TemperatureBehavior>) -> Self {
        Self { unit, temperature }
    }

    /// Apply a unit write payload. Only the first character matters.
    pub fn apply(&self, value: &[u8]) -> Result<()> {
        let text = std::str::from_utf8(value).map_err(|e| {
            PeripheralError::InvalidValue(format!("unit is not UTF-8: {}", e))
        })?;
        let unit = if text.starts_with('F') {
            Unit::Fahrenheit
        } else {
            Unit::Celsius
        };

        if self.unit.replace(unit) == unit {
            return Ok(());
        }

        info!(%unit, "change unit");
        // The unit write itself succeeded even if the push could not be made
        if let Err(e) = self.temperature.push_now() {
            warn!(error = %e, "temperature push after unit change failed");
        }
        Ok(())
    }
}

impl CharacteristicBehavior for UnitPreferenceBehavior {
    fn read(&self, _characteristic: &CharacteristicHandle) -> Result<Vec<u8>> {
        Ok(vec![self.unit.get().as_byte()])
    }

    fn write(
        &self,
        characteristic: &CharacteristicHandle,
        value: &[u8],
        _options: &WriteOptions,
    ) -> Result<()> {
        self.apply(value)?;
        characteristic.set_value(&[self.unit.get().as_byte()])
    }
}
