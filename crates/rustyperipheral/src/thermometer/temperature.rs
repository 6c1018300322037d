//! Temperature characteristic behavior
//!
//! Value layout (3 bytes): temperature in the preferred unit multiplied by
//! 100 as a signed 16-bit little-endian integer, followed by the ASCII unit
//! byte (`'C'` or `'F'`).

use super::sensor::TemperatureSensor;
use super::unit::{Unit, UnitPreference};
use crate::error::{PeripheralError, Result};
use crate::gatt::{CharacteristicBehavior, CharacteristicHandle};
use crate::scheduler::{NotificationScheduler, TaskControl};
use byteorder::{ByteOrder, LittleEndian};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Encode a Celsius reading in `unit`. Out-of-range values saturate.
pub fn encode_temperature(celsius: f64, unit: Unit) -> Result<[u8; 3]> {
    if !celsius.is_finite() {
        return Err(PeripheralError::SensorUnavailable(format!(
            "non-finite reading {}",
            celsius
        )));
    }

    let scaled = (unit.convert(celsius) * 100.0).round() as i16;
    let mut value = [0u8; 3];
    LittleEndian::write_i16(&mut value[..2], scaled);
    value[2] = unit.as_byte();
    Ok(value)
}

/// Reads the sensor and encodes it with the current unit
#[derive(Clone)]
struct TemperatureReader {
    unit: Arc<UnitPreference>,
    sensor: Arc<dyn TemperatureSensor>,
}

impl TemperatureReader {
    fn read(&self) -> Result<Vec<u8>> {
        let celsius = self.sensor.read_celsius()?;
        Ok(encode_temperature(celsius, self.unit.get())?.to_vec())
    }

    /// One scheduled tick: failures skip the tick and keep the task armed
    fn push(&self, characteristic: &CharacteristicHandle) -> TaskControl {
        if let Err(e) = characteristic.push_with(|| self.read()) {
            warn!(
                characteristic = %characteristic.id(),
                error = %e,
                "skipping temperature notification"
            );
        }
        TaskControl::Continue
    }
}

/// Read/notify behavior of the temperature characteristic
pub struct TemperatureBehavior {
    reader: TemperatureReader,
    scheduler: Arc<NotificationScheduler>,
    interval: Duration,
    // Set on subscribe, cleared on unsubscribe. A task that stops itself
    // leaves it in place; pushes recheck the notifying flag.
    characteristic: Mutex<Option<CharacteristicHandle>>,
}

impl TemperatureBehavior {
    pub fn new(
        unit: Arc<UnitPreference>,
        sensor: Arc<dyn TemperatureSensor>,
        scheduler: Arc<NotificationScheduler>,
        interval: Duration,
    ) -> Self {
        Self {
            reader: TemperatureReader { unit, sensor },
            scheduler,
            interval,
            characteristic: Mutex::new(None),
        }
    }

    /// Push a fresh value right away, outside the periodic schedule.
    ///
    /// Does nothing unless a client is subscribed. Returns whether a value was
    /// pushed.
    pub fn push_now(&self) -> Result<bool> {
        let characteristic = self.characteristic.lock().clone();
        match characteristic {
            Some(characteristic) => {
                let pushed = characteristic.push_with(|| self.reader.read())?;
                debug!(characteristic = %characteristic.id(), pushed, "immediate temperature push");
                Ok(pushed)
            }
            None => Ok(false),
        }
    }
}

impl CharacteristicBehavior for TemperatureBehavior {
    fn read(&self, _characteristic: &CharacteristicHandle) -> Result<Vec<u8>> {
        self.reader.read()
    }

    fn on_notify(&self, notifying: bool, characteristic: &CharacteristicHandle) -> Result<()> {
        if notifying {
            *self.characteristic.lock() = Some(characteristic.clone());

            let reader = self.reader.clone();
            let task_handle = characteristic.clone();
            let push = move || reader.push(&task_handle);
            self.scheduler.arm(characteristic, self.interval, push)
        } else {
            self.scheduler.disarm(characteristic);
            *self.characteristic.lock() = None;
            Ok(())
        }
    }
}
