//! Test doubles for the transport and sensor boundaries

use crate::error::{PeripheralError, Result};
use crate::thermometer::TemperatureSensor;
use crate::transport::{PropertyMap, RegistrationReply, Transport};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Transport that records every call
#[derive(Default)]
pub struct RecordingTransport {
    pub notifications: Mutex<Vec<(String, Vec<u8>)>>,
    pub advertisements: Mutex<Vec<String>>,
    pub fail_registration: AtomicBool,
}

impl RecordingTransport {
    pub fn notifications_for(&self, path: &str) -> Vec<Vec<u8>> {
        self.notifications
            .lock()
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, v)| v.clone())
            .collect()
    }

    pub fn notification_count(&self, path: &str) -> usize {
        self.notifications_for(path).len()
    }
}

impl Transport for RecordingTransport {
    fn register_advertisement(&self, path: &str, _options: PropertyMap, reply: RegistrationReply) {
        self.advertisements.lock().push(path.to_string());
        if self.fail_registration.load(Ordering::SeqCst) {
            let error = PeripheralError::Transport("org.bluez.Error.Failed".into());
            reply(Err(error));
        } else {
            reply(Ok(()));
        }
    }

    fn notify_value(&self, path: &str, value: &[u8]) -> Result<()> {
        self.notifications
            .lock()
            .push((path.to_string(), value.to_vec()));
        Ok(())
    }
}

/// Sensor returning a settable reading, or failing when cleared
pub struct FixedSensor {
    celsius: Mutex<Option<f64>>,
}

impl FixedSensor {
    pub fn new(celsius: f64) -> Self {
        Self {
            celsius: Mutex::new(Some(celsius)),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            celsius: Mutex::new(None),
        }
    }

    pub fn set(&self, celsius: Option<f64>) {
        *self.celsius.lock() = celsius;
    }
}

impl TemperatureSensor for FixedSensor {
    fn read_celsius(&self) -> Result<f64> {
        self.celsius
            .lock()
            .ok_or_else(|| PeripheralError::SensorUnavailable("cleared".into()))
    }
}
