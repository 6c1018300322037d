//! Thermometer profile
//!
//! A temperature characteristic (read, notify) whose encoding depends on a
//! unit preference characteristic (read, write). Changing the unit pushes the
//! temperature to a subscribed client right away.

pub mod sensor;
pub mod service;
pub mod temperature;
pub mod unit;


pub use sensor::{
    FallbackSensor, SensorSource, SimulatedSensor, TemperatureSensor, ThermalZoneSensor,
};
pub use service::ThermometerService;
pub use temperature::{encode_temperature, TemperatureBehavior};
pub use unit::{Unit, UnitPreference, UnitPreferenceBehavior};
