//! RustyPeripheral - A Rust library for BLE peripherals
//!
//! This library builds the pieces a Bluetooth Low Energy peripheral publishes
//! to the platform Bluetooth daemon: an LE advertisement, a GATT tree of
//! services, characteristics and descriptors, and the periodic notification
//! tasks behind subscribed characteristics. A thermometer profile ties them
//! together.
//!
//! The platform stack itself is reached through the [`Transport`] trait.

pub mod advertisement;
pub mod config;
pub mod error;
pub mod gatt;
pub mod peripheral;
pub mod scheduler;
pub mod thermometer;
pub mod transport;

#[cfg(test)]
mod mock;

// Re-export common types for convenience
pub use advertisement::{AdType, Advertisement, AdvertisementBuilder, AdvertisementProperties};
pub use config::PeripheralConfig;
pub use error::{PeripheralError, Result};
pub use gatt::{
    CharacteristicBehavior, CharacteristicFlags, CharacteristicHandle, GattTree, NotifyState,
    WriteOptions,
};
pub use peripheral::Peripheral;
pub use scheduler::{NotificationScheduler, TaskControl};
pub use thermometer::{SensorSource, TemperatureSensor, ThermometerService, Unit};
pub use transport::{PropertyMap, PropertyValue, Transport};
