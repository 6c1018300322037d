//! Thermometer GATT service layout

use super::sensor::TemperatureSensor;
use super::temperature::TemperatureBehavior;
use super::unit::{UnitPreference, UnitPreferenceBehavior};
use crate::error::Result;
use crate::gatt::{CharacteristicFlags, CharacteristicHandle, DescriptorFlags, GattTree};
use crate::scheduler::NotificationScheduler;
use std::sync::Arc;
use std::time::Duration;

/// Custom 128-bit thermometer service
pub const THERMOMETER_SERVICE_UUID: &str = "9941f656-8e3e-11eb-8dcd-0242ac130003";
/// SIG-assigned Temperature characteristic
pub const TEMPERATURE_CHAR_UUID: &str = "2A6E";
/// Custom unit preference characteristic
pub const UNIT_CHAR_UUID: &str = "9941fb38-8e3e-11eb-8dcd-0242ac130003";
/// Characteristic Presentation Format descriptor
pub const PRESENTATION_FORMAT_DESC_UUID: &str = "2904";
/// Characteristic User Description descriptor
pub const USER_DESCRIPTION_DESC_UUID: &str = "2901";

pub const THERMOMETER_SERVICE_ID: u16 = 1;
pub const TEMPERATURE_CHAR_ID: u16 = 1;
pub const UNIT_CHAR_ID: u16 = 2;

/// sint16, exponent -2, unit 0x272F (degree Celsius), namespace SIG, no description
pub const TEMPERATURE_PRESENTATION_FORMAT: [u8; 7] = [0x0E, 0xFE, 0x2F, 0x27, 0x01, 0x00, 0x00];
pub const UNIT_DESCRIPTION: &str = "Temperature Units (F or C)";

/// Handles to an installed thermometer service
pub struct ThermometerService {
    pub unit: Arc<UnitPreference>,
    pub temperature: Arc<TemperatureBehavior>,
    pub unit_behavior: Arc<UnitPreferenceBehavior>,
    pub temperature_characteristic: CharacteristicHandle,
    pub unit_characteristic: CharacteristicHandle,
}

impl ThermometerService {
    /// Register the service, both characteristics and their descriptors
    pub fn install(
        tree: &mut GattTree,
        scheduler: Arc<NotificationScheduler>,
        sensor: Arc<dyn TemperatureSensor>,
        interval: Duration,
    ) -> Result<Self> {
        let unit = Arc::new(UnitPreference::default());
        let temperature = Arc::new(TemperatureBehavior::new(
            unit.clone(),
            sensor,
            scheduler,
            interval,
        ));
        let unit_behavior = Arc::new(UnitPreferenceBehavior::new(
            unit.clone(),
            temperature.clone(),
        ));

        tree.register_service(THERMOMETER_SERVICE_ID, THERMOMETER_SERVICE_UUID, true)?;

        let temperature_characteristic = tree.add_characteristic(
            THERMOMETER_SERVICE_ID,
            TEMPERATURE_CHAR_ID,
            TEMPERATURE_CHAR_UUID,
            CharacteristicFlags::READ | CharacteristicFlags::NOTIFY,
            Vec::new(),
            temperature.clone(),
        )?;
        tree.add_descriptor(
            THERMOMETER_SERVICE_ID,
            TEMPERATURE_CHAR_ID,
            1,
            PRESENTATION_FORMAT_DESC_UUID,
            TEMPERATURE_PRESENTATION_FORMAT.to_vec(),
            DescriptorFlags::READ,
        )?;

        let unit_characteristic = tree.add_characteristic(
            THERMOMETER_SERVICE_ID,
            UNIT_CHAR_ID,
            UNIT_CHAR_UUID,
            CharacteristicFlags::READ | CharacteristicFlags::WRITE,
            Vec::new(),
            unit_behavior.clone(),
        )?;
        tree.add_descriptor(
            THERMOMETER_SERVICE_ID,
            UNIT_CHAR_ID,
            1,
            USER_DESCRIPTION_DESC_UUID,
            UNIT_DESCRIPTION.as_bytes().to_vec(),
            DescriptorFlags::READ,
        )?;

        Ok(Self {
            unit,
            temperature,
            unit_behavior,
            temperature_characteristic,
            unit_characteristic,
        })
    }
}
