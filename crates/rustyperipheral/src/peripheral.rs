//! Thermometer peripheral assembly
//!
//! Wires the GATT tree, the notification scheduler, the thermometer service
//! and the advertisement together behind one transport handle.

use crate::advertisement::{AdType, Advertisement, AdvertisementBuilder};
use crate::config::PeripheralConfig;
use crate::error::Result;
use crate::gatt::GattTree;
use crate::scheduler::NotificationScheduler;
use crate::thermometer::{service::THERMOMETER_SERVICE_UUID, TemperatureSensor, ThermometerService};
use crate::transport::Transport;
use std::sync::Arc;
use tracing::{info, warn};

/// A thermometer peripheral ready to be published
pub struct Peripheral {
    config: PeripheralConfig,
    transport: Arc<dyn Transport>,
    scheduler: Arc<NotificationScheduler>,
    tree: GattTree,
    thermometer: ThermometerService,
    advertisement: Advertisement,
}

impl Peripheral {
    /// Build a peripheral reading from the configured sensor source.
    ///
    /// Errors are tree construction errors and are fatal to startup.
    pub fn new(config: PeripheralConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let sensor = config.sensor.build();
        Self::with_sensor(config, transport, sensor)
    }

    /// Build a peripheral around an explicit sensor
    pub fn with_sensor(
        config: PeripheralConfig,
        transport: Arc<dyn Transport>,
        sensor: Arc<dyn TemperatureSensor>,
    ) -> Result<Self> {
        if let Err(e) = sensor.read_celsius() {
            warn!(error = %e, "temperature sensor unavailable, reads will fail until it recovers");
        }

        let scheduler = Arc::new(NotificationScheduler::new());
        let mut tree = GattTree::new(transport.clone());
        let thermometer = ThermometerService::install(
            &mut tree,
            scheduler.clone(),
            sensor,
            config.notify_interval,
        )?;

        let mut builder = AdvertisementBuilder::new(AdType::Peripheral);
        builder
            .add_local_name(config.local_name.clone())
            .add_service_uuid(THERMOMETER_SERVICE_UUID)
            .set_appearance(config.appearance);
        if let Some(include) = config.include_tx_power {
            builder.set_include_tx_power(include);
        }
        let advertisement = Advertisement::new(config.advertisement_index, builder.build());

        Ok(Self {
            config,
            transport,
            scheduler,
            tree,
            thermometer,
            advertisement,
        })
    }

    /// Register the advertisement with the platform advertising manager
    pub fn publish(&self) {
        info!(
            name = %self.config.local_name,
            objects = self.tree.managed_objects().len(),
            "publishing peripheral"
        );
        self.advertisement.register(self.transport.as_ref());
    }

    pub fn config(&self) -> &PeripheralConfig {
        &self.config
    }

    pub fn tree(&self) -> &GattTree {
        &self.tree
    }

    pub fn advertisement(&self) -> &Advertisement {
        &self.advertisement
    }

    pub fn thermometer(&self) -> &ThermometerService {
        &self.thermometer
    }

    pub fn scheduler(&self) -> &NotificationScheduler {
        &self.scheduler
    }
}

impl Drop for Peripheral {
    fn drop(&mut self) {
        self.scheduler.disarm_all();
    }
}
