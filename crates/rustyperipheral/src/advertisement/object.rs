//! Advertisement object exported to the platform advertising manager

use super::builder::AdvertisementProperties;
use crate::error::{PeripheralError, Result};
use crate::transport::*;
use tracing::{debug, error, info};

/// An addressable advertisement ready for registration
#[derive(Debug, Clone)]
pub struct Advertisement {
    path: String,
    properties: AdvertisementProperties,
}

impl Advertisement {
    /// Wrap a property snapshot under `/org/bluez/example/advertisement{index}`
    pub fn new(index: u32, properties: AdvertisementProperties) -> Self {
        Self {
            path: format!("{}{}", ADVERTISEMENT_PATH_BASE, index),
            properties,
        }
    }

    /// Object path of this advertisement
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Properties for one interface, as queried by the advertising manager
    pub fn get_properties(&self, interface: &str) -> Result<PropertyMap> {
        if interface != LE_ADVERTISEMENT_IFACE {
            return Err(PeripheralError::InvalidArguments(format!(
                "unknown interface {} on {}",
                interface, self.path
            )));
        }

        let props = self.properties.to_property_map();
        debug!(path = %self.path, ?props, "advertisement properties queried");
        Ok(props)
    }

    /// All interfaces exported by this object
    pub fn managed_properties(&self) -> InterfaceMap {
        let mut map = InterfaceMap::new();
        map.insert(
            LE_ADVERTISEMENT_IFACE.into(),
            self.properties.to_property_map(),
        );
        map
    }

    /// Register with the platform advertising manager.
    ///
    /// Completion is reported asynchronously and only logged; a failed
    /// registration is not retried.
    pub fn register(&self, transport: &dyn Transport) {
        let path = self.path.clone();
        info!(path = %path, "registering advertisement");

        transport.register_advertisement(
            &self.path,
            PropertyMap::new(),
            Box::new(move |result| match result {
                Ok(()) => info!(path = %path, "advertisement registered"),
                Err(e) => error!(path = %path, error = %e, "failed to register advertisement"),
            }),
        );
    }

    /// Called by the advertising manager when it drops the advertisement
    pub fn release(&self) {
        info!(path = %self.path, "advertisement released");
    }
}
