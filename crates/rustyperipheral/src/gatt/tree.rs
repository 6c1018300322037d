//! GATT attribute tree
//!
//! Holds the service/characteristic/descriptor hierarchy and routes client
//! requests to the behavior registered for each characteristic. The tree is
//! populated through `&mut self` before publishing; request dispatch only
//! needs `&self`, so its shape cannot change once it is shared.

use super::behavior::CharacteristicBehavior;
use super::handle::CharacteristicHandle;
use super::types::*;
use crate::error::{PeripheralError, Result};
use crate::transport::*;
use std::sync::Arc;
use tracing::{debug, info};

/// GATT characteristic descriptor
#[derive(Debug, Clone)]
pub struct Descriptor {
    /// Descriptor id, unique within its characteristic
    pub id: u16,
    /// Descriptor UUID
    pub uuid: String,
    /// Static descriptor value
    pub value: Vec<u8>,
    /// Descriptor capabilities
    pub flags: DescriptorFlags,
    /// Object path
    pub path: String,
}

/// GATT characteristic with its behavior and descriptors
struct GattCharacteristic {
    id: u16,
    uuid: String,
    flags: CharacteristicFlags,
    handle: CharacteristicHandle,
    behavior: Arc<dyn CharacteristicBehavior>,
    descriptors: Vec<Descriptor>,
}

/// A GATT service with characteristics
struct GattService {
    id: u16,
    uuid: String,
    primary: bool,
    path: String,
    characteristics: Vec<GattCharacteristic>,
}

/// The attribute tree served to a connected client
pub struct GattTree {
    /// Transport used to emit notifications
    transport: Arc<dyn Transport>,
    /// Root object path for service paths
    base_path: String,
    /// Services in registration order
    services: Vec<GattService>,
}

impl GattTree {
    /// Create an empty tree rooted at the default application path
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_base_path(transport, APPLICATION_PATH_BASE)
    }

    /// Create an empty tree rooted at `base_path`
    pub fn with_base_path(transport: Arc<dyn Transport>, base_path: impl Into<String>) -> Self {
        Self {
            transport,
            base_path: base_path.into(),
            services: Vec::new(),
        }
    }

    /// Add a service to the tree
    pub fn register_service(
        &mut self,
        id: u16,
        uuid: impl Into<String>,
        primary: bool,
    ) -> Result<ServiceHandle> {
        if self.services.iter().any(|s| s.id == id) {
            return Err(PeripheralError::DuplicateId {
                kind: "service",
                id,
            });
        }

        let uuid = uuid.into();
        let path = format!("{}/service{:04}", self.base_path, id);
        debug!(service = id, %uuid, primary, "registering service");

        self.services.push(GattService {
            id,
            uuid,
            primary,
            path: path.clone(),
            characteristics: Vec::new(),
        });

        Ok(ServiceHandle { id, path })
    }

    /// Add a characteristic to a service
    ///
    /// On error the tree is left untouched.
    pub fn add_characteristic(
        &mut self,
        service_id: u16,
        char_id: u16,
        uuid: impl Into<String>,
        flags: CharacteristicFlags,
        initial_value: Vec<u8>,
        behavior: Arc<dyn CharacteristicBehavior>,
    ) -> Result<CharacteristicHandle> {
        // Find the service
        let service = self
            .services
            .iter_mut()
            .find(|s| s.id == service_id)
            .ok_or(PeripheralError::UnknownService(service_id))?;

        if service.characteristics.iter().any(|c| c.id == char_id) {
            return Err(PeripheralError::DuplicateId {
                kind: "characteristic",
                id: char_id,
            });
        }

        let uuid = uuid.into();
        let path = format!("{}/char{:04}", service.path, char_id);
        let handle = CharacteristicHandle::new(
            CharacteristicId::new(service_id, char_id),
            path,
            initial_value,
            self.transport.clone(),
        );
        debug!(
            service = service_id,
            characteristic = char_id,
            %uuid,
            flags = ?flags.names(),
            "registering characteristic"
        );

        service.characteristics.push(GattCharacteristic {
            id: char_id,
            uuid,
            flags,
            handle: handle.clone(),
            behavior,
            descriptors: Vec::new(),
        });

        Ok(handle)
    }

    /// Add a descriptor to a characteristic
    pub fn add_descriptor(
        &mut self,
        service_id: u16,
        char_id: u16,
        desc_id: u16,
        uuid: impl Into<String>,
        value: Vec<u8>,
        flags: DescriptorFlags,
    ) -> Result<()> {
        let characteristic = self
            .services
            .iter_mut()
            .find(|s| s.id == service_id)
            .and_then(|s| s.characteristics.iter_mut().find(|c| c.id == char_id))
            .ok_or(PeripheralError::UnknownCharacteristic {
                service: service_id,
                characteristic: char_id,
            })?;

        if characteristic.descriptors.iter().any(|d| d.id == desc_id) {
            return Err(PeripheralError::DuplicateId {
                kind: "descriptor",
                id: desc_id,
            });
        }

        let uuid = uuid.into();
        debug!(
            service = service_id,
            characteristic = char_id,
            descriptor = desc_id,
            %uuid,
            "registering descriptor"
        );

        let path = format!("{}/desc{:04}", characteristic.handle.path(), desc_id);
        characteristic.descriptors.push(Descriptor {
            id: desc_id,
            uuid,
            value,
            flags,
            path,
        });

        Ok(())
    }

    /// Serve a read request
    pub fn handle_read(&self, service_id: u16, char_id: u16) -> Result<Vec<u8>> {
        let characteristic = self.find_characteristic(service_id, char_id)?;
        if !characteristic.flags.can_read() {
            return Err(PeripheralError::Unsupported("read"));
        }

        let value = characteristic.behavior.read(&characteristic.handle)?;
        let id = characteristic.handle.id();
        debug!(characteristic = %id, value = %hex::encode(&value), "read");
        Ok(value)
    }

    /// Serve a write request
    pub fn handle_write(
        &self,
        service_id: u16,
        char_id: u16,
        value: &[u8],
        options: &WriteOptions,
    ) -> Result<()> {
        let characteristic = self.find_characteristic(service_id, char_id)?;
        if !characteristic.flags.can_write() {
            return Err(PeripheralError::Unsupported("write"));
        }

        let id = characteristic.handle.id();
        debug!(characteristic = %id, value = %hex::encode(value), "write");
        characteristic
            .behavior
            .write(&characteristic.handle, value, options)
    }

    /// Start (`want_notify == true`) or stop notifications.
    ///
    /// Asking for the state the characteristic is already in does nothing.
    pub fn handle_subscribe(&self, service_id: u16, char_id: u16, want_notify: bool) -> Result<()> {
        let characteristic = self.find_characteristic(service_id, char_id)?;
        if !characteristic.flags.can_notify() {
            return Err(PeripheralError::Unsupported("notify"));
        }

        let handle = &characteristic.handle;
        let was_notifying = handle.set_notifying(want_notify);
        if was_notifying == want_notify {
            debug!(
                characteristic = %handle.id(),
                notifying = want_notify,
                "notification state unchanged"
            );
            return Ok(());
        }

        info!(
            characteristic = %handle.id(),
            notifying = want_notify,
            "notification state changed"
        );
        if let Err(e) = characteristic.behavior.on_notify(want_notify, handle) {
            handle.set_notifying(was_notifying);
            return Err(e);
        }
        Ok(())
    }

    /// Serve a descriptor read
    pub fn read_descriptor(&self, service_id: u16, char_id: u16, desc_id: u16) -> Result<Vec<u8>> {
        let descriptor = self.find_descriptor(service_id, char_id, desc_id)?;
        if !descriptor.flags.can_read() {
            return Err(PeripheralError::Unsupported("read"));
        }
        Ok(descriptor.value.clone())
    }

    /// Look up the runtime handle of a characteristic
    pub fn characteristic(&self, service_id: u16, char_id: u16) -> Result<CharacteristicHandle> {
        self.find_characteristic(service_id, char_id)
            .map(|c| c.handle.clone())
    }

    /// Properties of one object on one interface
    pub fn get_properties(&self, object: GattObject, interface: &str) -> Result<PropertyMap> {
        let expected = match object {
            GattObject::Service(_) => GATT_SERVICE_IFACE,
            GattObject::Characteristic(..) => GATT_CHARACTERISTIC_IFACE,
            GattObject::Descriptor(..) => GATT_DESCRIPTOR_IFACE,
        };
        if interface != expected {
            return Err(PeripheralError::InvalidArguments(format!(
                "unknown interface {}, expected {}",
                interface, expected
            )));
        }

        match object {
            GattObject::Service(sid) => Ok(self.service_properties(self.find_service(sid)?)),
            GattObject::Characteristic(sid, cid) => {
                let service = self.find_service(sid)?;
                Ok(Self::characteristic_properties(
                    service,
                    self.find_characteristic(sid, cid)?,
                ))
            }
            GattObject::Descriptor(sid, cid, did) => {
                let characteristic = self.find_characteristic(sid, cid)?;
                Ok(Self::descriptor_properties(
                    characteristic,
                    self.find_descriptor(sid, cid, did)?,
                ))
            }
        }
    }

    /// Every object in the tree with its interface properties, in tree order
    pub fn managed_objects(&self) -> Vec<(String, InterfaceMap)> {
        let mut objects = Vec::new();

        for service in &self.services {
            let mut ifaces = InterfaceMap::new();
            ifaces.insert(GATT_SERVICE_IFACE.into(), self.service_properties(service));
            objects.push((service.path.clone(), ifaces));

            for characteristic in &service.characteristics {
                let mut ifaces = InterfaceMap::new();
                ifaces.insert(
                    GATT_CHARACTERISTIC_IFACE.into(),
                    Self::characteristic_properties(service, characteristic),
                );
                objects.push((characteristic.handle.path().to_string(), ifaces));

                for descriptor in &characteristic.descriptors {
                    let mut ifaces = InterfaceMap::new();
                    ifaces.insert(
                        GATT_DESCRIPTOR_IFACE.into(),
                        Self::descriptor_properties(characteristic, descriptor),
                    );
                    objects.push((descriptor.path.clone(), ifaces));
                }
            }
        }

        objects
    }

    /// Iterate over every characteristic handle in the tree
    pub fn characteristics(&self) -> impl Iterator<Item = &CharacteristicHandle> {
        self.services
            .iter()
            .flat_map(|s| s.characteristics.iter().map(|c| &c.handle))
    }

    fn service_properties(&self, service: &GattService) -> PropertyMap {
        let mut props = PropertyMap::new();
        props.insert(PROP_UUID.into(), PropertyValue::Str(service.uuid.clone()));
        props.insert(PROP_PRIMARY.into(), PropertyValue::Bool(service.primary));
        props.insert(
            PROP_CHARACTERISTICS.into(),
            PropertyValue::PathArray(
                service
                    .characteristics
                    .iter()
                    .map(|c| c.handle.path().to_string())
                    .collect(),
            ),
        );
        props
    }

    fn characteristic_properties(
        service: &GattService,
        characteristic: &GattCharacteristic,
    ) -> PropertyMap {
        let mut props = PropertyMap::new();
        props.insert(
            PROP_UUID.into(),
            PropertyValue::Str(characteristic.uuid.clone()),
        );
        props.insert(
            PROP_SERVICE.into(),
            PropertyValue::Path(service.path.clone()),
        );
        props.insert(
            PROP_VALUE.into(),
            PropertyValue::Bytes(characteristic.handle.value()),
        );
        props.insert(
            PROP_NOTIFYING.into(),
            PropertyValue::Bool(characteristic.handle.is_notifying()),
        );
        props.insert(
            PROP_FLAGS.into(),
            PropertyValue::StrArray(characteristic.flags.names()),
        );
        props.insert(
            PROP_DESCRIPTORS.into(),
            PropertyValue::PathArray(
                characteristic
                    .descriptors
                    .iter()
                    .map(|d| d.path.clone())
                    .collect(),
            ),
        );
        props
    }

    fn descriptor_properties(
        characteristic: &GattCharacteristic,
        descriptor: &Descriptor,
    ) -> PropertyMap {
        let mut props = PropertyMap::new();
        props.insert(
            PROP_UUID.into(),
            PropertyValue::Str(descriptor.uuid.clone()),
        );
        props.insert(
            PROP_CHARACTERISTIC.into(),
            PropertyValue::Path(characteristic.handle.path().to_string()),
        );
        props.insert(
            PROP_VALUE.into(),
            PropertyValue::Bytes(descriptor.value.clone()),
        );
        props.insert(
            PROP_FLAGS.into(),
            PropertyValue::StrArray(descriptor.flags.names()),
        );
        props
    }

    fn find_service(&self, service_id: u16) -> Result<&GattService> {
        self.services
            .iter()
            .find(|s| s.id == service_id)
            .ok_or(PeripheralError::UnknownService(service_id))
    }

    fn find_characteristic(&self, service_id: u16, char_id: u16) -> Result<&GattCharacteristic> {
        self.find_service(service_id)?
            .characteristics
            .iter()
            .find(|c| c.id == char_id)
            .ok_or(PeripheralError::UnknownCharacteristic {
                service: service_id,
                characteristic: char_id,
            })
    }

    fn find_descriptor(&self, service_id: u16, char_id: u16, desc_id: u16) -> Result<&Descriptor> {
        self.find_characteristic(service_id, char_id)?
            .descriptors
            .iter()
            .find(|d| d.id == desc_id)
            .ok_or(PeripheralError::UnknownDescriptor {
                service: service_id,
                characteristic: char_id,
                descriptor: desc_id,
            })
    }
}
