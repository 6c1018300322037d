//! Unit tests for the GATT tree

use super::*;
use crate::error::{PeripheralError, Result};
use crate::mock::RecordingTransport;
use crate::transport::*;
use parking_lot::Mutex;
use std::sync::Arc;

/// Behavior that records every callback
#[derive(Default)]
struct CountingBehavior {
    reads: Mutex<usize>,
    writes: Mutex<Vec<(Vec<u8>, WriteOptions)>>,
    notify_calls: Mutex<Vec<bool>>,
    reject_writes: bool,
}

impl CharacteristicBehavior for CountingBehavior {
    fn read(&self, _characteristic: &CharacteristicHandle) -> Result<Vec<u8>> {
        *self.reads.lock() += 1;
        Ok(vec![0x2a])
    }

    fn write(
        &self,
        _characteristic: &CharacteristicHandle,
        value: &[u8],
        options: &WriteOptions,
    ) -> Result<()> {
        if self.reject_writes {
            return Err(PeripheralError::InvalidValue("rejected".into()));
        }
        self.writes.lock().push((value.to_vec(), options.clone()));
        Ok(())
    }

    fn on_notify(&self, notifying: bool, _characteristic: &CharacteristicHandle) -> Result<()> {
        self.notify_calls.lock().push(notifying);
        Ok(())
    }
}

fn new_tree() -> (Arc<RecordingTransport>, GattTree) {
    let transport = Arc::new(RecordingTransport::default());
    let tree = GattTree::new(transport.clone());
    (transport, tree)
}

fn read_only(tree: &mut GattTree, service_id: u16, char_id: u16) -> CharacteristicHandle {
    tree.add_characteristic(
        service_id,
        char_id,
        "2a29",
        CharacteristicFlags::READ,
        vec![],
        Arc::new(StoredValue),
    )
    .unwrap()
}

fn all_flags() -> CharacteristicFlags {
    CharacteristicFlags::READ | CharacteristicFlags::WRITE | CharacteristicFlags::NOTIFY
}

#[test]
fn test_register_service_rejects_duplicate_id() {
    let (_, mut tree) = new_tree();

    let handle = tree.register_service(1, "180a", true).unwrap();
    assert_eq!(handle.id, 1);
    assert_eq!(handle.path, "/org/bluez/example/service0001");

    let err = tree.register_service(1, "180f", false).unwrap_err();
    assert_eq!(
        err,
        PeripheralError::DuplicateId {
            kind: "service",
            id: 1
        }
    );
    assert!(err.is_structural());
}

#[test]
fn test_add_characteristic_errors_leave_tree_unchanged() {
    let (_, mut tree) = new_tree();
    tree.register_service(1, "180a", true).unwrap();

    let (flags, stored) = (CharacteristicFlags::READ, Arc::new(StoredValue));
    let err = tree
        .add_characteristic(2, 1, "2a29", flags, vec![], stored.clone())
        .unwrap_err();
    assert_eq!(err, PeripheralError::UnknownService(2));

    let acme = b"acme".to_vec();
    tree.add_characteristic(1, 1, "2a29", flags, acme, stored.clone())
        .unwrap();
    let other = b"other".to_vec();
    let err = tree
        .add_characteristic(1, 1, "2a24", CharacteristicFlags::WRITE, other, stored)
        .unwrap_err();
    assert_eq!(
        err,
        PeripheralError::DuplicateId {
            kind: "characteristic",
            id: 1
        }
    );

    // The original characteristic is still the only one, unchanged
    assert_eq!(tree.characteristics().count(), 1);
    assert_eq!(tree.handle_read(1, 1).unwrap(), b"acme".to_vec());
    let props = tree
        .get_properties(GattObject::Characteristic(1, 1), GATT_CHARACTERISTIC_IFACE)
        .unwrap();
    assert_eq!(props[PROP_UUID], PropertyValue::Str("2a29".into()));
}

#[test]
fn test_add_descriptor_errors() {
    let (_, mut tree) = new_tree();
    tree.register_service(1, "180a", true).unwrap();
    read_only(&mut tree, 1, 1);

    let err = tree
        .add_descriptor(1, 9, 1, "2901", vec![], DescriptorFlags::READ)
        .unwrap_err();
    assert_eq!(
        err,
        PeripheralError::UnknownCharacteristic {
            service: 1,
            characteristic: 9
        }
    );

    let err = tree
        .add_descriptor(7, 1, 1, "2901", vec![], DescriptorFlags::READ)
        .unwrap_err();
    assert!(matches!(err, PeripheralError::UnknownCharacteristic { .. }));

    tree.add_descriptor(1, 1, 1, "2901", b"Maker".to_vec(), DescriptorFlags::READ)
        .unwrap();
    let err = tree
        .add_descriptor(1, 1, 1, "2904", vec![0x0e], DescriptorFlags::READ)
        .unwrap_err();
    assert_eq!(
        err,
        PeripheralError::DuplicateId {
            kind: "descriptor",
            id: 1
        }
    );
}

#[test]
fn test_read_dispatches_to_behavior() {
    let (_, mut tree) = new_tree();
    tree.register_service(1, "180a", true).unwrap();
    let behavior = Arc::new(CountingBehavior::default());
    tree.add_characteristic(1, 1, "2a29", all_flags(), vec![0x01], behavior.clone())
        .unwrap();

    assert_eq!(tree.handle_read(1, 1).unwrap(), vec![0x2a]);
    assert_eq!(tree.handle_read(1, 1).unwrap(), vec![0x2a]);
    assert_eq!(*behavior.reads.lock(), 2);

    // Reading does not touch the cached value
    assert_eq!(tree.characteristic(1, 1).unwrap().value(), vec![0x01]);
}

#[test]
fn test_requests_require_capability_flags() {
    let (_, mut tree) = new_tree();
    tree.register_service(1, "180a", true).unwrap();
    let behavior = Arc::new(CountingBehavior::default());
    let flags = CharacteristicFlags::empty();
    tree.add_characteristic(1, 1, "2a29", flags, vec![], behavior.clone())
        .unwrap();

    assert_eq!(
        tree.handle_read(1, 1).unwrap_err(),
        PeripheralError::Unsupported("read")
    );
    assert_eq!(
        tree.handle_write(1, 1, b"x", &WriteOptions::default()).unwrap_err(),
        PeripheralError::Unsupported("write")
    );
    assert_eq!(
        tree.handle_subscribe(1, 1, true).unwrap_err(),
        PeripheralError::Unsupported("notify")
    );

    assert_eq!(*behavior.reads.lock(), 0);
    assert!(behavior.writes.lock().is_empty());
    assert!(behavior.notify_calls.lock().is_empty());
    let handle = tree.characteristic(1, 1).unwrap();
    assert_eq!(handle.notify_state(), NotifyState::Idle);
}

#[test]
fn test_unknown_targets() {
    let (_, mut tree) = new_tree();
    tree.register_service(1, "180a", true).unwrap();

    let err = tree.handle_read(5, 1).unwrap_err();
    assert_eq!(err, PeripheralError::UnknownService(5));
    assert_eq!(
        tree.handle_read(1, 5).unwrap_err(),
        PeripheralError::UnknownCharacteristic {
            service: 1,
            characteristic: 5
        }
    );
}

#[test]
fn test_write_propagates_behavior_failure() {
    let (_, mut tree) = new_tree();
    tree.register_service(1, "180a", true).unwrap();
    let ok = Arc::new(CountingBehavior::default());
    let rejecting = Arc::new(CountingBehavior {
        reject_writes: true,
        ..Default::default()
    });
    tree.add_characteristic(1, 1, "a", all_flags(), vec![], ok.clone()).unwrap();
    tree.add_characteristic(1, 2, "b", all_flags(), vec![], rejecting).unwrap();

    tree.handle_write(1, 1, b"hello", &WriteOptions::default()).unwrap();
    assert_eq!(
        *ok.writes.lock(),
        vec![(b"hello".to_vec(), WriteOptions::default())]
    );

    let err = tree.handle_write(1, 2, b"hello", &WriteOptions::default()).unwrap_err();
    assert!(matches!(err, PeripheralError::InvalidValue(_)));
    assert!(!err.is_structural());
}

#[test]
fn test_write_options_reach_behavior() {
    let (_, mut tree) = new_tree();
    tree.register_service(1, "180a", true).unwrap();
    let behavior = Arc::new(CountingBehavior::default());
    tree.add_characteristic(1, 1, "a", all_flags(), vec![], behavior.clone())
        .unwrap();

    let options = WriteOptions {
        offset: 2,
        without_response: true,
        device: Some("/org/bluez/hci0/dev_00_11_22_33_44_55".into()),
    };
    tree.handle_write(1, 1, b"lo", &options).unwrap();

    let writes = behavior.writes.lock();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].0, b"lo".to_vec());
    assert_eq!(writes[0].1, options);
}

#[test]
fn test_stored_value_round_trip_and_notify() {
    let (transport, mut tree) = new_tree();
    tree.register_service(1, "180a", true).unwrap();
    let old = b"old".to_vec();
    let handle = tree
        .add_characteristic(1, 1, "2a29", all_flags(), old, Arc::new(StoredValue))
        .unwrap();

    tree.handle_write(1, 1, b"new", &WriteOptions::default()).unwrap();
    assert_eq!(tree.handle_read(1, 1).unwrap(), b"new".to_vec());
    // Not notifying, nothing emitted
    assert_eq!(transport.notification_count(handle.path()), 0);

    tree.handle_subscribe(1, 1, true).unwrap();
    tree.handle_write(1, 1, b"newer", &WriteOptions::default()).unwrap();
    let sent = transport.notifications_for(handle.path());
    assert_eq!(sent, vec![b"newer".to_vec()]);
}

#[test]
fn test_subscribe_state_machine() {
    let (_, mut tree) = new_tree();
    tree.register_service(1, "180a", true).unwrap();
    let behavior = Arc::new(CountingBehavior::default());
    let handle = tree
        .add_characteristic(1, 1, "2a6e", all_flags(), vec![], behavior.clone())
        .unwrap();
    assert_eq!(handle.notify_state(), NotifyState::Idle);

    tree.handle_subscribe(1, 1, true).unwrap();
    assert_eq!(handle.notify_state(), NotifyState::Notifying);

    // Repeated subscribe is a no-op
    tree.handle_subscribe(1, 1, true).unwrap();

    tree.handle_subscribe(1, 1, false).unwrap();
    assert_eq!(handle.notify_state(), NotifyState::Idle);

    // Repeated unsubscribe is a no-op
    tree.handle_subscribe(1, 1, false).unwrap();

    assert_eq!(*behavior.notify_calls.lock(), vec![true, false]);
}

#[test]
fn test_descriptor_reads() {
    let (_, mut tree) = new_tree();
    tree.register_service(1, "180a", true).unwrap();
    read_only(&mut tree, 1, 1);
    let format = vec![0x0e, 0xfe, 0x2f, 0x27, 0x01, 0x00, 0x00];
    tree.add_descriptor(1, 1, 1, "2904", format, DescriptorFlags::READ)
        .unwrap();
    tree.add_descriptor(1, 1, 2, "2900", vec![0x00], DescriptorFlags::empty())
        .unwrap();

    assert_eq!(
        tree.read_descriptor(1, 1, 1).unwrap(),
        vec![0x0e, 0xfe, 0x2f, 0x27, 0x01, 0x00, 0x00]
    );
    assert_eq!(
        tree.read_descriptor(1, 1, 2).unwrap_err(),
        PeripheralError::Unsupported("read")
    );
    assert_eq!(
        tree.read_descriptor(1, 1, 3).unwrap_err(),
        PeripheralError::UnknownDescriptor {
            service: 1,
            characteristic: 1,
            descriptor: 3
        }
    );
}

#[test]
fn test_get_properties_checks_interface() {
    let (_, mut tree) = new_tree();
    tree.register_service(1, "9941f656-8e3e-11eb-8dcd-0242ac130003", true).unwrap();
    let flags = CharacteristicFlags::READ | CharacteristicFlags::NOTIFY;
    tree.add_characteristic(1, 1, "2A6E", flags, vec![0x01], Arc::new(StoredValue))
        .unwrap();
    tree.add_descriptor(1, 1, 1, "2901", b"Temp".to_vec(), DescriptorFlags::READ)
        .unwrap();

    let err = tree
        .get_properties(GattObject::Service(1), GATT_CHARACTERISTIC_IFACE)
        .unwrap_err();
    assert!(matches!(err, PeripheralError::InvalidArguments(_)));
    let err = tree
        .get_properties(GattObject::Characteristic(1, 1), LE_ADVERTISEMENT_IFACE)
        .unwrap_err();
    assert!(matches!(err, PeripheralError::InvalidArguments(_)));

    let service = tree.get_properties(GattObject::Service(1), GATT_SERVICE_IFACE).unwrap();
    assert_eq!(service[PROP_PRIMARY], PropertyValue::Bool(true));
    assert_eq!(
        service[PROP_CHARACTERISTICS],
        PropertyValue::PathArray(vec!["/org/bluez/example/service0001/char0001".into()])
    );

    let characteristic = tree
        .get_properties(GattObject::Characteristic(1, 1), GATT_CHARACTERISTIC_IFACE)
        .unwrap();
    assert_eq!(
        characteristic[PROP_SERVICE],
        PropertyValue::Path("/org/bluez/example/service0001".into())
    );
    assert_eq!(characteristic[PROP_NOTIFYING], PropertyValue::Bool(false));
    assert_eq!(
        characteristic[PROP_FLAGS],
        PropertyValue::StrArray(vec!["read".into(), "notify".into()])
    );
    assert_eq!(characteristic[PROP_VALUE], PropertyValue::Bytes(vec![0x01]));

    let descriptor = tree
        .get_properties(GattObject::Descriptor(1, 1, 1), GATT_DESCRIPTOR_IFACE)
        .unwrap();
    assert_eq!(
        descriptor[PROP_CHARACTERISTIC],
        PropertyValue::Path("/org/bluez/example/service0001/char0001".into())
    );
    let value = PropertyValue::Bytes(b"Temp".to_vec());
    assert_eq!(descriptor[PROP_VALUE], value);
}

#[test]
fn test_managed_objects_in_tree_order() {
    let (_, mut tree) = new_tree();
    tree.register_service(2, "180f", true).unwrap();
    tree.register_service(1, "180a", false).unwrap();
    read_only(&mut tree, 1, 1);
    tree.add_descriptor(1, 1, 1, "2901", vec![], DescriptorFlags::READ).unwrap();

    let paths: Vec<String> = tree.managed_objects().into_iter().map(|(p, _)| p).collect();
    assert_eq!(
        paths,
        vec![
            "/org/bluez/example/service0002",
            "/org/bluez/example/service0001",
            "/org/bluez/example/service0001/char0001",
            "/org/bluez/example/service0001/char0001/desc0001",
        ]
    );
}

#[test]
fn test_custom_base_path() {
    let transport = Arc::new(RecordingTransport::default());
    let mut tree = GattTree::with_base_path(transport, "/com/example/thermo");
    let service = tree.register_service(1, "181a", true).unwrap();
    let characteristic = read_only(&mut tree, 1, 3);
    tree.add_descriptor(1, 3, 2, "2901", vec![], DescriptorFlags::READ)
        .unwrap();

    assert_eq!(service.path, "/com/example/thermo/service0001");
    assert_eq!(
        characteristic.path(),
        "/com/example/thermo/service0001/char0003"
    );
    let paths: Vec<String> = tree.managed_objects().into_iter().map(|(p, _)| p).collect();
    assert_eq!(
        paths.last().map(String::as_str),
        Some("/com/example/thermo/service0001/char0003/desc0002")
    );
}
