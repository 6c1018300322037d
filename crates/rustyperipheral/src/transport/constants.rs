// Interfaces exported to the platform Bluetooth daemon
pub const LE_ADVERTISEMENT_IFACE: &str = "org.bluez.LEAdvertisement1";
pub const GATT_SERVICE_IFACE: &str = "org.bluez.GattService1";
pub const GATT_CHARACTERISTIC_IFACE: &str = "org.bluez.GattCharacteristic1";
pub const GATT_DESCRIPTOR_IFACE: &str = "org.bluez.GattDescriptor1";

// Object path roots
pub const ADVERTISEMENT_PATH_BASE: &str = "/org/bluez/example/advertisement";
pub const APPLICATION_PATH_BASE: &str = "/org/bluez/example";

// Advertisement property keys
pub const PROP_TYPE: &str = "Type";
pub const PROP_LOCAL_NAME: &str = "LocalName";
pub const PROP_SERVICE_UUIDS: &str = "ServiceUUIDs";
pub const PROP_SOLICIT_UUIDS: &str = "SolicitUUIDs";
pub const PROP_MANUFACTURER_DATA: &str = "ManufacturerData";
pub const PROP_SERVICE_DATA: &str = "ServiceData";
pub const PROP_INCLUDE_TX_POWER: &str = "IncludeTxPower";
pub const PROP_INCLUDES: &str = "Includes";
pub const PROP_APPEARANCE: &str = "Appearance";

// GATT object property keys
pub const PROP_UUID: &str = "UUID";
pub const PROP_PRIMARY: &str = "Primary";
pub const PROP_SERVICE: &str = "Service";
pub const PROP_CHARACTERISTIC: &str = "Characteristic";
pub const PROP_CHARACTERISTICS: &str = "Characteristics";
pub const PROP_DESCRIPTORS: &str = "Descriptors";
pub const PROP_VALUE: &str = "Value";
pub const PROP_NOTIFYING: &str = "Notifying";
pub const PROP_FLAGS: &str = "Flags";
