//! Advertisement property accumulation
//!
//! Fields are collected through `add_*` calls in any order and frozen into an
//! [`AdvertisementProperties`] snapshot by [`AdvertisementBuilder::build`].

use crate::transport::*;
use std::collections::BTreeMap;
use std::fmt;

/// Advertising packet type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdType {
    /// Non-connectable broadcast
    Broadcast,
    /// Connectable peripheral
    Peripheral,
}

impl AdType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdType::Broadcast => "broadcast",
            AdType::Peripheral => "peripheral",
        }
    }
}

impl fmt::Display for AdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable advertisement property snapshot
///
/// `None` means the field was never set and must not be exported at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvertisementProperties {
    pub ad_type: AdType,
    pub local_name: Option<String>,
    pub includes: Option<Vec<String>>,
    pub service_uuids: Option<Vec<String>>,
    pub solicit_uuids: Option<Vec<String>>,
    pub manufacturer_data: Option<BTreeMap<u16, Vec<u8>>>,
    pub service_data: Option<BTreeMap<String, Vec<u8>>>,
    pub include_tx_power: Option<bool>,
    pub appearance: u16,
}

impl AdvertisementProperties {
    /// Encode into the property map exported on the advertisement interface.
    /// Only set fields are emitted; `Appearance` is always present.
    pub fn to_property_map(&self) -> PropertyMap {
        let mut props = PropertyMap::new();
        props.insert(
            PROP_TYPE.into(),
            PropertyValue::Str(self.ad_type.as_str().into()),
        );

        if let Some(name) = &self.local_name {
            props.insert(PROP_LOCAL_NAME.into(), PropertyValue::Str(name.clone()));
        }
        if let Some(uuids) = &self.service_uuids {
            props.insert(
                PROP_SERVICE_UUIDS.into(),
                PropertyValue::StrArray(uuids.clone()),
            );
        }
        if let Some(uuids) = &self.solicit_uuids {
            props.insert(
                PROP_SOLICIT_UUIDS.into(),
                PropertyValue::StrArray(uuids.clone()),
            );
        }
        if let Some(data) = &self.manufacturer_data {
            props.insert(
                PROP_MANUFACTURER_DATA.into(),
                PropertyValue::U16ByteMap(data.clone()),
            );
        }
        if let Some(data) = &self.service_data {
            props.insert(
                PROP_SERVICE_DATA.into(),
                PropertyValue::StrByteMap(data.clone()),
            );
        }
        if let Some(include) = self.include_tx_power {
            props.insert(PROP_INCLUDE_TX_POWER.into(), PropertyValue::Bool(include));
        }
        if let Some(includes) = &self.includes {
            props.insert(
                PROP_INCLUDES.into(),
                PropertyValue::StrArray(includes.clone()),
            );
        }

        props.insert(PROP_APPEARANCE.into(), PropertyValue::U16(self.appearance));
        props
    }
}

/// Incremental advertisement builder
#[derive(Debug, Clone)]
pub struct AdvertisementBuilder {
    props: AdvertisementProperties,
}

impl AdvertisementBuilder {
    /// Start an empty advertisement of the given type
    pub fn new(ad_type: AdType) -> Self {
        Self {
            props: AdvertisementProperties {
                ad_type,
                local_name: None,
                includes: None,
                service_uuids: None,
                solicit_uuids: None,
                manufacturer_data: None,
                service_data: None,
                include_tx_power: None,
                appearance: 0,
            },
        }
    }

    /// Append a service UUID. Repeated UUIDs are kept.
    pub fn add_service_uuid(&mut self, uuid: impl Into<String>) -> &mut Self {
        self.props
            .service_uuids
            .get_or_insert_with(Vec::new)
            .push(uuid.into());
        self
    }

    /// Append a solicited service UUID. Repeated UUIDs are kept.
    pub fn add_solicit_uuid(&mut self, uuid: impl Into<String>) -> &mut Self {
        self.props
            .solicit_uuids
            .get_or_insert_with(Vec::new)
            .push(uuid.into());
        self
    }

    /// Set the manufacturer data for a company code, replacing any previous entry
    pub fn add_manufacturer_data(
        &mut self,
        company_code: u16,
        data: impl Into<Vec<u8>>,
    ) -> &mut Self {
        self.props
            .manufacturer_data
            .get_or_insert_with(BTreeMap::new)
            .insert(company_code, data.into());
        self
    }

    /// Set the service data for a UUID, replacing any previous entry
    pub fn add_service_data(
        &mut self,
        uuid: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> &mut Self {
        self.props
            .service_data
            .get_or_insert_with(BTreeMap::new)
            .insert(uuid.into(), data.into());
        self
    }

    /// Set the local name. The last call wins.
    pub fn add_local_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.props.local_name = Some(name.into());
        self
    }

    /// Ask the daemon to include a generated field (e.g. "tx-power")
    pub fn include_field(&mut self, field: impl Into<String>) -> &mut Self {
        self.props
            .includes
            .get_or_insert_with(Vec::new)
            .push(field.into());
        self
    }

    pub fn set_appearance(&mut self, appearance: u16) -> &mut Self {
        self.props.appearance = appearance;
        self
    }

    pub fn set_include_tx_power(&mut self, include: bool) -> &mut Self {
        self.props.include_tx_power = Some(include);
        self
    }

    /// Freeze the accumulated fields
    pub fn build(&self) -> AdvertisementProperties {
        self.props.clone()
    }
}
