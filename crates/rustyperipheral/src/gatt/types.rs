//! Common types for the GATT tree
//!
//! This module defines the identifiers, capability flags and request options
//! shared by the tree and the characteristic behaviors.

use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Characteristic capabilities, bit values as in the characteristic
    /// declaration properties field
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CharacteristicFlags: u8 {
        const READ = 0x02;
        const WRITE = 0x08;
        const NOTIFY = 0x10;
    }
}

impl CharacteristicFlags {
    pub fn can_read(&self) -> bool {
        self.contains(Self::READ)
    }

    pub fn can_write(&self) -> bool {
        self.contains(Self::WRITE)
    }

    pub fn can_notify(&self) -> bool {
        self.contains(Self::NOTIFY)
    }

    /// Flag names in the form the platform daemon expects
    pub fn names(&self) -> Vec<String> {
        let mut names = Vec::new();
        if self.can_read() {
            names.push("read".to_string());
        }
        if self.can_write() {
            names.push("write".to_string());
        }
        if self.can_notify() {
            names.push("notify".to_string());
        }
        names
    }
}

bitflags! {
    /// Descriptor capabilities
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DescriptorFlags: u8 {
        const READ = 0x01;
    }
}

impl DescriptorFlags {
    pub fn can_read(&self) -> bool {
        self.contains(Self::READ)
    }

    pub fn names(&self) -> Vec<String> {
        if self.can_read() {
            vec!["read".to_string()]
        } else {
            Vec::new()
        }
    }
}

/// Service id and characteristic id pair addressing one characteristic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CharacteristicId {
    pub service: u16,
    pub characteristic: u16,
}

impl CharacteristicId {
    pub fn new(service: u16, characteristic: u16) -> Self {
        Self {
            service,
            characteristic,
        }
    }
}

impl fmt::Display for CharacteristicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.service, self.characteristic)
    }
}

/// Notification state of a characteristic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyState {
    Idle,
    Notifying,
}

/// Options delivered with a write request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Offset into the value
    pub offset: u16,
    /// Write command (no response expected)
    pub without_response: bool,
    /// Object path of the writing device, if known
    pub device: Option<String>,
}

/// Handle to a registered service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceHandle {
    pub id: u16,
    pub path: String,
}

/// Addresses one object in the tree for property export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GattObject {
    Service(u16),
    Characteristic(u16, u16),
    Descriptor(u16, u16, u16),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_names() {
        let flags = CharacteristicFlags::READ | CharacteristicFlags::NOTIFY;
        assert_eq!(flags.names(), vec!["read", "notify"]);
        assert!(!flags.can_write());
        assert_eq!(flags.bits(), 0x12);

        assert!(DescriptorFlags::empty().names().is_empty());
    }
}
