//! Error types for the rustyperipheral library
//!
//! This module defines the error types used throughout the library.

use thiserror::Error;

/// Errors that can occur while building or serving the peripheral
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PeripheralError {
    #[error("Duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: u16 },

    #[error("Unknown service: {0}")]
    UnknownService(u16),

    #[error("Unknown characteristic {characteristic} in service {service}")]
    UnknownCharacteristic { service: u16, characteristic: u16 },

    #[error("Unknown descriptor {descriptor} on characteristic {service}/{characteristic}")]
    UnknownDescriptor {
        service: u16,
        characteristic: u16,
        descriptor: u16,
    },

    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Sensor unavailable: {0}")]
    SensorUnavailable(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to start notification task: {0}")]
    Scheduler(String),
}

/// Result type for peripheral operations
pub type Result<T> = std::result::Result<T, PeripheralError>;

impl PeripheralError {
    /// Setup-time errors describe a broken attribute tree and are fatal to startup
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            PeripheralError::DuplicateId { .. }
                | PeripheralError::UnknownService(_)
                | PeripheralError::UnknownCharacteristic { .. }
                | PeripheralError::UnknownDescriptor { .. }
        )
    }
}
