//! GATT (Generic Attribute Profile) server side
//!
//! This module provides the service/characteristic/descriptor tree and the
//! behavior interface that serves client read, write and notify requests.

pub mod behavior;
pub mod handle;
pub mod tree;
pub mod types;

#[cfg(test)]
mod tests;

pub use behavior::{CharacteristicBehavior, StoredValue};
pub use handle::CharacteristicHandle;
pub use tree::{Descriptor, GattTree};
pub use types::{
    CharacteristicFlags, CharacteristicId, DescriptorFlags, GattObject, NotifyState,
    ServiceHandle, WriteOptions,
};
