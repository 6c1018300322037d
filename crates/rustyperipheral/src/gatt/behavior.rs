//! Pluggable characteristic behaviors

use super::handle::CharacteristicHandle;
use super::types::WriteOptions;
use crate::error::Result;

/// Read/write/notify logic attached to a characteristic at registration time.
///
/// Every method runs synchronously on the thread that delivered the request.
/// The defaults implement a plain stored value.
pub trait CharacteristicBehavior: Send + Sync {
    /// Produce the bytes returned to a read request
    fn read(&self, characteristic: &CharacteristicHandle) -> Result<Vec<u8>> {
        Ok(characteristic.value())
    }

    /// Apply a write request
    fn write(
        &self,
        characteristic: &CharacteristicHandle,
        value: &[u8],
        _options: &WriteOptions,
    ) -> Result<()> {
        characteristic.set_value(value)
    }

    /// The client started (`true`) or stopped (`false`) notifications
    fn on_notify(&self, _notifying: bool, _characteristic: &CharacteristicHandle) -> Result<()> {
        Ok(())
    }
}

/// Behavior that serves the cached value as-is
#[derive(Debug, Clone, Copy, Default)]
pub struct StoredValue;

impl CharacteristicBehavior for StoredValue {}
