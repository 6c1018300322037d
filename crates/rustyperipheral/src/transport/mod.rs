//! Transport boundary to the platform Bluetooth stack
//!
//! The peripheral never talks to the radio directly. Everything it needs from
//! the outside world goes through a [`Transport`] handle that is created once
//! and passed to the components that use it.

pub mod constants;
pub mod properties;

pub use self::constants::*;
pub use self::properties::{InterfaceMap, PropertyMap, PropertyValue};

use crate::error::Result;

/// Completion callback for an asynchronous registration call
pub type RegistrationReply = Box<dyn FnOnce(Result<()>) + Send + 'static>;

/// Operations the peripheral needs from the platform stack
pub trait Transport: Send + Sync {
    /// Ask the platform advertising manager to start advertising the object
    /// at `path`. The reply is invoked exactly once, possibly from another
    /// thread.
    fn register_advertisement(&self, path: &str, options: PropertyMap, reply: RegistrationReply);

    /// Emit a value change for a notifying characteristic
    fn notify_value(&self, path: &str, value: &[u8]) -> Result<()>;
}
