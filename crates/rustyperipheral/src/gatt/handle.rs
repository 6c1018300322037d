//! Runtime state of a characteristic
//!
//! The tree owns the shape; a [`CharacteristicHandle`] is the piece a behavior
//! or scheduler task holds on to. Handles are cheap to clone and all clones
//! share the same cached value and notification flag.

use super::types::{CharacteristicId, NotifyState};
use crate::error::Result;
use crate::transport::Transport;
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{trace, warn};

struct CharacteristicState {
    value: RwLock<Vec<u8>>,
    notifying: AtomicBool,
    // Bumped on every notifying transition
    subscription: AtomicU64,
    // Serializes pushes and notifying transitions
    push_lock: Mutex<()>,
}

/// Shared handle onto one characteristic
#[derive(Clone)]
pub struct CharacteristicHandle {
    id: CharacteristicId,
    path: Arc<str>,
    state: Arc<CharacteristicState>,
    transport: Arc<dyn Transport>,
}

impl CharacteristicHandle {
    pub(crate) fn new(
        id: CharacteristicId,
        path: String,
        initial_value: Vec<u8>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            id,
            path: path.into(),
            state: Arc::new(CharacteristicState {
                value: RwLock::new(initial_value),
                notifying: AtomicBool::new(false),
                subscription: AtomicU64::new(0),
                push_lock: Mutex::new(()),
            }),
            transport,
        }
    }

    pub fn id(&self) -> CharacteristicId {
        self.id
    }

    /// Object path of the characteristic
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Last cached value
    pub fn value(&self) -> Vec<u8> {
        self.state.value.read().clone()
    }

    pub fn is_notifying(&self) -> bool {
        self.state.notifying.load(Ordering::Acquire)
    }

    pub fn notify_state(&self) -> NotifyState {
        if self.is_notifying() {
            NotifyState::Notifying
        } else {
            NotifyState::Idle
        }
    }

    /// Identifies the current subscription. Changes whenever notifications
    /// are started or stopped, so a stop followed by a restart is visible
    /// even though the flag ends up unchanged.
    pub fn subscription(&self) -> u64 {
        self.state.subscription.load(Ordering::Acquire)
    }

    /// Update the notification flag. Waits for an in-flight push to finish.
    /// Returns the previous state.
    pub(crate) fn set_notifying(&self, notifying: bool) -> bool {
        let _guard = self.state.push_lock.lock();
        let previous = self.state.notifying.swap(notifying, Ordering::AcqRel);
        if previous != notifying {
            self.state.subscription.fetch_add(1, Ordering::AcqRel);
        }
        previous
    }

    /// Store a new value and emit it to the client when notifying
    pub fn set_value(&self, value: &[u8]) -> Result<()> {
        *self.state.value.write() = value.to_vec();

        if self.is_notifying() {
            trace!(characteristic = %self.id, value = %hex::encode(value), "notify");
            self.transport.notify_value(&self.path, value)?;
        }
        Ok(())
    }

    /// Produce and push a fresh value if the characteristic is notifying.
    ///
    /// Pushes for the same characteristic never overlap. Returns whether a
    /// value was pushed.
    pub fn push_with<F>(&self, produce: F) -> Result<bool>
    where
        F: FnOnce() -> Result<Vec<u8>>,
    {
        let _guard = self.state.push_lock.lock();
        if !self.is_notifying() {
            return Ok(false);
        }

        let value = produce()?;
        if let Err(e) = self.set_value(&value) {
            warn!(characteristic = %self.id, error = %e, "failed to deliver notification");
            return Err(e);
        }
        Ok(true)
    }
}

impl fmt::Debug for CharacteristicHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CharacteristicHandle")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("notifying", &self.is_notifying())
            .finish()
    }
}
