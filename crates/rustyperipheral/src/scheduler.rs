//! Periodic notification scheduler
//!
//! Each armed characteristic gets its own worker thread that sleeps for the
//! configured interval and then invokes the push function. Tasks for
//! different characteristics are independent of each other.
//!
//! Guarantees:
//! - at most one push function invocation per characteristic at a time,
//!   including across a re-arm;
//! - once [`NotificationScheduler::disarm`] returns, the push function of that
//!   characteristic is never invoked again.

use crate::error::{PeripheralError, Result};
use crate::gatt::{CharacteristicHandle, CharacteristicId};
use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

/// What a push function wants the scheduler to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskControl {
    /// Keep the task armed
    Continue,
    /// Cancel the task and return the characteristic to idle. The
    /// characteristic's behavior is not called back.
    Stop,
}

/// Cancellation signal shared between the scheduler and one worker
struct TaskSignal {
    cancelled: Mutex<bool>,
    wake: Condvar,
}

impl TaskSignal {
    fn new() -> Self {
        Self {
            cancelled: Mutex::new(false),
            wake: Condvar::new(),
        }
    }

    fn cancel(&self) {
        *self.cancelled.lock() = true;
        self.wake.notify_all();
    }

    /// Sleep for `interval` unless cancelled first. Returns true when cancelled.
    fn wait(&self, interval: Duration) -> bool {
        let mut cancelled = self.cancelled.lock();
        if !*cancelled {
            self.wake
                .wait_while_for(&mut cancelled, |cancelled| !*cancelled, interval);
        }
        *cancelled
    }
}

struct ArmedTask {
    generation: u64,
    signal: Arc<TaskSignal>,
    worker: JoinHandle<()>,
}

impl ArmedTask {
    /// Cancel and wait for the worker, unless called from the worker itself.
    /// In that case the worker exits once the running push function returns.
    fn stop(self) {
        self.signal.cancel();
        if self.worker.thread().id() == thread::current().id() {
            return;
        }
        if self.worker.join().is_err() {
            warn!("notification worker panicked");
        }
    }
}

type TaskTable = Mutex<HashMap<CharacteristicId, ArmedTask>>;

/// Runs one periodic push task per notifying characteristic
pub struct NotificationScheduler {
    tasks: Arc<TaskTable>,
    next_generation: AtomicU64,
}

impl NotificationScheduler {
    pub fn new() -> Self {
        Self {
            tasks: Arc::new(Mutex::new(HashMap::new())),
            next_generation: AtomicU64::new(0),
        }
    }

    /// Start pushing for `handle` every `interval`.
    ///
    /// A task already armed for the same characteristic is replaced. The task
    /// ends on its own when `push_fn` returns [`TaskControl::Stop`] or when the
    /// subscription it was armed for ended, even if a new one has started
    /// since.
    pub fn arm<F>(
        &self,
        handle: &CharacteristicHandle,
        interval: Duration,
        push_fn: F,
    ) -> Result<()>
    where
        F: FnMut() -> TaskControl + Send + 'static,
    {
        let id = handle.id();
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let signal = Arc::new(TaskSignal::new());

        // Held across spawn so a fast-exiting worker cannot remove its entry
        // before it is inserted
        let mut tasks = self.tasks.lock();

        let predecessor = tasks.remove(&id).map(|previous| {
            previous.signal.cancel();
            previous.worker
        });

        let task = WorkerTask {
            handle: handle.clone(),
            subscription: handle.subscription(),
            interval,
            generation,
            signal: signal.clone(),
            tasks: Arc::downgrade(&self.tasks),
            predecessor,
        };
        let worker = thread::Builder::new()
            .name(format!("notify-{}-{}", id.service, id.characteristic))
            .spawn(move || task.run(push_fn))
            .map_err(|e| PeripheralError::Scheduler(e.to_string()))?;

        tasks.insert(
            id,
            ArmedTask {
                generation,
                signal,
                worker,
            },
        );
        debug!(
            characteristic = %id,
            interval_ms = interval.as_millis() as u64,
            generation,
            "notification task armed"
        );
        Ok(())
    }

    /// Cancel the task for `handle`. Does nothing if none is armed.
    pub fn disarm(&self, handle: &CharacteristicHandle) {
        let task = self.tasks.lock().remove(&handle.id());
        if let Some(task) = task {
            debug!(
                characteristic = %handle.id(),
                generation = task.generation,
                "notification task disarmed"
            );
            task.stop();
        }
    }

    /// Whether a task is currently armed for `handle`
    pub fn is_armed(&self, handle: &CharacteristicHandle) -> bool {
        self.tasks.lock().contains_key(&handle.id())
    }

    /// Cancel every task
    pub fn disarm_all(&self) {
        let tasks: Vec<ArmedTask> = self.tasks.lock().drain().map(|(_, task)| task).collect();
        for task in tasks {
            task.stop();
        }
    }
}

impl Default for NotificationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for NotificationScheduler {
    fn drop(&mut self) {
        self.disarm_all();
    }
}

/// State moved into a worker thread
struct WorkerTask {
    handle: CharacteristicHandle,
    subscription: u64,
    interval: Duration,
    generation: u64,
    signal: Arc<TaskSignal>,
    tasks: Weak<TaskTable>,
    predecessor: Option<JoinHandle<()>>,
}

impl WorkerTask {
    fn run<F>(mut self, mut push_fn: F)
    where
        F: FnMut() -> TaskControl,
    {
        // The replaced task may still be inside its push function
        if let Some(predecessor) = self.predecessor.take() {
            if predecessor.join().is_err() {
                warn!(characteristic = %self.handle.id(), "replaced notification worker panicked");
            }
        }

        loop {
            if self.signal.wait(self.interval) {
                return;
            }

            if !self.handle.is_notifying() || self.handle.subscription() != self.subscription {
                debug!(characteristic = %self.handle.id(), "subscription ended, stopping task");
                break;
            }

            if push_fn() == TaskControl::Stop {
                debug!(characteristic = %self.handle.id(), "push function stopped task");
                self.handle.set_notifying(false);
                break;
            }
        }

        self.unregister();
    }

    fn unregister(&self) {
        let Some(tasks) = self.tasks.upgrade() else {
            return;
        };
        let mut tasks = tasks.lock();
        let id = self.handle.id();
        if tasks.get(&id).map(|t| t.generation) == Some(self.generation) {
            // Dropping our own JoinHandle detaches this thread
            tasks.remove(&id);
        }
    }
}
