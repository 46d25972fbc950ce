//! Ownership of the single live status subscription.
//!
//! A [`SubscriptionSlot`] holds at most one running subscription task,
//! tagged with a caller-chosen kind. [`SubscriptionSlot::acquire`] is the
//! only way to start one, and it aborts whatever the slot held before, of
//! any kind: last writer wins, nothing is queued.
//!
//! The running task receives a [`Lease`]. When the task ends on its own (the
//! feed closed, or it completed the install), it hands the lease back so the
//! slot reads as empty. A lease from a replaced subscription cannot clear its
//! successor.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::task::JoinHandle;

struct ActiveSubscription<K> {
    id: u64,
    kind: K,
    task: JoinHandle<()>,
}

type Shared<K> = Mutex<Option<ActiveSubscription<K>>>;

fn lock<K>(shared: &Shared<K>) -> MutexGuard<'_, Option<ActiveSubscription<K>>> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Slot holding zero or one running subscription task of kind `K`.
pub struct SubscriptionSlot<K = ()> {
    active: Arc<Shared<K>>,
    next_id: AtomicU64,
}

/// Proof of ownership handed to a running subscription task.
pub struct Lease<K = ()> {
    id: u64,
    slot: Weak<Shared<K>>,
}

impl<K> fmt::Debug for Lease<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lease").field("id", &self.id).finish()
    }
}

impl<K> Lease<K> {
    /// Vacate the slot if this lease still owns it.
    pub fn release(self) {
        let Some(shared) = self.slot.upgrade() else {
            return;
        };
        let mut active = lock(&shared);
        if active.as_ref().is_some_and(|current| current.id == self.id) {
            active.take();
        }
    }
}

impl<K> SubscriptionSlot<K> {
    pub fn new() -> Self {
        Self {
            active: Arc::new(Mutex::new(None)),
            next_id: AtomicU64::new(0),
        }
    }

    /// Start a new subscription task of `kind`, aborting the one currently
    /// held whatever its kind.
    ///
    /// `start` receives the [`Lease`] for the new subscription and returns
    /// the future to run. Returns `true` if a still-running subscription was
    /// replaced.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn acquire<F, Fut>(&self, kind: K, start: F) -> bool
    where
        F: FnOnce(Lease<K>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let lease = Lease {
            id,
            slot: Arc::downgrade(&self.active),
        };

        // The new task cannot release its lease before it is stored: release
        // needs this lock.
        let mut active = lock(&self.active);
        let replaced = active.take().is_some_and(abort);
        let task = tokio::spawn(start(lease));
        *active = Some(ActiveSubscription { id, kind, task });
        replaced
    }

    /// Abort the held subscription, if any.
    ///
    /// Returns `true` if a running subscription was stopped. Calling this on
    /// an empty slot is a no-op.
    pub fn release(&self) -> bool {
        let previous = lock(&self.active).take();
        previous.is_some_and(abort)
    }

    /// Whether a subscription task is currently running.
    pub fn is_active(&self) -> bool {
        lock(&self.active)
            .as_ref()
            .is_some_and(|current| !current.task.is_finished())
    }

    /// The kind of the running subscription task, if any.
    pub fn active_kind(&self) -> Option<K>
    where
        K: Copy,
    {
        lock(&self.active)
            .as_ref()
            .filter(|current| !current.task.is_finished())
            .map(|current| current.kind)
    }
}

fn abort<K>(subscription: ActiveSubscription<K>) -> bool {
    let was_running = !subscription.task.is_finished();
    subscription.task.abort();
    was_running
}

impl<K> Default for SubscriptionSlot<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Drop for SubscriptionSlot<K> {
    fn drop(&mut self) {
        self.release();
    }
}
