use std::sync::{Mutex, MutexGuard, PoisonError};

/// Single-slot, most-recent-wins handoff between one producer and one consumer.
///
/// `publish` never blocks on the consumer: an unconsumed value is simply
/// replaced. `take` empties the slot, `peek` leaves it in place.
pub struct Mailbox<T> {
    slot: Mutex<Option<T>>,
}

impl<T> Mailbox<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    pub fn publish(&self, value: T) {
        *self.lock() = Some(value);
    }

    pub fn take(&self) -> Option<T> {
        self.lock().take()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_none()
    }

    // A panicking producer cannot leave a half-written Option behind, so the
    // poisoned guard is still safe to use.
    fn lock(&self) -> MutexGuard<'_, Option<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone> Mailbox<T> {
    pub fn peek(&self) -> Option<T> {
        self.lock().clone()
    }
}

impl<T> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}
