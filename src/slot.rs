use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// An output slot owned by the submitter and written by a job.
///
/// Cloning a `JobSlot` yields another handle to the same slot: keep one,
/// move the other into the job. The pool itself never sees it.
pub struct JobSlot<T> {
    value: Arc<Mutex<Option<T>>>,
}

impl<T> JobSlot<T> {
    /// Creates an empty slot.
    pub fn new() -> Self {
        JobSlot {
            value: Arc::new(Mutex::new(None)),
        }
    }

    /// Stores `value`, replacing whatever was there.
    pub fn fill(&self, value: T) {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = Some(value);
    }

    /// Removes and returns the stored value.
    pub fn take(&self) -> Option<T> {
        self.value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Returns `true` if a value has been stored and not taken.
    pub fn is_filled(&self) -> bool {
        self.value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl<T: Clone> JobSlot<T> {
    /// Returns a copy of the stored value.
    pub fn get(&self) -> Option<T> {
        self.value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<T> Clone for JobSlot<T> {
    fn clone(&self) -> Self {
        JobSlot {
            value: Arc::clone(&self.value),
        }
    }
}

impl<T> Default for JobSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for JobSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.value.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_tuple("JobSlot").field(&*value).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_value() {
        let slot = JobSlot::new();
        let writer = slot.clone();
        assert!(!slot.is_filled());

        writer.fill(1);
        writer.fill(2);
        assert_eq!(slot.get(), Some(2));
        assert_eq!(slot.take(), Some(2));
        assert!(!writer.is_filled());
    }
}
