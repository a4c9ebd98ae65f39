//! Per-key re-entry guard.
//!
//! An operation claims its key before doing any work; a second claim for
//! the same key fails until the first [`InFlightGuard`] is dropped.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Default, Clone)]
pub struct InFlightSet {
    keys: Arc<Mutex<HashSet<String>>>,
}

/// RAII guard that releases its key on drop.
#[derive(Debug)]
pub struct InFlightGuard {
    keys: Arc<Mutex<HashSet<String>>>,
    key: String,
}

impl InFlightSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key`, or `None` if it is already in flight.
    pub fn try_claim(&self, key: &str) -> Option<InFlightGuard> {
        let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        if !keys.insert(key.to_string()) {
            return None;
        }
        Some(InFlightGuard {
            keys: Arc::clone(&self.keys),
            key: key.to_string(),
        })
    }

    pub fn is_in_flight(&self, key: &str) -> bool {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_claim_is_refused_until_release() {
        let set = InFlightSet::new();
        let guard = set.try_claim("u1").unwrap();
        assert!(set.try_claim("u1").is_none());
        assert!(set.try_claim("u2").is_some());
        assert!(set.is_in_flight("u1"));

        drop(guard);
        assert!(!set.is_in_flight("u1"));
        assert!(set.try_claim("u1").is_some());
    }
}
