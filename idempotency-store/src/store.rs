//! Single-flight key→record map.

use crate::config::{IdempotencyConfig, InFlightPolicy};
use crate::error::{Error, Result};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Notify;

/// The cached outcome of a single `execute` call.
#[derive(Debug, Clone)]
pub struct Outcome<T> {
    /// The operation's return value.
    pub result: T,
    /// A caller-chosen status code (e.g. an HTTP status) cached alongside it.
    pub status_code: u16,
}

enum SlotState<T> {
    InProgress,
    Done { outcome: Outcome<T>, expires_at: Instant },
}

struct Slot<T> {
    state: Mutex<SlotState<T>>,
    notify: Notify,
}

impl<T> Slot<T> {
    fn in_progress() -> Self {
        Self { state: Mutex::new(SlotState::InProgress), notify: Notify::new() }
    }
}

/// Key→record map with TTL and single-flight execution.
pub struct IdempotencyStore<T> {
    config: IdempotencyConfig,
    slots: DashMap<String, Arc<Slot<T>>>,
}

impl<T: Clone + Send + Sync + 'static> IdempotencyStore<T> {
    /// Build a store from `config`.
    pub fn new(config: IdempotencyConfig) -> Self {
        Self { config, slots: DashMap::new() }
    }

    /// Run `operation` under `key`'s single-flight guard.
    ///
    /// - No record for `key`: this call becomes the owner, runs `operation`,
    ///   and caches the outcome for `ttl`.
    /// - A record is in progress: wait for it (up to `wait_cap`) or reject,
    ///   per the configured [`InFlightPolicy`].
    /// - A completed, unexpired record exists: return it without re-running.
    pub async fn execute<F, Fut>(&self, key: &str, operation: F) -> Result<Outcome<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Outcome<T>>,
    {
        if key.is_empty() {
            return Err(Error::MissingKey);
        }

        loop {
            let (slot, owns_execution) = self.claim(key);

            if owns_execution {
                let outcome = operation().await;
                let expires_at = Instant::now() + self.config.ttl;
                *slot.state.lock() = SlotState::Done { outcome: outcome.clone(), expires_at };
                slot.notify.notify_waiters();
                return Ok(outcome);
            }

            let notified = slot.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let snapshot = match &*slot.state.lock() {
                SlotState::Done { outcome, expires_at } => Some((outcome.clone(), *expires_at)),
                SlotState::InProgress => None,
            };

            match snapshot {
                Some((outcome, expires_at)) => {
                    if Instant::now() >= expires_at {
                        self.evict_if_current(key, &slot);
                        continue;
                    }
                    return Ok(outcome);
                }
                None => match self.config.in_flight_policy {
                    InFlightPolicy::Reject => return Err(Error::Conflict),
                    InFlightPolicy::Wait => {
                        match tokio::time::timeout(self.config.wait_cap, notified).await {
                            Err(_) => return Err(Error::WaitTimeout),
                            Ok(()) => continue,
                        }
                    }
                },
            }
        }
    }

    /// Get or create the slot for `key`, reporting whether this call is the
    /// one responsible for running the operation.
    fn claim(&self, key: &str) -> (Arc<Slot<T>>, bool) {
        match self.slots.entry(key.to_string()) {
            Entry::Occupied(e) => (e.get().clone(), false),
            Entry::Vacant(e) => {
                let slot = Arc::new(Slot::in_progress());
                e.insert(slot.clone());
                (slot, true)
            }
        }
    }

    fn evict_if_current(&self, key: &str, slot: &Arc<Slot<T>>) {
        self.slots.remove_if(key, |_, current| Arc::ptr_eq(current, slot));
    }

    /// Drop expired, completed records. In-progress records are never evicted
    /// by age since they have no `expires_at` yet.
    pub fn sweep_expired(&self) {
        let now = Instant::now();
        self.slots.retain(|_, slot| match &*slot.state.lock() {
            SlotState::Done { expires_at, .. } => *expires_at > now,
            SlotState::InProgress => true,
        });
    }

    /// Number of records currently held (including in-progress ones).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
