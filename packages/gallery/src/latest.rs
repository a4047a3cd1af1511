//! Last-requested-wins slot for overlapping pipeline invocations.
//!
//! Each invocation takes a [`Ticket`] before it starts. Its result is applied
//! only if no newer ticket has been issued in the meantime, so a slow early
//! refresh can never overwrite the result of a later one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::debug;

use crate::metrics::METRICS;

/// Issued by [`LatestSlot::begin`]; higher tickets were requested later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn get(self) -> u64 {
        self.0
    }
}

pub struct LatestSlot<T> {
    issued: AtomicU64,
    current: RwLock<Option<(Ticket, Arc<T>)>>,
}

impl<T> Default for LatestSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LatestSlot<T> {
    pub fn new() -> Self {
        Self {
            issued: AtomicU64::new(0),
            current: RwLock::new(None),
        }
    }

    /// Register a new invocation.
    pub fn begin(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Apply `value` if `ticket` is still the newest. Returns whether it was applied.
    pub fn commit(&self, ticket: Ticket, value: T) -> bool {
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        let newest = self.issued.load(Ordering::Acquire);
        let superseded = current.as_ref().is_some_and(|(held, _)| *held >= ticket);
        if ticket.0 != newest || superseded {
            METRICS.stale_discards.fetch_add(1, Ordering::Relaxed);
            debug!(ticket = ticket.0, newest, "Discarding stale result");
            return false;
        }
        *current = Some((ticket, Arc::new(value)));
        true
    }

    /// Last applied value and the ticket it was committed under.
    pub fn snapshot(&self) -> Option<(Ticket, Arc<T>)> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|(ticket, value)| (*ticket, Arc::clone(value)))
    }

    /// Number of invocations begun so far.
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::Acquire)
    }
}
