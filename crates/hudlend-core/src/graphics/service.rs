//! The device lending service.
//!
//! Owns the single shared graphics device and hands out exclusive, ordered
//! access to it:
//!
//! - exactly one lease is outstanding at any instant
//! - queued high-priority requests go before queued low-priority ones
//! - requests of equal priority are served in arrival order
//! - requests made on the primary thread are always high priority
//!
//! # Design
//!
//! Waiters sit in one FIFO queue per tier, each parked on its own condvar.
//! On release the service picks the next waiter itself (high queue first),
//! installs it as holder and wakes only that waiter, so newcomers can never
//! slip in between a release and the woken waiter. The queue state has its
//! own mutex; the device sits behind a separate one that only the current
//! holder ever locks.
//!
//! There is no reentrancy. A thread that already holds the lease and asks
//! again waits for itself forever; the service logs a warning when it sees
//! this happen, and nothing more.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};

use super::error::{LendError, ReleaseRejected};
use super::lease::{Lease, LeaseHandle, LeaseInfo};
use super::priority::Priority;
use super::thread::{PrimaryThreadProbe, ThreadIdentity};

static NEXT_SERVICE_ID: AtomicU64 = AtomicU64::new(1);

/// Point-in-time view of the service, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LendingSnapshot {
    /// The outstanding lease, if any.
    pub holder: Option<LeaseInfo>,
    /// High-priority requests waiting.
    pub queued_high: usize,
    /// Low-priority requests waiting.
    pub queued_low: usize,
    /// Leases granted since the service was created.
    pub total_grants: u64,
}

impl LendingSnapshot {
    /// Whether nobody holds or waits for the device.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.holder.is_none() && self.queued_high == 0 && self.queued_low == 0
    }

    /// Total number of waiting requests.
    #[must_use]
    pub const fn queued(&self) -> usize {
        self.queued_high + self.queued_low
    }
}

/// A queued request and the condvar its thread is parked on.
#[derive(Debug)]
struct Waiter {
    info: LeaseInfo,
    wake: Arc<Condvar>,
}

#[derive(Debug, Default)]
struct LendState {
    holder: Option<LeaseInfo>,
    high: VecDeque<Waiter>,
    low: VecDeque<Waiter>,
    next_ticket: u64,
    total_grants: u64,
    /// Times a queued thread returned from its wait.
    #[cfg(test)]
    wakeups: u64,
}

impl LendState {
    fn issue(&mut self, priority: Priority, owner: ThreadIdentity) -> LeaseInfo {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        LeaseInfo {
            ticket,
            priority,
            owner,
        }
    }

    fn grant(&mut self, lease: LeaseInfo) {
        self.holder = Some(lease);
        self.total_grants += 1;
    }

    fn enqueue(&mut self, waiter: Waiter) {
        match waiter.info.priority {
            Priority::High => self.high.push_back(waiter),
            Priority::Low => self.low.push_back(waiter),
        }
    }

    fn next_waiter(&mut self) -> Option<Waiter> {
        self.high.pop_front().or_else(|| self.low.pop_front())
    }

    fn holds(&self, ticket: u64) -> bool {
        self.holder.is_some_and(|holder| holder.ticket == ticket)
    }
}

/// Arbitrates exclusive access to a single, non-thread-safe device.
///
/// Share it between threads behind an `Arc` (or a scoped borrow) and use
/// [`lend`](Self::lend) for scoped access. [`acquire`](Self::acquire) and
/// [`release`](Self::release) are the raw primitives underneath.
pub struct DeviceLendingService<D> {
    id: u64,
    device: Mutex<D>,
    state: Mutex<LendState>,
    primary: Arc<dyn PrimaryThreadProbe>,
}

impl<D> DeviceLendingService<D> {
    /// Take ownership of `device`.
    ///
    /// `primary` decides which thread's requests are always promoted to
    /// [`Priority::High`].
    pub fn new(device: D, primary: Arc<dyn PrimaryThreadProbe>) -> Self {
        let id = NEXT_SERVICE_ID.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(service = id, "Device lending service created");
        Self {
            id,
            device: Mutex::new(device),
            state: Mutex::new(LendState::default()),
            primary,
        }
    }

    /// Process-unique id of this service.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Whether the calling thread is the designated primary thread.
    #[must_use]
    pub fn is_primary_thread(&self) -> bool {
        self.primary.is_primary_thread()
    }

    /// Block until the device is granted to the caller.
    ///
    /// On the primary thread `requested` is ignored and the request is
    /// treated as high priority. There is no timeout and no cancellation;
    /// calling this while already holding a lease on the same thread
    /// deadlocks.
    pub fn acquire(&self, requested: Priority) -> Lease {
        let owner = ThreadIdentity::current();
        let priority = if self.is_primary_thread() {
            Priority::High
        } else {
            requested
        };

        let mut state = self.state.lock();
        let request = state.issue(priority, owner);

        if let Some(holder) = state.holder {
            if holder.owner == owner {
                tracing::warn!(
                    service = self.id,
                    thread = %owner,
                    held_ticket = holder.ticket,
                    "Thread is requesting the device while already holding it; this will not return"
                );
            }

            let wake = Arc::new(Condvar::new());
            state.enqueue(Waiter {
                info: request,
                wake: Arc::clone(&wake),
            });
            tracing::debug!(
                service = self.id,
                priority = %priority,
                thread = %owner,
                ticket = request.ticket,
                queued_high = state.high.len(),
                queued_low = state.low.len(),
                "Waiting for device"
            );

            while !state.holds(request.ticket) {
                wake.wait(&mut state);
                #[cfg(test)]
                {
                    state.wakeups += 1;
                }
            }
        } else {
            // Queues are only ever non-empty while someone holds the lease.
            debug_assert!(state.high.is_empty() && state.low.is_empty());
            state.grant(request);
        }
        drop(state);

        tracing::debug!(
            service = self.id,
            priority = %priority,
            thread = %owner,
            ticket = request.ticket,
            "+++ Lend device"
        );

        Lease::new(self.id, request)
    }

    /// Return a lease and pass the device to the next waiter.
    ///
    /// Returning a lease that is not the outstanding one is a programming
    /// error: it panics in debug builds. In release builds it is logged and
    /// the lease comes back inside the error, untouched, so it can still be
    /// returned to the service that issued it.
    pub fn release(&self, lease: Lease) -> Result<(), ReleaseRejected> {
        let result = self.finish(lease);
        if let Err(err) = &result {
            if cfg!(debug_assertions) {
                panic!("{err}");
            }
        }
        result
    }

    /// Acquire and wrap the lease in a scoped handle.
    pub fn lend(&self, priority: Priority) -> LeaseHandle<'_, D> {
        let lease = self.acquire(priority);
        let device = self.device.lock();
        LeaseHandle::new(self, lease, device)
    }

    /// Shorthand for `lend(Priority::High)`.
    pub fn lend_high(&self) -> LeaseHandle<'_, D> {
        self.lend(Priority::High)
    }

    /// Shorthand for `lend(Priority::Low)`.
    pub fn lend_low(&self) -> LeaseHandle<'_, D> {
        self.lend(Priority::Low)
    }

    /// Run `f` against the device under a raw lease.
    ///
    /// Fails if `lease` is not the outstanding lease of this service.
    pub fn with_device<R>(
        &self,
        lease: &Lease,
        f: impl FnOnce(&mut D) -> R,
    ) -> Result<R, LendError> {
        if !self.is_outstanding(lease) {
            return Err(self.not_holder(lease));
        }
        let mut device = self.device.lock();
        Ok(f(&mut device))
    }

    /// Current holder and queue depths.
    #[must_use]
    pub fn snapshot(&self) -> LendingSnapshot {
        let state = self.state.lock();
        LendingSnapshot {
            holder: state.holder,
            queued_high: state.high.len(),
            queued_low: state.low.len(),
            total_grants: state.total_grants,
        }
    }

    /// Return a lease without the debug-build panic on misuse.
    pub(super) fn finish(&self, lease: Lease) -> Result<(), ReleaseRejected> {
        let info = lease.info();
        let releasing_thread = ThreadIdentity::current();

        let mut state = self.state.lock();
        if lease.service() != self.id || !state.holds(info.ticket) {
            drop(state);
            let err = self.not_holder(&lease);
            tracing::error!(
                service = self.id,
                issuer = lease.service(),
                ticket = info.ticket,
                thread = %releasing_thread,
                "Rejected release of a lease that is not outstanding"
            );
            return Err(ReleaseRejected::new(err, lease));
        }

        state.holder = None;
        let next = state.next_waiter();
        if let Some(next) = &next {
            state.grant(next.info);
        }
        drop(state);

        tracing::debug!(
            service = self.id,
            priority = %info.priority,
            thread = %info.owner,
            ticket = info.ticket,
            "--- Return device"
        );

        if releasing_thread != info.owner {
            tracing::warn!(
                service = self.id,
                ticket = info.ticket,
                acquired_on = %info.owner,
                released_on = %releasing_thread,
                "Device returned on a different thread than it was lent on"
            );
        }

        if let Some(next) = next {
            next.wake.notify_one();
        }
        Ok(())
    }

    fn is_outstanding(&self, lease: &Lease) -> bool {
        lease.service() == self.id && self.state.lock().holds(lease.issued_at())
    }

    const fn not_holder(&self, lease: &Lease) -> LendError {
        LendError::NotHolder {
            ticket: lease.issued_at(),
            issuer: lease.service(),
            service: self.id,
        }
    }
}

impl<D> fmt::Debug for DeviceLendingService<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceLendingService")
            .field("id", &self.id)
            .field("snapshot", &self.snapshot())
            .finish_non_exhaustive()
    }
}
