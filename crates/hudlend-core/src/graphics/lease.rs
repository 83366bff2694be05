//! Leases and the scoped lease handle.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::thread;

use parking_lot::MutexGuard;
use serde::{Deserialize, Serialize};

use super::error::{LendError, ReleaseRejected};
use super::priority::Priority;
use super::service::DeviceLendingService;
use super::thread::ThreadIdentity;

/// Descriptive, copyable view of a lease (held or queued).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseInfo {
    /// Logical acquisition order, unique per service.
    pub ticket: u64,
    /// Effective tier after primary-thread promotion.
    pub priority: Priority,
    /// Thread that requested the lease.
    pub owner: ThreadIdentity,
}

/// Grant of exclusive device access.
///
/// Only [`DeviceLendingService::acquire`] creates one, and
/// [`DeviceLendingService::release`] consumes it. A lease is neither `Clone`
/// nor `Copy`, so the same lease cannot be returned twice.
#[must_use = "a lease that is never released blocks every other caller forever"]
pub struct Lease {
    service: u64,
    info: LeaseInfo,
}

impl Lease {
    pub(super) const fn new(service: u64, info: LeaseInfo) -> Self {
        Self { service, info }
    }

    /// Id of the issuing service.
    #[must_use]
    pub const fn service(&self) -> u64 {
        self.service
    }

    /// Snapshot of this lease's attributes.
    #[must_use]
    pub const fn info(&self) -> LeaseInfo {
        self.info
    }

    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.info.priority
    }

    #[must_use]
    pub const fn owner(&self) -> ThreadIdentity {
        self.info.owner
    }

    /// Acquisition ticket; higher tickets were requested later.
    #[must_use]
    pub const fn issued_at(&self) -> u64 {
        self.info.ticket
    }
}

impl fmt::Debug for Lease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lease")
            .field("service", &self.service)
            .field("ticket", &self.info.ticket)
            .field("priority", &self.info.priority)
            .field("owner", &self.info.owner)
            .finish()
    }
}

/// Scoped device access.
///
/// Created by [`DeviceLendingService::lend`], which blocks until the lease is
/// granted. Dereferences to the device for as long as it lives and returns
/// the lease exactly once when dropped, whichever way the scope is left.
///
/// The handle may be moved to and dropped on another thread. That is legal
/// but logged as a warning, since it usually means a lease outlived the work
/// it was taken for.
pub struct LeaseHandle<'a, D> {
    service: &'a DeviceLendingService<D>,
    device: Option<MutexGuard<'a, D>>,
    lease: Option<Lease>,
}

impl<'a, D> LeaseHandle<'a, D> {
    pub(super) fn new(
        service: &'a DeviceLendingService<D>,
        lease: Lease,
        device: MutexGuard<'a, D>,
    ) -> Self {
        Self {
            service,
            device: Some(device),
            lease: Some(lease),
        }
    }

    /// Attributes of the held lease.
    #[must_use]
    pub fn info(&self) -> LeaseInfo {
        self.held().info()
    }

    /// Effective priority the lease was granted at.
    #[must_use]
    pub fn priority(&self) -> Priority {
        self.held().priority()
    }

    /// Return the lease now instead of at end of scope.
    ///
    /// Unlike dropping, a misuse is reported as an error rather than a
    /// debug-build panic.
    pub fn release(mut self) -> Result<(), LendError> {
        self.device.take();
        match self.lease.take() {
            Some(lease) => self.service.finish(lease).map_err(ReleaseRejected::into_error),
            None => Ok(()),
        }
    }

    fn held(&self) -> &Lease {
        self.lease.as_ref().expect("lease is held until the handle is consumed")
    }
}

impl<D> Deref for LeaseHandle<'_, D> {
    type Target = D;

    fn deref(&self) -> &D {
        self.device
            .as_deref()
            .expect("device guard is held until the handle is consumed")
    }
}

impl<D> DerefMut for LeaseHandle<'_, D> {
    fn deref_mut(&mut self) -> &mut D {
        self.device
            .as_deref_mut()
            .expect("device guard is held until the handle is consumed")
    }
}

impl<D> Drop for LeaseHandle<'_, D> {
    fn drop(&mut self) {
        // Unlock the device before the next holder can be woken.
        self.device.take();

        let Some(lease) = self.lease.take() else {
            return;
        };

        if let Err(err) = self.service.finish(lease) {
            if cfg!(debug_assertions) && !thread::panicking() {
                panic!("{err}");
            }
        }
    }
}

impl<D> fmt::Debug for LeaseHandle<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeaseHandle")
            .field("service", &self.service.id())
            .field("lease", &self.lease)
            .finish_non_exhaustive()
    }
}
