//! Device lending error types.

use thiserror::Error;

use super::lease::Lease;

/// Errors raised by the device lending service.
///
/// These indicate a broken exclusion invariant in the caller, not a
/// recoverable condition. Debug builds panic before returning them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LendError {
    /// The lease being returned is not the one currently outstanding on
    /// this service (issued by another service, or already superseded).
    #[error("lease #{ticket} from service {issuer} is not the outstanding lease of service {service}")]
    NotHolder {
        /// Ticket of the rejected lease.
        ticket: u64,
        /// Service that issued the lease.
        issuer: u64,
        /// Service the lease was returned to.
        service: u64,
    },
}

/// A release the service refused, with the lease handed back.
///
/// The lease is still outstanding on the service that issued it. Pass it to
/// that service's [`release`](super::DeviceLendingService::release) or that
/// service stays locked.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct ReleaseRejected {
    error: LendError,
    lease: Lease,
}

impl ReleaseRejected {
    pub(super) const fn new(error: LendError, lease: Lease) -> Self {
        Self { error, lease }
    }

    /// Why the release was refused.
    #[must_use]
    pub const fn error(&self) -> &LendError {
        &self.error
    }

    /// Take back the lease.
    pub fn into_lease(self) -> Lease {
        self.lease
    }

    /// Drop the lease and keep only the reason.
    #[must_use]
    pub fn into_error(self) -> LendError {
        self.error
    }
}
