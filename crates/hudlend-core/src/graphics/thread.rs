//! Thread identity bookkeeping.
//!
//! Two concerns live here:
//! - [`ThreadIdentity`]: a small numeric id per OS thread, used as a
//!   structured log field when leases are lent and returned.
//! - [`PrimaryThreadProbe`]: the injected answer to "is the caller the
//!   designated primary (render) thread?". The lending service uses it to
//!   promote every request from that thread to high priority.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, ThreadId};

use serde::{Deserialize, Serialize};

static NEXT_THREAD_IDENTITY: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static CURRENT_IDENTITY: ThreadIdentity =
        ThreadIdentity(NEXT_THREAD_IDENTITY.fetch_add(1, Ordering::Relaxed));
}

/// Process-unique numeric identity of an OS thread.
///
/// Assigned lazily the first time a thread asks for it and stable for the
/// rest of that thread's life. Identities are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadIdentity(u64);

impl ThreadIdentity {
    /// Identity of the calling thread.
    #[must_use]
    pub fn current() -> Self {
        CURRENT_IDENTITY.with(|id| *id)
    }

    /// Raw numeric value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ThreadIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Answers whether the calling thread is the designated primary thread.
///
/// Injected into the lending service at construction so the primary-thread
/// rule can be exercised without a real render loop.
#[cfg_attr(test, mockall::automock)]
pub trait PrimaryThreadProbe: Send + Sync {
    /// `true` if the current thread is the primary thread.
    fn is_primary_thread(&self) -> bool;
}

/// Probe bound to a single, fixed [`ThreadId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DesignatedThread {
    id: ThreadId,
}

impl DesignatedThread {
    /// Designate the calling thread as primary.
    ///
    /// Call this once from the render thread during startup.
    #[must_use]
    pub fn current() -> Self {
        Self {
            id: thread::current().id(),
        }
    }

    /// Designate an arbitrary thread (e.g. from a `JoinHandle`).
    #[must_use]
    pub const fn from_id(id: ThreadId) -> Self {
        Self { id }
    }

    /// The designated thread's id.
    #[must_use]
    pub const fn id(&self) -> ThreadId {
        self.id
    }
}

impl PrimaryThreadProbe for DesignatedThread {
    fn is_primary_thread(&self) -> bool {
        thread::current().id() == self.id
    }
}

/// Probe for hosts without a render loop: no thread is ever primary.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrimaryThread;

impl PrimaryThreadProbe for NoPrimaryThread {
    fn is_primary_thread(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_stable_within_a_thread() {
        assert_eq!(ThreadIdentity::current(), ThreadIdentity::current());
    }

    #[test]
    fn identities_differ_across_threads() {
        let here = ThreadIdentity::current();
        let there = thread::spawn(ThreadIdentity::current).join().unwrap();
        assert_ne!(here, there);
    }

    #[test]
    fn designated_thread_only_matches_itself() {
        let primary = DesignatedThread::current();
        assert!(primary.is_primary_thread());

        let elsewhere = thread::spawn(move || primary.is_primary_thread())
            .join()
            .unwrap();
        assert!(!elsewhere);
    }

    #[test]
    fn designated_from_spawned_thread_id() {
        let worker = thread::spawn(|| {});
        let primary = DesignatedThread::from_id(worker.thread().id());
        worker.join().unwrap();
        assert!(!primary.is_primary_thread());
    }

    #[test]
    fn no_primary_thread_is_never_primary() {
        assert!(!NoPrimaryThread.is_primary_thread());
    }
}
