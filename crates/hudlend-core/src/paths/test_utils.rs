//! Environment isolation for tests that read `HUDLEND_DATA_DIR`.

use std::env;

use parking_lot::{Mutex, MutexGuard};

static ENV_LOCK: Mutex<()> = parking_lot::const_mutex(());

/// Holds the process-wide env lock and one variable's overridden value.
///
/// The previous value is put back, and the lock released, on drop. Two
/// tests overriding variables therefore never run at the same time.
pub struct ScopedEnvVar {
    key: &'static str,
    previous: Option<String>,
    _lock: MutexGuard<'static, ()>,
}

impl ScopedEnvVar {
    pub fn set(key: &'static str, value: &str) -> Self {
        Self::apply(key, Some(value))
    }

    pub fn unset(key: &'static str) -> Self {
        Self::apply(key, None)
    }

    #[allow(unsafe_code)]
    fn apply(key: &'static str, value: Option<&str>) -> Self {
        let lock = ENV_LOCK.lock();
        let previous = env::var(key).ok();
        // SAFETY: every test that mutates the environment holds ENV_LOCK.
        unsafe {
            match value {
                Some(value) => env::set_var(key, value),
                None => env::remove_var(key),
            }
        }
        Self {
            key,
            previous,
            _lock: lock,
        }
    }
}

impl Drop for ScopedEnvVar {
    #[allow(unsafe_code)]
    fn drop(&mut self) {
        // SAFETY: ENV_LOCK is still held; `_lock` is dropped after this body.
        unsafe {
            match self.previous.take() {
                Some(value) => env::set_var(self.key, value),
                None => env::remove_var(self.key),
            }
        }
    }
}
