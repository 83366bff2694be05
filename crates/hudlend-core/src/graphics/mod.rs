//! Shared graphics device lending.
//!
//! The overlay owns exactly one graphics device, and that device is not
//! thread-safe. Every thread that wants to draw, upload or read back goes
//! through a [`DeviceLendingService`]:
//!
//! ```no_run
//! use std::sync::Arc;
//! use hudlend_core::graphics::{DesignatedThread, DeviceLendingService, Priority};
//!
//! # struct Device;
//! # impl Device { fn upload(&mut self) {} }
//! let service = DeviceLendingService::new(Device, Arc::new(DesignatedThread::current()));
//! {
//!     let mut device = service.lend(Priority::Low);
//!     device.upload();
//! } // returned here
//! ```

mod error;
mod lease;
mod priority;
mod service;
mod thread;

pub use error::{LendError, ReleaseRejected};
pub use lease::{Lease, LeaseHandle, LeaseInfo};
pub use priority::Priority;
pub use service::{DeviceLendingService, LendingSnapshot};
pub use thread::{DesignatedThread, NoPrimaryThread, PrimaryThreadProbe, ThreadIdentity};
