// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! A counting signal the host can hand to native code.
//!
//! On Linux the signal is an unnamed POSIX semaphore whose [`Signal::handle`] is a valid
//! `sem_t*`, so the native side may `sem_post` it directly. Elsewhere an in-process
//! condition variable stands in and the handle is opaque.

use std::{ffi::c_void, io, time::Duration};

mod condvar;
#[cfg(target_os = "linux")]
mod posix;

pub use condvar::CondvarSignal;
#[cfg(target_os = "linux")]
pub use posix::PosixSemaphore;

#[derive(Debug, thiserror::Error)]
pub enum SignalError {
	#[error("signal is closed")]
	Closed,

	#[error("{operation} failed: {source}")]
	Os {
		operation: &'static str,
		#[source]
		source: io::Error,
	},
}

pub type Result<T> = std::result::Result<T, SignalError>;

pub trait Signal: Send + Sync {
	/// Increments the count, waking one waiter.
	fn post(&self) -> Result<()>;

	/// Blocks until the count is positive, then decrements it.
	fn wait(&self) -> Result<()>;

	/// Like [`Signal::wait`] but gives up after `timeout`. Returns whether the signal was taken.
	fn wait_timeout(&self, timeout: Duration) -> Result<bool>;

	/// Takes the signal if it is available without blocking.
	fn try_wait(&self) -> Result<bool>;

	/// Drops every pending post.
	fn reset(&self) -> Result<()> {
		while self.try_wait()? {}
		Ok(())
	}

	/// Wakes every blocked waiter with [`SignalError::Closed`]. Further operations fail the same way.
	fn close(&self) -> Result<()>;

	/// Address to pass to native code.
	fn handle(&self) -> *mut c_void;
}

/// The signal implementation for the platform this crate was built for.
#[cfg(target_os = "linux")]
pub type PlatformSignal = PosixSemaphore;
#[cfg(not(target_os = "linux"))]
pub type PlatformSignal = CondvarSignal;

pub fn platform_signal() -> Result<Box<dyn Signal>> {
	Ok(Box::new(PlatformSignal::new()?))
}
