// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	cell::UnsafeCell,
	ffi::c_void,
	io,
	mem::MaybeUninit,
	sync::atomic::{AtomicBool, AtomicUsize, Ordering},
	time::Duration,
};

use tracing::{trace, warn};

use crate::{Result, Signal, SignalError};

/// Unnamed POSIX semaphore, private to the process.
///
/// The `sem_t` lives on the heap so its address stays fixed for native code holding the handle.
/// It is destroyed only on drop; [`Signal::close`] releases blocked waiters with
/// [`SignalError::Closed`] and leaves the semaphore itself intact.
pub struct PosixSemaphore {
	sem: Box<UnsafeCell<libc::sem_t>>,
	closed: AtomicBool,
	waiters: AtomicUsize,
}

// SAFETY: sem_t is designed for concurrent use from multiple threads.
unsafe impl Send for PosixSemaphore {}
unsafe impl Sync for PosixSemaphore {}

impl PosixSemaphore {
	pub fn new() -> Result<Self> {
		// SAFETY: sem_init fully initialises the zeroed storage.
		let sem: Box<UnsafeCell<libc::sem_t>> = Box::new(UnsafeCell::new(unsafe { MaybeUninit::zeroed().assume_init() }));
		if unsafe { libc::sem_init(sem.get(), 0, 0) } != 0 {
			return Err(os_error("sem_init"));
		}
		trace!(handle = ?sem.get(), "semaphore created");
		Ok(Self {
			sem,
			closed: AtomicBool::new(false),
			waiters: AtomicUsize::new(0),
		})
	}

	fn is_closed(&self) -> bool {
		self.closed.load(Ordering::SeqCst)
	}

	fn ptr(&self) -> Result<*mut libc::sem_t> {
		if self.is_closed() {
			return Err(SignalError::Closed);
		}
		Ok(self.sem.get())
	}

	/// Registers a blocking waiter. Fails once the semaphore is closed.
	fn enter(&self) -> Result<Waiter<'_>> {
		// Registered before the closed check, so `close` either sees this waiter or the
		// waiter sees the flag.
		self.waiters.fetch_add(1, Ordering::SeqCst);
		let waiter = Waiter(&self.waiters);
		if self.is_closed() {
			return Err(SignalError::Closed);
		}
		Ok(waiter)
	}
}

struct Waiter<'a>(&'a AtomicUsize);

impl Drop for Waiter<'_> {
	fn drop(&mut self) {
		self.0.fetch_sub(1, Ordering::SeqCst);
	}
}

fn os_error(operation: &'static str) -> SignalError {
	SignalError::Os {
		operation,
		source: io::Error::last_os_error(),
	}
}

fn errno() -> i32 {
	io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

fn deadline(timeout: Duration) -> Result<libc::timespec> {
	let mut now = libc::timespec {
		tv_sec: 0,
		tv_nsec: 0,
	};
	if unsafe { libc::clock_gettime(libc::CLOCK_REALTIME, &mut now) } != 0 {
		return Err(os_error("clock_gettime"));
	}

	let nanos = now.tv_nsec as u64 + u64::from(timeout.subsec_nanos());
	Ok(libc::timespec {
		tv_sec: now.tv_sec + timeout.as_secs() as libc::time_t + (nanos / 1_000_000_000) as libc::time_t,
		tv_nsec: (nanos % 1_000_000_000) as libc::c_long,
	})
}

impl Signal for PosixSemaphore {
	fn post(&self) -> Result<()> {
		if unsafe { libc::sem_post(self.ptr()?) } != 0 {
			return Err(os_error("sem_post"));
		}
		Ok(())
	}

	fn wait(&self) -> Result<()> {
		let _waiter = self.enter()?;
		let sem = self.sem.get();
		loop {
			if unsafe { libc::sem_wait(sem) } == 0 {
				return if self.is_closed() {
					Err(SignalError::Closed)
				} else {
					Ok(())
				};
			}
			if errno() != libc::EINTR {
				return Err(os_error("sem_wait"));
			}
		}
	}

	fn wait_timeout(&self, timeout: Duration) -> Result<bool> {
		let _waiter = self.enter()?;
		let sem = self.sem.get();
		let deadline = deadline(timeout)?;
		loop {
			if unsafe { libc::sem_timedwait(sem, &deadline) } == 0 {
				return if self.is_closed() {
					Err(SignalError::Closed)
				} else {
					Ok(true)
				};
			}
			match errno() {
				libc::EINTR => continue,
				libc::ETIMEDOUT => return Ok(false),
				_ => return Err(os_error("sem_timedwait")),
			}
		}
	}

	fn try_wait(&self) -> Result<bool> {
		let sem = self.ptr()?;
		loop {
			if unsafe { libc::sem_trywait(sem) } == 0 {
				return Ok(true);
			}
			match errno() {
				libc::EINTR => continue,
				libc::EAGAIN => return Ok(false),
				_ => return Err(os_error("sem_trywait")),
			}
		}
	}

	fn close(&self) -> Result<()> {
		if self.closed.swap(true, Ordering::SeqCst) {
			return Ok(());
		}

		let waiters = self.waiters.load(Ordering::SeqCst);
		trace!(waiters, "releasing waiters");
		for _ in 0..waiters {
			if unsafe { libc::sem_post(self.sem.get()) } != 0 {
				return Err(os_error("sem_post"));
			}
		}
		Ok(())
	}

	fn handle(&self) -> *mut c_void {
		self.sem.get() as *mut c_void
	}
}

impl Drop for PosixSemaphore {
	fn drop(&mut self) {
		// No waiter can be left: each one borrows the semaphore.
		if unsafe { libc::sem_destroy(self.sem.get()) } != 0 {
			warn!(error = %os_error("sem_destroy"), "failed to destroy semaphore");
		}
	}
}
