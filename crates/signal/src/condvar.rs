// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{ffi::c_void, time::Duration};

use parking_lot::{Condvar, Mutex};

use crate::{Result, Signal, SignalError};

#[derive(Debug, Default)]
struct State {
	count: u64,
	closed: bool,
}

/// In-process counting signal built on a mutex and condition variable.
#[derive(Debug, Default)]
pub struct CondvarSignal {
	state: Mutex<State>,
	available: Condvar,
}

impl CondvarSignal {
	pub fn new() -> Result<Self> {
		Ok(Self::default())
	}
}

impl Signal for CondvarSignal {
	fn post(&self) -> Result<()> {
		let mut state = self.state.lock();
		if state.closed {
			return Err(SignalError::Closed);
		}
		state.count += 1;
		self.available.notify_one();
		Ok(())
	}

	fn wait(&self) -> Result<()> {
		let mut state = self.state.lock();
		loop {
			if state.closed {
				return Err(SignalError::Closed);
			}
			if state.count > 0 {
				state.count -= 1;
				return Ok(());
			}
			self.available.wait(&mut state);
		}
	}

	fn wait_timeout(&self, timeout: Duration) -> Result<bool> {
		let mut state = self.state.lock();
		let deadline = std::time::Instant::now() + timeout;
		loop {
			if state.closed {
				return Err(SignalError::Closed);
			}
			if state.count > 0 {
				state.count -= 1;
				return Ok(true);
			}
			if self.available.wait_until(&mut state, deadline).timed_out() {
				return Ok(false);
			}
		}
	}

	fn try_wait(&self) -> Result<bool> {
		let mut state = self.state.lock();
		if state.closed {
			return Err(SignalError::Closed);
		}
		if state.count > 0 {
			state.count -= 1;
			return Ok(true);
		}
		Ok(false)
	}

	fn reset(&self) -> Result<()> {
		let mut state = self.state.lock();
		if state.closed {
			return Err(SignalError::Closed);
		}
		state.count = 0;
		Ok(())
	}

	fn close(&self) -> Result<()> {
		let mut state = self.state.lock();
		state.closed = true;
		self.available.notify_all();
		Ok(())
	}

	fn handle(&self) -> *mut c_void {
		self as *const Self as *mut c_void
	}
}
