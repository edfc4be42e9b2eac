// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::ffi::c_void;

/// C signature of a method callback: `PyObject* (*)(PyObject* self, PyObject* args)`.
pub type CFunction = unsafe extern "C" fn(*mut c_void, *mut c_void) -> *mut c_void;

/// A native callable address the library may call back into.
///
/// Built from `'static` functions only, so it stays valid for as long as the library can
/// call it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trampoline {
	address: *const c_void,
}

impl Trampoline {
	pub fn from_fn(function: CFunction) -> Self {
		Self {
			address: function as *const c_void,
		}
	}

	/// # Safety
	/// `address` must be a C function matching the flags it is registered with and must stay
	/// callable for as long as the library holds it.
	pub unsafe fn from_raw(address: *const c_void) -> Self {
		Self {
			address,
		}
	}

	pub fn as_ptr(&self) -> *const c_void {
		self.address
	}
}

impl From<CFunction> for Trampoline {
	fn from(function: CFunction) -> Self {
		Trampoline::from_fn(function)
	}
}
