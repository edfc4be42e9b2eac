// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{ffi::c_void, fmt, mem::transmute, rc::Rc};

use crate::loader::SymbolLoader;

/// Memory the native library may later free or keep.
pub trait NativeAllocator: fmt::Debug {
	/// Allocates `size` bytes. Returns null on failure.
	fn allocate(&self, size: usize) -> *mut c_void;

	/// # Safety
	/// `ptr` must come from [`NativeAllocator::allocate`] on the same allocator and not be freed yet.
	unsafe fn free(&self, ptr: *mut c_void);
}

type MallocFn = unsafe extern "C" fn(usize) -> *mut c_void;
type FreeFn = unsafe extern "C" fn(*mut c_void);

/// The library's own allocator, e.g. `PyMem_Malloc` / `PyMem_Free`.
///
/// Holds on to the library exporting the pair, so memory it handed out can still be freed
/// after the binding session that created it is gone.
#[derive(Clone)]
pub struct LibraryAllocator {
	malloc: MallocFn,
	free: FreeFn,
	library: Option<Rc<dyn SymbolLoader>>,
}

impl fmt::Debug for LibraryAllocator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LibraryAllocator")
			.field("malloc", &(self.malloc as *const c_void))
			.field("free", &(self.free as *const c_void))
			.field("owns_library", &self.library.is_some())
			.finish()
	}
}

impl LibraryAllocator {
	/// # Safety
	/// `malloc` and `free` must be the addresses of functions with the C signatures
	/// `void* (size_t)` and `void (void*)`.
	pub unsafe fn from_addresses(malloc: *mut c_void, free: *mut c_void) -> Self {
		unsafe {
			Self {
				malloc: transmute::<*mut c_void, MallocFn>(malloc),
				free: transmute::<*mut c_void, FreeFn>(free),
				library: None,
			}
		}
	}

	/// Keeps `library` loaded for as long as this allocator or any clone of it lives.
	pub fn owned_by(mut self, library: Rc<dyn SymbolLoader>) -> Self {
		self.library = Some(library);
		self
	}

	pub fn owns_library(&self) -> bool {
		self.library.is_some()
	}
}

impl NativeAllocator for LibraryAllocator {
	fn allocate(&self, size: usize) -> *mut c_void {
		unsafe { (self.malloc)(size) }
	}

	unsafe fn free(&self, ptr: *mut c_void) {
		unsafe { (self.free)(ptr) }
	}
}

/// The C runtime's `malloc` / `free`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAllocator;

impl NativeAllocator for SystemAllocator {
	fn allocate(&self, size: usize) -> *mut c_void {
		unsafe { libc::malloc(size) }
	}

	unsafe fn free(&self, ptr: *mut c_void) {
		unsafe { libc::free(ptr) }
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicUsize, Ordering};

	use super::*;

	static ALLOCATED: AtomicUsize = AtomicUsize::new(0);
	static FREED: AtomicUsize = AtomicUsize::new(0);

	unsafe extern "C" fn counting_malloc(size: usize) -> *mut c_void {
		ALLOCATED.fetch_add(size, Ordering::SeqCst);
		unsafe { libc::malloc(size) }
	}

	unsafe extern "C" fn counting_free(ptr: *mut c_void) {
		FREED.fetch_add(1, Ordering::SeqCst);
		unsafe { libc::free(ptr) }
	}

	#[test]
	fn test_library_allocator_calls_through() {
		let allocator = unsafe {
			LibraryAllocator::from_addresses(counting_malloc as *const () as *mut c_void, counting_free as *const () as *mut c_void)
		};

		let ptr = allocator.allocate(24);
		assert!(!ptr.is_null());
		unsafe { allocator.free(ptr) };

		assert_eq!(ALLOCATED.load(Ordering::SeqCst), 24);
		assert_eq!(FREED.load(Ordering::SeqCst), 1);
	}

	struct NoSymbols;

	impl SymbolLoader for NoSymbols {
		fn resolve(&self, name: &str) -> Result<*mut c_void, crate::error::BindError> {
			Err(crate::error::BindError::Symbol {
				name: name.to_string(),
				reason: "none".to_string(),
			})
		}
	}

	#[test]
	fn test_allocator_keeps_library_alive() {
		let library: Rc<dyn SymbolLoader> = Rc::new(NoSymbols);
		let allocator = unsafe {
			LibraryAllocator::from_addresses(counting_malloc as *const () as *mut c_void, counting_free as *const () as *mut c_void)
		}
		.owned_by(library.clone());
		let copy = allocator.clone();
		assert!(copy.owns_library());
		assert_eq!(Rc::strong_count(&library), 3);

		drop(allocator);
		drop(copy);
		assert_eq!(Rc::strong_count(&library), 1);
	}

	#[test]
	fn test_system_allocator() {
		let ptr = SystemAllocator.allocate(8);
		assert!(!ptr.is_null());
		unsafe { SystemAllocator.free(ptr) };
	}
}
