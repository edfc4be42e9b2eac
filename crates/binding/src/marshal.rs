// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Host strings to and from null terminated native strings.

use std::{
	ffi::{CStr, c_char, c_void},
	mem::ManuallyDrop,
	ptr::copy_nonoverlapping,
	rc::Rc,
};

use pyabi_descriptor::Platform;

use crate::{alloc::NativeAllocator, error::MarshalError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
	/// UTF-8 `char` strings.
	Narrow,
	/// `wchar_t` strings of the given unit width: UTF-16 for 2, UTF-32 for 4.
	Wide(usize),
}

impl Encoding {
	/// `wchar_t` encoding of `platform`.
	pub fn wide_for(platform: Platform) -> Encoding {
		Encoding::Wide(platform.wchar_width())
	}

	/// `wchar_t` encoding of the host.
	pub fn host_wide() -> Encoding {
		Encoding::Wide(size_of::<libc::wchar_t>())
	}

	pub fn unit_width(&self) -> usize {
		match self {
			Encoding::Narrow => 1,
			Encoding::Wide(width) => *width,
		}
	}

	/// Bytes of `value` in this encoding, including the terminator.
	pub fn encode(&self, value: &str) -> Result<Vec<u8>, MarshalError> {
		if let Some(position) = value.find('\0') {
			return Err(MarshalError::InteriorNul {
				position,
			});
		}

		match self {
			Encoding::Narrow => {
				let mut bytes = Vec::with_capacity(value.len() + 1);
				bytes.extend_from_slice(value.as_bytes());
				bytes.push(0);
				Ok(bytes)
			}
			Encoding::Wide(2) => {
				Ok(value.encode_utf16().chain(Some(0)).flat_map(u16::to_ne_bytes).collect())
			}
			Encoding::Wide(4) => Ok(value.chars().map(u32::from).chain(Some(0)).flat_map(u32::to_ne_bytes).collect()),
			Encoding::Wide(width) => Err(MarshalError::UnsupportedWidth(*width)),
		}
	}

	/// Reads the null terminated string at `ptr`. A null pointer reads as `None`.
	///
	/// # Safety
	/// A non-null `ptr` must point to a terminated string of this encoding.
	pub unsafe fn decode(&self, ptr: *const c_void) -> Result<Option<String>, MarshalError> {
		if ptr.is_null() {
			return Ok(None);
		}

		let value = match self {
			Encoding::Narrow => unsafe { CStr::from_ptr(ptr as *const c_char) }
				.to_str()
				.map(str::to_string)
				.map_err(|_| MarshalError::InvalidEncoding {
					encoding: "UTF-8",
				})?,
			Encoding::Wide(2) => {
				let units = unsafe { terminated_units(ptr as *const u16) };
				String::from_utf16(units).map_err(|_| MarshalError::InvalidEncoding {
					encoding: "UTF-16",
				})?
			}
			Encoding::Wide(4) => {
				let units = unsafe { terminated_units(ptr as *const u32) };
				units.iter()
					.map(|unit| char::from_u32(*unit))
					.collect::<Option<String>>()
					.ok_or(MarshalError::InvalidEncoding {
						encoding: "UTF-32",
					})?
			}
			Encoding::Wide(width) => return Err(MarshalError::UnsupportedWidth(*width)),
		};
		Ok(Some(value))
	}
}

unsafe fn terminated_units<'a, T: Copy + Default + PartialEq>(ptr: *const T) -> &'a [T] {
	let mut len = 0;
	while unsafe { *ptr.add(len) } != T::default() {
		len += 1;
	}
	unsafe { std::slice::from_raw_parts(ptr, len) }
}

/// A string living in native memory obtained from a [`NativeAllocator`].
///
/// Freed on drop unless ownership is passed on with [`NativeString::into_raw`].
#[derive(Debug)]
pub struct NativeString {
	ptr: *mut c_void,
	len: usize,
	encoding: Encoding,
	allocator: Rc<dyn NativeAllocator>,
}

impl NativeString {
	pub fn new(value: &str, encoding: Encoding, allocator: Rc<dyn NativeAllocator>) -> Result<Self, MarshalError> {
		let bytes = encoding.encode(value)?;

		let ptr = allocator.allocate(bytes.len());
		if ptr.is_null() {
			return Err(MarshalError::Allocation {
				size: bytes.len(),
			});
		}
		unsafe { copy_nonoverlapping(bytes.as_ptr(), ptr as *mut u8, bytes.len()) };

		Ok(Self {
			ptr,
			len: bytes.len(),
			encoding,
			allocator,
		})
	}

	pub fn as_ptr(&self) -> *const c_void {
		self.ptr
	}

	/// Size in bytes including the terminator.
	pub fn byte_len(&self) -> usize {
		self.len
	}

	pub fn encoding(&self) -> Encoding {
		self.encoding
	}

	/// Gives up ownership; the native side becomes responsible for freeing the memory.
	pub fn into_raw(self) -> *mut c_void {
		let this = ManuallyDrop::new(self);
		this.ptr
	}

	pub fn to_string_lossy(&self) -> Option<String> {
		unsafe { self.encoding.decode(self.ptr) }.ok().flatten()
	}
}

impl Drop for NativeString {
	fn drop(&mut self) {
		unsafe { self.allocator.free(self.ptr) };
	}
}
