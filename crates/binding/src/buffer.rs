// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Zero initialised byte regions shaped by a [`StructLayout`].
//!
//! This is the only place the binding layer writes raw memory. Every write goes through
//! [`RawStructBuffer::write_bytes`], which checks the target [`Field`] against the buffer
//! bounds and the probed member width first.

use std::{
	ffi::c_void,
	rc::Rc,
	slice::{from_raw_parts, from_raw_parts_mut},
};

use pyabi_descriptor::{Field, OffsetError, StructLayout};

use crate::{
	alloc::NativeAllocator,
	dispatch::Word,
	error::Result,
	marshal::{Encoding, NativeString},
};

const WORD: usize = size_of::<Word>();

/// An owned array of `count` structs of one layout.
///
/// The buffer must outlive every native pointer into it; [`RawStructBuffer::leak`] hands
/// it over to the native side for good.
#[derive(Debug)]
pub struct RawStructBuffer<'a> {
	layout: &'a StructLayout,
	count: usize,
	len: usize,
	// u64 storage keeps the region 8-byte aligned.
	storage: Vec<u64>,
	allocator: Rc<dyn NativeAllocator>,
	strings: Vec<NativeString>,
}

impl<'a> RawStructBuffer<'a> {
	pub fn new(layout: &'a StructLayout, allocator: Rc<dyn NativeAllocator>) -> std::result::Result<Self, OffsetError> {
		Self::array(layout, 1, allocator)
	}

	/// A buffer holding `count` consecutive structs of `layout`.
	pub fn array(
		layout: &'a StructLayout,
		count: usize,
		allocator: Rc<dyn NativeAllocator>,
	) -> std::result::Result<Self, OffsetError> {
		if layout.size == 0 {
			return Err(OffsetError::EmptyLayout(layout.name.clone()));
		}

		let len = layout.size.checked_mul(count).filter(|len| *len <= isize::MAX as usize).ok_or(
			OffsetError::OutOfBounds {
				offset: 0,
				width: layout.size.saturating_mul(count),
				len: isize::MAX as usize,
			},
		)?;
		Ok(Self {
			layout,
			count,
			len,
			storage: vec![0u64; len.div_ceil(8)],
			allocator,
			strings: Vec::new(),
		})
	}

	pub fn layout(&self) -> &'a StructLayout {
		self.layout
	}

	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	pub fn count(&self) -> usize {
		self.count
	}

	pub fn stride(&self) -> usize {
		self.layout.size
	}

	/// `member` of the first struct.
	pub fn field(&self, member: &str) -> std::result::Result<Field, OffsetError> {
		self.layout.field(member)
	}

	/// `member` of the `index`-th struct.
	pub fn element_field(&self, index: usize, member: &str) -> std::result::Result<Field, OffsetError> {
		Ok(self.layout.field(member)?.element(index, self.stride()))
	}

	pub fn as_bytes(&self) -> &[u8] {
		unsafe { from_raw_parts(self.storage.as_ptr() as *const u8, self.len) }
	}

	pub fn as_ptr(&self) -> *const c_void {
		self.storage.as_ptr() as *const c_void
	}

	pub fn as_mut_ptr(&mut self) -> *mut c_void {
		self.storage.as_mut_ptr() as *mut c_void
	}

	/// Verifies a `width` byte access at `field` without touching the buffer.
	///
	/// A field size of zero means the member width was never probed; only bounds are checked then.
	pub fn check(&self, field: Field, width: usize) -> std::result::Result<(), OffsetError> {
		if field.size() != 0 && field.size() != width {
			return Err(OffsetError::WidthMismatch {
				offset: field.offset(),
				size: field.size(),
				width,
			});
		}
		if field.offset().checked_add(width).is_none_or(|end| end > self.len) {
			return Err(OffsetError::OutOfBounds {
				offset: field.offset(),
				width,
				len: self.len,
			});
		}
		Ok(())
	}

	pub fn write_bytes(&mut self, field: Field, bytes: &[u8]) -> std::result::Result<(), OffsetError> {
		self.check(field, bytes.len())?;
		let len = self.len;
		let region = unsafe { from_raw_parts_mut(self.storage.as_mut_ptr() as *mut u8, len) };
		region[field.offset()..field.offset() + bytes.len()].copy_from_slice(bytes);
		Ok(())
	}

	pub fn read_bytes(&self, field: Field, width: usize) -> std::result::Result<&[u8], OffsetError> {
		self.check(field, width)?;
		Ok(&self.as_bytes()[field.offset()..field.offset() + width])
	}

	pub fn write_word(&mut self, field: Field, value: Word) -> std::result::Result<(), OffsetError> {
		self.write_bytes(field, &value.to_ne_bytes())
	}

	pub fn write_ptr(&mut self, field: Field, value: *const c_void) -> std::result::Result<(), OffsetError> {
		self.write_word(field, value as Word)
	}

	/// Writes `value` truncated to the probed width of `field` (1, 2, 4 or 8 bytes).
	pub fn write_signed(&mut self, field: Field, value: i64) -> std::result::Result<(), OffsetError> {
		match field.size() {
			1 => self.write_bytes(field, &(value as i8).to_ne_bytes()),
			2 => self.write_bytes(field, &(value as i16).to_ne_bytes()),
			4 => self.write_bytes(field, &(value as i32).to_ne_bytes()),
			8 => self.write_bytes(field, &value.to_ne_bytes()),
			size => Err(OffsetError::WidthMismatch {
				offset: field.offset(),
				size,
				width: 8,
			}),
		}
	}

	pub fn read_word(&self, field: Field) -> std::result::Result<Word, OffsetError> {
		let bytes = self.read_bytes(field, WORD)?;
		let mut word = [0u8; WORD];
		word.copy_from_slice(bytes);
		Ok(Word::from_ne_bytes(word))
	}

	pub fn read_ptr(&self, field: Field) -> std::result::Result<*const c_void, OffsetError> {
		Ok(self.read_word(field)? as *const c_void)
	}

	pub fn read_signed(&self, field: Field) -> std::result::Result<i64, OffsetError> {
		let bytes = self.read_bytes(field, field.size())?;
		Ok(match *bytes {
			[a] => i8::from_ne_bytes([a]) as i64,
			[a, b] => i16::from_ne_bytes([a, b]) as i64,
			[a, b, c, d] => i32::from_ne_bytes([a, b, c, d]) as i64,
			[a, b, c, d, e, f, g, h] => i64::from_ne_bytes([a, b, c, d, e, f, g, h]),
			_ => {
				return Err(OffsetError::WidthMismatch {
					offset: field.offset(),
					size: field.size(),
					width: 8,
				});
			}
		})
	}

	/// Allocates `value` with the session allocator and stores its address at `field`.
	///
	/// The string is owned by this buffer from then on.
	pub fn write_string(&mut self, field: Field, value: &str, encoding: Encoding) -> Result<()> {
		self.check(field, WORD)?;
		let native = NativeString::new(value, encoding, self.allocator.clone())?;
		self.write_ptr(field, native.as_ptr())?;
		self.strings.push(native);
		Ok(())
	}

	/// Hands the buffer and the strings it owns to the native side; nothing is freed afterwards.
	pub fn leak(self) -> *mut c_void {
		for string in self.strings {
			string.into_raw();
		}
		Box::leak(self.storage.into_boxed_slice()).as_mut_ptr() as *mut c_void
	}
}
