// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::ffi::c_void;

use pyabi_descriptor::{Field, OffsetError, StructKind};
use tracing::debug;

use crate::{
	bindings::Bindings, buffer::RawStructBuffer, error::Result, marshal::Encoding, trampoline::Trampoline,
};

/// One callable exposed through a method table.
#[derive(Debug, Clone)]
pub struct MethodEntry {
	pub name: String,
	pub function: Trampoline,
	/// `METH_*` calling convention flags.
	pub flags: i32,
	pub doc: Option<String>,
}

impl MethodEntry {
	pub fn new(name: impl Into<String>, function: Trampoline, flags: i32) -> Self {
		Self {
			name: name.into(),
			function,
			flags,
			doc: None,
		}
	}

	pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
		self.doc = Some(doc.into());
		self
	}
}

/// A null terminated array of method definitions.
#[derive(Debug)]
pub struct MethodTable<'a> {
	buffer: RawStructBuffer<'a>,
	len: usize,
}

impl<'a> MethodTable<'a> {
	/// Number of entries, not counting the terminator.
	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	pub fn buffer(&self) -> &RawStructBuffer<'a> {
		&self.buffer
	}

	pub fn as_ptr(&self) -> *const c_void {
		self.buffer.as_ptr()
	}

	/// Hands the table to the native side for good.
	pub fn leak(self) -> *mut c_void {
		self.buffer.leak()
	}
}

struct EntryFields {
	name: Field,
	function: Field,
	flags: Field,
	doc: Option<Field>,
}

/// Builds `entries` followed by a zeroed terminator entry, laid out per the bound
/// method definition layout.
pub fn build_method_table<'a>(bindings: &'a Bindings, entries: &[MethodEntry]) -> Result<MethodTable<'a>> {
	let layout = bindings.layout(StructKind::MethodDef);
	let mut buffer = RawStructBuffer::array(layout, entries.len() + 1, bindings.allocator())?;

	let fields = EntryFields {
		name: layout.field("ml_name")?,
		function: layout.field("ml_meth")?,
		flags: layout.field("ml_flags")?,
		doc: if entries.iter().any(|e| e.doc.is_some()) {
			Some(layout.field("ml_doc")?)
		} else {
			None
		},
	};
	check_entry(&buffer, &fields)?;

	let encoding = Encoding::Narrow;
	for (index, entry) in entries.iter().enumerate() {
		let stride = buffer.stride();
		buffer.write_string(fields.name.element(index, stride), &entry.name, encoding)?;
		buffer.write_ptr(fields.function.element(index, stride), entry.function.as_ptr())?;
		buffer.write_signed(fields.flags.element(index, stride), entry.flags as i64)?;
		if let (Some(doc), Some(field)) = (&entry.doc, fields.doc) {
			buffer.write_string(field.element(index, stride), doc, encoding)?;
		}
	}

	debug!(layout = %layout.name, entries = entries.len(), size = buffer.len(), "method table built");
	Ok(MethodTable {
		buffer,
		len: entries.len(),
	})
}

fn check_entry(buffer: &RawStructBuffer<'_>, fields: &EntryFields) -> std::result::Result<(), OffsetError> {
	const WORD: usize = size_of::<usize>();

	if !matches!(fields.flags.size(), 1 | 2 | 4 | 8) {
		return Err(OffsetError::WidthMismatch {
			offset: fields.flags.offset(),
			size: fields.flags.size(),
			width: 4,
		});
	}

	let mut checks = vec![(fields.name, WORD), (fields.function, WORD), (fields.flags, fields.flags.size())];
	checks.extend(fields.doc.map(|doc| (doc, WORD)));

	for (field, width) in checks {
		buffer.check(field, width)?;
		// Every entry repeats the first one, so staying inside one stride is enough.
		if field.offset() + width > buffer.stride() {
			return Err(OffsetError::OutOfBounds {
				offset: field.offset(),
				width,
				len: buffer.stride(),
			});
		}
	}
	Ok(())
}
