// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{ffi::c_void, marker::PhantomData};

use pyabi_descriptor::{OffsetError, StructKind};
use tracing::debug;

use super::method::MethodTable;
use crate::{bindings::Bindings, buffer::RawStructBuffer, error::Result, marshal::Encoding};

const WORD: usize = size_of::<usize>();

/// `m_size` of a module without per-interpreter state.
const NO_MODULE_STATE: i64 = -1;

/// A module definition struct ready to be passed to the runtime's module constructor.
///
/// Borrows the method table it points at, so the table cannot be dropped first.
#[derive(Debug)]
pub struct ModuleDescriptor<'a> {
	buffer: RawStructBuffer<'a>,
	_methods: PhantomData<&'a MethodTable<'a>>,
}

impl<'a> ModuleDescriptor<'a> {
	pub fn buffer(&self) -> &RawStructBuffer<'a> {
		&self.buffer
	}

	pub fn as_ptr(&self) -> *const c_void {
		self.buffer.as_ptr()
	}

	/// Hands the descriptor to the native side for good. The method table must be leaked too.
	pub fn leak(self) -> *mut c_void {
		self.buffer.leak()
	}
}

/// Builds a module definition named `name`.
///
/// The embedded object header gets a reference count of one and no type; the module has no
/// per-interpreter state.
pub fn build_module_descriptor<'a>(
	bindings: &'a Bindings,
	name: &str,
	doc: Option<&str>,
	methods: Option<&'a MethodTable<'a>>,
) -> Result<ModuleDescriptor<'a>> {
	let module = bindings.layout(StructKind::ModuleDef);
	let base = bindings.layout(StructKind::ModuleDefBase);
	let object = bindings.layout(StructKind::Object);

	let mut buffer = RawStructBuffer::new(module, bindings.allocator())?;

	let header = module.field("m_base")?.nested(base.field("ob_base")?);
	let refcnt = header.nested(object.field("ob_refcnt")?);
	let ob_type = header.nested(object.field("ob_type")?);
	let m_name = module.field("m_name")?;
	let m_doc = module.field("m_doc")?;
	let m_size = module.field("m_size")?;
	let m_methods = module.field("m_methods")?;

	for field in [ob_type, m_name, m_doc, m_methods] {
		buffer.check(field, WORD)?;
	}
	for field in [refcnt, m_size] {
		if !matches!(field.size(), 4 | 8) {
			return Err(OffsetError::WidthMismatch {
				offset: field.offset(),
				size: field.size(),
				width: WORD,
			}
			.into());
		}
		buffer.check(field, field.size())?;
	}

	buffer.write_signed(refcnt, 1)?;
	buffer.write_ptr(ob_type, std::ptr::null())?;
	buffer.write_string(m_name, name, Encoding::Narrow)?;
	match doc {
		Some(doc) => buffer.write_string(m_doc, doc, Encoding::Narrow)?,
		None => buffer.write_ptr(m_doc, std::ptr::null())?,
	}
	buffer.write_signed(m_size, NO_MODULE_STATE)?;
	buffer.write_ptr(m_methods, methods.map_or(std::ptr::null(), MethodTable::as_ptr))?;

	debug!(module = name, methods = methods.map_or(0, MethodTable::len), "module descriptor built");
	Ok(ModuleDescriptor {
		buffer,
		_methods: PhantomData,
	})
}
