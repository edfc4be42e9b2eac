// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	ffi::{c_char, c_int, c_void},
	mem::{MaybeUninit, offset_of},
	ptr::addr_of,
};

use pyabi_descriptor::{StructLayout, StructMember};

fn size_of_pointee<M>(_: *const M) -> usize {
	size_of::<M>()
}

macro_rules! mirror_layout {
	($ty:ty, $name:literal, { $($member:ident : $c_ty:literal),* $(,)? }) => {{
		StructLayout::new($name, size_of::<$ty>())
			$(.with_member(StructMember::new(
				stringify!($member),
				$c_ty,
				offset_of!($ty, $member) as i64,
				{
					let instance = MaybeUninit::<$ty>::uninit();
					// SAFETY: only the address of the member is taken, nothing is read.
					size_of_pointee(unsafe { addr_of!((*instance.as_ptr()).$member) })
				},
			)))*
	}};
}

#[allow(dead_code)]
#[repr(C)]
struct Point {
	x: c_int,
	y: c_int,
}

#[allow(dead_code)]
#[repr(C)]
struct Object {
	ob_refcnt: isize,
	ob_type: *mut c_void,
}

#[allow(dead_code)]
#[repr(C)]
struct MethodDef {
	ml_name: *const c_char,
	ml_meth: *const c_void,
	ml_flags: c_int,
	ml_doc: *const c_char,
}

#[allow(dead_code)]
#[repr(C)]
struct ModuleDefBase {
	ob_base: Object,
	m_init: *const c_void,
	m_index: isize,
	m_copy: *mut c_void,
}

#[allow(dead_code)]
#[repr(C)]
struct ModuleDef {
	m_base: ModuleDefBase,
	m_name: *const c_char,
	m_doc: *const c_char,
	m_size: isize,
	m_methods: *mut MethodDef,
	m_slots: *mut c_void,
	m_traverse: *const c_void,
	m_clear: *const c_void,
	m_free: *const c_void,
}

/// `struct Point { int x; int y; }`
pub fn point() -> StructLayout {
	mirror_layout!(Point, "Point", { x: "int", y: "int" })
}

pub fn object() -> StructLayout {
	mirror_layout!(Object, "PyObject", { ob_refcnt: "Py_ssize_t", ob_type: "PyTypeObject*" })
}

pub fn method_def() -> StructLayout {
	mirror_layout!(MethodDef, "PyMethodDef", {
		ml_name: "char*",
		ml_meth: "PyCFunction",
		ml_flags: "int",
		ml_doc: "char*",
	})
}

pub fn module_def_base() -> StructLayout {
	mirror_layout!(ModuleDefBase, "PyModuleDef_Base", {
		ob_base: "PyObject",
		m_init: "PyObject* (*)(void)",
		m_index: "Py_ssize_t",
		m_copy: "PyObject*",
	})
}

pub fn module_def() -> StructLayout {
	mirror_layout!(ModuleDef, "PyModuleDef", {
		m_base: "PyModuleDef_Base",
		m_name: "char*",
		m_doc: "char*",
		m_size: "Py_ssize_t",
		m_methods: "PyMethodDef*",
		m_slots: "struct PyModuleDef_Slot*",
		m_traverse: "traverseproc",
		m_clear: "inquiry",
		m_free: "freefunc",
	})
}
