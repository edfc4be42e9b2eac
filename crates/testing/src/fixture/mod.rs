// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Descriptors describing the host's own C ABI.
//!
//! Layouts are derived from `#[repr(C)]` mirrors with `offset_of!`, so they are correct for
//! whatever target the tests are compiled for.

mod layouts;

pub use layouts::{method_def, module_def, module_def_base, object, point};
use pyabi_descriptor::{Descriptor, FunctionSignature, Parameter};

/// Signature taking `arity` word sized parameters named `a0..`.
pub fn word_function(name: &str, arity: usize) -> FunctionSignature {
	let parameters = if arity == 0 {
		vec![Parameter::new("", "void")]
	} else {
		(0..arity).map(|i| Parameter::new(format!("a{i}"), "Py_ssize_t")).collect()
	};
	FunctionSignature::new(name, "Py_ssize_t", parameters)
}

/// Descriptor with the object, method and module layouts of the host plus the given functions.
pub fn host_descriptor(functions: &[(&str, usize)]) -> Descriptor {
	let mut descriptor = Descriptor::default();
	descriptor.functions = functions.iter().map(|(name, arity)| word_function(name, *arity)).collect();
	descriptor.structs.object = object();
	descriptor.structs.method_def = method_def();
	descriptor.structs.module_def_base = module_def_base();
	descriptor.structs.module_def = module_def();
	descriptor.data.insert("sizeof:void*".to_string(), size_of::<usize>().to_string());
	descriptor
}
