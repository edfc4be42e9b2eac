// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	ffi::c_void,
	sync::atomic::{AtomicUsize, Ordering},
};

use pyabi_binding::{ArityError, BindOptions, Bindings, Error, InvocationError, MAX_ARITY, Word};
use pyabi_testing::{MemorySymbols, fixture::host_descriptor, init_tracing};

static CALLS: AtomicUsize = AtomicUsize::new(0);

extern "C" fn version() -> Word {
	CALLS.fetch_add(1, Ordering::SeqCst);
	311
}

extern "C" fn mul(a: Word, b: Word) -> Word {
	CALLS.fetch_add(1, Ordering::SeqCst);
	a * b
}

extern "C" fn digits(a: Word, b: Word, c: Word, d: Word, e: Word) -> Word {
	CALLS.fetch_add(1, Ordering::SeqCst);
	a * 10_000 + b * 1_000 + c * 100 + d * 10 + e
}

static NONE_STRUCT: [usize; 2] = [1, 0];

fn bind() -> Bindings {
	init_tracing();
	let descriptor = host_descriptor(&[("Py_Version", 0), ("Py_Mul", 2), ("Py_Digits", 5), ("Py_Absent", 1)]);
	let symbols = MemorySymbols::new()
		.with("Py_Version", version as *const c_void)
		.with("Py_Mul", mul as *const c_void)
		.with("Py_Digits", digits as *const c_void)
		.with("_Py_NoneStruct", &raw const NONE_STRUCT as *const c_void);
	Bindings::bind(descriptor, symbols, &BindOptions::default())
}

#[test]
fn test_synthetic_functions_bind_and_forward() {
	let bindings = bind();
	assert_eq!(bindings.table().resolved_count(), 3);

	unsafe {
		assert_eq!(bindings.invoke("Py_Version", &[]).unwrap(), 311);
		assert_eq!(bindings.invoke("Py_Mul", &[6, 7]).unwrap(), 42);
		assert_eq!(bindings.invoke("Py_Digits", &[1, 2, 3, 4, 5]).unwrap(), 12345);
	}
}

#[test]
fn test_unresolved_symbol_is_recorded_not_fatal() {
	let bindings = bind();
	let unresolved: Vec<_> = bindings.table().unresolved().map(|(name, _)| name).collect();
	assert_eq!(unresolved, vec!["Py_Absent"]);

	let err = unsafe { bindings.invoke("Py_Absent", &[1]) }.unwrap_err();
	assert!(matches!(err, Error::Invocation(InvocationError::Unresolved { .. })));
}

#[test]
fn test_eleven_arguments_fail_before_any_call() {
	let bindings = bind();
	let before = CALLS.load(Ordering::SeqCst);

	let err = unsafe { bindings.invoke("Py_Digits", &[0; MAX_ARITY + 1]) }.unwrap_err();
	match err {
		Error::Arity(ArityError {
			name,
			given,
			max,
		}) => {
			assert_eq!(name, "Py_Digits");
			assert_eq!(given, 11);
			assert_eq!(max, 10);
		}
		other => panic!("unexpected error: {other}"),
	}

	// Unknown names with too many arguments still report the arity first.
	assert!(matches!(unsafe { bindings.invoke("Py_Nowhere", &[0; 12]) }, Err(Error::Arity(_))));
	assert_eq!(CALLS.load(Ordering::SeqCst), before);
}

#[test]
fn test_none_singleton_resolved_once() {
	let bindings = bind();
	assert_eq!(bindings.none(), Some(&raw const NONE_STRUCT as *const c_void as *mut c_void));
}
