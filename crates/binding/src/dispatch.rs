// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Arity indexed call stubs.
//!
//! Every argument and the return value travel as one machine word, which covers the
//! integer and pointer signatures of the runtime's C API. Floating point parameters are
//! passed in different registers on every mainstream ABI and cannot go through here.

use std::{ffi::c_void, mem::transmute};

/// One argument or return value.
pub type Word = usize;

/// Largest argument count [`call`] can forward.
pub const MAX_ARITY: usize = 10;

type Stub = unsafe fn(*const c_void, &[Word]) -> Word;

macro_rules! stub {
	(@word $idx:tt) => {
		Word
	};
	($name:ident;) => {
		unsafe fn $name(address: *const c_void, _args: &[Word]) -> Word {
			// SAFETY: the caller guarantees `address` is a C function taking no arguments.
			let function: unsafe extern "C" fn() -> Word = unsafe { transmute(address) };
			unsafe { function() }
		}
	};
	($name:ident; $($idx:tt),*) => {
		unsafe fn $name(address: *const c_void, args: &[Word]) -> Word {
			// SAFETY: the caller guarantees `address` is a C function taking this many words.
			let function: unsafe extern "C" fn($(stub!(@word $idx)),*) -> Word = unsafe { transmute(address) };
			unsafe { function($(args[$idx]),*) }
		}
	};
}

stub!(call0;);
stub!(call1; 0);
stub!(call2; 0, 1);
stub!(call3; 0, 1, 2);
stub!(call4; 0, 1, 2, 3);
stub!(call5; 0, 1, 2, 3, 4);
stub!(call6; 0, 1, 2, 3, 4, 5);
stub!(call7; 0, 1, 2, 3, 4, 5, 6);
stub!(call8; 0, 1, 2, 3, 4, 5, 6, 7);
stub!(call9; 0, 1, 2, 3, 4, 5, 6, 7, 8);
stub!(call10; 0, 1, 2, 3, 4, 5, 6, 7, 8, 9);

const DISPATCH: [Stub; MAX_ARITY + 1] = [call0, call1, call2, call3, call4, call5, call6, call7, call8, call9, call10];

/// Calls the C function at `address` with `args`.
///
/// Returns `None` without calling anything when more than [`MAX_ARITY`] arguments are given.
/// For functions returning `void` the returned word is meaningless.
///
/// # Safety
/// `address` must point to a C function taking exactly `args.len()` word sized arguments.
pub unsafe fn call(address: *const c_void, args: &[Word]) -> Option<Word> {
	let stub = DISPATCH.get(args.len())?;
	Some(unsafe { stub(address, args) })
}

#[cfg(test)]
mod tests {
	use super::*;

	extern "C" fn zero() -> Word {
		7
	}

	extern "C" fn sub(a: Word, b: Word) -> Word {
		a - b
	}

	extern "C" fn weighted(a0: Word, a1: Word, a2: Word, a3: Word, a4: Word, a5: Word, a6: Word, a7: Word, a8: Word, a9: Word) -> Word {
		a0 + 2 * a1 + 3 * a2 + 4 * a3 + 5 * a4 + 6 * a5 + 7 * a6 + 8 * a7 + 9 * a8 + 10 * a9
	}

	#[test]
	fn test_call_forwards_in_order() {
		unsafe {
			assert_eq!(call(zero as *const c_void, &[]), Some(7));
			assert_eq!(call(sub as *const c_void, &[10, 3]), Some(7));
			assert_eq!(call(weighted as *const c_void, &[1; 10]), Some(55));
			assert_eq!(call(weighted as *const c_void, &[0, 0, 0, 0, 0, 0, 0, 0, 0, 1]), Some(10));
		}
	}

	#[test]
	fn test_call_rejects_eleven_arguments() {
		// The address is never called, so any value will do.
		let result = unsafe { call(std::ptr::null(), &[0; MAX_ARITY + 1]) };
		assert_eq!(result, None);
	}
}
