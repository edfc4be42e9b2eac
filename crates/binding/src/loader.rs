// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Opening shared libraries and resolving their exports.

use std::{
	ffi::c_void,
	path::{Path, PathBuf},
};

use libloading::Library;
use tracing::{debug, instrument};

use crate::error::BindError;

/// Resolves exported symbols of a native library to their addresses.
pub trait SymbolLoader {
	/// Address of the exported symbol `name`, for functions and data alike.
	fn resolve(&self, name: &str) -> Result<*mut c_void, BindError>;
}

/// A shared library opened from disk.
#[derive(Debug)]
pub struct DynamicLibrary {
	path: PathBuf,
	library: Library,
}

impl DynamicLibrary {
	/// Opens the library at `path`.
	///
	/// With `global` set the library's symbols are made available to libraries loaded
	/// after it, which extension modules of the runtime rely on.
	#[instrument(name = "binding::library::open", level = "debug", skip(path), fields(path = %path.as_ref().display()))]
	pub fn open(path: impl AsRef<Path>, global: bool) -> Result<Self, BindError> {
		let path = path.as_ref();
		let library = open_library(path, global).map_err(|source| BindError::Library {
			path: path.to_path_buf(),
			source,
		})?;

		debug!("library opened");
		Ok(Self {
			path: path.to_path_buf(),
			library,
		})
	}

	pub fn path(&self) -> &Path {
		&self.path
	}
}

impl SymbolLoader for DynamicLibrary {
	fn resolve(&self, name: &str) -> Result<*mut c_void, BindError> {
		// SAFETY: the symbol is read as an untyped address, nothing is called here.
		let symbol = unsafe { self.library.get::<*mut c_void>(name.as_bytes()) }.map_err(|err| {
			BindError::Symbol {
				name: name.to_string(),
				reason: err.to_string(),
			}
		})?;

		let address = *symbol;
		if address.is_null() {
			return Err(BindError::Symbol {
				name: name.to_string(),
				reason: "symbol resolved to null".to_string(),
			});
		}
		Ok(address)
	}
}

#[cfg(unix)]
fn open_library(path: &Path, global: bool) -> Result<Library, libloading::Error> {
	use libloading::os::unix::{Library as UnixLibrary, RTLD_GLOBAL, RTLD_LOCAL, RTLD_NOW};

	let visibility = if global {
		RTLD_GLOBAL
	} else {
		RTLD_LOCAL
	};
	// SAFETY: loading runs the library's initialisers; callers choose which library to trust.
	unsafe { UnixLibrary::open(Some(path), RTLD_NOW | visibility) }.map(Library::from)
}

#[cfg(windows)]
fn open_library(path: &Path, _global: bool) -> Result<Library, libloading::Error> {
	use libloading::os::windows::{LOAD_WITH_ALTERED_SEARCH_PATH, Library as WindowsLibrary};

	// Dependent DLLs are searched next to the library itself.
	// SAFETY: loading runs the library's initialisers; callers choose which library to trust.
	unsafe { WindowsLibrary::load_with_flags(path, LOAD_WITH_ALTERED_SEARCH_PATH) }.map(Library::from)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_open_missing_library_carries_os_error() {
		let err = DynamicLibrary::open("/nonexistent/libpython9.99.so", true).unwrap_err();
		match err {
			BindError::Library {
				path,
				..
			} => assert_eq!(path, PathBuf::from("/nonexistent/libpython9.99.so")),
			other => panic!("unexpected error: {other}"),
		}
	}
}
