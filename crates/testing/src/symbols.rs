// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{collections::HashMap, ffi::c_void};

use pyabi_binding::{BindError, SymbolLoader};

/// An in-process symbol table standing in for a loaded shared library.
#[derive(Debug, Default, Clone)]
pub struct MemorySymbols {
	symbols: HashMap<String, usize>,
}

impl MemorySymbols {
	pub fn new() -> Self {
		Self::default()
	}

	/// Exports `address` under `name`. Works for functions and data alike.
	pub fn with(mut self, name: &str, address: *const c_void) -> Self {
		self.symbols.insert(name.to_string(), address as usize);
		self
	}

	pub fn len(&self) -> usize {
		self.symbols.len()
	}

	pub fn is_empty(&self) -> bool {
		self.symbols.is_empty()
	}
}

impl SymbolLoader for MemorySymbols {
	fn resolve(&self, name: &str) -> Result<*mut c_void, BindError> {
		self.symbols.get(name).map(|address| *address as *mut c_void).ok_or_else(|| BindError::Symbol {
			name: name.to_string(),
			reason: "not exported".to_string(),
		})
	}
}
