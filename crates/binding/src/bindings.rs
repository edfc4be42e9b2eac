// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{ffi::c_void, path::Path, rc::Rc};

use pyabi_descriptor::{Descriptor, DescriptorSource, StructKind, StructLayout, Target};
use tracing::{debug, info, instrument, trace, warn};

use crate::{
	alloc::{LibraryAllocator, NativeAllocator, SystemAllocator},
	buffer::RawStructBuffer,
	dispatch::{self, MAX_ARITY, Word},
	error::{ArityError, InvocationError, Result},
	loader::{DynamicLibrary, SymbolLoader},
	marshal::{Encoding, NativeString},
	table::{Binding, BindingTable},
};

/// Knobs for one bind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindOptions {
	/// Functions whose name starts with this prefix are internal and never bound.
	pub private_prefix: String,
	/// Data symbol of the runtime's `None` singleton.
	pub none_symbol: String,
	pub malloc_symbol: String,
	pub free_symbol: String,
	/// Open the library with global symbol visibility.
	pub global: bool,
}

impl Default for BindOptions {
	fn default() -> Self {
		Self {
			private_prefix: "_".to_string(),
			none_symbol: "_Py_NoneStruct".to_string(),
			malloc_symbol: "PyMem_Malloc".to_string(),
			free_symbol: "PyMem_Free".to_string(),
			global: true,
		}
	}
}

impl BindOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn private_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.private_prefix = prefix.into();
		self
	}

	pub fn none_symbol(mut self, symbol: impl Into<String>) -> Self {
		self.none_symbol = symbol.into();
		self
	}

	pub fn allocator_symbols(mut self, malloc: impl Into<String>, free: impl Into<String>) -> Self {
		self.malloc_symbol = malloc.into();
		self.free_symbol = free.into();
		self
	}

	pub fn global(mut self, global: bool) -> Self {
		self.global = global;
		self
	}

	fn is_private(&self, name: &str) -> bool {
		!self.private_prefix.is_empty() && name.starts_with(&self.private_prefix)
	}
}

/// One binding session: a loaded library, its descriptor and the resolved functions.
///
/// Not `Send` or `Sync`; callers needing to share a session must add their own
/// synchronisation around it.
pub struct Bindings {
	target: Option<Target>,
	descriptor: Descriptor,
	table: BindingTable,
	none: Option<*mut c_void>,
	allocator: Rc<dyn NativeAllocator>,
	// Keeps the library mapped for as long as any resolved address may be used.
	_loader: Rc<dyn SymbolLoader>,
}

impl Bindings {
	/// Resolves every non-private function of `descriptor` through `loader`.
	///
	/// Symbols that fail to resolve are recorded as [`Binding::Unresolved`] and only fail
	/// when invoked.
	#[instrument(name = "binding::bind", level = "debug", skip_all, fields(functions = descriptor.functions.len()))]
	pub fn bind<L>(descriptor: Descriptor, loader: L, options: &BindOptions) -> Self
	where
		L: SymbolLoader + 'static,
	{
		let loader: Rc<dyn SymbolLoader> = Rc::new(loader);
		let mut table = BindingTable::new();
		let mut skipped = 0usize;

		for function in &descriptor.functions {
			if options.is_private(&function.name) {
				trace!(symbol = %function.name, "skipping private function");
				skipped += 1;
				continue;
			}

			match loader.resolve(&function.name) {
				Ok(address) => {
					debug!(symbol = %function.name, arity = function.arity(), "resolved");
					table.insert(function.name.clone(), Binding::Resolved {
						address,
						arity: function.arity(),
					});
				}
				Err(err) => {
					warn!(symbol = %function.name, error = %err, "unresolved");
					table.insert(function.name.clone(), Binding::Unresolved {
						reason: err.to_string(),
					});
				}
			}
		}

		let none = match loader.resolve(&options.none_symbol) {
			Ok(address) => Some(address),
			Err(err) => {
				warn!(symbol = %options.none_symbol, error = %err, "none singleton not resolved");
				None
			}
		};

		let allocator = resolve_allocator(&loader, options);

		info!(
			resolved = table.resolved_count(),
			unresolved = table.len() - table.resolved_count(),
			skipped,
			"bind complete"
		);

		Self {
			target: None,
			descriptor,
			table,
			none,
			allocator,
			_loader: loader,
		}
	}

	/// Opens the library at `path` and binds `descriptor` against it.
	pub fn bind_path(descriptor: Descriptor, path: impl AsRef<Path>, options: &BindOptions) -> Result<Self> {
		let library = DynamicLibrary::open(path, options.global)?;
		Ok(Self::bind(descriptor, library, options))
	}

	/// Loads the descriptor for `target` from `source` and binds the library at `path`.
	#[instrument(name = "binding::open", level = "info", skip_all, fields(target = %target))]
	pub fn open(
		source: &dyn DescriptorSource,
		target: Target,
		path: impl AsRef<Path>,
		options: &BindOptions,
	) -> Result<Self> {
		let descriptor = source.load(&target)?;
		let mut bindings = Self::bind_path(descriptor, path, options)?;
		bindings.target = Some(target);
		Ok(bindings)
	}

	pub fn target(&self) -> Option<Target> {
		self.target
	}

	pub fn descriptor(&self) -> &Descriptor {
		&self.descriptor
	}

	pub fn table(&self) -> &BindingTable {
		&self.table
	}

	pub fn layout(&self, kind: StructKind) -> &StructLayout {
		self.descriptor.layout(kind)
	}

	/// Address of the runtime's `None` singleton, resolved once at bind time.
	pub fn none(&self) -> Option<*mut c_void> {
		self.none
	}

	pub fn allocator(&self) -> Rc<dyn NativeAllocator> {
		self.allocator.clone()
	}

	/// Address of a bound function.
	pub fn address(&self, name: &str) -> std::result::Result<*mut c_void, InvocationError> {
		match self.table.get(name) {
			None => Err(InvocationError::UnknownFunction(name.to_string())),
			Some(Binding::Unresolved {
				reason,
			}) => Err(InvocationError::Unresolved {
				name: name.to_string(),
				reason: reason.clone(),
			}),
			Some(Binding::Resolved {
				address,
				..
			}) => Ok(*address),
		}
	}

	/// Calls the bound function `name` with word sized `args`.
	///
	/// More than [`MAX_ARITY`] arguments fail with [`ArityError`] before anything else is
	/// looked at.
	///
	/// # Safety
	/// The arguments must match what the native function expects; no checking beyond the
	/// count is possible.
	pub unsafe fn invoke(&self, name: &str, args: &[Word]) -> Result<Word> {
		if args.len() > MAX_ARITY {
			return Err(ArityError {
				name: name.to_string(),
				given: args.len(),
				max: MAX_ARITY,
			}
			.into());
		}

		let address = self.address(name)?;
		if let Some(Binding::Resolved {
			arity,
			..
		}) = self.table.get(name)
		{
			if *arity != args.len() {
				warn!(symbol = name, expected = *arity, given = args.len(), "argument count differs from signature");
			}
		}

		// SAFETY: at most MAX_ARITY arguments, checked above.
		let result = unsafe { dispatch::call(address, args) };
		result.ok_or_else(|| {
			ArityError {
				name: name.to_string(),
				given: args.len(),
				max: MAX_ARITY,
			}
			.into()
		})
	}

	/// `value` as a native UTF-8 string allocated with the session allocator.
	pub fn to_native(&self, value: &str) -> Result<NativeString> {
		Ok(NativeString::new(value, Encoding::Narrow, self.allocator.clone())?)
	}

	/// `value` as a native `wchar_t` string for the bound platform.
	pub fn to_native_wide(&self, value: &str) -> Result<NativeString> {
		let encoding = match self.target {
			Some(target) => Encoding::wide_for(target.platform),
			None => Encoding::host_wide(),
		};
		Ok(NativeString::new(value, encoding, self.allocator.clone())?)
	}

	/// Reads a native UTF-8 string.
	///
	/// # Safety
	/// `ptr` must be null or point to a terminated string.
	pub unsafe fn from_native(&self, ptr: *const c_void) -> Result<Option<String>> {
		Ok(unsafe { Encoding::Narrow.decode(ptr) }?)
	}

	/// Reads a native `wchar_t` string.
	///
	/// # Safety
	/// `ptr` must be null or point to a terminated wide string.
	pub unsafe fn from_native_wide(&self, ptr: *const c_void) -> Result<Option<String>> {
		let encoding = match self.target {
			Some(target) => Encoding::wide_for(target.platform),
			None => Encoding::host_wide(),
		};
		Ok(unsafe { encoding.decode(ptr) }?)
	}

	/// Frees memory the library allocated and handed to the host.
	///
	/// # Safety
	/// `ptr` must come from the session allocator and not be freed yet.
	pub unsafe fn free_native(&self, ptr: *mut c_void) {
		if !ptr.is_null() {
			unsafe { self.allocator.free(ptr) }
		}
	}

	/// A zeroed buffer for one struct of `kind`.
	pub fn buffer(&self, kind: StructKind) -> Result<RawStructBuffer<'_>> {
		Ok(RawStructBuffer::new(self.layout(kind), self.allocator())?)
	}
}

fn resolve_allocator(loader: &Rc<dyn SymbolLoader>, options: &BindOptions) -> Rc<dyn NativeAllocator> {
	match (loader.resolve(&options.malloc_symbol), loader.resolve(&options.free_symbol)) {
		(Ok(malloc), Ok(free)) => {
			debug!(malloc = %options.malloc_symbol, free = %options.free_symbol, "using library allocator");
			// SAFETY: the symbols are the library's documented allocator pair.
			Rc::new(unsafe { LibraryAllocator::from_addresses(malloc, free) }.owned_by(loader.clone()))
		}
		(malloc, _) => {
			let missing = if malloc.is_err() {
				&options.malloc_symbol
			} else {
				&options.free_symbol
			};
			warn!(symbol = %missing, "library allocator not resolved, falling back to the system allocator");
			Rc::new(SystemAllocator)
		}
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use pyabi_descriptor::{FunctionSignature, Parameter};

	use super::*;
	use crate::error::{BindError, Error};

	#[derive(Default)]
	struct Symbols(HashMap<&'static str, usize>);

	impl SymbolLoader for Symbols {
		fn resolve(&self, name: &str) -> std::result::Result<*mut c_void, BindError> {
			self.0.get(name).map(|a| *a as *mut c_void).ok_or_else(|| BindError::Symbol {
				name: name.to_string(),
				reason: "missing".to_string(),
			})
		}
	}

	extern "C" fn answer() -> Word {
		42
	}

	fn descriptor() -> Descriptor {
		let mut descriptor = Descriptor::default();
		descriptor.functions.push(FunctionSignature::new("answer", "long", vec![Parameter::new("", "void")]));
		descriptor.functions.push(FunctionSignature::new("_private", "void", vec![]));
		descriptor.functions.push(FunctionSignature::new("missing", "void", vec![]));
		descriptor
	}

	fn symbols() -> Symbols {
		let mut symbols = Symbols::default();
		symbols.0.insert("answer", answer as *const () as usize);
		symbols.0.insert("_private", answer as *const () as usize);
		symbols
	}

	#[test]
	fn test_private_functions_are_skipped() {
		let bindings = Bindings::bind(descriptor(), symbols(), &BindOptions::default());
		assert!(!bindings.table().contains("_private"));
		assert_eq!(bindings.table().len(), 2);
		assert_eq!(bindings.table().resolved_count(), 1);
	}

	#[test]
	fn test_empty_prefix_binds_everything() {
		let bindings = Bindings::bind(descriptor(), symbols(), &BindOptions::new().private_prefix(""));
		assert!(bindings.table().get("_private").unwrap().is_resolved());
	}

	#[test]
	fn test_invoke_errors() {
		let bindings = Bindings::bind(descriptor(), symbols(), &BindOptions::default());

		assert_eq!(unsafe { bindings.invoke("answer", &[]) }.unwrap(), 42);
		assert!(matches!(
			unsafe { bindings.invoke("missing", &[]) },
			Err(Error::Invocation(InvocationError::Unresolved { .. }))
		));
		assert!(matches!(
			unsafe { bindings.invoke("nope", &[]) },
			Err(Error::Invocation(InvocationError::UnknownFunction(_)))
		));
	}

	#[test]
	fn test_missing_allocator_and_none_fall_back() {
		let bindings = Bindings::bind(descriptor(), symbols(), &BindOptions::default());
		assert!(bindings.none().is_none());

		let native = bindings.to_native("fallback").unwrap();
		assert_eq!(unsafe { bindings.from_native(native.as_ptr()) }.unwrap().as_deref(), Some("fallback"));
	}
}
