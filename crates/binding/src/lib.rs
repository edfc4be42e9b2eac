// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Runtime binding against a native library described by a [`Descriptor`].
//!
//! [`Bindings::bind`] resolves every exported function named in the descriptor through a
//! [`SymbolLoader`], after which functions are invoked by name with word sized arguments.
//! The builders in [`builder`] write ABI-correct method tables and module descriptors using
//! only the offsets the descriptor carries.
//!
//! Everything here hands out raw capability: the native library's own memory rules still
//! apply to every pointer passed across.
//!
//! [`Descriptor`]: pyabi_descriptor::Descriptor

pub mod alloc;
pub mod bindings;
pub mod buffer;
pub mod builder;
pub mod dispatch;
pub mod error;
pub mod flags;
pub mod loader;
pub mod marshal;
pub mod table;
pub mod trampoline;

pub use alloc::{LibraryAllocator, NativeAllocator, SystemAllocator};
pub use bindings::{BindOptions, Bindings};
pub use buffer::RawStructBuffer;
pub use builder::{MethodEntry, MethodTable, ModuleDescriptor, build_method_table, build_module_descriptor};
pub use dispatch::{MAX_ARITY, Word};
pub use error::{ArityError, BindError, Error, InvocationError, MarshalError, Result};
pub use loader::{DynamicLibrary, SymbolLoader};
pub use marshal::{Encoding, NativeString};
pub use table::{Binding, BindingTable};
pub use trampoline::{CFunction, Trampoline};
