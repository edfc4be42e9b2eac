// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Builders for the structs the runtime expects the host to hand over when it defines an
//! extension module. Both resolve every member they need before writing the first byte.

mod method;
mod module;

pub use method::{MethodEntry, MethodTable, build_method_table};
pub use module::{ModuleDescriptor, build_module_descriptor};
