// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Descriptor model for the pyabi dynamic FFI layer.
//!
//! A [`Descriptor`] catalogs everything the host needs to talk to one build of the
//! native runtime library without its headers:
//! - the exported function signatures ([`FunctionSignature`])
//! - the layouts of the handful of ABI-critical structs ([`StructLayout`])
//! - an auxiliary string bag for probe-derived constants
//!
//! Descriptors are produced per [`Target`] (platform + version) by `pyabi-gen` and
//! served at run time through a [`DescriptorSource`].

pub mod descriptor;
pub mod error;
pub mod function;
pub mod layout;
pub mod store;
pub mod target;

pub use descriptor::{Descriptor, StructKind, Structs, lookup_function};
pub use error::{DescriptorError, OffsetError};
pub use function::{FunctionSignature, Parameter};
pub use layout::{Field, LayoutWarning, StructLayout, StructMember, UNRESOLVED_OFFSET, member_offset};
pub use store::{DescriptorSource, FsStore, StaticEntry, StaticStore};
pub use target::{Platform, Target, Version};

pub type Result<T> = std::result::Result<T, DescriptorError>;
