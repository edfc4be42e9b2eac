// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Descriptor generation.
//!
//! A descriptor is produced per (platform, version) in two passes over the runtime's
//! public headers:
//! 1. extraction: the headers are copied, patched so the export macros disappear,
//!    preprocessed, and parsed; exported prototypes become [`FunctionSignature`]s and the
//!    ABI-critical structs become layouts with every offset unresolved
//! 2. probing: a generated C program compiled against the original headers reports the
//!    real size and offset of every member, which are written back
//!
//! [`Pipeline`] runs both passes for every configured target in parallel and saves the
//! results to a [`FsStore`](pyabi_descriptor::FsStore).
//!
//! [`FunctionSignature`]: pyabi_descriptor::FunctionSignature

pub mod c;
pub mod config;
pub mod error;
pub mod extract;
pub mod patch;
pub mod pipeline;
pub mod probe;
pub mod provider;
pub mod tags;
pub mod toolchain;

pub use config::{GenConfig, TagTool};
pub use error::{
	ConfigError, ExtractError, GenError, PatchError, PipelineError, ProbeError, ProviderError, ToolError, UnitError,
};
pub use extract::{Extraction, Extractor};
pub use patch::HeaderPatch;
pub use pipeline::{Pipeline, PipelineReport};
pub use probe::{ProbeOutput, Prober};
pub use provider::{RuntimeInstallation, RuntimeProvider, StaticProvider};
pub use tags::{Ctags, HeaderScan, PrototypeNames, TagSource};
pub use toolchain::{ToolCommand, Toolchain, detect_compiler};
