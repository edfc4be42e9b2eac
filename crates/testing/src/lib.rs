// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Helpers shared by the integration tests of the pyabi crates.

pub mod compiler;
pub mod fixture;
pub mod symbols;
pub mod tempdir;
pub mod tracing;
pub mod util;

pub use compiler::c_compiler;
pub use symbols::MemorySymbols;
pub use tempdir::temp_dir;
pub use tracing::init_tracing;
