// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Native offset probing.
//!
//! Offsets depend on the compiler and ABI the runtime was built with, so they are measured
//! rather than computed: a generated program allocates each struct, prints the distance of
//! every member from the start of the instance, and its output is written back into the
//! descriptor. The program is compiled against the unmodified headers on the platform the
//! descriptor is for.

mod output;
mod source;

use std::{
	env::consts::EXE_SUFFIX,
	fs, io,
	path::{Path, PathBuf},
	process::Command,
};

pub use output::{ProbeOutput, SIZEOF_PREFIX};
use pyabi_descriptor::{Descriptor, Platform, Target};
pub use source::{PRIMITIVES, is_probeable, probe_source};
use tracing::{debug, instrument};

use crate::{
	error::ProbeError,
	toolchain::{Toolchain, run_tool},
};

#[derive(Debug, Clone, Copy)]
pub struct Prober<'a> {
	toolchain: &'a Toolchain,
	host: Platform,
}

impl<'a> Prober<'a> {
	pub fn new(toolchain: &'a Toolchain, host: Platform) -> Self {
		Self {
			toolchain,
			host,
		}
	}

	pub fn host(&self) -> Platform {
		self.host
	}

	/// Probing only measures the host ABI, so `target` must be a host target.
	pub fn ensure_native(&self, target: &Target) -> Result<(), ProbeError> {
		if target.platform != self.host {
			return Err(ProbeError::CrossPlatform {
				host: self.host,
				target: *target,
			});
		}
		Ok(())
	}

	/// Measures the layouts of `descriptor` and writes them back.
	///
	/// `include_dirs` must hold the real headers of `target`; the probe source and binary
	/// are written to `work_dir`.
	#[instrument(name = "gen::probe", level = "debug", skip_all, fields(target = %target))]
	pub fn probe(
		&self,
		target: &Target,
		include_dirs: &[PathBuf],
		work_dir: &Path,
		descriptor: &mut Descriptor,
	) -> Result<ProbeOutput, ProbeError> {
		self.ensure_native(target)?;

		let io_error = |path: &Path| {
			let path = path.to_path_buf();
			move |source: io::Error| ProbeError::Io {
				path,
				source,
			}
		};

		fs::create_dir_all(work_dir).map_err(io_error(work_dir))?;
		let source_path = work_dir.join(format!("probe-{}.c", target.version.compact()));
		let binary = work_dir.join(format!("probe-{}{EXE_SUFFIX}", target.version.compact()));
		fs::write(&source_path, probe_source(descriptor)).map_err(io_error(&source_path))?;

		let mut compile = self.toolchain.compile_command(&source_path, &binary, include_dirs);
		debug!(probe = %source_path.display(), command = ?compile, "compiling probe");
		run_tool(&mut compile).map_err(ProbeError::Compile)?;

		let stdout = run_tool(&mut Command::new(&binary)).map_err(ProbeError::Execute)?;
		let output = ProbeOutput::parse(&stdout)?;
		output.apply(descriptor);

		debug!(structs = output.struct_sizes.len(), members = output.members.len(), "probed");
		Ok(output)
	}
}
