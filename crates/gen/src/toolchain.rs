// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! The external C preprocessor and compiler.

use std::{
	path::{Path, PathBuf},
	process::Command,
};

use once_cell::sync::Lazy;
use pyabi_descriptor::Platform;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ToolError;

/// Macros every preprocessor run defines.
pub const PREPROCESSOR_DEFINES: &[&str] = &["_POSIX_THREADS", "Py_ENABLE_SHARED"];

/// Triple this crate was built for; the probe has to run on it.
pub const BUILD_TARGET: &str = env!("PYABI_GEN_TARGET");
const BUILD_HOST: &str = env!("PYABI_GEN_HOST");

static SYSTEM_COMPILER: Lazy<ToolCommand> = Lazy::new(|| {
	detect_compiler().unwrap_or_else(|err| {
		warn!(error = %err, "no C compiler detected, falling back to cc");
		ToolCommand::new("cc")
	})
});

/// The C compiler `cc` selects for [`BUILD_TARGET`], honouring `CC`, `CFLAGS` and their
/// per-target variants.
pub fn detect_compiler() -> Result<ToolCommand, ToolError> {
	let mut build = cc::Build::new();
	build
		.target(BUILD_TARGET)
		.host(BUILD_HOST)
		.opt_level(0)
		.debug(false)
		.out_dir(std::env::temp_dir())
		.cargo_metadata(false)
		.cargo_warnings(false)
		.emit_rerun_if_env_changed(false);

	let tool = build.try_get_compiler().map_err(|source| ToolError::Detect {
		target: BUILD_TARGET,
		source,
	})?;
	Ok(ToolCommand {
		program: tool.path().to_path_buf(),
		args: tool.args().iter().map(|arg| arg.to_string_lossy().into_owned()).collect(),
	})
}

/// A program plus the extra arguments placed before the generated ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCommand {
	pub program: PathBuf,
	#[serde(default)]
	pub args: Vec<String>,
}

impl ToolCommand {
	pub fn new(program: impl Into<PathBuf>) -> Self {
		Self {
			program: program.into(),
			args: Vec::new(),
		}
	}

	/// The detected C compiler, or plain `cc` when detection fails. Detected once per process.
	pub fn system_compiler() -> Self {
		SYSTEM_COMPILER.clone()
	}

	pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
		self.args.push(arg.into());
		self
	}

	pub fn command(&self) -> Command {
		let mut command = Command::new(&self.program);
		command.args(&self.args);
		command
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
	pub preprocessor: ToolCommand,
	pub compiler: ToolCommand,
}

impl Toolchain {
	pub fn new(preprocessor: ToolCommand, compiler: ToolCommand) -> Self {
		Self {
			preprocessor,
			compiler,
		}
	}

	/// Arguments of a preprocessor run over `entry` for `platform`.
	///
	/// System headers come only from `include_dirs` (`-nostdinc`), which is where the fake libc goes.
	pub fn preprocess_args(platform: Platform, entry: &Path, include_dirs: &[PathBuf]) -> Vec<String> {
		let mut args = vec!["-E".to_string()];
		args.extend(PREPROCESSOR_DEFINES.iter().map(|define| format!("-D{define}")));
		if platform == Platform::Windows {
			args.push("-DMS_WINDOWS".to_string());
			args.push("-D__int64=int64_t".to_string());
		}
		args.push("-nostdinc".to_string());
		for dir in include_dirs {
			args.push("-I".to_string());
			args.push(dir.display().to_string());
		}
		args.push(entry.display().to_string());
		args
	}

	pub fn preprocess(&self, platform: Platform, entry: &Path, include_dirs: &[PathBuf]) -> Result<String, ToolError> {
		let mut command = self.preprocessor.command();
		command.args(Toolchain::preprocess_args(platform, entry, include_dirs));
		run_tool(&mut command)
	}

	/// The command compiling `source` into the executable `output`.
	pub fn compile_command(&self, source: &Path, output: &Path, include_dirs: &[PathBuf]) -> Command {
		let mut command = self.compiler.command();
		for dir in include_dirs {
			command.arg("-I").arg(dir);
		}
		command.arg("-o").arg(output).arg(source);
		command
	}
}

impl Default for Toolchain {
	fn default() -> Self {
		Self::new(ToolCommand::system_compiler(), ToolCommand::system_compiler())
	}
}

/// Runs `command` to completion and returns its standard output.
pub fn run_tool(command: &mut Command) -> Result<String, ToolError> {
	let program = command.get_program().to_string_lossy().into_owned();
	debug!(command = ?command, "running");

	let output = command.output().map_err(|source| ToolError::Spawn {
		program: program.clone(),
		source,
	})?;

	if !output.status.success() {
		return Err(ToolError::Failed {
			program,
			status: output.status.to_string(),
			stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
		});
	}

	Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
