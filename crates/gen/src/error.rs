// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{io, path::PathBuf};

use pyabi_descriptor::{DescriptorError, Platform, Target};
use thiserror::Error;

use crate::c::{LexError, ParseError};

#[derive(Debug, Error)]
pub enum PatchError {
	#[error("header {0} not found")]
	Missing(PathBuf),

	#[error("failed to patch {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: io::Error,
	},
}

/// An external tool that could not be run or exited unsuccessfully.
#[derive(Debug, Error)]
pub enum ToolError {
	#[error("failed to run {program}: {source}")]
	Spawn {
		program: String,
		#[source]
		source: io::Error,
	},

	#[error("no C compiler found for {target}: {source}")]
	Detect {
		target: &'static str,
		#[source]
		source: cc::Error,
	},

	#[error("{program} exited with {status}: {stderr}")]
	Failed {
		program: String,
		status: String,
		stderr: String,
	},
}

#[derive(Debug, Error)]
pub enum ExtractError {
	#[error("header tree {0} has no entry header")]
	MissingHeaders(PathBuf),

	#[error("failed to read {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	#[error("tag scan failed: {0}")]
	Tags(String),

	#[error(transparent)]
	Tool(#[from] ToolError),

	#[error(transparent)]
	Lex(#[from] LexError),

	#[error(transparent)]
	Parse(#[from] ParseError),
}

#[derive(Debug, Error)]
pub enum ProbeError {
	#[error("cannot probe {target} layouts on a {host} host")]
	CrossPlatform {
		host: Platform,
		target: Target,
	},

	#[error("probe compilation failed: {0}")]
	Compile(#[source] ToolError),

	#[error("probe execution failed: {0}")]
	Execute(#[source] ToolError),

	#[error("unexpected probe output line {line}: '{text}'")]
	Output {
		line: usize,
		text: String,
	},

	#[error("probe i/o on {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: io::Error,
	},
}

#[derive(Debug, Error)]
pub enum ProviderError {
	#[error("no runtime installation for {0}")]
	NotInstalled(Target),

	#[error("runtime installation for {target} is incomplete: {reason}")]
	Incomplete {
		target: Target,
		reason: String,
	},
}

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("failed to read config {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	#[error("malformed config {path}: {source}")]
	Malformed {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},

	#[error("unknown struct '{0}' in struct list")]
	UnknownStruct(String),

	#[error("config lists no {0}")]
	Empty(&'static str),
}

/// Why one pipeline unit failed.
#[derive(Debug, Error)]
pub enum UnitError {
	#[error(transparent)]
	Provider(#[from] ProviderError),

	#[error(transparent)]
	Patch(#[from] PatchError),

	#[error(transparent)]
	Extract(#[from] ExtractError),

	#[error(transparent)]
	Probe(#[from] ProbeError),

	#[error(transparent)]
	Store(#[from] DescriptorError),

	#[error("scratch directory {path}: {source}")]
	Scratch {
		path: PathBuf,
		#[source]
		source: io::Error,
	},
}

/// One failed (platform, version) unit.
#[derive(Debug, Error)]
#[error("{target}: {cause}")]
pub struct PipelineError {
	pub target: Target,
	#[source]
	pub cause: UnitError,
}

#[derive(Debug, Error)]
pub enum GenError {
	#[error(transparent)]
	Config(#[from] ConfigError),

	#[error("unsupported host: {0}")]
	Host(#[from] DescriptorError),

	#[error("failed to build worker pool: {0}")]
	Pool(#[from] rayon::ThreadPoolBuildError),
}
