// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::target::Platform;

/// Errors raised while locating, reading or writing descriptors.
#[derive(Debug, Error)]
pub enum DescriptorError {
	#[error("no descriptor for version {version} on {platform}")]
	NotFound {
		platform: Platform,
		version: String,
	},

	#[error("invalid version string '{0}'")]
	InvalidVersion(String),

	#[error("unsupported platform '{0}'")]
	UnsupportedPlatform(String),

	#[error("failed to access descriptor at {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	#[error("malformed descriptor {origin}: {source}")]
	Malformed {
		origin: String,
		#[source]
		source: serde_json::Error,
	},
}

/// Errors raised when a struct member offset cannot be used for a write.
///
/// All of these are raised before any byte of the target buffer is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OffsetError {
	#[error("offset not found: member '{member}' is not part of layout '{layout}'")]
	MissingMember {
		layout: String,
		member: String,
	},

	#[error("offset not found: member '{member}' of layout '{layout}' is unresolved")]
	Unresolved {
		layout: String,
		member: String,
	},

	#[error("access of {width} bytes at offset {offset} exceeds buffer of {len} bytes")]
	OutOfBounds {
		offset: usize,
		width: usize,
		len: usize,
	},

	#[error("field at offset {offset} is {size} bytes wide, cannot hold {width} bytes")]
	WidthMismatch {
		offset: usize,
		size: usize,
		width: usize,
	},

	#[error("layout '{0}' has no size")]
	EmptyLayout(String),
}
