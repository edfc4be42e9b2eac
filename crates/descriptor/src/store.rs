// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Persistence of descriptors, one JSON document per (platform, version).
//!
//! Files live at `<root>/<platform>/ctags-<compact version>.json`. Lookups never fall
//! back to a neighbouring version: a missing document is [`DescriptorError::NotFound`].

use std::{
	fs, io,
	path::{Path, PathBuf},
};

use tracing::{debug, instrument};

use crate::{
	descriptor::Descriptor,
	error::DescriptorError,
	target::{Platform, Target, Version},
};

/// Anything that can hand out the descriptor for a target.
pub trait DescriptorSource {
	fn load(&self, target: &Target) -> Result<Descriptor, DescriptorError>;

	/// Loads the descriptor for the running platform and a caller supplied version string.
	fn load_version(&self, version: &str) -> Result<Descriptor, DescriptorError> {
		self.load(&Target::current(version)?)
	}
}

/// Descriptor files on disk.
#[derive(Debug, Clone)]
pub struct FsStore {
	root: PathBuf,
}

impl FsStore {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self {
			root: root.into(),
		}
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	pub fn path(&self, target: &Target) -> PathBuf {
		self.root.join(target.platform.as_str()).join(target.file_name())
	}

	/// Writes `descriptor` for `target`, replacing any previous document atomically.
	#[instrument(level = "debug", skip(self, descriptor), fields(target = %target))]
	pub fn save(&self, target: &Target, descriptor: &Descriptor) -> Result<PathBuf, DescriptorError> {
		let path = self.path(target);
		let io_err = |source: io::Error| DescriptorError::Io {
			path: path.clone(),
			source,
		};

		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent).map_err(io_err)?;
		}

		let json = descriptor.to_json().map_err(|source| DescriptorError::Malformed {
			origin: path.display().to_string(),
			source,
		})?;

		let staging = path.with_extension("json.tmp");
		fs::write(&staging, json).map_err(io_err)?;
		fs::rename(&staging, &path).map_err(io_err)?;

		debug!(path = %path.display(), "descriptor written");
		Ok(path)
	}

	/// Versions with a descriptor for `platform`, ascending.
	pub fn versions(&self, platform: Platform) -> Result<Vec<Version>, DescriptorError> {
		let dir = self.root.join(platform.as_str());
		let entries = match fs::read_dir(&dir) {
			Ok(entries) => entries,
			Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
			Err(source) => {
				return Err(DescriptorError::Io {
					path: dir,
					source,
				});
			}
		};

		let mut versions = Vec::new();
		for entry in entries {
			let entry = entry.map_err(|source| DescriptorError::Io {
				path: dir.clone(),
				source,
			})?;
			let name = entry.file_name();
			let Some(compact) = name.to_str().and_then(|n| n.strip_prefix("ctags-")).and_then(|n| n.strip_suffix(".json"))
			else {
				continue;
			};
			if let Some(version) = expand_compact(compact) {
				versions.push(version);
			}
		}

		versions.sort();
		Ok(versions)
	}
}

impl DescriptorSource for FsStore {
	fn load(&self, target: &Target) -> Result<Descriptor, DescriptorError> {
		let path = self.path(target);
		let json = match fs::read_to_string(&path) {
			Ok(json) => json,
			Err(err) if err.kind() == io::ErrorKind::NotFound => {
				return Err(DescriptorError::NotFound {
					platform: target.platform,
					version: target.version.to_string(),
				});
			}
			Err(source) => {
				return Err(DescriptorError::Io {
					path,
					source,
				});
			}
		};

		Descriptor::from_json(&json).map_err(|source| DescriptorError::Malformed {
			origin: path.display().to_string(),
			source,
		})
	}
}

/// One descriptor document compiled into the consuming binary.
#[derive(Debug, Clone, Copy)]
pub struct StaticEntry {
	pub platform: Platform,
	/// Compact version key, e.g. `"311"`.
	pub version: &'static str,
	pub json: &'static str,
}

/// Descriptors served from a static table, typically filled with `include_str!`.
#[derive(Debug, Clone, Copy)]
pub struct StaticStore {
	entries: &'static [StaticEntry],
}

impl StaticStore {
	pub const fn new(entries: &'static [StaticEntry]) -> Self {
		Self {
			entries,
		}
	}
}

impl DescriptorSource for StaticStore {
	fn load(&self, target: &Target) -> Result<Descriptor, DescriptorError> {
		let compact = target.version.compact();
		let entry = self
			.entries
			.iter()
			.find(|e| e.platform == target.platform && e.version == compact)
			.ok_or_else(|| DescriptorError::NotFound {
				platform: target.platform,
				version: target.version.to_string(),
			})?;

		Descriptor::from_json(entry.json).map_err(|source| DescriptorError::Malformed {
			origin: format!("{}/{}", target.platform, entry.version),
			source,
		})
	}
}

/// Inverse of [`Version::compact`] for single digit majors: `"310"` is `3.10`.
fn expand_compact(compact: &str) -> Option<Version> {
	if compact.len() < 2 || !compact.chars().all(|c| c.is_ascii_digit()) {
		return None;
	}
	let (major, minor) = compact.split_at(1);
	Some(Version::new(major.parse().ok()?, minor.parse().ok()?))
}
