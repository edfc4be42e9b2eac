// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	collections::BTreeSet,
	fs,
	path::{Path, PathBuf},
};

use pyabi_descriptor::{Platform, StructKind, Target, Version};
use serde::{Deserialize, Serialize};

use crate::{
	error::ConfigError,
	provider::RuntimeInstallation,
	tags::{Ctags, HeaderScan, TagSource},
	toolchain::{ToolCommand, Toolchain},
};

/// How exported prototype names are collected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TagTool {
	Ctags {
		program: PathBuf,
	},
	HeaderScan,
}

impl TagTool {
	pub fn source(&self) -> Box<dyn TagSource> {
		match self {
			TagTool::Ctags {
				program,
			} => Box::new(Ctags::new(program)),
			TagTool::HeaderScan => Box::new(HeaderScan),
		}
	}
}

/// Settings of one generation run.
///
/// Every field has a default, so a config file only lists what it changes:
///
/// ```json
/// { "versions": ["3.11", "3.12"], "output_root": "descriptors", "workers": 2 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenConfig {
	pub versions: Vec<Version>,
	pub platforms: Vec<Platform>,
	/// Descriptors land in `<output_root>/<platform>/ctags-<version>.json`.
	pub output_root: PathBuf,
	/// Patched header copies and probe programs.
	pub scratch_root: PathBuf,
	/// Stand-in system headers for the preprocessor.
	pub fake_libc: PathBuf,
	/// Extra include directories for both preprocessing and probing.
	pub include_dirs: Vec<PathBuf>,
	pub tags: TagTool,
	pub preprocessor: ToolCommand,
	pub compiler: ToolCommand,
	pub structs: Vec<String>,
	pub include_deprecated: bool,
	/// Worker threads; 0 lets rayon choose.
	pub workers: usize,
	pub installations: Vec<RuntimeInstallation>,
}

impl Default for GenConfig {
	fn default() -> Self {
		Self {
			versions: vec![Version::new(3, 9), Version::new(3, 10), Version::new(3, 11), Version::new(3, 12)],
			platforms: Platform::current().ok().into_iter().collect(),
			output_root: PathBuf::from("platform_ctags"),
			scratch_root: std::env::temp_dir().join("pyabi-gen"),
			fake_libc: PathBuf::from("fake_libc_include"),
			include_dirs: Vec::new(),
			tags: TagTool::HeaderScan,
			preprocessor: ToolCommand::system_compiler(),
			compiler: ToolCommand::system_compiler(),
			structs: StructKind::ALL.iter().map(|kind| kind.name().to_string()).collect(),
			include_deprecated: false,
			workers: 0,
			installations: Vec::new(),
		}
	}
}

impl GenConfig {
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		serde_json::from_str(&json).map_err(|source| ConfigError::Malformed {
			path: path.to_path_buf(),
			source,
		})
	}

	pub fn with_versions(mut self, versions: impl IntoIterator<Item = Version>) -> Self {
		self.versions = versions.into_iter().collect();
		self
	}

	pub fn with_platforms(mut self, platforms: impl IntoIterator<Item = Platform>) -> Self {
		self.platforms = platforms.into_iter().collect();
		self
	}

	pub fn with_output_root(mut self, root: impl Into<PathBuf>) -> Self {
		self.output_root = root.into();
		self
	}

	pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
		self.scratch_root = root.into();
		self
	}

	pub fn with_fake_libc(mut self, dir: impl Into<PathBuf>) -> Self {
		self.fake_libc = dir.into();
		self
	}

	pub fn with_include_dir(mut self, dir: impl Into<PathBuf>) -> Self {
		self.include_dirs.push(dir.into());
		self
	}

	pub fn with_tags(mut self, tags: TagTool) -> Self {
		self.tags = tags;
		self
	}

	pub fn with_preprocessor(mut self, preprocessor: ToolCommand) -> Self {
		self.preprocessor = preprocessor;
		self
	}

	pub fn with_compiler(mut self, compiler: ToolCommand) -> Self {
		self.compiler = compiler;
		self
	}

	pub fn with_structs(mut self, structs: impl IntoIterator<Item = impl Into<String>>) -> Self {
		self.structs = structs.into_iter().map(Into::into).collect();
		self
	}

	pub fn with_include_deprecated(mut self, include: bool) -> Self {
		self.include_deprecated = include;
		self
	}

	pub fn with_workers(mut self, workers: usize) -> Self {
		self.workers = workers;
		self
	}

	pub fn with_installation(mut self, installation: RuntimeInstallation) -> Self {
		self.installations.push(installation);
		self
	}

	/// The requested structs; fails on names outside the descriptor's fixed set.
	pub fn struct_kinds(&self) -> Result<Vec<StructKind>, ConfigError> {
		self.structs
			.iter()
			.map(|name| StructKind::from_name(name).ok_or_else(|| ConfigError::UnknownStruct(name.clone())))
			.collect()
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.versions.is_empty() {
			return Err(ConfigError::Empty("versions"));
		}
		if self.platforms.is_empty() {
			return Err(ConfigError::Empty("platforms"));
		}
		self.struct_kinds()?;
		Ok(())
	}

	/// One unit per distinct (platform, version).
	pub fn targets(&self) -> Vec<Target> {
		let mut targets = BTreeSet::new();
		for platform in &self.platforms {
			for version in &self.versions {
				targets.insert(Target::new(*platform, *version));
			}
		}
		targets.into_iter().collect()
	}

	pub fn toolchain(&self) -> Toolchain {
		Toolchain::new(self.preprocessor.clone(), self.compiler.clone())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = GenConfig::default();
		assert_eq!(config.versions.len(), 4);
		assert_eq!(config.tags, TagTool::HeaderScan);
		assert_eq!(config.struct_kinds().unwrap(), StructKind::ALL.to_vec());
		assert!(!config.include_deprecated);
	}

	#[test]
	fn test_partial_json() {
		let config: GenConfig = serde_json::from_str(
			r#"{
				"versions": ["3.11", "3.12"],
				"platforms": ["linux", "windows"],
				"tags": { "kind": "ctags", "program": "/usr/bin/ctags" },
				"compiler": { "program": "clang", "args": ["-O0"] },
				"workers": 2
			}"#,
		)
		.unwrap();

		assert_eq!(config.versions, vec![Version::new(3, 11), Version::new(3, 12)]);
		assert_eq!(config.tags, TagTool::Ctags {
			program: PathBuf::from("/usr/bin/ctags")
		});
		assert_eq!(config.compiler.args, vec!["-O0".to_string()]);
		assert_eq!(config.preprocessor, ToolCommand::system_compiler());
		assert_eq!(config.workers, 2);
		assert_eq!(config.targets().len(), 4);
	}

	#[test]
	fn test_targets_are_distinct() {
		let config = GenConfig::default()
			.with_platforms([Platform::Linux, Platform::Linux])
			.with_versions([Version::new(3, 12), Version::new(3, 11), Version::new(3, 12)]);
		assert_eq!(config.targets(), vec![
			Target::new(Platform::Linux, Version::new(3, 11)),
			Target::new(Platform::Linux, Version::new(3, 12))
		]);
	}

	#[test]
	fn test_validation() {
		assert!(matches!(
			GenConfig::default().with_structs(["PyObject", "PyFrame"]).validate(),
			Err(ConfigError::UnknownStruct(name)) if name == "PyFrame"
		));
		assert!(matches!(GenConfig::default().with_versions([]).validate(), Err(ConfigError::Empty("versions"))));
		assert!(matches!(
			GenConfig::default().with_platforms([]).validate(),
			Err(ConfigError::Empty("platforms"))
		));
	}
}
