// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Where runtime installations for probing come from.
//!
//! Installing runtimes is someone else's job; the pipeline only asks a provider for the
//! paths of an installation that already exists.

use std::{collections::HashMap, path::PathBuf};

use pyabi_descriptor::{Platform, Target, Version};
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// One installed runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeInstallation {
	pub platform: Platform,
	pub version: Version,
	pub library_path: PathBuf,
	/// Directory holding `Python.h`.
	pub include_dir: PathBuf,
	#[serde(default)]
	pub package_dir: PathBuf,
}

impl RuntimeInstallation {
	pub fn target(&self) -> Target {
		Target::new(self.platform, self.version)
	}
}

pub trait RuntimeProvider: Send + Sync {
	fn installation(&self, target: &Target) -> Result<RuntimeInstallation, ProviderError>;
}

/// A fixed set of installations, e.g. the ones listed in a config file.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
	installations: HashMap<Target, RuntimeInstallation>,
}

impl StaticProvider {
	pub fn new(installations: impl IntoIterator<Item = RuntimeInstallation>) -> Self {
		Self {
			installations: installations.into_iter().map(|i| (i.target(), i)).collect(),
		}
	}

	pub fn with(mut self, installation: RuntimeInstallation) -> Self {
		self.installations.insert(installation.target(), installation);
		self
	}

	pub fn len(&self) -> usize {
		self.installations.len()
	}

	pub fn is_empty(&self) -> bool {
		self.installations.is_empty()
	}
}

impl RuntimeProvider for StaticProvider {
	fn installation(&self, target: &Target) -> Result<RuntimeInstallation, ProviderError> {
		let installation = self.installations.get(target).ok_or(ProviderError::NotInstalled(*target))?;
		if !installation.include_dir.join("Python.h").is_file() {
			return Err(ProviderError::Incomplete {
				target: *target,
				reason: format!("no Python.h in {}", installation.include_dir.display()),
			});
		}
		Ok(installation.clone())
	}
}
