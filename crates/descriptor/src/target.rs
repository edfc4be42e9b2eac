// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{self, Display, Formatter},
	str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::error::DescriptorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
	Linux,
	Darwin,
	Windows,
}

impl Platform {
	pub const ALL: [Platform; 3] = [Platform::Linux, Platform::Darwin, Platform::Windows];

	/// The platform of the running process.
	pub fn current() -> Result<Platform, DescriptorError> {
		if cfg!(target_os = "linux") {
			Ok(Platform::Linux)
		} else if cfg!(target_os = "macos") {
			Ok(Platform::Darwin)
		} else if cfg!(target_os = "windows") {
			Ok(Platform::Windows)
		} else {
			Err(DescriptorError::UnsupportedPlatform(std::env::consts::OS.to_string()))
		}
	}

	pub const fn as_str(&self) -> &'static str {
		match self {
			Platform::Linux => "linux",
			Platform::Darwin => "darwin",
			Platform::Windows => "windows",
		}
	}

	/// Width in bytes of the runtime's `wchar_t`.
	pub const fn wchar_width(&self) -> usize {
		match self {
			Platform::Windows => 2,
			Platform::Linux | Platform::Darwin => 4,
		}
	}
}

impl Display for Platform {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Platform {
	type Err = DescriptorError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"linux" => Ok(Platform::Linux),
			"darwin" | "macos" => Ok(Platform::Darwin),
			"windows" => Ok(Platform::Windows),
			other => Err(DescriptorError::UnsupportedPlatform(other.to_string())),
		}
	}
}

/// A `major.minor` runtime version. Patch levels share one descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
	major: u32,
	minor: u32,
}

impl Version {
	pub const fn new(major: u32, minor: u32) -> Self {
		Self {
			major,
			minor,
		}
	}

	/// Parses `"3.11"` or `"3.11.4"`.
	pub fn parse(version: &str) -> Result<Version, DescriptorError> {
		let invalid = || DescriptorError::InvalidVersion(version.to_string());

		let mut parts = version.trim().split('.');
		let major = parts.next().and_then(|p| p.parse::<u32>().ok()).ok_or_else(invalid)?;
		let minor = parts.next().and_then(|p| p.parse::<u32>().ok()).ok_or_else(invalid)?;

		if let Some(patch) = parts.next() {
			if patch.is_empty() || !patch.chars().all(|c| c.is_ascii_alphanumeric()) {
				return Err(invalid());
			}
		}
		if parts.next().is_some() {
			return Err(invalid());
		}

		Ok(Version::new(major, minor))
	}

	pub const fn major(&self) -> u32 {
		self.major
	}

	pub const fn minor(&self) -> u32 {
		self.minor
	}

	/// Compact key used in descriptor file names: `3.11` becomes `311`.
	pub fn compact(&self) -> String {
		format!("{}{}", self.major, self.minor)
	}
}

impl Display for Version {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{}", self.major, self.minor)
	}
}

impl FromStr for Version {
	type Err = DescriptorError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Version::parse(s)
	}
}

impl TryFrom<String> for Version {
	type Error = DescriptorError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Version::parse(&value)
	}
}

impl From<Version> for String {
	fn from(value: Version) -> Self {
		value.to_string()
	}
}

/// The (platform, version) pair a descriptor belongs to.
///
/// Passed explicitly into binding sessions and pipeline units; nothing in the
/// workspace keeps a global table keyed by platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Target {
	pub platform: Platform,
	pub version: Version,
}

impl Target {
	pub const fn new(platform: Platform, version: Version) -> Self {
		Self {
			platform,
			version,
		}
	}

	/// Target for the running platform and a caller supplied version string.
	pub fn current(version: &str) -> Result<Target, DescriptorError> {
		Ok(Target::new(Platform::current()?, Version::parse(version)?))
	}

	pub fn file_name(&self) -> String {
		format!("ctags-{}.json", self.version.compact())
	}
}

impl Display for Target {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}", self.platform, self.version)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_compact_versions() {
		for (input, compact) in [("3.9", "39"), ("3.10", "310"), ("3.11", "311"), ("3.12", "312")] {
			assert_eq!(Version::parse(input).unwrap().compact(), compact);
		}
	}

	#[test]
	fn test_patch_level_is_ignored() {
		assert_eq!(Version::parse("3.11.4").unwrap(), Version::new(3, 11));
		assert_eq!(Version::parse(" 3.10 ").unwrap().to_string(), "3.10");
	}

	#[test]
	fn test_invalid_versions() {
		for input in ["", "3", "3.", "three.eleven", "3.11.4.1", "311"] {
			assert!(matches!(Version::parse(input), Err(DescriptorError::InvalidVersion(_))), "{input}");
		}
	}

	#[test]
	fn test_version_serde_as_string() {
		let json = serde_json::to_string(&Version::new(3, 12)).unwrap();
		assert_eq!(json, "\"3.12\"");
		let version: Version = serde_json::from_str("\"3.9\"").unwrap();
		assert_eq!(version, Version::new(3, 9));
	}

	#[test]
	fn test_platform_names() {
		for platform in Platform::ALL {
			assert_eq!(platform.as_str().parse::<Platform>().unwrap(), platform);
		}
		assert_eq!("macos".parse::<Platform>().unwrap(), Platform::Darwin);
		assert!("haiku".parse::<Platform>().is_err());
	}

	#[test]
	fn test_target_file_name() {
		let target = Target::new(Platform::Linux, Version::new(3, 11));
		assert_eq!(target.file_name(), "ctags-311.json");
		assert_eq!(target.to_string(), "linux/3.11");
	}
}
