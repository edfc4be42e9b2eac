// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Macro neutralizers appended to `pyport.h` so the header tree parses as plain C.

use std::{
	fs,
	path::{Path, PathBuf},
};

use pyabi_descriptor::Version;
use tracing::{debug, instrument};

use crate::error::PatchError;

/// The header the neutralizers are appended to.
pub const PATCHED_HEADER: &str = "pyport.h";

const PATCH_UP_TO_311: &str = "
#define PyAPI_FUNC(RTYPE) RTYPE
#define PyAPI_DATA(RTYPE) RTYPE
#define PyMODINIT_FUNC PyObject*
#define _Py_NO_RETURN
#define Py_GCC_ATTRIBUTE(x)
#define Py_DEPRECATED(x)
";

const PATCH_FROM_312: &str = "
#define PyAPI_FUNC(RTYPE) RTYPE
#define Py_ALWAYS_INLINE
#define PyAPI_DATA(RTYPE) RTYPE
#define _Py_NO_RETURN
#define PyMODINIT_FUNC PyObject*
#define Py_GCC_ATTRIBUTE(x)
#define Py_DEPRECATED(x)
#define Py_UNUSED(x) x
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderPatch {
	text: &'static str,
}

impl HeaderPatch {
	pub fn for_version(version: Version) -> Self {
		let text = if (version.major(), version.minor()) >= (3, 12) {
			PATCH_FROM_312
		} else {
			PATCH_UP_TO_311
		};
		Self {
			text,
		}
	}

	pub fn text(&self) -> &'static str {
		self.text
	}

	/// Patches `pyport.h` under `headers`. Returns whether the file changed.
	pub fn apply(&self, headers: &Path) -> Result<bool, PatchError> {
		let path = headers.join(PATCHED_HEADER);
		if !path.is_file() {
			return Err(PatchError::Missing(path));
		}
		self.apply_to_file(&path)
	}

	/// Appends the neutralizers to `path` unless they are already there.
	#[instrument(name = "gen::patch", level = "debug", skip(self))]
	pub fn apply_to_file(&self, path: &Path) -> Result<bool, PatchError> {
		let io = |source| PatchError::Io {
			path: PathBuf::from(path),
			source,
		};

		let mut content = fs::read_to_string(path).map_err(io)?;
		if content.contains(self.text) {
			debug!("already patched");
			return Ok(false);
		}

		content.push_str(self.text);
		fs::write(path, content).map_err(io)?;
		debug!("patched");
		Ok(true)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_versioned_macro_sets() {
		let old = HeaderPatch::for_version(Version::new(3, 11));
		assert!(!old.text().contains("Py_ALWAYS_INLINE"));
		assert!(old.text().contains("#define PyAPI_FUNC(RTYPE) RTYPE"));

		for minor in [12, 13] {
			let new = HeaderPatch::for_version(Version::new(3, minor));
			assert!(new.text().contains("#define Py_ALWAYS_INLINE"));
			assert!(new.text().contains("#define Py_UNUSED(x) x"));
		}
		assert_eq!(HeaderPatch::for_version(Version::new(3, 9)), old);
	}
}
