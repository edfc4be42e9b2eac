// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fs;

use pyabi_descriptor::Version;
use pyabi_gen::{HeaderPatch, PatchError};
use pyabi_testing::temp_dir;

const PYPORT: &str = "#ifndef Py_PYPORT_H\n#define Py_PYPORT_H\ntypedef long Py_ssize_t;\n#endif\n";

#[test]
fn test_patch_twice_is_byte_identical() {
	temp_dir(|dir| {
		let path = dir.join("pyport.h");
		fs::write(&path, PYPORT)?;

		for version in [Version::new(3, 11), Version::new(3, 12)] {
			fs::write(&path, PYPORT)?;
			let patch = HeaderPatch::for_version(version);

			assert!(patch.apply(dir).unwrap());
			let once = fs::read(&path)?;
			assert!(!patch.apply(dir).unwrap());
			let twice = fs::read(&path)?;

			assert_eq!(once, twice);
			assert!(once.starts_with(PYPORT.as_bytes()));
			assert!(String::from_utf8_lossy(&once).ends_with(patch.text()));
		}
		Ok(())
	})
	.unwrap();
}

#[test]
fn test_missing_header() {
	temp_dir(|dir| {
		let err = HeaderPatch::for_version(Version::new(3, 10)).apply(dir).unwrap_err();
		assert!(matches!(err, PatchError::Missing(path) if path == dir.join("pyport.h")));
		Ok(())
	})
	.unwrap();
}
