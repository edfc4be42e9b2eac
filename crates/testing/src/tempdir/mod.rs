// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{env, fs, path::Path};

use uuid::Uuid;

/// Runs `f` inside a fresh, uniquely named directory that is removed afterwards.
pub fn temp_dir<F>(f: F) -> std::io::Result<()>
where
	F: FnOnce(&Path) -> std::io::Result<()>,
{
	let mut path = env::temp_dir();
	path.push(format!("pyabi-{}", Uuid::new_v4()));

	fs::create_dir(&path)?;
	let result = f(&path);

	let _ = fs::remove_dir_all(&path);
	result
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_directory_is_removed() {
		let mut seen = None;
		temp_dir(|path| {
			assert!(path.is_dir());
			fs::write(path.join("probe.c"), "int main(void) { return 0; }")?;
			seen = Some(path.to_path_buf());
			Ok(())
		})
		.unwrap();

		assert!(!seen.unwrap().exists());
	}
}
