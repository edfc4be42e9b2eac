// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::{BTreeMap, HashMap};

use pyabi_descriptor::{Descriptor, StructKind, UNRESOLVED_OFFSET};

use crate::error::ProbeError;

/// Data bag key prefix of primitive sizes.
pub const SIZEOF_PREFIX: &str = "sizeof:";

/// Parsed output of a probe run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeOutput {
	pub struct_sizes: HashMap<String, usize>,
	/// (struct, member) to (offset, size).
	pub members: HashMap<(String, String), (i64, usize)>,
	pub primitive_sizes: BTreeMap<String, usize>,
}

impl ProbeOutput {
	pub fn parse(output: &str) -> Result<ProbeOutput, ProbeError> {
		let mut parsed = ProbeOutput::default();

		for (index, line) in output.lines().enumerate() {
			let text = line.trim();
			if text.is_empty() {
				continue;
			}
			let malformed = || ProbeError::Output {
				line: index + 1,
				text: text.to_string(),
			};

			let words: Vec<&str> = text.split_whitespace().collect();
			match words.as_slice() {
				["struct", name, size] => {
					let size = size.parse().map_err(|_| malformed())?;
					parsed.struct_sizes.insert(name.to_string(), size);
				}
				["member", layout, member, offset, size] => {
					let offset: i64 = offset.parse().map_err(|_| malformed())?;
					let size = size.parse().map_err(|_| malformed())?;
					if offset < 0 {
						return Err(malformed());
					}
					parsed.members.insert((layout.to_string(), member.to_string()), (offset, size));
				}
				["sizeof", size, ty @ ..] if !ty.is_empty() => {
					let size = size.parse().map_err(|_| malformed())?;
					parsed.primitive_sizes.insert(ty.join(" "), size);
				}
				_ => return Err(malformed()),
			}
		}

		Ok(parsed)
	}

	/// Writes probed sizes and offsets into `descriptor`.
	///
	/// Members the probe did not report get the unresolved offset. Layouts the probe did
	/// not report keep their size.
	pub fn apply(&self, descriptor: &mut Descriptor) {
		for kind in StructKind::ALL {
			let layout = descriptor.structs.get_mut(kind);
			if layout.is_empty() {
				continue;
			}
			if let Some(size) = self.struct_sizes.get(&layout.name) {
				layout.size = *size;
			}

			let name = layout.name.clone();
			for member in layout.members.iter_mut() {
				match self.members.get(&(name.clone(), member.name.clone())) {
					Some((offset, size)) => {
						member.offset = *offset;
						member.size = *size;
					}
					None => member.offset = UNRESOLVED_OFFSET,
				}
			}
		}

		for (ty, size) in &self.primitive_sizes {
			descriptor.data.insert(format!("{SIZEOF_PREFIX}{ty}"), size.to_string());
		}
	}
}
