// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::ffi::c_void;

use indexmap::IndexMap;

/// Outcome of resolving one function at bind time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
	Resolved {
		address: *mut c_void,
		arity: usize,
	},
	Unresolved {
		reason: String,
	},
}

impl Binding {
	pub fn is_resolved(&self) -> bool {
		matches!(self, Binding::Resolved { .. })
	}

	pub fn address(&self) -> Option<*mut c_void> {
		match self {
			Binding::Resolved {
				address,
				..
			} => Some(*address),
			Binding::Unresolved {
				..
			} => None,
		}
	}
}

/// Name indexed bindings in descriptor order.
///
/// Holds raw addresses and is therefore neither `Send` nor `Sync`.
#[derive(Debug, Clone, Default)]
pub struct BindingTable {
	entries: IndexMap<String, Binding>,
}

impl BindingTable {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, name: impl Into<String>, binding: Binding) {
		self.entries.insert(name.into(), binding);
	}

	pub fn get(&self, name: &str) -> Option<&Binding> {
		self.entries.get(name)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.entries.contains_key(name)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &Binding)> {
		self.entries.iter().map(|(name, binding)| (name.as_str(), binding))
	}

	pub fn resolved_count(&self) -> usize {
		self.entries.values().filter(|b| b.is_resolved()).count()
	}

	pub fn unresolved(&self) -> impl Iterator<Item = (&str, &str)> {
		self.entries.iter().filter_map(|(name, binding)| match binding {
			Binding::Unresolved {
				reason,
			} => Some((name.as_str(), reason.as_str())),
			Binding::Resolved {
				..
			} => None,
		})
	}
}

#[cfg(test)]
mod tests {
	use std::ptr::null_mut;

	use super::*;

	#[test]
	fn test_counts_and_order() {
		let mut table = BindingTable::new();
		table.insert("Py_Initialize", Binding::Resolved {
			address: null_mut::<c_void>().wrapping_add(16),
			arity: 0,
		});
		table.insert("Py_Missing", Binding::Unresolved {
			reason: "not exported".to_string(),
		});
		table.insert("Py_Finalize", Binding::Resolved {
			address: null_mut::<c_void>().wrapping_add(32),
			arity: 0,
		});

		assert_eq!(table.len(), 3);
		assert_eq!(table.resolved_count(), 2);
		assert_eq!(table.unresolved().collect::<Vec<_>>(), vec![("Py_Missing", "not exported")]);
		assert_eq!(table.iter().map(|(name, _)| name).collect::<Vec<_>>(), vec![
			"Py_Initialize",
			"Py_Missing",
			"Py_Finalize"
		]);
		assert!(table.get("Py_Missing").unwrap().address().is_none());
	}
}
