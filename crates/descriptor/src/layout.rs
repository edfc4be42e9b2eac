// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Struct layouts as observed on a concrete build of the native library.
//!
//! Member offsets are signed: [`UNRESOLVED_OFFSET`] marks a member whose offset could not
//! be probed. Reading the sentinel through [`member_offset`] is fine; turning it into a
//! [`Field`] for a write is not, and fails with [`OffsetError`].

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{descriptor::null_as_default, error::OffsetError};

/// Offset sentinel for members that are unknown or unsupported on a target.
pub const UNRESOLVED_OFFSET: i64 = -1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructMember {
	pub name: String,
	#[serde(rename = "type")]
	pub ty: String,
	pub offset: i64,
	pub size: usize,
}

impl StructMember {
	pub fn new(name: impl Into<String>, ty: impl Into<String>, offset: i64, size: usize) -> Self {
		Self {
			name: name.into(),
			ty: ty.into(),
			offset,
			size,
		}
	}

	/// A member whose offset and size are still to be probed.
	pub fn unresolved(name: impl Into<String>, ty: impl Into<String>) -> Self {
		Self::new(name, ty, UNRESOLVED_OFFSET, 0)
	}

	pub fn is_resolved(&self) -> bool {
		self.offset >= 0
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructLayout {
	pub name: String,
	pub size: usize,
	#[serde(default, deserialize_with = "null_as_default")]
	pub members: Vec<StructMember>,
}

impl StructLayout {
	pub fn new(name: impl Into<String>, size: usize) -> Self {
		Self {
			name: name.into(),
			size,
			members: Vec::new(),
		}
	}

	pub fn with_member(mut self, member: StructMember) -> Self {
		self.push(member);
		self
	}

	/// Appends a member, keeping names unique. Returns `false` if the name was already taken.
	pub fn push(&mut self, member: StructMember) -> bool {
		if self.member(&member.name).is_some() {
			return false;
		}
		self.members.push(member);
		true
	}

	pub fn is_empty(&self) -> bool {
		self.name.is_empty() && self.members.is_empty()
	}

	pub fn member(&self, name: &str) -> Option<&StructMember> {
		self.members.iter().find(|m| m.name == name)
	}

	pub fn member_mut(&mut self, name: &str) -> Option<&mut StructMember> {
		self.members.iter_mut().find(|m| m.name == name)
	}

	/// Offset of `name`, or [`UNRESOLVED_OFFSET`] when the member is absent.
	pub fn member_offset(&self, name: &str) -> i64 {
		self.member(name).map(|m| m.offset).unwrap_or(UNRESOLVED_OFFSET)
	}

	/// Resolves `name` to a writable [`Field`].
	pub fn field(&self, name: &str) -> Result<Field, OffsetError> {
		let member = self.member(name).ok_or_else(|| OffsetError::MissingMember {
			layout: self.name.clone(),
			member: name.to_string(),
		})?;

		if !member.is_resolved() {
			return Err(OffsetError::Unresolved {
				layout: self.name.clone(),
				member: name.to_string(),
			});
		}

		Ok(Field {
			offset: member.offset as usize,
			size: member.size,
		})
	}

	/// End offset of the furthest resolved member.
	pub fn members_end(&self) -> usize {
		self.members.iter().filter(|m| m.is_resolved()).map(|m| (m.offset as usize).saturating_add(m.size)).max().unwrap_or(0)
	}

	pub fn is_resolved(&self) -> bool {
		self.members.iter().all(StructMember::is_resolved)
	}

	/// Checks the probed layout for inconsistencies worth reporting to the operator.
	pub fn validate(&self) -> Vec<LayoutWarning> {
		let mut warnings = Vec::new();

		for member in self.members.iter().filter(|m| !m.is_resolved()) {
			warnings.push(LayoutWarning::UnresolvedMember {
				layout: self.name.clone(),
				member: member.name.clone(),
			});
		}

		let end = self.members_end();
		if end > self.size {
			warnings.push(LayoutWarning::SizeTooSmall {
				layout: self.name.clone(),
				size: self.size,
				end,
			});
		}

		warnings
	}
}

/// Offset of `name` within `layout`, or [`UNRESOLVED_OFFSET`] when absent.
pub fn member_offset(layout: &StructLayout, name: &str) -> i64 {
	layout.member_offset(name)
}

/// A resolved, non-negative member position inside a struct.
///
/// Only obtainable through [`StructLayout::field`], so a writer holding a `Field`
/// can never write at the unresolved sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
	offset: usize,
	size: usize,
}

impl Field {
	pub fn offset(&self) -> usize {
		self.offset
	}

	pub fn size(&self) -> usize {
		self.size
	}

	/// Position of `inner` when this field is an embedded struct of the layout `inner` came from.
	///
	/// Offsets saturate, so an overflowing position fails every later bounds check.
	pub fn nested(self, inner: Field) -> Field {
		Field {
			offset: self.offset.saturating_add(inner.offset),
			size: inner.size,
		}
	}

	/// The same field inside the `index`-th element of an array of structs of `stride` bytes.
	pub fn element(self, index: usize, stride: usize) -> Field {
		Field {
			offset: index.saturating_mul(stride).saturating_add(self.offset),
			size: self.size,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutWarning {
	SizeTooSmall {
		layout: String,
		size: usize,
		end: usize,
	},
	UnresolvedMember {
		layout: String,
		member: String,
	},
}

impl Display for LayoutWarning {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			LayoutWarning::SizeTooSmall {
				layout,
				size,
				end,
			} => write!(f, "layout '{layout}' has size {size} but its members end at {end}"),
			LayoutWarning::UnresolvedMember {
				layout,
				member,
			} => write!(f, "member '{member}' of layout '{layout}' has no offset"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn point() -> StructLayout {
		StructLayout::new("Point", 8)
			.with_member(StructMember::new("x", "int", 0, 4))
			.with_member(StructMember::new("y", "int", 4, 4))
	}

	#[test]
	fn test_member_offset_absent_is_sentinel() {
		let layout = point();
		assert_eq!(member_offset(&layout, "x"), 0);
		assert_eq!(member_offset(&layout, "y"), 4);
		assert_eq!(member_offset(&layout, "z"), UNRESOLVED_OFFSET);
		assert_eq!(member_offset(&StructLayout::default(), "x"), UNRESOLVED_OFFSET);
	}

	#[test]
	fn test_field_missing_member() {
		let err = point().field("z").unwrap_err();
		assert_eq!(
			err,
			OffsetError::MissingMember {
				layout: "Point".to_string(),
				member: "z".to_string(),
			}
		);
	}

	#[test]
	fn test_field_unresolved_member() {
		let layout = point().with_member(StructMember::unresolved("w", "int"));
		assert!(matches!(layout.field("w"), Err(OffsetError::Unresolved { .. })));
	}

	#[test]
	fn test_push_rejects_duplicate() {
		let mut layout = point();
		assert!(!layout.push(StructMember::new("x", "long", 0, 8)));
		assert_eq!(layout.members.len(), 2);
		assert_eq!(layout.member("x").unwrap().ty, "int");
	}

	#[test]
	fn test_nested_field() {
		let outer = StructLayout::new("Outer", 24).with_member(StructMember::new("inner", "Point", 8, 8));
		let field = outer.field("inner").unwrap().nested(point().field("y").unwrap());
		assert_eq!(field.offset(), 12);
		assert_eq!(field.size(), 4);
		assert_eq!(field.element(2, 24).offset(), 60);
	}

	#[test]
	fn test_validate_clean_layout() {
		assert!(point().validate().is_empty());
	}

	#[test]
	fn test_validate_size_too_small() {
		let mut layout = point();
		layout.size = 6;
		assert_eq!(
			layout.validate(),
			vec![LayoutWarning::SizeTooSmall {
				layout: "Point".to_string(),
				size: 6,
				end: 8,
			}]
		);
	}

	#[test]
	fn test_validate_reports_unresolved() {
		let layout = point().with_member(StructMember::unresolved("", "union"));
		let warnings = layout.validate();
		assert_eq!(warnings.len(), 1);
		assert!(matches!(warnings[0], LayoutWarning::UnresolvedMember { .. }));
	}
}
