// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Declared C types and their descriptor spelling.
//!
//! Qualifiers are dropped when a declaration is parsed, so `const char *` renders as
//! `char*`. Pointers append `*`, arrays append `[N]` or `[]`, records render as
//! `struct tag` / `union tag` (or the bare keyword when anonymous) and function pointers
//! as `ret (*)(params)`.

use std::fmt::{self, Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
	Struct,
	Union,
}

impl RecordKind {
	pub const fn keyword(&self) -> &'static str {
		match self {
			RecordKind::Struct => "struct",
			RecordKind::Union => "union",
		}
	}
}

/// A struct or union, with its members when the declaration carried a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
	pub kind: RecordKind,
	pub tag: Option<String>,
	pub fields: Option<Vec<FieldDecl>>,
}

impl Record {
	/// Key of a tagged record in [`super::Declarations::records`], e.g. `struct _object`.
	pub fn key(&self) -> Option<String> {
		self.tag.as_ref().map(|tag| format!("{} {tag}", self.kind.keyword()))
	}

	pub fn is_anonymous(&self) -> bool {
		self.tag.is_none()
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
	pub name: Option<String>,
	pub ty: CType,
	/// Bit-field width expression.
	pub bits: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDecl {
	pub name: Option<String>,
	pub ty: CType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CType {
	/// Builtin, typedef or enum name, e.g. `unsigned long`, `Py_ssize_t`, `enum _x`.
	Named(String),
	Record(Record),
	Pointer(Box<CType>),
	Array(Box<CType>, Option<String>),
	Function {
		ret: Box<CType>,
		params: Vec<ParamDecl>,
		variadic: bool,
	},
}

impl CType {
	pub fn named(name: impl Into<String>) -> Self {
		CType::Named(name.into())
	}

	pub fn pointer(self) -> Self {
		CType::Pointer(Box::new(self))
	}

	pub fn is_void(&self) -> bool {
		matches!(self, CType::Named(name) if name == "void")
	}

	fn fmt_params(params: &[ParamDecl], variadic: bool, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str("(")?;
		for (i, param) in params.iter().enumerate() {
			if i > 0 {
				f.write_str(", ")?;
			}
			write!(f, "{}", param.ty)?;
		}
		if variadic {
			f.write_str(if params.is_empty() { "..." } else { ", ..." })?;
		}
		f.write_str(")")
	}
}

impl Display for CType {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			CType::Named(name) => f.write_str(name),
			CType::Record(record) => match &record.tag {
				Some(tag) => write!(f, "{} {tag}", record.kind.keyword()),
				None => f.write_str(record.kind.keyword()),
			},
			CType::Pointer(inner) => match inner.as_ref() {
				CType::Function {
					ret,
					params,
					variadic,
				} => {
					write!(f, "{ret} (*)")?;
					CType::fmt_params(params, *variadic, f)
				}
				other => write!(f, "{other}*"),
			},
			CType::Array(..) => {
				let mut dims = Vec::new();
				let mut element = self;
				while let CType::Array(inner, dim) = element {
					dims.push(dim.as_deref().unwrap_or(""));
					element = inner;
				}
				write!(f, "{element}")?;
				for dim in dims {
					write!(f, "[{dim}]")?;
				}
				Ok(())
			}
			CType::Function {
				ret,
				params,
				variadic,
			} => {
				write!(f, "{ret} ")?;
				CType::fmt_params(params, *variadic, f)
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_pointer_and_array_spelling() {
		assert_eq!(CType::named("char").pointer().to_string(), "char*");
		assert_eq!(CType::named("char").pointer().pointer().to_string(), "char**");

		let matrix = CType::Array(Box::new(CType::Array(Box::new(CType::named("int")), Some("3".into()))), Some("2".into()));
		assert_eq!(matrix.to_string(), "int[2][3]");
		assert_eq!(CType::Array(Box::new(CType::named("wchar_t")), None).to_string(), "wchar_t[]");
	}

	#[test]
	fn test_record_spelling() {
		let tagged = CType::Record(Record {
			kind: RecordKind::Struct,
			tag: Some("_typeobject".into()),
			fields: None,
		});
		assert_eq!(tagged.pointer().to_string(), "struct _typeobject*");

		let anonymous = CType::Record(Record {
			kind: RecordKind::Union,
			tag: None,
			fields: Some(vec![]),
		});
		assert_eq!(anonymous.to_string(), "union");
	}

	#[test]
	fn test_function_pointer_spelling() {
		let object = CType::named("PyObject").pointer();
		let callback = CType::Function {
			ret: Box::new(object.clone()),
			params: vec![
				ParamDecl {
					name: Some("self".into()),
					ty: object.clone(),
				},
				ParamDecl {
					name: None,
					ty: object,
				},
			],
			variadic: false,
		};
		assert_eq!(callback.pointer().to_string(), "PyObject* (*)(PyObject*, PyObject*)");
	}
}
