// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use serde::{Deserialize, Serialize};

use crate::descriptor::null_as_default;

/// A single named parameter of an exported function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
	pub name: String,
	#[serde(rename = "type")]
	pub ty: String,
}

impl Parameter {
	pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			ty: ty.into(),
		}
	}

	pub fn is_variadic(&self) -> bool {
		self.ty == "..."
	}
}

/// Signature of one exported function of the native library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSignature {
	pub name: String,
	pub return_type: String,
	#[serde(default, deserialize_with = "null_as_default")]
	pub parameters: Vec<Parameter>,
}

impl FunctionSignature {
	pub fn new(name: impl Into<String>, return_type: impl Into<String>, parameters: Vec<Parameter>) -> Self {
		Self {
			name: name.into(),
			return_type: return_type.into(),
			parameters,
		}
	}

	/// Number of fixed word arguments the function takes.
	///
	/// A lone `void` parameter means no parameters; a trailing `...` is not counted.
	pub fn arity(&self) -> usize {
		if self.parameters.len() == 1 && self.parameters[0].ty == "void" {
			return 0;
		}
		self.parameters.iter().filter(|p| !p.is_variadic()).count()
	}

	pub fn is_variadic(&self) -> bool {
		self.parameters.last().is_some_and(Parameter::is_variadic)
	}
}
