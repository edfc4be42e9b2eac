// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::path::PathBuf;

use pyabi_descriptor::{DescriptorError, OffsetError};

#[derive(Debug, thiserror::Error)]
pub enum BindError {
	#[error("failed to load library {path}: {source}")]
	Library {
		path: PathBuf,
		#[source]
		source: libloading::Error,
	},

	#[error("failed to resolve symbol '{name}': {reason}")]
	Symbol {
		name: String,
		reason: String,
	},
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvocationError {
	#[error("function '{0}' is not part of the descriptor")]
	UnknownFunction(String),

	#[error("function '{name}' is unresolved: {reason}")]
	Unresolved {
		name: String,
		reason: String,
	},
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{name}' called with {given} arguments, at most {max} are supported")]
pub struct ArityError {
	pub name: String,
	pub given: usize,
	pub max: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarshalError {
	#[error("string contains a nul character at position {position}")]
	InteriorNul {
		position: usize,
	},

	#[error("native allocation of {size} bytes failed")]
	Allocation {
		size: usize,
	},

	#[error("native string is not valid {encoding}")]
	InvalidEncoding {
		encoding: &'static str,
	},

	#[error("unsupported wide character width {0}")]
	UnsupportedWidth(usize),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Bind(#[from] BindError),

	#[error(transparent)]
	Invocation(#[from] InvocationError),

	#[error(transparent)]
	Arity(#[from] ArityError),

	#[error(transparent)]
	Marshal(#[from] MarshalError),

	#[error(transparent)]
	Offset(#[from] OffsetError),

	#[error(transparent)]
	Descriptor(#[from] DescriptorError),
}

pub type Result<T> = std::result::Result<T, Error>;
