// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! C declarations of a preprocessed header tree.

mod lexer;
mod parser;
mod token;
mod types;

use std::collections::HashMap;

pub use lexer::{LexError, Lexer};
pub use parser::{ParseError, Parser};
pub use token::{Span, Token, TokenKind};
pub use types::{CType, FieldDecl, ParamDecl, Record, RecordKind};

use crate::error::ExtractError;

/// Typedef chains longer than this are treated as unresolvable.
const MAX_TYPEDEF_DEPTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
	pub name: String,
	pub return_type: CType,
	pub params: Vec<ParamDecl>,
	pub variadic: bool,
	pub is_static: bool,
	pub is_inline: bool,
	/// Declared with a body, e.g. a `static inline` helper.
	pub is_definition: bool,
}

/// Everything the parser kept from one translation unit.
#[derive(Debug, Clone, Default)]
pub struct Declarations {
	/// Function declarations in source order.
	pub functions: Vec<FunctionDecl>,
	/// Records with a body, keyed `struct tag` / `union tag`.
	pub records: HashMap<String, Record>,
	pub typedefs: HashMap<String, CType>,
	/// Declarations that did not parse and were skipped.
	pub skipped: usize,
}

impl Declarations {
	pub fn function(&self, name: &str) -> Option<&FunctionDecl> {
		self.functions.iter().find(|f| f.name == name)
	}

	/// The record with a body that `name` denotes, through typedefs or as a struct tag.
	pub fn resolve_record(&self, name: &str) -> Option<&Record> {
		let mut current = name.to_string();

		for _ in 0..MAX_TYPEDEF_DEPTH {
			match self.typedefs.get(&current) {
				Some(CType::Record(record)) if record.fields.is_some() => return Some(record),
				Some(CType::Record(record)) => return record.key().and_then(|key| self.records.get(&key)),
				Some(CType::Named(next)) if *next != current => current = next.clone(),
				Some(_) => return None,
				None => {
					return self
						.records
						.get(&format!("struct {current}"))
						.or_else(|| self.records.get(&format!("union {current}")));
				}
			}
		}

		None
	}
}

/// Tokenizes and parses preprocessed C source.
pub fn parse_declarations(source: &str) -> Result<Declarations, ExtractError> {
	let tokens = Lexer::new(source).tokenize()?;
	Ok(Parser::new(tokens).parse()?)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_resolve_through_typedef_chain() {
		let declarations = parse_declarations(
			"struct _base { int a; };\n\
			 typedef struct _base Base;\n\
			 typedef Base Alias;",
		)
		.unwrap();
		let record = declarations.resolve_record("Alias").unwrap();
		assert_eq!(record.tag.as_deref(), Some("_base"));
		assert!(declarations.resolve_record("_base").is_some());
	}

	#[test]
	fn test_unresolvable_records() {
		let declarations = parse_declarations(
			"typedef struct _opaque Opaque;\n\
			 typedef int Number;\n\
			 typedef Loop Loop;",
		)
		.unwrap();
		assert!(declarations.resolve_record("Opaque").is_none());
		assert!(declarations.resolve_record("Number").is_none());
		assert!(declarations.resolve_record("Loop").is_none());
		assert!(declarations.resolve_record("Missing").is_none());
	}
}
