// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Display, Formatter};

/// Source position of a token, in the preprocessed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
	pub start: usize,
	pub end: usize,
	pub line: u32,
	pub column: u32,
}

impl Span {
	pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
		Self {
			start,
			end,
			line,
			column,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
	Ident,
	Number,
	Str,
	Char,

	LParen,
	RParen,
	LBracket,
	RBracket,
	LBrace,
	RBrace,
	Semicolon,
	Comma,
	Star,
	Colon,
	Assign,
	Ellipsis,
	/// Any other operator; declarations only carry these inside skipped expressions.
	Punct,

	Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
	pub kind: TokenKind,
	pub span: Span,
	pub text: String,
}

impl Token {
	pub fn new(kind: TokenKind, span: Span, text: impl Into<String>) -> Self {
		Self {
			kind,
			span,
			text: text.into(),
		}
	}

	pub fn is_ident(&self, text: &str) -> bool {
		self.kind == TokenKind::Ident && self.text == text
	}
}

impl Display for Token {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self.kind {
			TokenKind::Eof => f.write_str("end of input"),
			_ => write!(f, "'{}'", self.text),
		}
	}
}
