// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{iter::Peekable, str::CharIndices};

use thiserror::Error;

use super::token::{Span, Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
	#[error("unexpected character '{ch}' at {line}:{column}")]
	UnexpectedChar {
		ch: char,
		line: u32,
		column: u32,
	},

	#[error("unterminated literal at {line}:{column}")]
	UnterminatedLiteral {
		line: u32,
		column: u32,
	},

	#[error("unterminated comment at {line}:{column}")]
	UnterminatedComment {
		line: u32,
		column: u32,
	},
}

/// Tokenizer for preprocessed C.
///
/// Directive lines (`# 1 "Python.h"` line markers, `#pragma`) and comments are skipped.
/// Operators outside the declaration grammar come out as [`TokenKind::Punct`].
pub struct Lexer<'a> {
	source: &'a str,
	chars: Peekable<CharIndices<'a>>,
	position: usize,
	line: u32,
	column: u32,
	at_line_start: bool,
}

impl<'a> Lexer<'a> {
	pub fn new(source: &'a str) -> Self {
		Self {
			source,
			chars: source.char_indices().peekable(),
			position: 0,
			line: 1,
			column: 1,
			at_line_start: true,
		}
	}

	pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
		let mut tokens = Vec::new();

		loop {
			let token = self.next_token()?;
			let is_eof = token.kind == TokenKind::Eof;
			tokens.push(token);

			if is_eof {
				break;
			}
		}

		Ok(tokens)
	}

	fn next_token(&mut self) -> Result<Token, LexError> {
		self.skip_trivia()?;

		let Some(&(start, ch)) = self.chars.peek() else {
			return Ok(Token::new(
				TokenKind::Eof,
				Span::new(self.position, self.position, self.line, self.column),
				"",
			));
		};
		let start_column = self.column;
		self.at_line_start = false;

		match ch {
			'a'..='z' | 'A'..='Z' | '_' | '$' => Ok(self.scan_identifier()),
			'0'..='9' => Ok(self.scan_number()),
			'.' if self.peek_second().is_some_and(|c| c.is_ascii_digit()) => Ok(self.scan_number()),
			'"' => self.scan_literal('"', TokenKind::Str),
			'\'' => self.scan_literal('\'', TokenKind::Char),
			'.' => {
				self.advance();
				if self.source[self.position..].starts_with("..") {
					self.advance();
					self.advance();
					Ok(self.make_token(TokenKind::Ellipsis, start, start_column))
				} else {
					Ok(self.make_token(TokenKind::Punct, start, start_column))
				}
			}
			'(' => Ok(self.single(TokenKind::LParen, start, start_column)),
			')' => Ok(self.single(TokenKind::RParen, start, start_column)),
			'[' => Ok(self.single(TokenKind::LBracket, start, start_column)),
			']' => Ok(self.single(TokenKind::RBracket, start, start_column)),
			'{' => Ok(self.single(TokenKind::LBrace, start, start_column)),
			'}' => Ok(self.single(TokenKind::RBrace, start, start_column)),
			';' => Ok(self.single(TokenKind::Semicolon, start, start_column)),
			',' => Ok(self.single(TokenKind::Comma, start, start_column)),
			'*' => {
				self.advance();
				if self.match_char('=') {
					Ok(self.make_token(TokenKind::Punct, start, start_column))
				} else {
					Ok(self.make_token(TokenKind::Star, start, start_column))
				}
			}
			':' => Ok(self.single(TokenKind::Colon, start, start_column)),
			'=' => {
				self.advance();
				if self.match_char('=') {
					Ok(self.make_token(TokenKind::Punct, start, start_column))
				} else {
					Ok(self.make_token(TokenKind::Assign, start, start_column))
				}
			}
			'+' | '-' | '/' | '%' | '&' | '|' | '^' | '!' | '~' | '<' | '>' | '?' => {
				self.scan_operator(ch, start, start_column)
			}
			_ => Err(LexError::UnexpectedChar {
				ch,
				line: self.line,
				column: self.column,
			}),
		}
	}

	fn skip_trivia(&mut self) -> Result<(), LexError> {
		while let Some(&(_, ch)) = self.chars.peek() {
			match ch {
				' ' | '\t' | '\r' | '\x0c' | '\x0b' => {
					self.advance();
				}
				'\n' => {
					self.advance();
					self.at_line_start = true;
				}
				'\\' if self.peek_second() == Some('\n') => {
					self.advance();
					self.advance();
				}
				'#' if self.at_line_start => self.skip_line(),
				'/' if self.peek_second() == Some('/') => self.skip_line(),
				'/' if self.peek_second() == Some('*') => self.skip_block_comment()?,
				_ => break,
			}
		}
		Ok(())
	}

	fn skip_line(&mut self) {
		while let Some(&(_, c)) = self.chars.peek() {
			if c == '\n' {
				break;
			}
			self.advance();
		}
	}

	fn skip_block_comment(&mut self) -> Result<(), LexError> {
		let (line, column) = (self.line, self.column);
		self.advance();
		self.advance();
		loop {
			match self.advance() {
				None => {
					return Err(LexError::UnterminatedComment {
						line,
						column,
					});
				}
				Some('*') if self.match_char('/') => return Ok(()),
				Some(_) => {}
			}
		}
	}

	fn scan_identifier(&mut self) -> Token {
		let start = self.position;
		let start_column = self.column;

		while let Some(&(_, ch)) = self.chars.peek() {
			if ch.is_ascii_alphanumeric() || ch == '_' || ch == '$' {
				self.advance();
			} else {
				break;
			}
		}

		self.make_token(TokenKind::Ident, start, start_column)
	}

	/// Numbers are kept as text: suffixes, hex and floats all end up in array
	/// dimensions or skipped initializers.
	fn scan_number(&mut self) -> Token {
		let start = self.position;
		let start_column = self.column;

		while let Some(&(_, ch)) = self.chars.peek() {
			if ch.is_ascii_alphanumeric() || ch == '.' || ch == '_' {
				self.advance();
			} else if (ch == '+' || ch == '-') && self.exponent_sign() {
				self.advance();
			} else {
				break;
			}
		}

		self.make_token(TokenKind::Number, start, start_column)
	}

	fn exponent_sign(&self) -> bool {
		let text = &self.source[..self.position];
		let is_hex = text.rsplit(|c: char| !c.is_ascii_alphanumeric() && c != '.').next().is_some_and(|n| {
			n.starts_with("0x") || n.starts_with("0X")
		});
		match text.chars().last() {
			Some('e' | 'E') => !is_hex,
			Some('p' | 'P') => is_hex,
			_ => false,
		}
	}

	fn scan_literal(&mut self, quote: char, kind: TokenKind) -> Result<Token, LexError> {
		let start = self.position;
		let start_column = self.column;
		let start_line = self.line;

		self.advance();
		loop {
			match self.advance() {
				None | Some('\n') => {
					return Err(LexError::UnterminatedLiteral {
						line: start_line,
						column: start_column,
					});
				}
				Some('\\') => {
					self.advance();
				}
				Some(c) if c == quote => break,
				Some(_) => {}
			}
		}

		Ok(Token::new(kind, Span::new(start, self.position, start_line, start_column), &self.source[start..self.position]))
	}

	fn scan_operator(&mut self, first: char, start: usize, start_column: u32) -> Result<Token, LexError> {
		self.advance();
		if let Some(&(_, next)) = self.chars.peek() {
			let doubled = next == first && matches!(first, '+' | '-' | '&' | '|' | '<' | '>');
			if doubled || next == '=' || (first == '-' && next == '>') {
				self.advance();
				if matches!(first, '<' | '>') && doubled {
					self.match_char('=');
				}
			}
		}
		Ok(self.make_token(TokenKind::Punct, start, start_column))
	}

	fn single(&mut self, kind: TokenKind, start: usize, start_column: u32) -> Token {
		self.advance();
		self.make_token(kind, start, start_column)
	}

	fn make_token(&self, kind: TokenKind, start: usize, start_column: u32) -> Token {
		Token::new(kind, Span::new(start, self.position, self.line, start_column), &self.source[start..self.position])
	}

	fn peek_second(&self) -> Option<char> {
		let mut rest = self.source[self.position..].chars();
		rest.next();
		rest.next()
	}

	fn advance(&mut self) -> Option<char> {
		let (_, ch) = self.chars.next()?;
		self.position += ch.len_utf8();
		if ch == '\n' {
			self.line += 1;
			self.column = 1;
		} else {
			self.column += 1;
		}
		Some(ch)
	}

	fn match_char(&mut self, expected: char) -> bool {
		if let Some(&(_, ch)) = self.chars.peek() {
			if ch == expected {
				self.advance();
				return true;
			}
		}
		false
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn kinds(source: &str) -> Vec<TokenKind> {
		Lexer::new(source).tokenize().unwrap().into_iter().map(|t| t.kind).collect()
	}

	#[test]
	fn test_prototype_tokens() {
		let tokens = Lexer::new("PyObject *PyLong_FromLong(long);").tokenize().unwrap();
		let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
		assert_eq!(texts, vec!["PyObject", "*", "PyLong_FromLong", "(", "long", ")", ";", ""]);
		assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
	}

	#[test]
	fn test_line_markers_and_comments_skipped() {
		let source = "# 1 \"Include/Python.h\"\n#pragma once\nint /* gone */ x; // trailing\n";
		assert_eq!(kinds(source), vec![TokenKind::Ident, TokenKind::Ident, TokenKind::Semicolon, TokenKind::Eof]);
	}

	#[test]
	fn test_hash_inside_line_is_an_error() {
		assert!(matches!(Lexer::new("int # x;").tokenize(), Err(LexError::UnexpectedChar { ch: '#', .. })));
	}

	#[test]
	fn test_ellipsis_and_operators() {
		assert_eq!(kinds("(int, ...)"), vec![
			TokenKind::LParen,
			TokenKind::Ident,
			TokenKind::Comma,
			TokenKind::Ellipsis,
			TokenKind::RParen,
			TokenKind::Eof
		]);
		let tokens = Lexer::new("a << 2 >>= b->c").tokenize().unwrap();
		let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
		assert_eq!(texts, vec!["a", "<<", "2", ">>=", "b", "->", "c", ""]);
	}

	#[test]
	fn test_numbers_keep_suffixes() {
		let tokens = Lexer::new("0x7fffffffUL 1.5e-3f 12").tokenize().unwrap();
		let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
		assert_eq!(texts, vec!["0x7fffffffUL", "1.5e-3f", "12", ""]);
	}

	#[test]
	fn test_literals() {
		let tokens = Lexer::new(r#"char *s = "a\"b"; char c = '\'';"#).tokenize().unwrap();
		assert!(tokens.iter().any(|t| t.kind == TokenKind::Str && t.text == r#""a\"b""#));
		assert!(tokens.iter().any(|t| t.kind == TokenKind::Char && t.text == r"'\''"));
	}

	#[test]
	fn test_unterminated() {
		assert!(matches!(Lexer::new("\"abc").tokenize(), Err(LexError::UnterminatedLiteral { .. })));
		assert!(matches!(Lexer::new("/* abc").tokenize(), Err(LexError::UnterminatedComment { .. })));
	}

	#[test]
	fn test_line_numbers() {
		let tokens = Lexer::new("int\n  x;").tokenize().unwrap();
		assert_eq!(tokens[1].span.line, 2);
		assert_eq!(tokens[1].span.column, 3);
	}
}
