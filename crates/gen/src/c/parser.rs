// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Tolerant parser for the declarations of a preprocessed header tree.
//!
//! Only what a descriptor needs is modelled: prototypes, typedefs and struct/union bodies.
//! Enum bodies, initializers, inline function bodies and compiler extensions
//! (`__attribute__`, `__asm__`, `__declspec`, ...) are skipped. A declaration that does not
//! parse is skipped up to the next `;` and counted in [`Declarations::skipped`].

use thiserror::Error;
use tracing::trace;

use super::{
	Declarations, FunctionDecl,
	token::{Span, Token, TokenKind},
	types::{CType, FieldDecl, ParamDecl, Record, RecordKind},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
	#[error("expected {expected}, found {found} at {line}:{column}")]
	Unexpected {
		expected: &'static str,
		found: String,
		line: u32,
		column: u32,
	},

	#[error("unexpected end of input in {context}")]
	UnexpectedEof {
		context: &'static str,
	},
}

const BUILTIN_WORDS: &[&str] = &[
	"void", "char", "short", "int", "long", "float", "double", "signed", "unsigned", "_Bool", "_Complex", "__signed",
	"__signed__", "__int128",
];

/// Words that carry no layout information and may appear anywhere in a declaration.
const IGNORED_WORDS: &[&str] = &[
	"const",
	"volatile",
	"restrict",
	"__const",
	"__volatile",
	"__volatile__",
	"__restrict",
	"__restrict__",
	"_Atomic",
	"_Nullable",
	"_Nonnull",
	"_Null_unspecified",
	"__extension__",
	"__cdecl",
	"__stdcall",
	"__fastcall",
	"__unaligned",
	"__ptr32",
	"__ptr64",
	"__w64",
];

/// Extensions followed by a parenthesized argument list.
const ATTRIBUTE_WORDS: &[&str] =
	&["__attribute__", "__attribute", "__declspec", "__asm__", "__asm", "asm", "_Alignas", "__pragma", "_Pragma"];

#[derive(Debug, Clone, Default)]
struct Storage {
	typedef: bool,
	is_static: bool,
	is_inline: bool,
}

struct Specifiers {
	ty: CType,
	storage: Storage,
}

/// Shape of a declarator before it is applied to the declared base type.
enum Declarator {
	Name(Option<String>),
	Pointer(Box<Declarator>),
	Array(Box<Declarator>, Option<String>),
	Function(Box<Declarator>, Vec<ParamDecl>, bool),
}

impl Declarator {
	/// Wraps `base` from the outside in: `int *a[3]` is an array of pointers.
	fn apply(self, base: CType) -> (Option<String>, CType) {
		match self {
			Declarator::Name(name) => (name, base),
			Declarator::Pointer(inner) => inner.apply(base.pointer()),
			Declarator::Array(inner, dim) => inner.apply(CType::Array(Box::new(base), dim)),
			Declarator::Function(inner, params, variadic) => inner.apply(CType::Function {
				ret: Box::new(base),
				params,
				variadic,
			}),
		}
	}
}

pub struct Parser {
	tokens: Vec<Token>,
	position: usize,
	declarations: Declarations,
}

impl Parser {
	/// An [`TokenKind::Eof`] token is appended when `tokens` does not already end with one.
	pub fn new(mut tokens: Vec<Token>) -> Self {
		if tokens.last().is_none_or(|token| token.kind != TokenKind::Eof) {
			let span = tokens.last().map_or(Span::new(0, 0, 1, 1), |token| {
				Span::new(token.span.end, token.span.end, token.span.line, token.span.column)
			});
			tokens.push(Token::new(TokenKind::Eof, span, ""));
		}
		Self {
			tokens,
			position: 0,
			declarations: Declarations::default(),
		}
	}

	pub fn parse(mut self) -> Result<Declarations, ParseError> {
		while !self.at_eof() {
			let start = self.position;
			match self.external_declaration() {
				Ok(()) => {}
				Err(err @ ParseError::UnexpectedEof {
					..
				}) => return Err(err),
				Err(err) => {
					trace!(error = %err, "skipping declaration");
					self.declarations.skipped += 1;
					self.position = start;
					self.recover();
				}
			}
		}
		Ok(self.declarations)
	}

	fn external_declaration(&mut self) -> Result<(), ParseError> {
		if self.consume(TokenKind::Semicolon) {
			return Ok(());
		}
		if self.skip_static_assert()? {
			return Ok(());
		}

		let specifiers = self.specifiers()?;
		if self.consume(TokenKind::Semicolon) {
			return Ok(());
		}

		loop {
			let (name, ty) = self.declarator(specifiers.ty.clone())?;
			self.skip_ignored()?;

			if self.check(TokenKind::LBrace) {
				self.skip_group(TokenKind::LBrace, TokenKind::RBrace, "function body")?;
				self.record(&specifiers.storage, name, ty, true);
				return Ok(());
			}

			if self.consume(TokenKind::Assign) {
				self.expression_text(&[TokenKind::Comma, TokenKind::Semicolon])?;
			}
			self.record(&specifiers.storage, name, ty, false);

			if self.consume(TokenKind::Comma) {
				continue;
			}
			self.expect(TokenKind::Semicolon, "';' after declaration")?;
			return Ok(());
		}
	}

	fn record(&mut self, storage: &Storage, name: Option<String>, ty: CType, is_definition: bool) {
		let Some(name) = name else {
			return;
		};

		if storage.typedef {
			self.declarations.typedefs.insert(name, ty);
			return;
		}

		if let CType::Function {
			ret,
			params,
			variadic,
		} = ty
		{
			self.declarations.functions.push(FunctionDecl {
				name,
				return_type: *ret,
				params,
				variadic,
				is_static: storage.is_static,
				is_inline: storage.is_inline,
				is_definition,
			});
		}
	}

	fn specifiers(&mut self) -> Result<Specifiers, ParseError> {
		let mut storage = Storage::default();
		let mut words: Vec<String> = Vec::new();
		let mut base: Option<CType> = None;

		while self.peek().kind == TokenKind::Ident {
			let text = self.peek().text.clone();
			match text.as_str() {
				"typedef" => {
					storage.typedef = true;
					self.advance();
				}
				"static" => {
					storage.is_static = true;
					self.advance();
				}
				"extern" | "register" | "auto" | "_Thread_local" | "__thread" => {
					self.advance();
				}
				"inline" | "__inline" | "__inline__" | "__forceinline" | "_Noreturn" => {
					storage.is_inline = true;
					self.advance();
				}
				"struct" | "union" => {
					self.advance();
					let kind = if text == "struct" {
						RecordKind::Struct
					} else {
						RecordKind::Union
					};
					base = Some(CType::Record(self.record_specifier(kind)?));
				}
				"enum" => {
					self.advance();
					base = Some(self.enum_specifier()?);
				}
				"typeof" | "__typeof" | "__typeof__" => {
					self.advance();
					self.skip_group(TokenKind::LParen, TokenKind::RParen, "typeof")?;
					base = Some(CType::named("__typeof__"));
				}
				word if BUILTIN_WORDS.contains(&word) => {
					words.push(text.clone());
					self.advance();
				}
				word if IGNORED_WORDS.contains(&word) || ATTRIBUTE_WORDS.contains(&word) => {
					self.skip_ignored()?;
				}
				// A typedef name, unless the type is already known; then it is the declarator.
				_ if base.is_none() && words.is_empty() => {
					base = Some(CType::Named(text.clone()));
					self.advance();
				}
				_ => break,
			}
		}

		let ty = match base {
			Some(ty) => ty,
			None if !words.is_empty() => CType::Named(words.join(" ")),
			None => return Err(self.unexpected("type specifier")),
		};

		Ok(Specifiers {
			ty,
			storage,
		})
	}

	fn record_specifier(&mut self, kind: RecordKind) -> Result<Record, ParseError> {
		self.skip_ignored()?;
		let tag = if self.peek().kind == TokenKind::Ident {
			Some(self.advance().text)
		} else {
			None
		};
		self.skip_ignored()?;

		let fields = if self.consume(TokenKind::LBrace) {
			let fields = self.fields()?;
			self.skip_ignored()?;
			Some(fields)
		} else {
			None
		};

		let record = Record {
			kind,
			tag,
			fields,
		};
		if record.fields.is_some() {
			if let Some(key) = record.key() {
				self.declarations.records.insert(key, record.clone());
			}
		}
		Ok(record)
	}

	fn enum_specifier(&mut self) -> Result<CType, ParseError> {
		self.skip_ignored()?;
		let tag = if self.peek().kind == TokenKind::Ident {
			Some(self.advance().text)
		} else {
			None
		};
		self.skip_ignored()?;
		if self.check(TokenKind::LBrace) {
			self.skip_group(TokenKind::LBrace, TokenKind::RBrace, "enum body")?;
		}

		Ok(CType::Named(match tag {
			Some(tag) => format!("enum {tag}"),
			None => "enum".to_string(),
		}))
	}

	/// Members up to and including the closing brace.
	fn fields(&mut self) -> Result<Vec<FieldDecl>, ParseError> {
		let mut fields = Vec::new();

		loop {
			match self.peek().kind {
				TokenKind::RBrace => {
					self.advance();
					return Ok(fields);
				}
				TokenKind::Semicolon => {
					self.advance();
					continue;
				}
				TokenKind::Eof => {
					return Err(ParseError::UnexpectedEof {
						context: "struct body",
					});
				}
				_ => {}
			}
			if self.skip_static_assert()? {
				continue;
			}

			let specifiers = self.specifiers()?;
			if self.consume(TokenKind::Semicolon) {
				// Anonymous struct or union member.
				fields.push(FieldDecl {
					name: None,
					ty: specifiers.ty,
					bits: None,
				});
				continue;
			}

			loop {
				let (name, ty) = if self.check(TokenKind::Colon) {
					(None, specifiers.ty.clone())
				} else {
					self.declarator(specifiers.ty.clone())?
				};
				self.skip_ignored()?;

				let bits = if self.consume(TokenKind::Colon) {
					Some(self.expression_text(&[TokenKind::Comma, TokenKind::Semicolon])?)
				} else {
					None
				};
				self.skip_ignored()?;

				fields.push(FieldDecl {
					name,
					ty,
					bits,
				});

				if self.consume(TokenKind::Comma) {
					continue;
				}
				self.expect(TokenKind::Semicolon, "';' after member")?;
				break;
			}
		}
	}

	fn declarator(&mut self, base: CType) -> Result<(Option<String>, CType), ParseError> {
		Ok(self.declarator_shape()?.apply(base))
	}

	fn declarator_shape(&mut self) -> Result<Declarator, ParseError> {
		self.skip_ignored()?;
		if self.consume(TokenKind::Star) {
			return Ok(Declarator::Pointer(Box::new(self.declarator_shape()?)));
		}

		let mut shape = if self.check(TokenKind::LParen) && self.is_nested_declarator() {
			self.advance();
			let inner = self.declarator_shape()?;
			self.expect(TokenKind::RParen, "')' closing declarator")?;
			inner
		} else if self.peek().kind == TokenKind::Ident && !BUILTIN_WORDS.contains(&self.peek().text.as_str()) {
			Declarator::Name(Some(self.advance().text))
		} else {
			Declarator::Name(None)
		};

		loop {
			if self.consume(TokenKind::LBracket) {
				let dim = self.expression_text(&[TokenKind::RBracket])?;
				self.expect(TokenKind::RBracket, "']'")?;
				shape = Declarator::Array(Box::new(shape), (!dim.is_empty()).then_some(dim));
			} else if self.consume(TokenKind::LParen) {
				let (params, variadic) = self.parameters()?;
				shape = Declarator::Function(Box::new(shape), params, variadic);
			} else {
				break;
			}
		}

		Ok(shape)
	}

	/// At `(`: does it open a nested declarator such as `(*name)` rather than a parameter list?
	fn is_nested_declarator(&self) -> bool {
		let Some(next) = self.tokens.get(self.position + 1) else {
			return false;
		};
		match next.kind {
			TokenKind::Star | TokenKind::LParen => true,
			TokenKind::Punct => next.text == "^",
			TokenKind::Ident => {
				let text = next.text.as_str();
				if IGNORED_WORDS.contains(&text) || ATTRIBUTE_WORDS.contains(&text) {
					return true;
				}
				!(BUILTIN_WORDS.contains(&text)
					|| matches!(text, "struct" | "union" | "enum")
					|| self.declarations.typedefs.contains_key(text))
			}
			_ => false,
		}
	}

	/// Parameters after the opening `(`, up to and including the closing `)`.
	fn parameters(&mut self) -> Result<(Vec<ParamDecl>, bool), ParseError> {
		let mut params = Vec::new();
		let mut variadic = false;

		if self.consume(TokenKind::RParen) {
			return Ok((params, variadic));
		}

		loop {
			if self.consume(TokenKind::Ellipsis) {
				variadic = true;
			} else {
				let specifiers = self.specifiers()?;
				let (name, ty) = self.declarator(specifiers.ty)?;
				self.skip_ignored()?;
				params.push(ParamDecl {
					name,
					ty,
				});
			}

			if self.consume(TokenKind::Comma) {
				continue;
			}
			self.expect(TokenKind::RParen, "')' closing parameter list")?;
			return Ok((params, variadic));
		}
	}

	/// Source text of an expression up to one of `stops` at nesting depth zero; the stop is not consumed.
	fn expression_text(&mut self, stops: &[TokenKind]) -> Result<String, ParseError> {
		let mut text = String::new();
		let mut depth = 0usize;
		let mut previous_word = false;

		loop {
			let token = self.peek();
			if depth == 0 && stops.contains(&token.kind) {
				return Ok(text);
			}
			match token.kind {
				TokenKind::Eof => {
					return Err(ParseError::UnexpectedEof {
						context: "expression",
					});
				}
				TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
				TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
					if depth == 0 {
						return Err(self.unexpected("expression"));
					}
					depth -= 1;
				}
				_ => {}
			}

			let is_word = matches!(token.kind, TokenKind::Ident | TokenKind::Number);
			if is_word && previous_word {
				text.push(' ');
			}
			text.push_str(&token.text);
			previous_word = is_word;
			self.advance();
		}
	}

	/// Skips qualifiers, calling conventions and attribute groups.
	fn skip_ignored(&mut self) -> Result<(), ParseError> {
		while self.peek().kind == TokenKind::Ident {
			let text = self.peek().text.as_str();
			if IGNORED_WORDS.contains(&text) {
				self.advance();
			} else if ATTRIBUTE_WORDS.contains(&text) {
				self.advance();
				self.skip_ignored_words();
				if self.check(TokenKind::LParen) {
					self.skip_group(TokenKind::LParen, TokenKind::RParen, "attribute")?;
				}
			} else {
				break;
			}
		}
		Ok(())
	}

	// `__asm__ volatile (...)`
	fn skip_ignored_words(&mut self) {
		while self.peek().kind == TokenKind::Ident && IGNORED_WORDS.contains(&self.peek().text.as_str()) {
			self.advance();
		}
	}

	fn skip_static_assert(&mut self) -> Result<bool, ParseError> {
		if !(self.peek().is_ident("_Static_assert") || self.peek().is_ident("static_assert")) {
			return Ok(false);
		}
		self.advance();
		self.skip_group(TokenKind::LParen, TokenKind::RParen, "static assertion")?;
		self.expect(TokenKind::Semicolon, "';' after static assertion")?;
		Ok(true)
	}

	fn skip_group(&mut self, open: TokenKind, close: TokenKind, context: &'static str) -> Result<(), ParseError> {
		self.expect(open, context)?;
		let mut depth = 1usize;
		while depth > 0 {
			let token = self.advance();
			match token.kind {
				TokenKind::Eof => {
					return Err(ParseError::UnexpectedEof {
						context,
					});
				}
				kind if kind == open => depth += 1,
				kind if kind == close => depth -= 1,
				_ => {}
			}
		}
		Ok(())
	}

	/// Skips the rest of a broken declaration: through the next top level `;` or closing brace.
	fn recover(&mut self) {
		let mut depth = 0usize;
		loop {
			let token = self.advance();
			match token.kind {
				TokenKind::Eof => return,
				TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
				TokenKind::RParen | TokenKind::RBracket => depth = depth.saturating_sub(1),
				TokenKind::RBrace => {
					depth = depth.saturating_sub(1);
					if depth == 0 {
						self.consume(TokenKind::Semicolon);
						return;
					}
				}
				TokenKind::Semicolon if depth == 0 => return,
				_ => {}
			}
		}
	}

	fn peek(&self) -> &Token {
		&self.tokens[self.position.min(self.tokens.len() - 1)]
	}

	fn at_eof(&self) -> bool {
		self.peek().kind == TokenKind::Eof
	}

	fn advance(&mut self) -> Token {
		let token = self.peek().clone();
		if token.kind != TokenKind::Eof {
			self.position += 1;
		}
		token
	}

	fn check(&self, kind: TokenKind) -> bool {
		self.peek().kind == kind
	}

	fn consume(&mut self, kind: TokenKind) -> bool {
		if self.check(kind) {
			self.advance();
			true
		} else {
			false
		}
	}

	fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<Token, ParseError> {
		if self.check(kind) {
			return Ok(self.advance());
		}
		if self.at_eof() {
			return Err(ParseError::UnexpectedEof {
				context: expected,
			});
		}
		Err(self.unexpected(expected))
	}

	fn unexpected(&self, expected: &'static str) -> ParseError {
		let token = self.peek();
		ParseError::Unexpected {
			expected,
			found: token.to_string(),
			line: token.span.line,
			column: token.span.column,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::c::parse_declarations;

	fn parse(source: &str) -> Declarations {
		parse_declarations(source).unwrap()
	}

	fn member_names(record: &Record) -> Vec<Option<&str>> {
		record.fields.as_ref().unwrap().iter().map(|f| f.name.as_deref()).collect()
	}

	#[test]
	fn test_token_streams_without_eof() {
		let empty = Parser::new(Vec::new()).parse().unwrap();
		assert!(empty.functions.is_empty());
		assert_eq!(empty.skipped, 0);

		let mut tokens = crate::c::Lexer::new("int Py_IsInitialized(void);").tokenize().unwrap();
		tokens.pop();
		let declarations = Parser::new(tokens).parse().unwrap();
		assert!(declarations.function("Py_IsInitialized").is_some());
	}

	#[test]
	fn test_inline_typedef_struct() {
		let declarations = parse(
			"typedef long Py_ssize_t;\n\
			 typedef struct _object { Py_ssize_t ob_refcnt; struct _typeobject *ob_type; } PyObject;",
		);
		let object = declarations.resolve_record("PyObject").unwrap();
		assert_eq!(member_names(object), vec![Some("ob_refcnt"), Some("ob_type")]);

		let fields = object.fields.as_ref().unwrap();
		assert_eq!(fields[0].ty.to_string(), "Py_ssize_t");
		assert_eq!(fields[1].ty.to_string(), "struct _typeobject*");
		assert!(declarations.records.contains_key("struct _object"));
	}

	#[test]
	fn test_forward_typedef_with_anonymous_union() {
		let declarations = parse(
			"typedef struct _object PyObject;\n\
			 struct _object {\n\
			     union { Py_ssize_t ob_refcnt; unsigned int ob_refcnt_split[2]; };\n\
			     PyTypeObject *ob_type;\n\
			 };",
		);
		let object = declarations.resolve_record("PyObject").unwrap();
		assert_eq!(member_names(object), vec![None, Some("ob_type")]);

		let CType::Record(union) = &object.fields.as_ref().unwrap()[0].ty else {
			panic!("anonymous member is not a record");
		};
		assert_eq!(union.kind, RecordKind::Union);
		assert_eq!(member_names(union), vec![Some("ob_refcnt"), Some("ob_refcnt_split")]);
		assert_eq!(union.fields.as_ref().unwrap()[1].ty.to_string(), "unsigned int[2]");
	}

	#[test]
	fn test_prototypes() {
		let declarations = parse(
			"PyObject * PyLong_FromLong(long);\n\
			 int Py_IsInitialized(void);\n\
			 PyObject * PyErr_Format(PyObject *exception, const char *format, ...);\n\
			 void Py_SetPath(const wchar_t *);\n\
			 extern int Py_VerboseFlag;\n\
			 int (*PyOS_InputHook)(void);",
		);
		let names: Vec<&str> = declarations.functions.iter().map(|f| f.name.as_str()).collect();
		assert_eq!(names, vec!["PyLong_FromLong", "Py_IsInitialized", "PyErr_Format", "Py_SetPath"]);

		let from_long = declarations.function("PyLong_FromLong").unwrap();
		assert_eq!(from_long.return_type.to_string(), "PyObject*");
		assert_eq!(from_long.params.len(), 1);
		assert_eq!(from_long.params[0].name, None);
		assert_eq!(from_long.params[0].ty.to_string(), "long");

		assert!(declarations.function("Py_IsInitialized").unwrap().params[0].ty.is_void());

		let format = declarations.function("PyErr_Format").unwrap();
		assert!(format.variadic);
		assert_eq!(format.params[1].name.as_deref(), Some("format"));
		assert_eq!(format.params[1].ty.to_string(), "char*");

		assert_eq!(declarations.function("Py_SetPath").unwrap().params[0].ty.to_string(), "wchar_t*");
	}

	#[test]
	fn test_inline_definitions_and_extensions() {
		let declarations = parse(
			"static inline int Py_Inline(PyObject *o) { if (o) { return 1; } return 0; }\n\
			 __attribute__((visibility(\"default\"))) int Py_Visible(void) __asm__(\"Py_Visible\");\n\
			 __extension__ typedef long long int64_t;\n\
			 enum { Py_A = 1 << 2, Py_B };\n\
			 _Static_assert(sizeof(int) == 4, \"int\");\n\
			 int Py_After(void);",
		);

		let inline = declarations.function("Py_Inline").unwrap();
		assert!(inline.is_static && inline.is_inline && inline.is_definition);
		assert!(!declarations.function("Py_Visible").unwrap().is_definition);
		assert_eq!(declarations.typedefs["int64_t"], CType::named("long long"));
		assert!(declarations.function("Py_After").is_some());
		assert_eq!(declarations.skipped, 0);
	}

	#[test]
	fn test_function_pointer_typedef_and_members() {
		let declarations = parse(
			"typedef PyObject *(*PyCFunction)(PyObject *, PyObject *);\n\
			 struct PyMethodDef { const char *ml_name; PyCFunction ml_meth; int ml_flags; const char *ml_doc; };\n\
			 typedef struct PyMethodDef PyMethodDef;\n\
			 void (*signal(int sig, void (*func)(int)))(int);",
		);
		assert_eq!(declarations.typedefs["PyCFunction"].to_string(), "PyObject* (*)(PyObject*, PyObject*)");

		let method = declarations.resolve_record("PyMethodDef").unwrap();
		let fields = method.fields.as_ref().unwrap();
		let types: Vec<String> = fields.iter().map(|f| f.ty.to_string()).collect();
		assert_eq!(types, vec!["char*", "PyCFunction", "int", "char*"]);

		let signal = declarations.function("signal").unwrap();
		assert_eq!(signal.return_type.to_string(), "void (*)(int)");
		assert_eq!(signal.params[1].ty.to_string(), "void (*)(int)");
	}

	#[test]
	fn test_bitfields_and_arrays() {
		let declarations = parse(
			"typedef struct {\n\
			     unsigned int interned:2;\n\
			     unsigned int :0;\n\
			     int kind __attribute__((aligned(4)));\n\
			     char data[sizeof(int) * 2], *tail;\n\
			 } PyState;",
		);
		let state = declarations.resolve_record("PyState").unwrap();
		let fields = state.fields.as_ref().unwrap();

		assert_eq!(fields[0].bits.as_deref(), Some("2"));
		assert_eq!(fields[1].name, None);
		assert_eq!(fields[1].bits.as_deref(), Some("0"));
		assert_eq!(fields[2].name.as_deref(), Some("kind"));
		assert_eq!(fields[3].ty.to_string(), "char[sizeof(int)*2]");
		assert_eq!(fields[4].ty.to_string(), "char*");
	}

	#[test]
	fn test_broken_declarations_are_skipped() {
		let declarations = parse("} } int ok(void); int 3; int after(long);");
		let names: Vec<&str> = declarations.functions.iter().map(|f| f.name.as_str()).collect();
		assert_eq!(names, vec!["ok", "after"]);
		assert_eq!(declarations.skipped, 3);
	}

	#[test]
	fn test_truncated_input_fails() {
		let err = parse_declarations("struct _object { int a;").unwrap_err();
		assert!(matches!(err, crate::error::ExtractError::Parse(ParseError::UnexpectedEof { .. })));
	}
}
