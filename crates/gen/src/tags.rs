// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Names of the exported prototypes of a header tree.
//!
//! Exported functions are the ones declared through `PyAPI_FUNC(...)`. The scan runs on the
//! unpatched headers, where the export and deprecation macros are still visible.

use std::{
	collections::BTreeSet,
	fs,
	path::{Path, PathBuf},
	process::Command,
};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{error::ExtractError, toolchain::run_tool};

static EXPORTED: Lazy<Regex> = Lazy::new(|| Regex::new(r"PyAPI_FUNC\([^)]*\)\s*(\w+)\(").unwrap());

const DEPRECATION_MARKER: &str = "Py_DEPRECATED";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrototypeNames {
	pub exported: BTreeSet<String>,
	/// Exported prototypes annotated with the deprecation macro.
	pub deprecated: BTreeSet<String>,
}

impl PrototypeNames {
	/// Records the prototype in `statement` if it is an exported one.
	pub fn add_statement(&mut self, statement: &str) {
		let Some(captures) = EXPORTED.captures(statement) else {
			return;
		};
		let name = captures[1].to_string();
		if statement.contains(DEPRECATION_MARKER) {
			self.deprecated.insert(name);
		} else {
			self.exported.insert(name);
		}
	}

	pub fn is_empty(&self) -> bool {
		self.exported.is_empty() && self.deprecated.is_empty()
	}
}

pub trait TagSource: Send + Sync {
	fn scan(&self, headers: &Path) -> Result<PrototypeNames, ExtractError>;
}

/// Universal ctags emitting JSON lines.
#[derive(Debug, Clone)]
pub struct Ctags {
	program: PathBuf,
}

#[derive(Deserialize)]
struct CtagsEntry {
	#[serde(default)]
	kind: String,
	#[serde(default)]
	pattern: String,
}

impl Ctags {
	pub fn new(program: impl Into<PathBuf>) -> Self {
		Self {
			program: program.into(),
		}
	}

	/// Collects prototypes from ctags JSON output.
	pub fn parse_output(output: &str) -> Result<PrototypeNames, ExtractError> {
		let mut names = PrototypeNames::default();
		for line in output.lines().filter(|line| !line.trim().is_empty()) {
			let entry: CtagsEntry =
				serde_json::from_str(line).map_err(|err| ExtractError::Tags(format!("{err}: {line}")))?;
			if entry.kind == "prototype" {
				names.add_statement(&entry.pattern);
			}
		}
		Ok(names)
	}
}

impl TagSource for Ctags {
	#[instrument(name = "gen::tags::ctags", level = "debug", skip(self))]
	fn scan(&self, headers: &Path) -> Result<PrototypeNames, ExtractError> {
		let mut command = Command::new(&self.program);
		command.args(["--language-force=C", "--output-format=json", "-R", "--c-kinds=+p", "-f", "-"]).arg(headers);

		let output = run_tool(&mut command)?;
		let names = Ctags::parse_output(&output)?;
		debug!(exported = names.exported.len(), deprecated = names.deprecated.len(), "scanned");
		Ok(names)
	}
}

/// Built-in scan of the `*.h` files of a tree, no external tool needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderScan;

impl HeaderScan {
	/// Collects prototypes from one header's text.
	///
	/// A prototype is deprecated when the deprecation macro appears in the same statement.
	/// Macro definitions are not prototypes.
	pub fn scan_text(text: &str, names: &mut PrototypeNames) {
		for found in EXPORTED.find_iter(text) {
			let line_start = text[..found.start()].rfind('\n').map_or(0, |i| i + 1);
			if text[line_start..].trim_start().starts_with('#') {
				continue;
			}
			let start = text[..found.start()].rfind([';', '{', '}', '\n']).map_or(0, |i| i + 1);
			let statement_start = statement_start(text, start);
			names.add_statement(&text[statement_start..found.end()]);
		}
	}
}

/// Extends a match backwards over preceding lines that do not end a statement.
fn statement_start(text: &str, line_start: usize) -> usize {
	let mut start = line_start;
	while start > 0 {
		let before = &text[..start - 1];
		let previous = before.rfind('\n').map_or(0, |i| i + 1);
		let line = before[previous..].trim();
		if line.is_empty() || line.starts_with('#') || line.ends_with([';', '{', '}']) || line.ends_with("*/") {
			break;
		}
		start = previous;
	}
	start
}

impl TagSource for HeaderScan {
	#[instrument(name = "gen::tags::scan", level = "debug", skip(self))]
	fn scan(&self, headers: &Path) -> Result<PrototypeNames, ExtractError> {
		if !headers.is_dir() {
			return Err(ExtractError::MissingHeaders(headers.to_path_buf()));
		}

		let mut files = Vec::new();
		collect_headers(headers, &mut files)?;
		files.sort();

		let mut names = PrototypeNames::default();
		for file in files {
			let text = fs::read_to_string(&file).map_err(|source| ExtractError::Io {
				path: file.clone(),
				source,
			})?;
			HeaderScan::scan_text(&text, &mut names);
		}

		debug!(exported = names.exported.len(), deprecated = names.deprecated.len(), "scanned");
		Ok(names)
	}
}

fn collect_headers(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), ExtractError> {
	let io = |source| ExtractError::Io {
		path: dir.to_path_buf(),
		source,
	};
	for entry in fs::read_dir(dir).map_err(io)? {
		let path = entry.map_err(io)?.path();
		if path.is_dir() {
			collect_headers(&path, files)?;
		} else if path.extension().is_some_and(|ext| ext == "h") {
			files.push(path);
		}
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_exported_and_deprecated_split() {
		let text = "\
PyAPI_FUNC(int) Py_IsInitialized(void);
Py_DEPRECATED(3.9) PyAPI_FUNC(void) PyEval_InitThreads(void);
PyAPI_FUNC(PyObject *) PyLong_FromLong(long);
Py_DEPRECATED(3.11)
PyAPI_FUNC(void) Py_SetProgramName(const wchar_t *);
static inline int Py_Helper(void) { return 0; }
#define PyAPI_FUNC(RTYPE) __attribute__((visibility(\"default\"))) RTYPE
PyAPI_DATA(PyObject *) PyExc_TypeError;
";
		let mut names = PrototypeNames::default();
		HeaderScan::scan_text(text, &mut names);

		let exported: Vec<&str> = names.exported.iter().map(String::as_str).collect();
		let deprecated: Vec<&str> = names.deprecated.iter().map(String::as_str).collect();
		assert_eq!(exported, vec!["PyLong_FromLong", "Py_IsInitialized"]);
		assert_eq!(deprecated, vec!["PyEval_InitThreads", "Py_SetProgramName"]);
	}

	#[test]
	fn test_ctags_json_lines() {
		let output = r#"{"_type": "tag", "name": "Py_Main", "path": "pylifecycle.h", "pattern": "/^PyAPI_FUNC(int) Py_Main(int argc, wchar_t **argv);$/", "kind": "prototype"}
{"_type": "tag", "name": "PyObject", "path": "object.h", "pattern": "/^} PyObject;$/", "kind": "typedef"}
{"_type": "tag", "name": "PyEval_AcquireLock", "path": "ceval.h", "pattern": "/^Py_DEPRECATED(3.2) PyAPI_FUNC(void) PyEval_AcquireLock(void);$/", "kind": "prototype"}
{"_type": "tag", "name": "Py_Helper", "path": "x.h", "pattern": "/^int Py_Helper(void);$/", "kind": "prototype"}
"#;
		let names = Ctags::parse_output(output).unwrap();
		assert_eq!(names.exported.iter().collect::<Vec<_>>(), vec!["Py_Main"]);
		assert_eq!(names.deprecated.iter().collect::<Vec<_>>(), vec!["PyEval_AcquireLock"]);
	}

	#[test]
	fn test_ctags_garbage_rejected() {
		assert!(matches!(Ctags::parse_output("not json"), Err(ExtractError::Tags(_))));
	}
}
