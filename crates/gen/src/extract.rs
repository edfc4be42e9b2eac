// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Raw descriptors from parsed declarations.
//!
//! Signatures are kept for the exported prototypes only; struct shapes carry member names
//! and types with every offset still unresolved.

use std::collections::HashSet;

use pyabi_descriptor::{Descriptor, FunctionSignature, Parameter, StructKind, StructLayout, StructMember};
use tracing::{debug, warn};

use crate::{
	c::{CType, Declarations, FunctionDecl, Record},
	tags::PrototypeNames,
};

/// A descriptor before probing, plus what the extractor left out.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
	pub descriptor: Descriptor,
	/// Deprecated signatures not included in the descriptor.
	pub deprecated: Vec<FunctionSignature>,
	/// Exported names with no parsed prototype.
	pub missing_functions: Vec<String>,
	/// Requested structs with no definition.
	pub missing_structs: Vec<StructKind>,
}

#[derive(Debug, Clone)]
pub struct Extractor {
	structs: Vec<StructKind>,
	include_deprecated: bool,
}

impl Default for Extractor {
	fn default() -> Self {
		Self::new(StructKind::ALL.to_vec())
	}
}

impl Extractor {
	pub fn new(structs: Vec<StructKind>) -> Self {
		Self {
			structs,
			include_deprecated: false,
		}
	}

	pub fn with_deprecated(mut self, include: bool) -> Self {
		self.include_deprecated = include;
		self
	}

	pub fn extract(&self, declarations: &Declarations, names: &PrototypeNames) -> Extraction {
		let mut extraction = Extraction::default();
		let mut seen = HashSet::new();

		for decl in declarations.functions.iter().filter(|f| !f.is_definition && !f.is_static) {
			if !seen.insert(decl.name.as_str()) {
				continue;
			}
			if names.exported.contains(&decl.name) {
				extraction.descriptor.functions.push(signature(decl));
			} else if names.deprecated.contains(&decl.name) {
				if self.include_deprecated {
					extraction.descriptor.functions.push(signature(decl));
				} else {
					extraction.deprecated.push(signature(decl));
				}
			}
		}

		extraction.missing_functions =
			names.exported.iter().filter(|name| !seen.contains(name.as_str())).cloned().collect();

		for kind in &self.structs {
			match declarations.resolve_record(kind.name()) {
				Some(record) => *extraction.descriptor.structs.get_mut(*kind) = struct_shape(kind.name(), record),
				None => {
					warn!(layout = kind.name(), "struct definition not found");
					extraction.missing_structs.push(*kind);
				}
			}
		}

		debug!(
			functions = extraction.descriptor.functions.len(),
			deprecated = extraction.deprecated.len(),
			missing = extraction.missing_functions.len(),
			"extracted"
		);
		extraction
	}
}

pub fn signature(decl: &FunctionDecl) -> FunctionSignature {
	let mut parameters: Vec<Parameter> = decl
		.params
		.iter()
		.map(|param| Parameter::new(param.name.clone().unwrap_or_default(), param.ty.to_string()))
		.collect();
	if decl.variadic {
		parameters.push(Parameter::new("", "..."));
	}
	FunctionSignature::new(&decl.name, decl.return_type.to_string(), parameters)
}

/// Member shape of `record` with anonymous struct and union members flattened into it.
pub fn struct_shape(name: &str, record: &Record) -> StructLayout {
	let mut layout = StructLayout::new(name, 0);
	flatten(record, &mut layout);
	layout
}

fn flatten(record: &Record, layout: &mut StructLayout) {
	for field in record.fields.iter().flatten() {
		match (&field.name, &field.ty) {
			(None, CType::Record(inner)) if inner.is_anonymous() && inner.fields.is_some() => flatten(inner, layout),
			(name, ty) => {
				let ty = match &field.bits {
					Some(bits) => format!("{ty}:{bits}"),
					None => ty.to_string(),
				};
				let name = name.clone().unwrap_or_default();
				if !layout.push(StructMember::unresolved(name.as_str(), ty)) {
					warn!(layout = %layout.name, member = %name, "duplicate member dropped from layout");
				}
			}
		}
	}
}
