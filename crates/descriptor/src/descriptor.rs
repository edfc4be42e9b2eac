// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	collections::BTreeMap,
	fmt::{self, Display, Formatter},
};

use serde::{Deserialize, Deserializer, Serialize};

use crate::{
	function::FunctionSignature,
	layout::{LayoutWarning, StructLayout},
};

/// The fixed set of ABI-critical structs a descriptor carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StructKind {
	Config,
	PreConfig,
	WideStringList,
	Object,
	MethodDef,
	ModuleDefBase,
	ModuleDef,
}

impl StructKind {
	pub const ALL: [StructKind; 7] = [
		StructKind::Config,
		StructKind::PreConfig,
		StructKind::WideStringList,
		StructKind::Object,
		StructKind::MethodDef,
		StructKind::ModuleDefBase,
		StructKind::ModuleDef,
	];

	/// The C type name of the struct.
	pub const fn name(&self) -> &'static str {
		match self {
			StructKind::Config => "PyConfig",
			StructKind::PreConfig => "PyPreConfig",
			StructKind::WideStringList => "PyWideStringList",
			StructKind::Object => "PyObject",
			StructKind::MethodDef => "PyMethodDef",
			StructKind::ModuleDefBase => "PyModuleDef_Base",
			StructKind::ModuleDef => "PyModuleDef",
		}
	}

	pub fn from_name(name: &str) -> Option<StructKind> {
		StructKind::ALL.into_iter().find(|kind| kind.name() == name)
	}
}

impl Display for StructKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Structs {
	#[serde(rename = "PyConfig", default, skip_serializing_if = "StructLayout::is_empty")]
	pub config: StructLayout,
	#[serde(rename = "PyPreConfig", default, skip_serializing_if = "StructLayout::is_empty")]
	pub pre_config: StructLayout,
	#[serde(rename = "PyWideStringList", default, skip_serializing_if = "StructLayout::is_empty")]
	pub wide_string_list: StructLayout,
	#[serde(rename = "PyObject", default, skip_serializing_if = "StructLayout::is_empty")]
	pub object: StructLayout,
	#[serde(rename = "PyMethodDef", default, skip_serializing_if = "StructLayout::is_empty")]
	pub method_def: StructLayout,
	#[serde(rename = "PyModuleDef_Base", default, skip_serializing_if = "StructLayout::is_empty")]
	pub module_def_base: StructLayout,
	#[serde(rename = "PyModuleDef", default, skip_serializing_if = "StructLayout::is_empty")]
	pub module_def: StructLayout,
}

impl Structs {
	pub fn get(&self, kind: StructKind) -> &StructLayout {
		match kind {
			StructKind::Config => &self.config,
			StructKind::PreConfig => &self.pre_config,
			StructKind::WideStringList => &self.wide_string_list,
			StructKind::Object => &self.object,
			StructKind::MethodDef => &self.method_def,
			StructKind::ModuleDefBase => &self.module_def_base,
			StructKind::ModuleDef => &self.module_def,
		}
	}

	pub fn get_mut(&mut self, kind: StructKind) -> &mut StructLayout {
		match kind {
			StructKind::Config => &mut self.config,
			StructKind::PreConfig => &mut self.pre_config,
			StructKind::WideStringList => &mut self.wide_string_list,
			StructKind::Object => &mut self.object,
			StructKind::MethodDef => &mut self.method_def,
			StructKind::ModuleDefBase => &mut self.module_def_base,
			StructKind::ModuleDef => &mut self.module_def,
		}
	}

	/// Layouts that are present, in [`StructKind::ALL`] order.
	pub fn iter(&self) -> impl Iterator<Item = (StructKind, &StructLayout)> {
		StructKind::ALL.into_iter().map(|kind| (kind, self.get(kind))).filter(|(_, layout)| !layout.is_empty())
	}
}

/// Catalog of functions and struct layouts for one (platform, version) build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
	#[serde(rename = "PyFunctions", default, deserialize_with = "null_as_default")]
	pub functions: Vec<FunctionSignature>,
	#[serde(rename = "PyStructs", default, deserialize_with = "null_as_default")]
	pub structs: Structs,
	#[serde(rename = "PyData", default, deserialize_with = "null_as_default", skip_serializing_if = "BTreeMap::is_empty")]
	pub data: BTreeMap<String, String>,
}

impl Descriptor {
	pub fn from_json(json: &str) -> serde_json::Result<Self> {
		serde_json::from_str(json)
	}

	pub fn to_json(&self) -> serde_json::Result<String> {
		serde_json::to_string_pretty(self)
	}

	pub fn lookup_function(&self, name: &str) -> Option<&FunctionSignature> {
		self.functions.iter().find(|f| f.name == name)
	}

	pub fn layout(&self, kind: StructKind) -> &StructLayout {
		self.structs.get(kind)
	}

	pub fn validate(&self) -> Vec<LayoutWarning> {
		self.structs.iter().flat_map(|(_, layout)| layout.validate()).collect()
	}
}

pub fn lookup_function<'a>(descriptor: &'a Descriptor, name: &str) -> Option<&'a FunctionSignature> {
	descriptor.lookup_function(name)
}

/// Descriptors written by older generators encode empty collections as `null`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
