// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::Write;

use pyabi_descriptor::{Descriptor, StructMember};

/// Primitive types whose sizes are recorded, as (data bag key, C type).
pub const PRIMITIVES: &[(&str, &str)] = &[
	("char", "char"),
	("signed char", "signed char"),
	("unsigned char", "unsigned char"),
	("short", "short"),
	("signed short", "signed short"),
	("unsigned short", "unsigned short"),
	("int", "int"),
	("signed int", "signed int"),
	("unsigned int", "unsigned int"),
	("long", "long"),
	("signed long", "signed long"),
	("unsigned long", "unsigned long"),
	("long long", "long long"),
	("signed long long", "signed long long"),
	("unsigned long long", "unsigned long long"),
	("float", "float"),
	("double", "double"),
	("_Bool", "_Bool"),
	("enum", "pyabi_probe_enum"),
	("size_t", "size_t"),
	("void*", "void *"),
	("wchar_t", "wchar_t"),
];

/// Whether the probe can take the offset of `member`.
///
/// Unnamed members and bit-fields have no address.
pub fn is_probeable(member: &StructMember) -> bool {
	!member.name.is_empty() && member.name != "None" && !member.ty.contains(':')
}

/// The C program printing the layout of every struct in `descriptor`.
///
/// Output lines:
/// - `struct <Name> <size>`
/// - `member <Name> <member> <offset> <size>`
/// - `sizeof <size> <type>`
pub fn probe_source(descriptor: &Descriptor) -> String {
	let mut out = String::new();
	out.push_str(
		"#include <Python.h>\n\
		 #include <stddef.h>\n\
		 #include <stdio.h>\n\
		 #include <stdlib.h>\n\
		 #include <wchar.h>\n\n\
		 typedef enum { PYABI_PROBE_ENUM_FIRST = 1, PYABI_PROBE_ENUM_SECOND } pyabi_probe_enum;\n\n",
	);

	let layouts: Vec<_> = descriptor.structs.iter().map(|(_, layout)| layout).filter(|l| !l.name.is_empty()).collect();

	for layout in &layouts {
		let name = &layout.name;
		let _ = writeln!(out, "static void probe_{name}(void) {{");
		let _ = writeln!(out, "\t{name} *s = ({name} *)calloc(1, sizeof({name}));");
		let _ = writeln!(out, "\tif (s == NULL) {{\n\t\texit(2);\n\t}}");
		let _ = writeln!(out, "\tprintf(\"struct {name} %zu\\n\", sizeof({name}));");
		for member in layout.members.iter().filter(|m| is_probeable(m)) {
			let field = &member.name;
			// Flexible array members have no size.
			let size = if member.ty.ends_with("[]") {
				"(size_t)0".to_string()
			} else {
				format!("sizeof(s->{field})")
			};
			let _ = writeln!(
				out,
				"\tprintf(\"member {name} {field} %ld %zu\\n\", (long)((char *)&s->{field} - (char *)s), {size});"
			);
		}
		out.push_str("\tfree(s);\n}\n\n");
	}

	out.push_str("int main(void) {\n");
	for layout in &layouts {
		let _ = writeln!(out, "\tprobe_{}();", layout.name);
	}
	for (key, ty) in PRIMITIVES {
		let _ = writeln!(out, "\tprintf(\"sizeof %zu {key}\\n\", sizeof({ty}));");
	}
	out.push_str("\treturn 0;\n}\n");
	out
}
