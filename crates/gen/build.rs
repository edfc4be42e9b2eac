// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::env;

// The C compiler is looked up at run time with `cc`, which needs the triples cargo only
// exposes to build scripts.
fn main() {
	for (var, exported) in [("TARGET", "PYABI_GEN_TARGET"), ("HOST", "PYABI_GEN_HOST")] {
		let triple = env::var(var).unwrap_or_default();
		println!("cargo:rustc-env={exported}={triple}");
	}
	println!("cargo:rerun-if-changed=build.rs");
}
