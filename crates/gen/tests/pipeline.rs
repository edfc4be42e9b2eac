// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! End to end generation over the header tree in `fixtures/runtime`.
//! The full run is skipped when no C compiler is available.

#![cfg(unix)]

use std::{
	fs,
	path::{Path, PathBuf},
};

use pyabi_descriptor::{DescriptorSource, Platform, StructLayout, Target, Version};
use pyabi_gen::{
	ExtractError, GenConfig, Pipeline, ProbeError, ProviderError, RuntimeInstallation, StaticProvider, ToolCommand,
	ToolError, UnitError,
};
use pyabi_testing::{c_compiler, fixture, init_tracing, temp_dir};

fn fixtures() -> PathBuf {
	Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn installation(platform: Platform, version: Version) -> RuntimeInstallation {
	RuntimeInstallation {
		platform,
		version,
		library_path: PathBuf::from("libpython.so"),
		include_dir: fixtures().join("runtime/include"),
		package_dir: PathBuf::new(),
	}
}

fn host() -> Platform {
	Platform::current().unwrap()
}

fn foreign() -> Platform {
	if host() == Platform::Windows {
		Platform::Linux
	} else {
		Platform::Windows
	}
}

fn config(root: &Path) -> GenConfig {
	GenConfig::default()
		.with_output_root(root.join("out"))
		.with_scratch_root(root.join("scratch"))
		.with_fake_libc(fixtures().join("fake_libc"))
		.with_workers(2)
}

fn assert_matches_host(probed: &StructLayout, expected: &StructLayout) {
	assert_eq!(probed.name, expected.name);
	assert_eq!(probed.size, expected.size, "size of {}", expected.name);
	for member in &expected.members {
		let found = probed.member(&member.name).unwrap_or_else(|| panic!("{} lacks {}", expected.name, member.name));
		assert_eq!((found.offset, found.size), (member.offset, member.size), "{}.{}", expected.name, member.name);
	}
}

#[test]
fn test_generate_and_load() {
	init_tracing();
	let Some(compiler) = c_compiler() else {
		eprintln!("skipping: no C compiler");
		return;
	};

	temp_dir(|root| {
		let version = Version::new(3, 11);
		let config = config(root)
			.with_platforms([host()])
			.with_versions([version])
			.with_preprocessor(compiler.clone())
			.with_compiler(compiler)
			.with_installation(installation(host(), version));

		let pipeline = Pipeline::from_config(config).unwrap();
		let report = pipeline.run().unwrap();
		assert!(report.is_success(), "{:?}", report.failed);

		let target = Target::new(host(), version);
		assert_eq!(report.succeeded, vec![(target, root.join("out").join(host().as_str()).join("ctags-311.json"))]);

		let descriptor = pipeline.store().load(&target).unwrap();

		for name in ["Py_Initialize", "Py_IsInitialized", "Py_Main", "PyModule_Create2", "PyCFunction_New", "_Py_Private"] {
			assert!(descriptor.lookup_function(name).is_some(), "{name} missing");
		}
		assert!(descriptor.lookup_function("PyEval_InitThreads").is_none());
		assert!(descriptor.lookup_function("Py_IsNone").is_none());
		assert!(descriptor.lookup_function("PyErr_Format").unwrap().is_variadic());
		assert_eq!(descriptor.lookup_function("Py_Main").unwrap().parameters[1].ty, "wchar_t**");

		let structs = &descriptor.structs;
		assert_matches_host(&structs.object, &fixture::object());
		assert_matches_host(&structs.method_def, &fixture::method_def());
		assert_matches_host(&structs.module_def_base, &fixture::module_def_base());
		assert_matches_host(&structs.module_def, &fixture::module_def());
		assert_eq!(structs.object.member_offset("ob_refcnt_bytes"), 0);
		assert!(structs.config.is_empty());
		assert!(descriptor.validate().is_empty());

		assert_eq!(descriptor.data["sizeof:void*"], size_of::<usize>().to_string());
		assert_eq!(descriptor.data["sizeof:int"], size_of::<std::ffi::c_int>().to_string());

		// The probe compiled against the fixture itself, which stays unpatched.
		let original = fs::read_to_string(fixtures().join("runtime/include/pyport.h"))?;
		assert!(!original.contains("#define PyMODINIT_FUNC"));
		Ok(())
	})
	.unwrap();
}

#[test]
fn test_failures_stay_per_unit() {
	init_tracing();
	temp_dir(|root| {
		let installed = Version::new(3, 11);
		let config = config(root)
			.with_platforms([host(), foreign()])
			.with_versions([Version::new(3, 11), Version::new(3, 12)])
			.with_preprocessor(ToolCommand::new("pyabi-missing-preprocessor"));
		let provider = StaticProvider::default().with(installation(host(), installed));

		let report = Pipeline::new(config, provider).unwrap().run().unwrap();
		assert!(report.succeeded.is_empty());
		assert_eq!(report.failed.len(), 4);

		for failure in &report.failed {
			let target = failure.target;
			match &failure.cause {
				UnitError::Extract(ExtractError::Tool(ToolError::Spawn {
					program,
					..
				})) => {
					assert_eq!(target, Target::new(host(), installed));
					assert_eq!(program, "pyabi-missing-preprocessor");
				}
				UnitError::Provider(ProviderError::NotInstalled(missing)) => {
					assert_eq!(*missing, Target::new(host(), Version::new(3, 12)));
				}
				UnitError::Probe(ProbeError::CrossPlatform {
					..
				}) => assert_eq!(target.platform, foreign()),
				other => panic!("unexpected failure for {target}: {other}"),
			}
		}

		// The scratch copy was patched before preprocessing failed.
		let scratch = root.join("scratch").join(host().as_str()).join("311").join("include/pyport.h");
		assert!(fs::read_to_string(scratch)?.contains("#define PyMODINIT_FUNC PyObject*"));
		assert!(!root.join("out").exists());
		Ok(())
	})
	.unwrap();
}
