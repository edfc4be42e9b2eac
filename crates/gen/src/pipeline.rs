// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Generation of one descriptor per (platform, version).
//!
//! Each unit copies the installation's headers to scratch space, patches the copy,
//! extracts signatures and struct shapes from it, probes offsets against the untouched
//! originals and saves the result. Units share nothing but the configuration and run on a
//! rayon pool; a failed unit is reported and never stops the others.

use std::{
	fs, io,
	path::{Path, PathBuf},
};

use pyabi_descriptor::{FsStore, Platform, StructKind, Target};
use rayon::{ThreadPoolBuilder, prelude::*};
use tracing::{error, info, instrument, warn};

use crate::{
	c::parse_declarations,
	config::GenConfig,
	error::{ExtractError, GenError, PipelineError, UnitError},
	extract::Extractor,
	patch::HeaderPatch,
	probe::Prober,
	provider::{RuntimeProvider, StaticProvider},
	tags::TagSource,
	toolchain::Toolchain,
};

/// Header every header tree is entered through.
pub const ENTRY_HEADER: &str = "Python.h";

/// Outcome of a run.
#[derive(Debug, Default)]
pub struct PipelineReport {
	/// Saved descriptors, by target.
	pub succeeded: Vec<(Target, PathBuf)>,
	/// Every failed unit.
	pub failed: Vec<PipelineError>,
}

impl PipelineReport {
	pub fn is_success(&self) -> bool {
		self.failed.is_empty()
	}

	pub fn failed_targets(&self) -> Vec<Target> {
		self.failed.iter().map(|failure| failure.target).collect()
	}
}

pub struct Pipeline<P: RuntimeProvider> {
	config: GenConfig,
	structs: Vec<StructKind>,
	provider: P,
	tags: Box<dyn TagSource>,
	toolchain: Toolchain,
	store: FsStore,
	host: Platform,
}

impl Pipeline<StaticProvider> {
	/// A pipeline over the installations listed in `config`.
	pub fn from_config(config: GenConfig) -> Result<Self, GenError> {
		let provider = StaticProvider::new(config.installations.clone());
		Pipeline::new(config, provider)
	}
}

impl<P: RuntimeProvider> Pipeline<P> {
	pub fn new(config: GenConfig, provider: P) -> Result<Self, GenError> {
		config.validate()?;
		let structs = config.struct_kinds()?;

		Ok(Self {
			structs,
			provider,
			tags: config.tags.source(),
			toolchain: config.toolchain(),
			store: FsStore::new(&config.output_root),
			host: Platform::current()?,
			config,
		})
	}

	pub fn with_tag_source(mut self, tags: Box<dyn TagSource>) -> Self {
		self.tags = tags;
		self
	}

	pub fn config(&self) -> &GenConfig {
		&self.config
	}

	pub fn store(&self) -> &FsStore {
		&self.store
	}

	/// Runs every unit and collects the outcome.
	pub fn run(&self) -> Result<PipelineReport, GenError> {
		let targets = self.config.targets();
		info!(units = targets.len(), workers = self.config.workers, "pipeline started");

		let pool = ThreadPoolBuilder::new()
			.num_threads(self.config.workers)
			.thread_name(|i| format!("pyabi-gen-{i}"))
			.build()?;
		let results: Vec<(Target, Result<PathBuf, UnitError>)> =
			pool.install(|| targets.par_iter().map(|target| (*target, self.run_unit(*target))).collect());

		let mut report = PipelineReport::default();
		for (target, result) in results {
			match result {
				Ok(path) => report.succeeded.push((target, path)),
				Err(cause) => {
					error!(platform = %target.platform, version = %target.version, error = %cause, "unit failed");
					report.failed.push(PipelineError {
						target,
						cause,
					});
				}
			}
		}

		info!(succeeded = report.succeeded.len(), failed = report.failed.len(), "pipeline finished");
		Ok(report)
	}

	/// Produces and saves the descriptor of `target`.
	#[instrument(name = "gen::unit", level = "debug", skip(self), fields(platform = %target.platform, version = %target.version))]
	pub fn run_unit(&self, target: Target) -> Result<PathBuf, UnitError> {
		info!("unit started");
		let prober = Prober::new(&self.toolchain, self.host);
		prober.ensure_native(&target)?;

		let installation = self.provider.installation(&target)?;

		let scratch = self.config.scratch_root.join(target.platform.as_str()).join(target.version.compact());
		let headers = scratch.join("include");
		reset_dir(&scratch).and_then(|()| copy_tree(&installation.include_dir, &headers)).map_err(|source| {
			UnitError::Scratch {
				path: scratch.clone(),
				source,
			}
		})?;
		HeaderPatch::for_version(target.version).apply(&headers)?;

		let names = self.tags.scan(&installation.include_dir)?;

		let mut includes = vec![self.config.fake_libc.clone(), headers.clone()];
		includes.extend(self.config.include_dirs.iter().cloned());
		let text = self
			.toolchain
			.preprocess(target.platform, &headers.join(ENTRY_HEADER), &includes)
			.map_err(ExtractError::Tool)?;
		let declarations = parse_declarations(&text)?;
		if declarations.skipped > 0 {
			warn!(skipped = declarations.skipped, "declarations skipped");
		}

		let extraction = Extractor::new(self.structs.clone())
			.with_deprecated(self.config.include_deprecated)
			.extract(&declarations, &names);
		let mut descriptor = extraction.descriptor;

		let mut probe_includes = vec![installation.include_dir.clone()];
		probe_includes.extend(self.config.include_dirs.iter().cloned());
		prober.probe(&target, &probe_includes, &scratch.join("probe"), &mut descriptor)?;

		for warning in descriptor.validate() {
			warn!(%warning, "layout warning");
		}

		let path = self.store.save(&target, &descriptor)?;
		info!(path = %path.display(), functions = descriptor.functions.len(), "unit finished");
		Ok(path)
	}
}

fn reset_dir(dir: &Path) -> io::Result<()> {
	if dir.exists() {
		fs::remove_dir_all(dir)?;
	}
	fs::create_dir_all(dir)
}

/// Copies the header tree at `from` into `to`.
///
/// Linked files are copied as regular files, so patching the copy never writes through a link
/// into the installation. Linked directories are not descended into; on unix they are
/// recreated as links to the same absolute target, elsewhere they are skipped.
fn copy_tree(from: &Path, to: &Path) -> io::Result<()> {
	fs::create_dir_all(to)?;
	for entry in fs::read_dir(from)? {
		let entry = entry?;
		let source = entry.path();
		let target = to.join(entry.file_name());
		let file_type = entry.file_type()?;

		if file_type.is_dir() {
			copy_tree(&source, &target)?;
		} else if file_type.is_symlink() {
			match fs::metadata(&source) {
				Ok(metadata) if metadata.is_dir() => link_dir(&source, &target)?,
				Ok(_) => {
					fs::copy(&source, &target)?;
				}
				Err(err) => warn!(path = %source.display(), error = %err, "skipping dangling header link"),
			}
		} else {
			fs::copy(&source, &target)?;
		}
	}
	Ok(())
}

#[cfg(unix)]
fn link_dir(source: &Path, target: &Path) -> io::Result<()> {
	let destination = fs::read_link(source)?;
	let destination = match source.parent() {
		Some(parent) if destination.is_relative() => parent.join(destination),
		_ => destination,
	};
	std::os::unix::fs::symlink(destination, target)
}

#[cfg(not(unix))]
fn link_dir(source: &Path, _target: &Path) -> io::Result<()> {
	warn!(path = %source.display(), "skipping linked header directory");
	Ok(())
}

#[cfg(all(test, unix))]
mod tests {
	use std::os::unix::fs::symlink;

	use pyabi_testing::temp_dir;

	use super::*;

	#[test]
	fn test_copy_tree_handles_links() {
		temp_dir(|root| {
			let include = root.join("include");
			fs::create_dir_all(include.join("cpython"))?;
			fs::write(include.join("pyport.h"), "/* port */\n")?;
			fs::write(include.join("cpython/object.h"), "/* object */\n")?;
			symlink("pyport.h", include.join("alias.h"))?;
			symlink("cpython", include.join("linked"))?;
			symlink(".", include.join("cpython/self"))?;
			symlink("gone.h", include.join("dangling.h"))?;

			let copy = root.join("copy");
			copy_tree(&include, &copy)?;

			let alias = copy.join("alias.h");
			assert!(!fs::symlink_metadata(&alias)?.file_type().is_symlink());
			assert_eq!(fs::read_to_string(&alias)?, "/* port */\n");

			assert!(fs::symlink_metadata(copy.join("linked"))?.file_type().is_symlink());
			assert_eq!(fs::read_to_string(copy.join("linked/object.h"))?, "/* object */\n");
			assert!(fs::symlink_metadata(copy.join("cpython/self"))?.file_type().is_symlink());
			assert!(!copy.join("dangling.h").exists());

			fs::write(&alias, "patched")?;
			assert_eq!(fs::read_to_string(include.join("pyport.h"))?, "/* port */\n");
			Ok(())
		})
		.unwrap();
	}
}
