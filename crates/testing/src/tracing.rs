// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt};

/// Installs a test writer subscriber filtered by `RUST_LOG` (default `warn`).
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_tracing() {
	static INIT: Once = Once::new();

	INIT.call_once(|| {
		let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
		let _ = fmt().with_env_filter(filter).with_test_writer().with_target(true).try_init();
	});
}
