// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use pyabi_gen::ToolCommand;

/// The C compiler `cc` detects for this build, if it actually runs here.
///
/// Tests that compile C fixtures skip themselves when this is `None`.
pub fn c_compiler() -> Option<ToolCommand> {
	let compiler = ToolCommand::system_compiler();
	let runs = compiler.command().arg("--version").output().is_ok_and(|output| output.status.success());
	runs.then_some(compiler)
}
