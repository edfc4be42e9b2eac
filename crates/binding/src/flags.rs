// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Calling convention flags of a method table entry (`ml_flags`).

pub const METH_VARARGS: i32 = 0x0001;
pub const METH_KEYWORDS: i32 = 0x0002;
pub const METH_NOARGS: i32 = 0x0004;
pub const METH_O: i32 = 0x0008;
pub const METH_CLASS: i32 = 0x0010;
pub const METH_STATIC: i32 = 0x0020;
pub const METH_COEXIST: i32 = 0x0040;
pub const METH_FASTCALL: i32 = 0x0080;
pub const METH_METHOD: i32 = 0x0200;
