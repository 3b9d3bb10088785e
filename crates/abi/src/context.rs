// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use core::ffi::c_void;

use crate::callbacks::HostApiFFI;

/// Context handed to every native entry point.
///
/// `bridge` is opaque to the library and must be passed back unchanged to
/// every callback. The context is only valid for the duration of the call it
/// was passed to.
#[repr(C)]
pub struct ContextFFI {
	pub bridge: *const c_void,
	pub abi_version: u32,
	pub api: HostApiFFI,
}
