// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use crate::context::ContextFFI;

/// Logging callbacks
#[repr(C)]
#[derive(Clone, Copy)]
pub struct LogCallbacks {
	/// Log a message
	///
	/// # Parameters
	/// - `ctx`: FFI context
	/// - `level`: Log level (0=trace, 1=debug, 2=info, 3=warn, 4=error)
	/// - `message`: Message bytes (not null-terminated)
	/// - `message_len`: Length of message in bytes
	pub message: extern "C" fn(ctx: *const ContextFFI, level: u32, message: *const u8, message_len: usize),
}
