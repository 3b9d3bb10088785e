// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Logging callbacks for native libraries
//!
//! Allows native libraries to emit log messages through the host's tracing
//! subscriber.

use tether_abi::{constants::*, context::ContextFFI};
use tracing::{debug, error, info, trace, warn};

/// Log a message from a native library
///
/// # Parameters
/// - `level`: Log level (0=trace, 1=debug, 2=info, 3=warn, 4=error)
/// - `message`: Message bytes (not null-terminated)
/// - `message_len`: Length of message in bytes
pub(super) extern "C" fn host_log_message(
	_ctx: *const ContextFFI,
	level: u32,
	message: *const u8,
	message_len: usize,
) {
	if message.is_null() {
		return;
	}

	// SAFETY: the library passes `message_len` readable bytes
	let msg_str = unsafe {
		let bytes = std::slice::from_raw_parts(message, message_len);
		String::from_utf8_lossy(bytes)
	};

	match level {
		LOG_TRACE => trace!(target: "tether::native", "{}", msg_str),
		LOG_DEBUG => debug!(target: "tether::native", "{}", msg_str),
		LOG_INFO => info!(target: "tether::native", "{}", msg_str),
		LOG_WARN => warn!(target: "tether::native", "{}", msg_str),
		LOG_ERROR => error!(target: "tether::native", "{}", msg_str),
		_ => info!(target: "tether::native", "{}", msg_str),
	}
}
