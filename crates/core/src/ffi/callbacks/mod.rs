// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Host callback implementations for native libraries

mod channel;
mod logging;
mod registry;
mod relay;
mod resource;

use core::ffi::c_void;

use tether_abi::{
	callbacks::{HostApiFFI, log::LogCallbacks},
	constants::{SIDE_CLIENT, SIDE_SERVER},
};
use tether_type::{Error, Result, Side};

/// Create the host callback table
pub(crate) fn host_api() -> HostApiFFI {
	HostApiFFI {
		channel: channel::callbacks(),
		registry: registry::callbacks(),
		resource: resource::callbacks(),
		relay: relay::callbacks(),
		log: LogCallbacks {
			message: logging::host_log_message,
		},
	}
}

/// Borrow a string passed by a library.
///
/// # Safety
/// `ptr` must point to `len` readable bytes, or be null with `len` 0.
unsafe fn read_str<'a>(ptr: *const u8, len: usize) -> Result<&'a str> {
	if len == 0 {
		return Ok("");
	}
	if ptr.is_null() {
		return Err(Error::NullPointer("string"));
	}
	let bytes = unsafe { std::slice::from_raw_parts(ptr, len) };
	Ok(std::str::from_utf8(bytes)?)
}

/// Borrow an array passed by a library.
///
/// # Safety
/// `data` must point to `count` initialized values of `T`, or be null with
/// `count` 0.
unsafe fn read_slice<'a, T>(data: *const c_void, count: usize) -> Result<&'a [T]> {
	if count == 0 {
		return Ok(&[]);
	}
	if data.is_null() {
		return Err(Error::NullPointer("array"));
	}
	Ok(unsafe { std::slice::from_raw_parts(data as *const T, count) })
}

fn out_ptr<T>(out: *mut T, what: &'static str) -> Result<*mut T> {
	if out.is_null() {
		return Err(Error::NullPointer(what));
	}
	Ok(out)
}

fn side_of(side: u8) -> Result<Side> {
	match side {
		SIDE_CLIENT => Ok(Side::Client),
		SIDE_SERVER => Ok(Side::Server),
		other => Err(Error::InvalidToken {
			what: format!("side {}", other),
		}),
	}
}

fn side_byte(side: Side) -> u8 {
	match side {
		Side::Client => SIDE_CLIENT,
		Side::Server => SIDE_SERVER,
	}
}
