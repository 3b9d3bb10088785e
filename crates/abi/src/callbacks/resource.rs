// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use core::ffi::c_void;

use crate::{context::ContextFFI, data::BufferRefFFI, library::DestroyFFI};

/// Resource table callbacks
#[repr(C)]
#[derive(Clone, Copy)]
pub struct ResourceCallbacks {
	/// Allocate a server object
	///
	/// # Parameters
	/// - `object`: Library-owned pointer
	/// - `destroy`: Called once when the object is released, may be null
	/// - `label`, `label_len`: Class name shown in table dumps
	/// - `id_out`: Receives the server id
	///
	/// # Returns
	/// - 0 on success, negative error code on failure
	pub allocate_object: extern "C" fn(
		ctx: *const ContextFFI,
		object: *mut c_void,
		destroy: Option<DestroyFFI>,
		label: *const u8,
		label_len: usize,
		id_out: *mut u32,
	) -> i32,

	/// Look up the pointer of a live server object allocated by a library
	pub object_ptr: extern "C" fn(ctx: *const ContextFFI, id: u32, object_out: *mut *mut c_void) -> i32,

	/// Release a resource
	///
	/// # Returns
	/// - 0 if released, `TETHER_ALREADY_RELEASED` if it was not live
	pub release: extern "C" fn(ctx: *const ContextFFI, id: u32, side: u8) -> i32,

	/// Check whether a resource is live
	pub is_live: extern "C" fn(ctx: *const ContextFFI, id: u32, side: u8, live_out: *mut u8) -> i32,

	/// Allocate a zeroed buffer of `count` elements on `side`
	pub create_buffer: extern "C" fn(
		ctx: *const ContextFFI,
		side: u8,
		element_size: u32,
		count: usize,
		buffer_out: *mut BufferRefFFI,
	) -> i32,

	/// Log the live resources of both tables at `info` and report their
	/// counts. Clearing the tables is left to the host's shutdown.
	pub dump_tables: extern "C" fn(ctx: *const ContextFFI, client_out: *mut usize, server_out: *mut usize) -> i32,
}
