// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use core::ffi::c_void;

use crate::{context::ContextFFI, data::BufferRefFFI};

/// Value channel callbacks
///
/// Every push returns 0 on success. Every pop writes its out-parameter and
/// returns 0, or returns a negative code when the channel is empty or the top
/// value has another shape. Strings and arrays returned by a pop stay valid
/// until the outermost native call returns.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct ChannelCallbacks {
	pub push_null: extern "C" fn(ctx: *const ContextFFI) -> i32,
	pub push_boolean: extern "C" fn(ctx: *const ContextFFI, value: u8) -> i32,
	pub push_int1: extern "C" fn(ctx: *const ContextFFI, value: i8) -> i32,
	pub push_int2: extern "C" fn(ctx: *const ContextFFI, value: i16) -> i32,
	pub push_int4: extern "C" fn(ctx: *const ContextFFI, value: i32) -> i32,
	pub push_int8: extern "C" fn(ctx: *const ContextFFI, value: i64) -> i32,
	pub push_uint1: extern "C" fn(ctx: *const ContextFFI, value: u8) -> i32,
	pub push_uint2: extern "C" fn(ctx: *const ContextFFI, value: u16) -> i32,
	pub push_uint4: extern "C" fn(ctx: *const ContextFFI, value: u32) -> i32,
	pub push_uint8: extern "C" fn(ctx: *const ContextFFI, value: u64) -> i32,
	pub push_float4: extern "C" fn(ctx: *const ContextFFI, value: f32) -> i32,
	pub push_float8: extern "C" fn(ctx: *const ContextFFI, value: f64) -> i32,
	pub push_size_t: extern "C" fn(ctx: *const ContextFFI, value: usize) -> i32,
	pub push_ptr: extern "C" fn(ctx: *const ContextFFI, value: *mut c_void) -> i32,

	/// Push a string
	///
	/// # Parameters
	/// - `ptr`: UTF-8 bytes, embedded NULs allowed
	/// - `len`: Length in bytes
	pub push_utf8: extern "C" fn(ctx: *const ContextFFI, ptr: *const u8, len: usize) -> i32,

	/// Push a homogeneous array
	///
	/// # Parameters
	/// - `kind`: Element kind (`KIND_*`)
	/// - `data`: First element, may be null when `count` is 0
	/// - `count`: Number of elements
	pub push_array: extern "C" fn(ctx: *const ContextFFI, kind: u8, data: *const c_void, count: usize) -> i32,

	pub push_instance: extern "C" fn(ctx: *const ContextFFI, id: u32, side: u8) -> i32,
	pub push_function: extern "C" fn(ctx: *const ContextFFI, id: u32, side: u8) -> i32,
	pub push_buffer: extern "C" fn(ctx: *const ContextFFI, buffer: *const BufferRefFFI) -> i32,

	/// Pop a null if the top of the channel is one
	///
	/// # Returns
	/// - 0 if a null was popped, `TETHER_NOT_NULL` if the channel is untouched
	pub pop_null: extern "C" fn(ctx: *const ContextFFI) -> i32,
	pub pop_boolean: extern "C" fn(ctx: *const ContextFFI, out: *mut u8) -> i32,
	pub pop_int1: extern "C" fn(ctx: *const ContextFFI, out: *mut i8) -> i32,
	pub pop_int2: extern "C" fn(ctx: *const ContextFFI, out: *mut i16) -> i32,
	pub pop_int4: extern "C" fn(ctx: *const ContextFFI, out: *mut i32) -> i32,
	pub pop_int8: extern "C" fn(ctx: *const ContextFFI, out: *mut i64) -> i32,
	pub pop_uint1: extern "C" fn(ctx: *const ContextFFI, out: *mut u8) -> i32,
	pub pop_uint2: extern "C" fn(ctx: *const ContextFFI, out: *mut u16) -> i32,
	pub pop_uint4: extern "C" fn(ctx: *const ContextFFI, out: *mut u32) -> i32,
	pub pop_uint8: extern "C" fn(ctx: *const ContextFFI, out: *mut u64) -> i32,
	pub pop_float4: extern "C" fn(ctx: *const ContextFFI, out: *mut f32) -> i32,
	pub pop_float8: extern "C" fn(ctx: *const ContextFFI, out: *mut f64) -> i32,
	pub pop_size_t: extern "C" fn(ctx: *const ContextFFI, out: *mut usize) -> i32,
	pub pop_ptr: extern "C" fn(ctx: *const ContextFFI, out: *mut *mut c_void) -> i32,

	/// Pop a string into the host scratch arena
	pub pop_utf8: extern "C" fn(ctx: *const ContextFFI, ptr_out: *mut *const u8, len_out: *mut usize) -> i32,

	/// Pop an array of `kind` into the host scratch arena
	pub pop_array:
		extern "C" fn(ctx: *const ContextFFI, kind: u8, data_out: *mut *const c_void, count_out: *mut usize) -> i32,

	pub pop_instance: extern "C" fn(ctx: *const ContextFFI, id_out: *mut u32, side_out: *mut u8) -> i32,
	pub pop_function: extern "C" fn(ctx: *const ContextFFI, id_out: *mut u32, side_out: *mut u8) -> i32,
	pub pop_buffer: extern "C" fn(ctx: *const ContextFFI, out: *mut BufferRefFFI) -> i32,

	/// Number of values currently on the channel
	pub depth: extern "C" fn(ctx: *const ContextFFI) -> usize,
}
