// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use core::ffi::c_void;

use crate::{
	context::ContextFFI,
	library::{DestroyFFI, FunctionFFI},
};

/// Callback relay callbacks
#[repr(C)]
#[derive(Clone, Copy)]
pub struct RelayCallbacks {
	/// Register a server function
	///
	/// # Parameters
	/// - `function`: Called with `user_data` on every invocation
	/// - `destroy`: Called with `user_data` when the function is released, may be null
	/// - `id_out`: Receives the server id
	pub register_function: extern "C" fn(
		ctx: *const ContextFFI,
		function: FunctionFFI,
		user_data: *mut c_void,
		destroy: Option<DestroyFFI>,
		id_out: *mut u32,
	) -> i32,

	/// Invoke a function registered on either side
	///
	/// Arguments must be pushed before the call, last argument first.
	///
	/// # Returns
	/// - 0 on success, `TETHER_EXCEPTION` if the function raised
	pub exec_function: extern "C" fn(ctx: *const ContextFFI, id: u32, side: u8) -> i32,

	/// Invoke an interface method on a client object
	pub invoke_client_method: extern "C" fn(ctx: *const ContextFFI, method: u32, target: u32) -> i32,

	/// Raise an exception from the current native method
	///
	/// # Parameters
	/// - `kind`: Exception token, or 0 for an unnamed exception
	/// - `message`, `message_len`: Exception message
	///
	/// # Returns
	/// - `TETHER_EXCEPTION`, to be returned by the native method
	pub raise: extern "C" fn(ctx: *const ContextFFI, kind: u32, message: *const u8, message_len: usize) -> i32,

	/// Grant the client permission to release the resources it deferred
	pub clear_safety_area: extern "C" fn(ctx: *const ContextFFI) -> i32,
}
