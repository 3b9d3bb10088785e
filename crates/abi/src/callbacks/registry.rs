// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use crate::{context::ContextFFI, data::StrFFI, library::NativeMethodFFI};

/// Registry callbacks, only valid during library initialization
#[repr(C)]
#[derive(Clone, Copy)]
pub struct RegistryCallbacks {
	/// Register a module
	///
	/// # Parameters
	/// - `name`, `name_len`: Module name
	/// - `module_out`: Receives the module token
	///
	/// # Returns
	/// - 0 on success, negative error code on failure
	pub register_module:
		extern "C" fn(ctx: *const ContextFFI, name: *const u8, name_len: usize, module_out: *mut u32) -> i32,

	/// Register a method of `module`
	pub register_method: extern "C" fn(
		ctx: *const ContextFFI,
		module: u32,
		name: *const u8,
		name_len: usize,
		method: NativeMethodFFI,
	) -> i32,

	/// Register a constant of `module`; its value is popped from the channel
	pub register_constant:
		extern "C" fn(ctx: *const ContextFFI, module: u32, name: *const u8, name_len: usize) -> i32,

	/// Declare a named exception of `module`
	pub register_exception: extern "C" fn(
		ctx: *const ContextFFI,
		module: u32,
		name: *const u8,
		name_len: usize,
		exception_out: *mut u32,
	) -> i32,

	/// Declare an interface implemented by client objects
	///
	/// # Parameters
	/// - `methods`, `method_count`: Method names of the interface
	/// - `interface_out`: Receives the interface token
	pub register_interface: extern "C" fn(
		ctx: *const ContextFFI,
		module: u32,
		name: *const u8,
		name_len: usize,
		methods: *const StrFFI,
		method_count: usize,
		interface_out: *mut u32,
	) -> i32,

	/// Resolve a method of a declared interface
	pub resolve_interface_method: extern "C" fn(
		ctx: *const ContextFFI,
		interface: u32,
		name: *const u8,
		name_len: usize,
		method_out: *mut u32,
	) -> i32,
}
