// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use core::ffi::c_void;

use crate::context::ContextFFI;

/// Symbol every native library exports to register its modules
pub const LIBRARY_INIT_SYMBOL: &[u8] = b"tether_library_init\0";

/// Optional symbol called once during bridge shutdown
pub const LIBRARY_SHUTDOWN_SYMBOL: &[u8] = b"tether_library_shutdown\0";

/// Optional export reporting the ABI version a library was built against
pub const LIBRARY_ABI_VERSION_SYMBOL: &[u8] = b"tether_abi_version\0";

/// Library initialization
///
/// Registers the library's modules through `ctx.api.registry`.
///
/// # Returns
/// - 0 on success, negative error code on failure
pub type LibraryInitFFI = extern "C" fn(ctx: *const ContextFFI) -> i32;

/// Library shutdown, called in reverse initialization order
pub type LibraryShutdownFFI = extern "C" fn(ctx: *const ContextFFI);

pub type LibraryAbiVersionFFI = extern "C" fn() -> u32;

/// A native method
///
/// Pops its arguments from the channel, pushes its results.
///
/// # Returns
/// - 0 on success
/// - `TETHER_EXCEPTION` after calling `relay.raise` (or after a nested call
///   returned `TETHER_EXCEPTION`)
/// - negative on unrecoverable failure
pub type NativeMethodFFI = extern "C" fn(ctx: *const ContextFFI) -> i32;

/// A server function registered at runtime, with its user data
pub type FunctionFFI = extern "C" fn(ctx: *const ContextFFI, user_data: *mut c_void) -> i32;

/// Destructor for an object or for function user data
///
/// # Safety
/// - Called exactly once, when the owning resource is released
pub type DestroyFFI = extern "C" fn(object: *mut c_void);
