// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

/// Version of this ABI. A library built against another version is rejected
/// during initialization.
pub const TETHER_ABI_VERSION: u32 = 1;

// Status codes returned by native methods and host callbacks.
//
// - `< 0`: Unrecoverable error - the host treats it as a protocol violation
// - `0`: Success
// - `> 0`: Recoverable outcome
pub const TETHER_OK: i32 = 0;
/// An exception is pending; the caller either propagates it or captures it.
pub const TETHER_EXCEPTION: i32 = 1;
/// Returned by `release` when the resource was not live.
pub const TETHER_ALREADY_RELEASED: i32 = 2;
/// Returned by `pop_null` when the top of the channel is not null.
pub const TETHER_NOT_NULL: i32 = 3;

pub const TETHER_ERROR_NULL_PTR: i32 = -1;
pub const TETHER_ERROR_PROTOCOL: i32 = -2;
pub const TETHER_ERROR_UNKNOWN_NAME: i32 = -3;
pub const TETHER_ERROR_INVALID_UTF8: i32 = -4;
pub const TETHER_ERROR_STATE: i32 = -5;
pub const TETHER_ERROR_PANIC: i32 = -99;

pub const SIDE_CLIENT: u8 = 0;
pub const SIDE_SERVER: u8 = 1;

// Element kinds of arrays crossing the ABI.
pub const KIND_BOOLEAN: u8 = 0;
pub const KIND_INT1: u8 = 1;
pub const KIND_INT2: u8 = 2;
pub const KIND_INT4: u8 = 3;
pub const KIND_INT8: u8 = 4;
pub const KIND_UINT1: u8 = 5;
pub const KIND_UINT2: u8 = 6;
pub const KIND_UINT4: u8 = 7;
pub const KIND_UINT8: u8 = 8;
pub const KIND_FLOAT4: u8 = 9;
pub const KIND_FLOAT8: u8 = 10;
pub const KIND_SIZE_T: u8 = 11;
pub const KIND_PTR: u8 = 12;

// Log levels accepted by the `message` log callback.
pub const LOG_TRACE: u32 = 0;
pub const LOG_DEBUG: u32 = 1;
pub const LOG_INFO: u32 = 2;
pub const LOG_WARN: u32 = 3;
pub const LOG_ERROR: u32 = 4;
