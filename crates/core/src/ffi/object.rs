// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use core::ffi::c_void;

use tether_abi::library::{DestroyFFI, FunctionFFI};

/// A server object owned by a native library.
pub(crate) struct ForeignObject {
	pub(crate) ptr: *mut c_void,
	destroy: Option<DestroyFFI>,
}

impl ForeignObject {
	pub(crate) fn new(ptr: *mut c_void, destroy: Option<DestroyFFI>) -> Self {
		Self {
			ptr,
			destroy,
		}
	}
}

// SAFETY: the pointer is only handed back to the library that produced it,
// and only while the bridge's critical section is held.
unsafe impl Send for ForeignObject {}
unsafe impl Sync for ForeignObject {}

impl Drop for ForeignObject {
	fn drop(&mut self) {
		if let Some(destroy) = self.destroy
			&& !self.ptr.is_null()
		{
			destroy(self.ptr);
		}
	}
}

/// A server function registered by a native library.
pub(crate) struct ForeignFunction {
	pub(crate) function: FunctionFFI,
	pub(crate) user_data: *mut c_void,
	destroy: Option<DestroyFFI>,
}

impl ForeignFunction {
	pub(crate) fn new(function: FunctionFFI, user_data: *mut c_void, destroy: Option<DestroyFFI>) -> Self {
		Self {
			function,
			user_data,
			destroy,
		}
	}
}

// SAFETY: see `ForeignObject`; `user_data` is opaque to the host.
unsafe impl Send for ForeignFunction {}
unsafe impl Sync for ForeignFunction {}

impl Drop for ForeignFunction {
	fn drop(&mut self) {
		if let Some(destroy) = self.destroy {
			destroy(self.user_data);
		}
	}
}
