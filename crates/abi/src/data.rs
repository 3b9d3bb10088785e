// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

/// A borrowed UTF-8 string (not null-terminated).
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct StrFFI {
	pub ptr: *const u8,
	pub len: usize,
}

impl StrFFI {
	pub const fn new(s: &str) -> Self {
		Self {
			ptr: s.as_ptr(),
			len: s.len(),
		}
	}
}

/// Layout of a shared buffer
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct BufferDescriptorFFI {
	/// First byte of the buffer
	pub start: *mut u8,
	/// Size of one element in bytes
	pub element_size: u32,
	/// Number of elements
	pub count: usize,
	/// `element_size * count`
	pub total_size: usize,
}

impl BufferDescriptorFFI {
	pub const fn empty() -> Self {
		Self {
			start: core::ptr::null_mut(),
			element_size: 0,
			count: 0,
			total_size: 0,
		}
	}
}

/// A buffer together with the resource that owns it
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct BufferRefFFI {
	pub owner_id: u32,
	/// `SIDE_CLIENT` or `SIDE_SERVER`
	pub owner_side: u8,
	pub descriptor: BufferDescriptorFFI,
}

impl BufferRefFFI {
	pub const fn empty() -> Self {
		Self {
			owner_id: 0,
			owner_side: 0,
			descriptor: BufferDescriptorFFI::empty(),
		}
	}
}
