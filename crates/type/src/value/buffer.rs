// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use crate::ForeignRef;

/// An opaque native address. Carried, compared and printed; never dereferenced
/// by the side that did not produce it.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NativePtr(pub usize);

impl NativePtr {
	pub const NULL: NativePtr = NativePtr(0);

	pub fn is_null(self) -> bool {
		self.0 == 0
	}

	pub fn from_ptr<T>(ptr: *const T) -> Self {
		NativePtr(ptr as usize)
	}

	pub fn as_ptr<T>(self) -> *mut T {
		self.0 as *mut T
	}
}

impl Display for NativePtr {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:#x}", self.0)
	}
}

/// Layout of a buffer shared across the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferDescriptor {
	pub start: NativePtr,
	pub element_size: u32,
	pub count: usize,
	pub total_size: usize,
}

impl BufferDescriptor {
	/// `None` when the total size does not fit in an allocation.
	pub fn new(start: NativePtr, element_size: u32, count: usize) -> Option<Self> {
		let total_size = Self::total_size(element_size, count)?;
		Some(Self {
			start,
			element_size,
			count,
			total_size,
		})
	}

	pub fn total_size(element_size: u32, count: usize) -> Option<usize> {
		(element_size as usize).checked_mul(count).filter(|size| *size <= isize::MAX as usize)
	}
}

/// A buffer resource together with the side whose table owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferRef {
	pub owner: ForeignRef,
	pub descriptor: BufferDescriptor,
}
