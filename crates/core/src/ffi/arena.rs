// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Scratch storage for values popped through the C ABI.
//!
//! Strings and arrays handed to a native library stay valid until the
//! native call that popped them returns. Each call frame cuts the arena back
//! to the mark it entered with.

use core::ffi::c_void;

use tether_type::Array;

/// Arena lengths at the start of a native call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct ScratchMark {
	strings: usize,
	arrays: usize,
}

#[derive(Default)]
pub(crate) struct Scratch {
	strings: Vec<String>,
	arrays: Vec<Array>,
}

impl Scratch {
	pub(crate) fn keep_string(&mut self, value: String) -> (*const u8, usize) {
		let result = (value.as_ptr(), value.len());
		self.strings.push(value);
		result
	}

	pub(crate) fn keep_array(&mut self, array: Array) -> (*const c_void, usize) {
		let result = (array_ptr(&array), array.len());
		self.arrays.push(array);
		result
	}

	pub(crate) fn mark(&self) -> ScratchMark {
		ScratchMark {
			strings: self.strings.len(),
			arrays: self.arrays.len(),
		}
	}

	/// Drop everything kept after `mark`.
	pub(crate) fn truncate(&mut self, mark: ScratchMark) {
		self.strings.truncate(mark.strings);
		self.arrays.truncate(mark.arrays);
	}

	pub(crate) fn clear(&mut self) {
		self.strings.clear();
		self.arrays.clear();
	}

	#[cfg(test)]
	pub(crate) fn len(&self) -> usize {
		self.strings.len() + self.arrays.len()
	}
}

fn array_ptr(array: &Array) -> *const c_void {
	match array {
		Array::Boolean(v) => v.as_ptr().cast(),
		Array::Int1(v) => v.as_ptr().cast(),
		Array::Int2(v) => v.as_ptr().cast(),
		Array::Int4(v) => v.as_ptr().cast(),
		Array::Int8(v) => v.as_ptr().cast(),
		Array::Uint1(v) => v.as_ptr().cast(),
		Array::Uint2(v) => v.as_ptr().cast(),
		Array::Uint4(v) => v.as_ptr().cast(),
		Array::Uint8(v) => v.as_ptr().cast(),
		Array::Float4(v) => v.as_ptr().cast(),
		Array::Float8(v) => v.as_ptr().cast(),
		Array::SizeT(v) => v.as_ptr().cast(),
		Array::Ptr(v) => v.as_ptr().cast(),
		Array::Utf8(v) => v.as_ptr().cast(),
	}
}
