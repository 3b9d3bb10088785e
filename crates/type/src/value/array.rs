// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use super::{NativePtr, ScalarKind};

/// A homogeneous array transferred as a single channel entry.
///
/// Arrays of structs never appear here: they travel as one array per field
/// (columnar), see the wrapper layer's struct marshaling.
#[derive(Clone, Debug, PartialEq)]
pub enum Array {
	Boolean(Vec<bool>),
	Int1(Vec<i8>),
	Int2(Vec<i16>),
	Int4(Vec<i32>),
	Int8(Vec<i64>),
	Uint1(Vec<u8>),
	Uint2(Vec<u16>),
	Uint4(Vec<u32>),
	Uint8(Vec<u64>),
	Float4(Vec<f32>),
	Float8(Vec<f64>),
	SizeT(Vec<usize>),
	Ptr(Vec<NativePtr>),
	Utf8(Vec<String>),
}

impl Array {
	pub fn element_kind(&self) -> ScalarKind {
		match self {
			Array::Boolean(_) => ScalarKind::Boolean,
			Array::Int1(_) => ScalarKind::Int1,
			Array::Int2(_) => ScalarKind::Int2,
			Array::Int4(_) => ScalarKind::Int4,
			Array::Int8(_) => ScalarKind::Int8,
			Array::Uint1(_) => ScalarKind::Uint1,
			Array::Uint2(_) => ScalarKind::Uint2,
			Array::Uint4(_) => ScalarKind::Uint4,
			Array::Uint8(_) => ScalarKind::Uint8,
			Array::Float4(_) => ScalarKind::Float4,
			Array::Float8(_) => ScalarKind::Float8,
			Array::SizeT(_) => ScalarKind::SizeT,
			Array::Ptr(_) => ScalarKind::Ptr,
			Array::Utf8(_) => ScalarKind::Utf8,
		}
	}

	pub fn len(&self) -> usize {
		match self {
			Array::Boolean(v) => v.len(),
			Array::Int1(v) => v.len(),
			Array::Int2(v) => v.len(),
			Array::Int4(v) => v.len(),
			Array::Int8(v) => v.len(),
			Array::Uint1(v) => v.len(),
			Array::Uint2(v) => v.len(),
			Array::Uint4(v) => v.len(),
			Array::Uint8(v) => v.len(),
			Array::Float4(v) => v.len(),
			Array::Float8(v) => v.len(),
			Array::SizeT(v) => v.len(),
			Array::Ptr(v) => v.len(),
			Array::Utf8(v) => v.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// A scalar type that can be carried inside an [`Array`].
pub trait ArrayElement: Sized {
	const KIND: ScalarKind;

	fn into_array(items: Vec<Self>) -> Array;

	/// Returns the array back when its element kind does not match.
	fn from_array(array: Array) -> Result<Vec<Self>, Array>;
}

macro_rules! impl_array_element {
	($($ty:ty => $variant:ident),+ $(,)?) => {
		$(
			impl ArrayElement for $ty {
				const KIND: ScalarKind = ScalarKind::$variant;

				fn into_array(items: Vec<Self>) -> Array {
					Array::$variant(items)
				}

				fn from_array(array: Array) -> Result<Vec<Self>, Array> {
					match array {
						Array::$variant(items) => Ok(items),
						other => Err(other),
					}
				}
			}
		)+
	};
}

impl_array_element! {
	bool => Boolean,
	i8 => Int1,
	i16 => Int2,
	i32 => Int4,
	i64 => Int8,
	u8 => Uint1,
	u16 => Uint2,
	u32 => Uint4,
	u64 => Uint8,
	f32 => Float4,
	f64 => Float8,
	usize => SizeT,
	NativePtr => Ptr,
	String => Utf8,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_from_array_rejects_other_kind() {
		let array = i32::into_array(vec![1, 2, 3]);
		let rejected = i64::from_array(array.clone());
		assert_eq!(rejected, Err(array));
	}

	#[test]
	fn test_empty_array_keeps_its_kind() {
		let array = String::into_array(Vec::new());
		assert!(array.is_empty());
		assert_eq!(array.element_kind(), ScalarKind::Utf8);
	}
}
