// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

mod array;
mod buffer;
mod from;

pub use array::{Array, ArrayElement};
pub use buffer::{BufferDescriptor, BufferRef, NativePtr};
pub use from::{FromValue, FuncRef};

use crate::ForeignRef;

/// A single entry on the value channel.
///
/// Values have no identity beyond their position on the channel. Both sides
/// agree on shape and order by construction; the channel only checks that
/// the shape popped is the shape that was pushed.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
	/// Explicit absence, distinct from an empty string or empty array.
	Null,
	Boolean(bool),
	Int1(i8),
	Int2(i16),
	Int4(i32),
	Int8(i64),
	Uint1(u8),
	Uint2(u16),
	Uint4(u32),
	Uint8(u64),
	Float4(f32),
	Float8(f64),
	/// A native `size_t`.
	SizeT(usize),
	/// An opaque native pointer, never dereferenced by the receiving side.
	Ptr(NativePtr),
	/// Length-delimited UTF-8, embedded NULs allowed.
	Utf8(String),
	/// A homogeneous array of one scalar kind.
	Array(Array),
	Buffer(BufferRef),
	/// An invocable function registered on `side`.
	Function(ForeignRef),
	/// An object living on `side`.
	Instance(ForeignRef),
}

impl Value {
	pub fn kind(&self) -> ValueKind {
		match self {
			Value::Null => ValueKind::Null,
			Value::Boolean(_) => ValueKind::Scalar(ScalarKind::Boolean),
			Value::Int1(_) => ValueKind::Scalar(ScalarKind::Int1),
			Value::Int2(_) => ValueKind::Scalar(ScalarKind::Int2),
			Value::Int4(_) => ValueKind::Scalar(ScalarKind::Int4),
			Value::Int8(_) => ValueKind::Scalar(ScalarKind::Int8),
			Value::Uint1(_) => ValueKind::Scalar(ScalarKind::Uint1),
			Value::Uint2(_) => ValueKind::Scalar(ScalarKind::Uint2),
			Value::Uint4(_) => ValueKind::Scalar(ScalarKind::Uint4),
			Value::Uint8(_) => ValueKind::Scalar(ScalarKind::Uint8),
			Value::Float4(_) => ValueKind::Scalar(ScalarKind::Float4),
			Value::Float8(_) => ValueKind::Scalar(ScalarKind::Float8),
			Value::SizeT(_) => ValueKind::Scalar(ScalarKind::SizeT),
			Value::Ptr(_) => ValueKind::Scalar(ScalarKind::Ptr),
			Value::Utf8(_) => ValueKind::Scalar(ScalarKind::Utf8),
			Value::Array(array) => ValueKind::Array(array.element_kind()),
			Value::Buffer(_) => ValueKind::Buffer,
			Value::Function(_) => ValueKind::Function,
			Value::Instance(_) => ValueKind::Instance,
		}
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}
}

/// The shape of a scalar, or of the elements of an [`Array`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
	Boolean,
	Int1,
	Int2,
	Int4,
	Int8,
	Uint1,
	Uint2,
	Uint4,
	Uint8,
	Float4,
	Float8,
	SizeT,
	Ptr,
	Utf8,
}

impl Display for ScalarKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			ScalarKind::Boolean => "boolean",
			ScalarKind::Int1 => "int1",
			ScalarKind::Int2 => "int2",
			ScalarKind::Int4 => "int4",
			ScalarKind::Int8 => "int8",
			ScalarKind::Uint1 => "uint1",
			ScalarKind::Uint2 => "uint2",
			ScalarKind::Uint4 => "uint4",
			ScalarKind::Uint8 => "uint8",
			ScalarKind::Float4 => "float4",
			ScalarKind::Float8 => "float8",
			ScalarKind::SizeT => "size_t",
			ScalarKind::Ptr => "ptr",
			ScalarKind::Utf8 => "utf8",
		})
	}
}

/// The shape of a [`Value`], used to detect calling-convention mismatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
	Null,
	Scalar(ScalarKind),
	Array(ScalarKind),
	Buffer,
	Function,
	Instance,
}

impl Display for ValueKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			ValueKind::Null => f.write_str("null"),
			ValueKind::Scalar(kind) => Display::fmt(kind, f),
			ValueKind::Array(kind) => write!(f, "array<{}>", kind),
			ValueKind::Buffer => f.write_str("buffer"),
			ValueKind::Function => f.write_str("function"),
			ValueKind::Instance => f.write_str("instance"),
		}
	}
}
