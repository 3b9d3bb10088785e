// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use super::{Array, ArrayElement, BufferRef, NativePtr, ScalarKind, Value, ValueKind};
use crate::ForeignRef;

/// A function reference, as opposed to an object reference.
///
/// Both are a [`ForeignRef`]; the wrapper selects which one it pushes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FuncRef(pub ForeignRef);

/// Conversion out of a popped [`Value`].
pub trait FromValue: Sized {
	/// The shape this type expects on the channel.
	fn kind() -> ValueKind;

	/// Returns the value back when its shape does not match.
	fn from_value(value: Value) -> Result<Self, Value>;
}

macro_rules! impl_scalar {
	($($ty:ty => $variant:ident),+ $(,)?) => {
		$(
			impl From<$ty> for Value {
				fn from(value: $ty) -> Self {
					Value::$variant(value)
				}
			}

			impl FromValue for $ty {
				fn kind() -> ValueKind {
					ValueKind::Scalar(ScalarKind::$variant)
				}

				fn from_value(value: Value) -> Result<Self, Value> {
					match value {
						Value::$variant(v) => Ok(v),
						other => Err(other),
					}
				}
			}
		)+
	};
}

impl_scalar! {
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

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Value::Utf8(value.to_string())
	}
}

impl<T: ArrayElement> From<Vec<T>> for Value {
	fn from(items: Vec<T>) -> Self {
		Value::Array(T::into_array(items))
	}
}

impl<T: ArrayElement> FromValue for Vec<T> {
	fn kind() -> ValueKind {
		ValueKind::Array(T::KIND)
	}

	fn from_value(value: Value) -> Result<Self, Value> {
		match value {
			Value::Array(array) => T::from_array(array).map_err(Value::Array),
			other => Err(other),
		}
	}
}

impl From<Array> for Value {
	fn from(array: Array) -> Self {
		Value::Array(array)
	}
}

impl From<ForeignRef> for Value {
	fn from(reference: ForeignRef) -> Self {
		Value::Instance(reference)
	}
}

impl FromValue for ForeignRef {
	fn kind() -> ValueKind {
		ValueKind::Instance
	}

	fn from_value(value: Value) -> Result<Self, Value> {
		match value {
			Value::Instance(reference) => Ok(reference),
			other => Err(other),
		}
	}
}

impl From<FuncRef> for Value {
	fn from(func: FuncRef) -> Self {
		Value::Function(func.0)
	}
}

impl FromValue for FuncRef {
	fn kind() -> ValueKind {
		ValueKind::Function
	}

	fn from_value(value: Value) -> Result<Self, Value> {
		match value {
			Value::Function(reference) => Ok(FuncRef(reference)),
			other => Err(other),
		}
	}
}

impl From<BufferRef> for Value {
	fn from(buffer: BufferRef) -> Self {
		Value::Buffer(buffer)
	}
}

impl FromValue for BufferRef {
	fn kind() -> ValueKind {
		ValueKind::Buffer
	}

	fn from_value(value: Value) -> Result<Self, Value> {
		match value {
			Value::Buffer(buffer) => Ok(buffer),
			other => Err(other),
		}
	}
}

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(value: Option<T>) -> Self {
		match value {
			Some(v) => v.into(),
			None => Value::Null,
		}
	}
}

/// `None` is popped from an explicit [`Value::Null`].
impl<T: FromValue> FromValue for Option<T> {
	fn kind() -> ValueKind {
		T::kind()
	}

	fn from_value(value: Value) -> Result<Self, Value> {
		match value {
			Value::Null => Ok(None),
			other => T::from_value(other).map(Some),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_scalar_round_trip() {
		assert_eq!(i64::from_value(Value::from(i64::MIN)), Ok(i64::MIN));
		assert_eq!(u64::from_value(Value::from(u64::MAX)), Ok(u64::MAX));
		assert_eq!(String::from_value(Value::from("a\0b")), Ok("a\0b".to_string()));
	}

	#[test]
	fn test_mismatch_returns_value() {
		let value = Value::from(3_i32);
		assert_eq!(i64::from_value(value.clone()), Err(value));
	}

	#[test]
	fn test_option_from_null() {
		assert_eq!(Option::<String>::from_value(Value::Null), Ok(None));
		assert_eq!(Option::<String>::from_value(Value::from("")), Ok(Some(String::new())));
	}

	#[test]
	fn test_instance_and_function_are_distinct() {
		let reference = ForeignRef::server(1);
		assert!(FuncRef::from_value(Value::from(reference)).is_err());
		assert_eq!(FuncRef::from_value(Value::from(FuncRef(reference))), Ok(FuncRef(reference)));
	}
}
