// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Value channel callbacks

use core::ffi::c_void;

use tether_abi::{
	callbacks::channel::ChannelCallbacks,
	constants::*,
	context::ContextFFI,
	data::{BufferDescriptorFFI, BufferRefFFI},
};
use tether_type::{
	Array, BufferDescriptor, BufferRef, Error, ForeignRef, FuncRef, NativePtr, RefId, Result, ScalarKind, Value,
	ValueKind,
};

use super::{out_ptr, read_slice, read_str, side_byte, side_of};
use crate::{Bridge, ffi::guarded};

pub(super) fn callbacks() -> ChannelCallbacks {
	ChannelCallbacks {
		push_null: host_push_null,
		push_boolean: host_push_boolean,
		push_int1: host_push_int1,
		push_int2: host_push_int2,
		push_int4: host_push_int4,
		push_int8: host_push_int8,
		push_uint1: host_push_uint1,
		push_uint2: host_push_uint2,
		push_uint4: host_push_uint4,
		push_uint8: host_push_uint8,
		push_float4: host_push_float4,
		push_float8: host_push_float8,
		push_size_t: host_push_size_t,
		push_ptr: host_push_ptr,
		push_utf8: host_push_utf8,
		push_array: host_push_array,
		push_instance: host_push_instance,
		push_function: host_push_function,
		push_buffer: host_push_buffer,
		pop_null: host_pop_null,
		pop_boolean: host_pop_boolean,
		pop_int1: host_pop_int1,
		pop_int2: host_pop_int2,
		pop_int4: host_pop_int4,
		pop_int8: host_pop_int8,
		pop_uint1: host_pop_uint1,
		pop_uint2: host_pop_uint2,
		pop_uint4: host_pop_uint4,
		pop_uint8: host_pop_uint8,
		pop_float4: host_pop_float4,
		pop_float8: host_pop_float8,
		pop_size_t: host_pop_size_t,
		pop_ptr: host_pop_ptr,
		pop_utf8: host_pop_utf8,
		pop_array: host_pop_array,
		pop_instance: host_pop_instance,
		pop_function: host_pop_function,
		pop_buffer: host_pop_buffer,
		depth: host_depth,
	}
}

macro_rules! scalar_callbacks {
	($($push:ident, $pop:ident => $ty:ty),+ $(,)?) => {
		$(
			extern "C" fn $push(ctx: *const ContextFFI, value: $ty) -> i32 {
				guarded(ctx, |bridge| {
					bridge.try_push(value)?;
					Ok(TETHER_OK)
				})
			}

			extern "C" fn $pop(ctx: *const ContextFFI, out: *mut $ty) -> i32 {
				guarded(ctx, |bridge| {
					let out = out_ptr(out, "out")?;
					let value: $ty = bridge.try_pop()?;
					// SAFETY: checked for null, the library passes a writable slot
					unsafe { out.write(value) };
					Ok(TETHER_OK)
				})
			}
		)+
	};
}

scalar_callbacks! {
	host_push_int1, host_pop_int1 => i8,
	host_push_int2, host_pop_int2 => i16,
	host_push_int4, host_pop_int4 => i32,
	host_push_int8, host_pop_int8 => i64,
	host_push_uint1, host_pop_uint1 => u8,
	host_push_uint2, host_pop_uint2 => u16,
	host_push_uint4, host_pop_uint4 => u32,
	host_push_uint8, host_pop_uint8 => u64,
	host_push_float4, host_pop_float4 => f32,
	host_push_float8, host_pop_float8 => f64,
	host_push_size_t, host_pop_size_t => usize,
}

extern "C" fn host_push_null(ctx: *const ContextFFI) -> i32 {
	guarded(ctx, |bridge| {
		bridge.try_push(Value::Null)?;
		Ok(TETHER_OK)
	})
}

extern "C" fn host_push_boolean(ctx: *const ContextFFI, value: u8) -> i32 {
	guarded(ctx, |bridge| {
		bridge.try_push(value != 0)?;
		Ok(TETHER_OK)
	})
}

extern "C" fn host_push_ptr(ctx: *const ContextFFI, value: *mut c_void) -> i32 {
	guarded(ctx, |bridge| {
		bridge.try_push(NativePtr::from_ptr(value))?;
		Ok(TETHER_OK)
	})
}

extern "C" fn host_push_utf8(ctx: *const ContextFFI, ptr: *const u8, len: usize) -> i32 {
	guarded(ctx, |bridge| {
		// SAFETY: the library passes `len` readable bytes
		let value = unsafe { read_str(ptr, len) }?;
		bridge.try_push(value)?;
		Ok(TETHER_OK)
	})
}

extern "C" fn host_push_array(ctx: *const ContextFFI, kind: u8, data: *const c_void, count: usize) -> i32 {
	guarded(ctx, |bridge| {
		// SAFETY: the library passes `count` elements of `kind`
		let array = unsafe { read_array(kind, data, count) }?;
		bridge.try_push(array)?;
		Ok(TETHER_OK)
	})
}

extern "C" fn host_push_instance(ctx: *const ContextFFI, id: u32, side: u8) -> i32 {
	guarded(ctx, |bridge| {
		bridge.try_push(Value::Instance(ForeignRef::new(RefId(id), side_of(side)?)))?;
		Ok(TETHER_OK)
	})
}

extern "C" fn host_push_function(ctx: *const ContextFFI, id: u32, side: u8) -> i32 {
	guarded(ctx, |bridge| {
		bridge.try_push(Value::Function(ForeignRef::new(RefId(id), side_of(side)?)))?;
		Ok(TETHER_OK)
	})
}

extern "C" fn host_push_buffer(ctx: *const ContextFFI, buffer: *const BufferRefFFI) -> i32 {
	guarded(ctx, |bridge| {
		if buffer.is_null() {
			return Err(Error::NullPointer("buffer"));
		}
		// SAFETY: checked for null
		let buffer = unsafe { *buffer };
		let descriptor = BufferDescriptor {
			start: NativePtr::from_ptr(buffer.descriptor.start),
			element_size: buffer.descriptor.element_size,
			count: buffer.descriptor.count,
			total_size: buffer.descriptor.total_size,
		};
		bridge.try_push(BufferRef {
			owner: ForeignRef::new(RefId(buffer.owner_id), side_of(buffer.owner_side)?),
			descriptor,
		})?;
		Ok(TETHER_OK)
	})
}

extern "C" fn host_pop_null(ctx: *const ContextFFI) -> i32 {
	guarded(ctx, |bridge| {
		if bridge.pop_if_null() {
			Ok(TETHER_OK)
		} else {
			Ok(TETHER_NOT_NULL)
		}
	})
}

extern "C" fn host_pop_boolean(ctx: *const ContextFFI, out: *mut u8) -> i32 {
	guarded(ctx, |bridge| {
		let out = out_ptr(out, "out")?;
		let value: bool = bridge.try_pop()?;
		// SAFETY: checked for null
		unsafe { out.write(value as u8) };
		Ok(TETHER_OK)
	})
}

extern "C" fn host_pop_ptr(ctx: *const ContextFFI, out: *mut *mut c_void) -> i32 {
	guarded(ctx, |bridge| {
		let out = out_ptr(out, "out")?;
		let value: NativePtr = bridge.try_pop()?;
		// SAFETY: checked for null
		unsafe { out.write(value.as_ptr()) };
		Ok(TETHER_OK)
	})
}

extern "C" fn host_pop_utf8(ctx: *const ContextFFI, ptr_out: *mut *const u8, len_out: *mut usize) -> i32 {
	guarded(ctx, |bridge| {
		let ptr_out = out_ptr(ptr_out, "ptr_out")?;
		let len_out = out_ptr(len_out, "len_out")?;
		let value: String = bridge.try_pop()?;
		let (ptr, len) = bridge.core().scratch.borrow_mut().keep_string(value);
		// SAFETY: checked for null
		unsafe {
			ptr_out.write(ptr);
			len_out.write(len);
		}
		Ok(TETHER_OK)
	})
}

extern "C" fn host_pop_array(
	ctx: *const ContextFFI,
	kind: u8,
	data_out: *mut *const c_void,
	count_out: *mut usize,
) -> i32 {
	guarded(ctx, |bridge| {
		let data_out = out_ptr(data_out, "data_out")?;
		let count_out = out_ptr(count_out, "count_out")?;
		let expected = ValueKind::Array(scalar_kind(kind)?);
		let array = pop_exact(bridge, expected)?;
		let Value::Array(array) = array else {
			return Err(Error::ShapeMismatch {
				expected,
				found: array.kind(),
			});
		};
		let (data, count) = bridge.core().scratch.borrow_mut().keep_array(array);
		// SAFETY: checked for null
		unsafe {
			data_out.write(data);
			count_out.write(count);
		}
		Ok(TETHER_OK)
	})
}

extern "C" fn host_pop_instance(ctx: *const ContextFFI, id_out: *mut u32, side_out: *mut u8) -> i32 {
	guarded(ctx, |bridge| {
		let id_out = out_ptr(id_out, "id_out")?;
		let side_out = out_ptr(side_out, "side_out")?;
		let reference: ForeignRef = bridge.try_pop()?;
		// SAFETY: checked for null
		unsafe {
			id_out.write(reference.id.0);
			side_out.write(side_byte(reference.side));
		}
		Ok(TETHER_OK)
	})
}

extern "C" fn host_pop_function(ctx: *const ContextFFI, id_out: *mut u32, side_out: *mut u8) -> i32 {
	guarded(ctx, |bridge| {
		let id_out = out_ptr(id_out, "id_out")?;
		let side_out = out_ptr(side_out, "side_out")?;
		let FuncRef(reference) = bridge.try_pop()?;
		// SAFETY: checked for null
		unsafe {
			id_out.write(reference.id.0);
			side_out.write(side_byte(reference.side));
		}
		Ok(TETHER_OK)
	})
}

extern "C" fn host_pop_buffer(ctx: *const ContextFFI, out: *mut BufferRefFFI) -> i32 {
	guarded(ctx, |bridge| {
		let out = out_ptr(out, "out")?;
		let buffer: BufferRef = bridge.try_pop()?;
		// SAFETY: checked for null
		unsafe { out.write(buffer_ffi(buffer)) };
		Ok(TETHER_OK)
	})
}

extern "C" fn host_depth(ctx: *const ContextFFI) -> usize {
	let mut depth = 0;
	guarded(ctx, |bridge| {
		depth = bridge.channel_depth();
		Ok(TETHER_OK)
	});
	depth
}

pub(super) fn buffer_ffi(buffer: BufferRef) -> BufferRefFFI {
	BufferRefFFI {
		owner_id: buffer.owner.id.0,
		owner_side: side_byte(buffer.owner.side),
		descriptor: BufferDescriptorFFI {
			start: buffer.descriptor.start.as_ptr(),
			element_size: buffer.descriptor.element_size,
			count: buffer.descriptor.count,
			total_size: buffer.descriptor.total_size,
		},
	}
}

/// Pop the top value if it has the `expected` shape, leave it otherwise.
pub(super) fn pop_exact(bridge: &Bridge, expected: ValueKind) -> Result<Value> {
	match bridge.peek_kind() {
		None => Err(Error::ChannelUnderflow {
			expected,
		}),
		Some(found) if found != expected => Err(Error::ShapeMismatch {
			expected,
			found,
		}),
		Some(_) => Ok(bridge.pop_value()),
	}
}

/// Arrays of strings have no C layout.
fn scalar_kind(kind: u8) -> Result<ScalarKind> {
	Ok(match kind {
		KIND_BOOLEAN => ScalarKind::Boolean,
		KIND_INT1 => ScalarKind::Int1,
		KIND_INT2 => ScalarKind::Int2,
		KIND_INT4 => ScalarKind::Int4,
		KIND_INT8 => ScalarKind::Int8,
		KIND_UINT1 => ScalarKind::Uint1,
		KIND_UINT2 => ScalarKind::Uint2,
		KIND_UINT4 => ScalarKind::Uint4,
		KIND_UINT8 => ScalarKind::Uint8,
		KIND_FLOAT4 => ScalarKind::Float4,
		KIND_FLOAT8 => ScalarKind::Float8,
		KIND_SIZE_T => ScalarKind::SizeT,
		KIND_PTR => ScalarKind::Ptr,
		other => {
			return Err(Error::InvalidToken {
				what: format!("array kind {}", other),
			});
		}
	})
}

/// # Safety
/// `data` must point to `count` elements of `kind`, or be null with `count` 0.
unsafe fn read_array(kind: u8, data: *const c_void, count: usize) -> Result<Array> {
	unsafe {
		Ok(match scalar_kind(kind)? {
			ScalarKind::Boolean => Array::Boolean(read_slice::<u8>(data, count)?.iter().map(|b| *b != 0).collect()),
			ScalarKind::Int1 => Array::Int1(read_slice::<i8>(data, count)?.to_vec()),
			ScalarKind::Int2 => Array::Int2(read_slice::<i16>(data, count)?.to_vec()),
			ScalarKind::Int4 => Array::Int4(read_slice::<i32>(data, count)?.to_vec()),
			ScalarKind::Int8 => Array::Int8(read_slice::<i64>(data, count)?.to_vec()),
			ScalarKind::Uint1 => Array::Uint1(read_slice::<u8>(data, count)?.to_vec()),
			ScalarKind::Uint2 => Array::Uint2(read_slice::<u16>(data, count)?.to_vec()),
			ScalarKind::Uint4 => Array::Uint4(read_slice::<u32>(data, count)?.to_vec()),
			ScalarKind::Uint8 => Array::Uint8(read_slice::<u64>(data, count)?.to_vec()),
			ScalarKind::Float4 => Array::Float4(read_slice::<f32>(data, count)?.to_vec()),
			ScalarKind::Float8 => Array::Float8(read_slice::<f64>(data, count)?.to_vec()),
			ScalarKind::SizeT => Array::SizeT(read_slice::<usize>(data, count)?.to_vec()),
			ScalarKind::Ptr => Array::Ptr(
				read_slice::<*mut c_void>(data, count)?.iter().map(|ptr| NativePtr::from_ptr(*ptr)).collect(),
			),
			ScalarKind::Utf8 => {
				return Err(Error::InvalidToken {
					what: "utf8 array kind".to_string(),
				});
			}
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_scalar_kind_rejects_unknown() {
		assert_eq!(scalar_kind(KIND_INT4), Ok(ScalarKind::Int4));
		assert!(scalar_kind(200).is_err());
	}

	#[test]
	fn test_read_empty_array_from_null() {
		let array = unsafe { read_array(KIND_FLOAT8, std::ptr::null(), 0) }.unwrap();
		assert_eq!(array, Array::Float8(Vec::new()));
	}

	#[test]
	fn test_read_bool_array() {
		let bytes = [1_u8, 0, 2];
		let array = unsafe { read_array(KIND_BOOLEAN, bytes.as_ptr().cast(), bytes.len()) }.unwrap();
		assert_eq!(array, Array::Boolean(vec![true, false, true]));
	}

	const TAG_UTF8: u8 = 13;
	const TAG_NULL: u8 = 14;
	const TAG_ARRAY: u8 = 20;
	const TAG_BUFFER: u8 = 40;
	const TAG_FUNCTION: u8 = 41;
	const TAG_INSTANCE: u8 = 42;

	macro_rules! echo_scalar {
		($api:expr, $ctx:expr, $ty:ty, $pop:ident, $push:ident) => {{
			let mut value = <$ty>::default();
			let status = ($api.channel.$pop)($ctx, &mut value);
			if status != TETHER_OK {
				return status;
			}
			($api.channel.$push)($ctx, value)
		}};
	}

	/// Pops a uint1 tag, then a value of the tagged kind, and pushes it back.
	extern "C" fn ffi_echo(ctx: *const ContextFFI) -> i32 {
		let api = unsafe { &(*ctx).api };
		let mut tag = 0_u8;
		let status = (api.channel.pop_uint1)(ctx, &mut tag);
		if status != TETHER_OK {
			return status;
		}

		match tag {
			KIND_BOOLEAN => echo_scalar!(api, ctx, u8, pop_boolean, push_boolean),
			KIND_INT1 => echo_scalar!(api, ctx, i8, pop_int1, push_int1),
			KIND_INT2 => echo_scalar!(api, ctx, i16, pop_int2, push_int2),
			KIND_INT4 => echo_scalar!(api, ctx, i32, pop_int4, push_int4),
			KIND_INT8 => echo_scalar!(api, ctx, i64, pop_int8, push_int8),
			KIND_UINT1 => echo_scalar!(api, ctx, u8, pop_uint1, push_uint1),
			KIND_UINT2 => echo_scalar!(api, ctx, u16, pop_uint2, push_uint2),
			KIND_UINT4 => echo_scalar!(api, ctx, u32, pop_uint4, push_uint4),
			KIND_UINT8 => echo_scalar!(api, ctx, u64, pop_uint8, push_uint8),
			KIND_FLOAT4 => echo_scalar!(api, ctx, f32, pop_float4, push_float4),
			KIND_FLOAT8 => echo_scalar!(api, ctx, f64, pop_float8, push_float8),
			KIND_SIZE_T => echo_scalar!(api, ctx, usize, pop_size_t, push_size_t),
			KIND_PTR => {
				let mut value = std::ptr::null_mut();
				let status = (api.channel.pop_ptr)(ctx, &mut value);
				if status != TETHER_OK {
					return status;
				}
				(api.channel.push_ptr)(ctx, value)
			}
			TAG_UTF8 => {
				let (mut ptr, mut len) = (std::ptr::null(), 0);
				let status = (api.channel.pop_utf8)(ctx, &mut ptr, &mut len);
				if status != TETHER_OK {
					return status;
				}
				(api.channel.push_utf8)(ctx, ptr, len)
			}
			TAG_NULL => {
				let status = (api.channel.pop_null)(ctx);
				if status != TETHER_OK {
					return status;
				}
				(api.channel.push_null)(ctx)
			}
			TAG_BUFFER => {
				let mut buffer = BufferRefFFI::empty();
				let status = (api.channel.pop_buffer)(ctx, &mut buffer);
				if status != TETHER_OK {
					return status;
				}
				(api.channel.push_buffer)(ctx, &buffer)
			}
			TAG_FUNCTION => {
				let (mut id, mut side) = (0, 0);
				let status = (api.channel.pop_function)(ctx, &mut id, &mut side);
				if status != TETHER_OK {
					return status;
				}
				(api.channel.push_function)(ctx, id, side)
			}
			TAG_INSTANCE => {
				let (mut id, mut side) = (0, 0);
				let status = (api.channel.pop_instance)(ctx, &mut id, &mut side);
				if status != TETHER_OK {
					return status;
				}
				(api.channel.push_instance)(ctx, id, side)
			}
			tag => {
				let kind = tag.wrapping_sub(TAG_ARRAY);
				let (mut data, mut count) = (std::ptr::null(), 0);
				let status = (api.channel.pop_array)(ctx, kind, &mut data, &mut count);
				if status != TETHER_OK {
					return status;
				}
				(api.channel.push_array)(ctx, kind, data, count)
			}
		}
	}

	/// Pops a string, then a client function. Runs the function and pushes
	/// the string back afterwards.
	extern "C" fn ffi_hold(ctx: *const ContextFFI) -> i32 {
		let api = unsafe { &(*ctx).api };
		let (mut ptr, mut len) = (std::ptr::null(), 0);
		let status = (api.channel.pop_utf8)(ctx, &mut ptr, &mut len);
		if status != TETHER_OK {
			return status;
		}
		let (mut id, mut side) = (0, 0);
		let status = (api.channel.pop_function)(ctx, &mut id, &mut side);
		if status != TETHER_OK {
			return status;
		}
		let status = (api.relay.exec_function)(ctx, id, side);
		if status != TETHER_OK {
			return status;
		}
		(api.channel.push_utf8)(ctx, ptr, len)
	}

	extern "C" fn echo_init(ctx: *const ContextFFI) -> i32 {
		let api = unsafe { &(*ctx).api };
		let mut module = 0;
		let name = "Echo";
		let status = (api.registry.register_module)(ctx, name.as_ptr(), name.len(), &mut module);
		if status != TETHER_OK {
			return status;
		}
		let method = "echo";
		let status = (api.registry.register_method)(ctx, module, method.as_ptr(), method.len(), ffi_echo);
		if status != TETHER_OK {
			return status;
		}
		let method = "hold";
		(api.registry.register_method)(ctx, module, method.as_ptr(), method.len(), ffi_hold)
	}

	struct CEcho {
		bridge: Bridge,
		echo: tether_type::MethodToken,
		hold: tether_type::MethodToken,
	}

	impl CEcho {
		fn new() -> Self {
			let bridge = crate::testing::session_with(crate::NativeLibrary::new().with_ffi_init("echo", echo_init, None));
			let module = bridge.resolve_module("Echo");
			Self {
				echo: bridge.resolve_method(module, "echo"),
				hold: bridge.resolve_method(module, "hold"),
				bridge,
			}
		}

		fn round_trip(&self, value: Value, tag: u8) -> Value {
			self.bridge.push(value);
			self.bridge.push(tag);
			self.bridge.invoke(self.echo);
			self.bridge.pop_value()
		}
	}

	fn array(kind: u8) -> u8 {
		TAG_ARRAY + kind
	}

	#[test]
	fn test_every_kind_crosses_the_c_abi() {
		let echo = CEcho::new();
		let bridge = &echo.bridge;
		let buffer = bridge.create_buffer(tether_type::Side::Server, 4, 2);
		let function = bridge.register_client_func(|_| Ok(()));
		let instance = bridge.allocate_server_object("Thing", ());

		let cases = vec![
			(Value::Null, TAG_NULL),
			(Value::Boolean(true), KIND_BOOLEAN),
			(Value::Boolean(false), KIND_BOOLEAN),
			(Value::Int1(i8::MIN), KIND_INT1),
			(Value::Int2(i16::MAX), KIND_INT2),
			(Value::Int4(-7), KIND_INT4),
			(Value::Int8(i64::MIN), KIND_INT8),
			(Value::Uint1(u8::MAX), KIND_UINT1),
			(Value::Uint2(u16::MAX), KIND_UINT2),
			(Value::Uint4(u32::MAX), KIND_UINT4),
			(Value::Uint8(u64::MAX), KIND_UINT8),
			(Value::Float4(1.5), KIND_FLOAT4),
			(Value::Float8(-0.25), KIND_FLOAT8),
			(Value::SizeT(usize::MAX), KIND_SIZE_T),
			(Value::Ptr(NativePtr(0xdead0)), KIND_PTR),
			(Value::Ptr(NativePtr::NULL), KIND_PTR),
			(Value::Utf8("a\0b".to_string()), TAG_UTF8),
			(Value::Utf8(String::new()), TAG_UTF8),
			(Value::Array(Array::Boolean(vec![true, false, true])), array(KIND_BOOLEAN)),
			(Value::Array(Array::Int1(vec![i8::MIN, 0, i8::MAX])), array(KIND_INT1)),
			(Value::Array(Array::Int2(vec![i16::MIN, i16::MAX])), array(KIND_INT2)),
			(Value::Array(Array::Int4(vec![3, 2, 1])), array(KIND_INT4)),
			(Value::Array(Array::Int4(Vec::new())), array(KIND_INT4)),
			(Value::Array(Array::Int8(vec![i64::MIN, i64::MAX])), array(KIND_INT8)),
			(Value::Array(Array::Uint1(vec![0, u8::MAX])), array(KIND_UINT1)),
			(Value::Array(Array::Uint2(vec![u16::MAX])), array(KIND_UINT2)),
			(Value::Array(Array::Uint4(vec![u32::MAX, 1])), array(KIND_UINT4)),
			(Value::Array(Array::Uint8(vec![u64::MAX])), array(KIND_UINT8)),
			(Value::Array(Array::Float4(vec![0.5, -2.0])), array(KIND_FLOAT4)),
			(Value::Array(Array::Float8(vec![1e300, -0.0])), array(KIND_FLOAT8)),
			(Value::Array(Array::SizeT(vec![usize::MAX, 0])), array(KIND_SIZE_T)),
			(Value::Array(Array::Ptr(vec![NativePtr(8), NativePtr::NULL])), array(KIND_PTR)),
			(Value::Buffer(buffer), TAG_BUFFER),
			(Value::Function(function.0), TAG_FUNCTION),
			(Value::Instance(instance), TAG_INSTANCE),
		];
		for (value, tag) in cases {
			assert_eq!(echo.round_trip(value.clone(), tag), value, "tag {}", tag);
		}
		assert_eq!(bridge.channel_depth(), 0);
		assert_eq!(bridge.core().scratch.borrow().len(), 0);
	}

	#[test]
	#[should_panic(expected = "array kind 13")]
	fn test_string_array_does_not_cross_the_c_abi() {
		let echo = CEcho::new();
		echo.round_trip(Value::Array(Array::Utf8(vec!["a".to_string()])), array(TAG_UTF8));
	}

	#[test]
	fn test_nested_calls_keep_outer_scratch() {
		let echo = CEcho::new();
		let bridge = &echo.bridge;
		let inner = echo.echo;
		let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
		let recorded = seen.clone();
		let function = bridge.register_client_func(move |bridge| {
			for i in 0..4 {
				bridge.push(format!("inner {i}"));
				bridge.push(TAG_UTF8);
				bridge.invoke(inner);
				assert_eq!(bridge.pop::<String>(), format!("inner {i}"));
				recorded.lock().unwrap().push(bridge.core().scratch.borrow().len());
			}
			Ok(())
		});

		bridge.push(function);
		bridge.push("outer");
		bridge.invoke(echo.hold);
		assert_eq!(bridge.pop::<String>(), "outer");
		assert_eq!(*seen.lock().unwrap(), vec![1, 1, 1, 1]);
		assert_eq!(bridge.core().scratch.borrow().len(), 0);
	}
}
