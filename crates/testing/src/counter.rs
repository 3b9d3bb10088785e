// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! `Counter`: a native library written against the C ABI only
//!
//! Everything here goes through `ContextFFI`, the way a library built in
//! another language would.

use core::ffi::c_void;
use std::{collections::HashMap, sync::LazyLock};

use parking_lot::Mutex;
use tether_abi::{constants::*, context::ContextFFI, library::NativeMethodFFI};
use tether_core::NativeLibrary;

pub const NAME: &str = "Counter";

/// A `NativeLibrary` with the `Counter` module linked in.
pub fn library() -> NativeLibrary {
	NativeLibrary::new().with_ffi_init(NAME, counter_library_init, Some(counter_library_shutdown))
}

type Status = Result<(), i32>;

struct Api<'a> {
	ctx: *const ContextFFI,
	api: &'a tether_abi::callbacks::HostApiFFI,
}

impl<'a> Api<'a> {
	/// # Safety
	/// `ctx` is the context passed to the running entry point.
	unsafe fn new(ctx: *const ContextFFI) -> Result<Self, i32> {
		if ctx.is_null() {
			return Err(TETHER_ERROR_NULL_PTR);
		}
		let context = unsafe { &*ctx };
		if context.abi_version != TETHER_ABI_VERSION {
			return Err(TETHER_ERROR_STATE);
		}
		Ok(Self {
			ctx,
			api: &context.api,
		})
	}

	fn check(status: i32) -> Status {
		if status == TETHER_OK { Ok(()) } else { Err(status) }
	}

	fn log(&self, level: u32, message: &str) {
		(self.api.log.message)(self.ctx, level, message.as_ptr(), message.len());
	}

	fn pop_i64(&self) -> Result<i64, i32> {
		let mut value = 0;
		Self::check((self.api.channel.pop_int8)(self.ctx, &mut value))?;
		Ok(value)
	}

	fn push_i64(&self, value: i64) -> Status {
		Self::check((self.api.channel.push_int8)(self.ctx, value))
	}

	fn pop_string(&self) -> Result<String, i32> {
		let mut ptr: *const u8 = core::ptr::null();
		let mut len = 0;
		Self::check((self.api.channel.pop_utf8)(self.ctx, &mut ptr, &mut len))?;
		if len == 0 {
			return Ok(String::new());
		}
		// SAFETY: the host keeps popped strings alive until the call returns
		let bytes = unsafe { std::slice::from_raw_parts(ptr, len) };
		String::from_utf8(bytes.to_vec()).map_err(|_| TETHER_ERROR_INVALID_UTF8)
	}

	fn push_string(&self, value: &str) -> Status {
		Self::check((self.api.channel.push_utf8)(self.ctx, value.as_ptr(), value.len()))
	}

	fn pop_instance(&self) -> Result<u32, i32> {
		let (mut id, mut side) = (0, 0);
		Self::check((self.api.channel.pop_instance)(self.ctx, &mut id, &mut side))?;
		if side != SIDE_SERVER {
			return Err(TETHER_ERROR_PROTOCOL);
		}
		Ok(id)
	}

	fn object(&self, id: u32) -> Result<*mut i64, i32> {
		let mut object: *mut c_void = core::ptr::null_mut();
		Self::check((self.api.resource.object_ptr)(self.ctx, id, &mut object))?;
		Ok(object.cast())
	}

	fn register_method(&self, module: u32, name: &str, method: NativeMethodFFI) -> Status {
		Self::check((self.api.registry.register_method)(self.ctx, module, name.as_ptr(), name.len(), method))
	}
}

/// Run a method body, turning its status into the return code.
fn run(ctx: *const ContextFFI, body: impl FnOnce(&Api<'_>) -> Status) -> i32 {
	// SAFETY: called from an entry point with its own context
	match unsafe { Api::new(ctx) } {
		Ok(api) => match body(&api) {
			Ok(()) => TETHER_OK,
			Err(status) => status,
		},
		Err(status) => status,
	}
}

/// `CounterError` exception id per bridge, keyed by the opaque bridge pointer.
static FAILURES: LazyLock<Mutex<HashMap<usize, u32>>> = LazyLock::new(|| Mutex::new(HashMap::new()));

fn bridge_key(ctx: *const ContextFFI) -> usize {
	// SAFETY: only called with a context validated by `Api::new`
	unsafe { (*ctx).bridge as usize }
}

pub extern "C" fn counter_library_init(ctx: *const ContextFFI) -> i32 {
	run(ctx, |api| {
		let mut module = 0;
		Api::check((api.api.registry.register_module)(ctx, NAME.as_ptr(), NAME.len(), &mut module))?;

		let mut failure = 0;
		let name = "CounterError";
		Api::check((api.api.registry.register_exception)(ctx, module, name.as_ptr(), name.len(), &mut failure))?;
		FAILURES.lock().insert(bridge_key(ctx), failure);

		api.push_i64(1_000_000)?;
		let limit = "LIMIT";
		Api::check((api.api.registry.register_constant)(ctx, module, limit.as_ptr(), limit.len()))?;

		api.register_method(module, "add", counter_add)?;
		api.register_method(module, "concat", counter_concat)?;
		api.register_method(module, "fail", counter_fail)?;
		api.register_method(module, "reverse", counter_reverse)?;
		api.register_method(module, "new", counter_new)?;
		api.register_method(module, "increment", counter_increment)?;
		api.register_method(module, "dispose", counter_dispose)?;
		api.register_method(module, "apply", counter_apply)?;
		api.register_method(module, "make_doubler", counter_make_doubler)?;
		api.register_method(module, "live_objects", counter_live_objects)?;
		api.log(LOG_DEBUG, "counter library initialized");
		Ok(())
	})
}

pub extern "C" fn counter_library_shutdown(ctx: *const ContextFFI) {
	run(ctx, |api| {
		FAILURES.lock().remove(&bridge_key(ctx));
		api.log(LOG_INFO, "counter library shut down");
		Ok(())
	});
}

/// add(a: i64, b: i64) -> i64
extern "C" fn counter_add(ctx: *const ContextFFI) -> i32 {
	run(ctx, |api| {
		let a = api.pop_i64()?;
		let b = api.pop_i64()?;
		api.push_i64(a.wrapping_add(b))
	})
}

/// concat(a: string, b: string) -> string
extern "C" fn counter_concat(ctx: *const ContextFFI) -> i32 {
	run(ctx, |api| {
		let a = api.pop_string()?;
		let b = api.pop_string()?;
		api.push_string(&format!("{}{}", a, b))
	})
}

/// fail(message: string), raises CounterError
extern "C" fn counter_fail(ctx: *const ContextFFI) -> i32 {
	run(ctx, |api| {
		let message = api.pop_string()?;
		let kind = FAILURES.lock().get(&bridge_key(ctx)).copied().ok_or(TETHER_ERROR_STATE)?;
		Err((api.api.relay.raise)(ctx, kind, message.as_ptr(), message.len()))
	})
}

/// reverse(values: [i32]) -> [i32]
extern "C" fn counter_reverse(ctx: *const ContextFFI) -> i32 {
	run(ctx, |api| {
		let mut data: *const c_void = core::ptr::null();
		let mut count = 0;
		Api::check((api.api.channel.pop_array)(ctx, KIND_INT4, &mut data, &mut count))?;
		let mut values = if count == 0 {
			Vec::new()
		} else {
			// SAFETY: the host keeps popped arrays alive until the call returns
			unsafe { std::slice::from_raw_parts(data as *const i32, count) }.to_vec()
		};
		values.reverse();
		Api::check((api.api.channel.push_array)(ctx, KIND_INT4, values.as_ptr().cast(), values.len()))
	})
}

extern "C" fn destroy_counter(object: *mut c_void) {
	// SAFETY: allocated by `counter_new` through `Box::into_raw`
	drop(unsafe { Box::from_raw(object as *mut i64) });
}

/// new(start: i64) -> Counter
extern "C" fn counter_new(ctx: *const ContextFFI) -> i32 {
	run(ctx, |api| {
		let start = api.pop_i64()?;
		let object = Box::into_raw(Box::new(start));
		let mut id = 0;
		let label = "Counter";
		let status = (api.api.resource.allocate_object)(
			ctx,
			object.cast(),
			Some(destroy_counter),
			label.as_ptr(),
			label.len(),
			&mut id,
		);
		if status != TETHER_OK {
			destroy_counter(object.cast());
			return Err(status);
		}
		Api::check((api.api.channel.push_instance)(ctx, id, SIDE_SERVER))
	})
}

/// increment(this) -> i64
extern "C" fn counter_increment(ctx: *const ContextFFI) -> i32 {
	run(ctx, |api| {
		let id = api.pop_instance()?;
		let object = api.object(id)?;
		// SAFETY: the object stays allocated while its table entry is live
		let value = unsafe {
			*object += 1;
			*object
		};
		api.push_i64(value)
	})
}

/// dispose(this)
extern "C" fn counter_dispose(ctx: *const ContextFFI) -> i32 {
	run(ctx, |api| {
		let id = api.pop_instance()?;
		let status = (api.api.resource.release)(ctx, id, SIDE_SERVER);
		if status == TETHER_ALREADY_RELEASED {
			api.log(LOG_WARN, "counter disposed twice");
			return Ok(());
		}
		Api::check(status)
	})
}

/// apply(callback: fn(i64) -> i64, value: i64) -> i64
///
/// Calls back into the client, then releases the callback.
extern "C" fn counter_apply(ctx: *const ContextFFI) -> i32 {
	run(ctx, |api| {
		let (mut id, mut side) = (0, 0);
		Api::check((api.api.channel.pop_function)(ctx, &mut id, &mut side))?;
		let value = api.pop_i64()?;

		api.push_i64(value)?;
		let status = (api.api.relay.exec_function)(ctx, id, side);
		let released = (api.api.resource.release)(ctx, id, side);
		Api::check(status)?;
		Api::check(released)?;

		let result = api.pop_i64()?;
		api.push_i64(result)
	})
}

extern "C" fn doubler(ctx: *const ContextFFI, user_data: *mut c_void) -> i32 {
	run(ctx, |api| {
		// SAFETY: `user_data` is the factor boxed by `counter_make_doubler`
		let factor = unsafe { *(user_data as *const i64) };
		let value = api.pop_i64()?;
		api.push_i64(value * factor)
	})
}

extern "C" fn destroy_factor(user_data: *mut c_void) {
	// SAFETY: boxed by `counter_make_doubler`
	drop(unsafe { Box::from_raw(user_data as *mut i64) });
}

/// make_doubler() -> fn(i64) -> i64, a server function
extern "C" fn counter_make_doubler(ctx: *const ContextFFI) -> i32 {
	run(ctx, |api| {
		let factor = Box::into_raw(Box::new(2_i64));
		let mut id = 0;
		let status = (api.api.relay.register_function)(ctx, doubler, factor.cast(), Some(destroy_factor), &mut id);
		if status != TETHER_OK {
			destroy_factor(factor.cast());
			return Err(status);
		}
		Api::check((api.api.channel.push_function)(ctx, id, SIDE_SERVER))
	})
}

/// live_objects() -> u64, the number of live server resources
extern "C" fn counter_live_objects(ctx: *const ContextFFI) -> i32 {
	run(ctx, |api| {
		let (mut client, mut server) = (0, 0);
		Api::check((api.api.resource.dump_tables)(ctx, &mut client, &mut server))?;
		Api::check((api.api.channel.push_uint8)(ctx, server as u64))
	})
}
