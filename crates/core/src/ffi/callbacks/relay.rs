// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Callback relay callbacks

use core::ffi::c_void;
use std::sync::Arc;

use tether_abi::{
	callbacks::relay::RelayCallbacks,
	constants::*,
	context::ContextFFI,
	library::{DestroyFFI, FunctionFFI},
};
use tether_type::{Error, Exception, ExceptionToken, ForeignRef, InterfaceMethodToken, RefId, Result};

use super::{out_ptr, read_str, side_of};
use crate::{
	Bridge,
	ffi::{call_ffi, guarded, object::ForeignFunction},
};

pub(super) fn callbacks() -> RelayCallbacks {
	RelayCallbacks {
		register_function: host_register_function,
		exec_function: host_exec_function,
		invoke_client_method: host_invoke_client_method,
		raise: host_raise,
		clear_safety_area: host_clear_safety_area,
	}
}

/// Park an exception for the native call that is unwinding.
fn raised(bridge: &Bridge, exception: Exception) -> Result<i32> {
	*bridge.core().pending.borrow_mut() = Some(exception);
	Ok(TETHER_EXCEPTION)
}

extern "C" fn host_register_function(
	ctx: *const ContextFFI,
	function: FunctionFFI,
	user_data: *mut c_void,
	destroy: Option<DestroyFFI>,
	id_out: *mut u32,
) -> i32 {
	guarded(ctx, |bridge| {
		let id_out = out_ptr(id_out, "id_out")?;
		let foreign = Arc::new(ForeignFunction::new(function, user_data, destroy));
		let func = bridge.register_server_func(move |bridge| {
			call_ffi(bridge, "server function", |ctx| (foreign.function)(ctx, foreign.user_data))
		});
		// SAFETY: checked for null
		unsafe { id_out.write(func.0.id.0) };
		Ok(TETHER_OK)
	})
}

extern "C" fn host_exec_function(ctx: *const ContextFFI, id: u32, side: u8) -> i32 {
	guarded(ctx, |bridge| {
		let function = ForeignRef::new(RefId(id), side_of(side)?);
		match bridge.invoke_callback(function) {
			Ok(()) => Ok(TETHER_OK),
			Err(exception) => raised(bridge, exception),
		}
	})
}

extern "C" fn host_invoke_client_method(ctx: *const ContextFFI, method: u32, target: u32) -> i32 {
	guarded(ctx, |bridge| {
		let method = InterfaceMethodToken::from_raw(method).ok_or_else(|| Error::InvalidToken {
			what: format!("interface method {}", method),
		})?;
		match bridge.invoke_client_method(method, ForeignRef::client(target)) {
			Ok(()) => Ok(TETHER_OK),
			Err(exception) => raised(bridge, exception),
		}
	})
}

extern "C" fn host_raise(ctx: *const ContextFFI, kind: u32, message: *const u8, message_len: usize) -> i32 {
	guarded(ctx, |bridge| {
		// SAFETY: the library passes `message_len` readable bytes
		let message = unsafe { read_str(message, message_len) }?;
		let exception = match ExceptionToken::from_raw(kind) {
			None => Exception::new(message),
			Some(kind) => {
				if !bridge.core().registry.borrow().is_exception(kind) {
					return Err(Error::InvalidToken {
						what: kind.to_string(),
					});
				}
				Exception::of_kind(kind, message)
			}
		};
		raised(bridge, exception)
	})
}

extern "C" fn host_clear_safety_area(ctx: *const ContextFFI) -> i32 {
	guarded(ctx, |bridge| {
		bridge.clear_safety_area();
		Ok(TETHER_OK)
	})
}
