// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Registry callbacks, only honored while the bridge initializes

use tether_abi::{
	callbacks::registry::RegistryCallbacks, constants::TETHER_OK, context::ContextFFI, data::StrFFI,
	library::NativeMethodFFI,
};
use tether_type::{Error, InterfaceToken, ModuleToken, Result, ValueKind};

use super::{out_ptr, read_str};
use crate::ffi::{guarded, native_method};

pub(super) fn callbacks() -> RegistryCallbacks {
	RegistryCallbacks {
		register_module: host_register_module,
		register_method: host_register_method,
		register_constant: host_register_constant,
		register_exception: host_register_exception,
		register_interface: host_register_interface,
		resolve_interface_method: host_resolve_interface_method,
	}
}

fn module_token(raw: u32) -> Result<ModuleToken> {
	ModuleToken::from_raw(raw).ok_or_else(|| Error::InvalidToken {
		what: format!("module {}", raw),
	})
}

extern "C" fn host_register_module(
	ctx: *const ContextFFI,
	name: *const u8,
	name_len: usize,
	module_out: *mut u32,
) -> i32 {
	guarded(ctx, |bridge| {
		let module_out = out_ptr(module_out, "module_out")?;
		// SAFETY: the library passes `name_len` readable bytes
		let name = unsafe { read_str(name, name_len) }?;
		let token = bridge.with_registry_mut(|registry| registry.register_module(name))?;
		// SAFETY: checked for null
		unsafe { module_out.write(token.raw()) };
		Ok(TETHER_OK)
	})
}

extern "C" fn host_register_method(
	ctx: *const ContextFFI,
	module: u32,
	name: *const u8,
	name_len: usize,
	method: NativeMethodFFI,
) -> i32 {
	guarded(ctx, |bridge| {
		let module = module_token(module)?;
		// SAFETY: as above
		let name = unsafe { read_str(name, name_len) }?;
		bridge.with_registry_mut(|registry| registry.register_method(module, name, native_method(method)))?;
		Ok(TETHER_OK)
	})
}

extern "C" fn host_register_constant(ctx: *const ContextFFI, module: u32, name: *const u8, name_len: usize) -> i32 {
	guarded(ctx, |bridge| {
		let module = module_token(module)?;
		// SAFETY: as above
		let name = unsafe { read_str(name, name_len) }?;
		let value = bridge.core().channel.borrow_mut().pop_value().ok_or(Error::ChannelUnderflow {
			expected: ValueKind::Null,
		})?;
		bridge.with_registry_mut(|registry| registry.register_constant(module, name, value))?;
		Ok(TETHER_OK)
	})
}

extern "C" fn host_register_exception(
	ctx: *const ContextFFI,
	module: u32,
	name: *const u8,
	name_len: usize,
	exception_out: *mut u32,
) -> i32 {
	guarded(ctx, |bridge| {
		let exception_out = out_ptr(exception_out, "exception_out")?;
		let module = module_token(module)?;
		// SAFETY: as above
		let name = unsafe { read_str(name, name_len) }?;
		let token = bridge.with_registry_mut(|registry| registry.register_exception(module, name))?;
		// SAFETY: checked for null
		unsafe { exception_out.write(token.raw()) };
		Ok(TETHER_OK)
	})
}

extern "C" fn host_register_interface(
	ctx: *const ContextFFI,
	module: u32,
	name: *const u8,
	name_len: usize,
	methods: *const StrFFI,
	method_count: usize,
	interface_out: *mut u32,
) -> i32 {
	guarded(ctx, |bridge| {
		let interface_out = out_ptr(interface_out, "interface_out")?;
		let module = module_token(module)?;
		// SAFETY: as above
		let name = unsafe { read_str(name, name_len) }?;

		let methods: &[StrFFI] = if method_count == 0 {
			&[]
		} else if methods.is_null() {
			return Err(Error::NullPointer("methods"));
		} else {
			// SAFETY: the library passes `method_count` names
			unsafe { std::slice::from_raw_parts(methods, method_count) }
		};
		let names = methods
			.iter()
			// SAFETY: every name points to `len` readable bytes
			.map(|method| unsafe { read_str(method.ptr, method.len) })
			.collect::<Result<Vec<_>>>()?;

		let token = bridge.with_registry_mut(|registry| registry.register_interface(module, name, &names))?;
		// SAFETY: checked for null
		unsafe { interface_out.write(token.raw()) };
		Ok(TETHER_OK)
	})
}

extern "C" fn host_resolve_interface_method(
	ctx: *const ContextFFI,
	interface: u32,
	name: *const u8,
	name_len: usize,
	method_out: *mut u32,
) -> i32 {
	guarded(ctx, |bridge| {
		let method_out = out_ptr(method_out, "method_out")?;
		let interface = InterfaceToken::from_raw(interface).ok_or_else(|| Error::InvalidToken {
			what: format!("interface {}", interface),
		})?;
		// SAFETY: as above
		let name = unsafe { read_str(name, name_len) }?;
		let token = bridge.core().registry.borrow().resolve_interface_method(interface, name)?;
		// SAFETY: checked for null
		unsafe { method_out.write(token.raw()) };
		Ok(TETHER_OK)
	})
}
