// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Host side of the C ABI.
//!
//! Native libraries reach the bridge through the callback table in
//! [`ContextFFI`]. Every callback is guarded: a failure is recorded on the
//! bridge and reported to the library as a negative status, which the library
//! must return from its entry point. The bridge then raises the recorded
//! error as a protocol violation.

pub(crate) mod arena;
mod callbacks;
mod object;

use core::ffi::c_void;
use std::{
	panic::{AssertUnwindSafe, catch_unwind},
	sync::Arc,
};

use tether_abi::{
	constants::*,
	context::ContextFFI,
	library::{LibraryInitFFI, LibraryShutdownFFI, NativeMethodFFI},
};
use tether_type::{Error, Exception, Result};
use tracing::{debug, error, warn};

use crate::{
	Bridge,
	bridge::BridgeInner,
	registry::NativeFn,
};

pub(crate) fn context(bridge: &Bridge) -> ContextFFI {
	ContextFFI {
		bridge: Arc::as_ptr(&bridge.inner) as *const c_void,
		abi_version: TETHER_ABI_VERSION,
		api: callbacks::host_api(),
	}
}

/// Recover the bridge a context was built for.
///
/// The pointer stays the same for the whole life of a bridge, so libraries
/// may key their own state on it.
///
/// # Safety
/// `ctx` must be null or a context passed to a native entry point that has
/// not returned yet.
unsafe fn bridge_from(ctx: *const ContextFFI) -> Result<Bridge> {
	if ctx.is_null() {
		return Err(Error::NullPointer("context"));
	}
	let ctx = unsafe { &*ctx };
	if ctx.abi_version != TETHER_ABI_VERSION || ctx.bridge.is_null() {
		return Err(Error::NullPointer("bridge"));
	}
	let inner = ctx.bridge as *const BridgeInner;
	// SAFETY: the caller holds a `Bridge` for as long as the context lives
	unsafe {
		Arc::increment_strong_count(inner);
		Ok(Bridge {
			inner: Arc::from_raw(inner),
		})
	}
}

/// Wrap a C entry point as a native method.
pub(crate) fn native_method(method: NativeMethodFFI) -> NativeFn {
	Arc::new(move |bridge: &Bridge| call_ffi(bridge, "native method", |ctx| method(ctx)))
}

/// Call into a native library and translate its status.
///
/// A callback failure is a violation even when the library returns
/// `TETHER_OK` after it. Failures recorded by an enclosing native call are
/// kept aside while this one runs.
pub(crate) fn call_ffi(
	bridge: &Bridge,
	what: &str,
	f: impl FnOnce(*const ContextFFI) -> i32,
) -> std::result::Result<(), Exception> {
	let ctx = context(bridge);
	let outer = bridge.core().ffi_error.take();
	let status = f(&ctx);

	let core = bridge.core();
	let pending = core.pending.take();
	let failure = core.ffi_error.replace(outer);
	match (status, failure) {
		(TETHER_OK, None) => {
			if let Some(exception) = pending {
				debug!(%exception, "native code handled an exception");
			}
			Ok(())
		}
		(TETHER_EXCEPTION, None) => {
			Err(pending.unwrap_or_else(|| Exception::new(format!("{} raised without an exception", what))))
		}
		(TETHER_OK | TETHER_EXCEPTION, Some(error)) => {
			drop(core);
			warn!(what, "native code ignored a failed host callback");
			bridge.violation(error)
		}
		(code, failure) => {
			let error = failure.unwrap_or_else(|| Error::NativeFailure {
				what: what.to_string(),
				code,
			});
			drop(core);
			bridge.violation(error)
		}
	}
}

/// Run a library's init entry point.
///
/// A failed host callback fails the init even if the library returned
/// `TETHER_OK` after it.
pub(crate) fn run_library_init(bridge: &Bridge, name: &str, init: LibraryInitFFI) -> Result<()> {
	let ctx = context(bridge);
	bridge.core().ffi_error.take();
	let status = init(&ctx);

	let core = bridge.core();
	core.scratch.borrow_mut().clear();
	core.pending.take();
	let failure = core.ffi_error.take();
	let reason = match (status, failure) {
		(TETHER_OK, None) => {
			debug!(library = name, "native library initialized");
			return Ok(());
		}
		(_, Some(err)) => err.to_string(),
		(status, None) => format!("status {}", status),
	};
	error!(library = name, %reason, "native library initialization failed");
	Err(Error::LibraryInit(format!("{}: {}", name, reason)))
}

pub(crate) fn run_library_shutdown(bridge: &Bridge, shutdown: LibraryShutdownFFI) {
	let ctx = context(bridge);
	shutdown(&ctx);
	if let Some(err) = bridge.core().ffi_error.take() {
		warn!(%err, "native library shutdown reported an error");
	}
}

/// Run a host callback on behalf of a native library.
pub(crate) fn guarded(ctx: *const ContextFFI, f: impl FnOnce(&Bridge) -> Result<i32>) -> i32 {
	// SAFETY: callbacks are only reachable through a context built by
	// `context`, which outlives the native call it was passed to.
	let bridge = match unsafe { bridge_from(ctx) } {
		Ok(bridge) => bridge,
		Err(err) => {
			error!(%err, "host callback without a valid context");
			return TETHER_ERROR_NULL_PTR;
		}
	};

	match catch_unwind(AssertUnwindSafe(|| f(&bridge))) {
		Ok(Ok(status)) => status,
		Ok(Err(err)) => {
			let status = status_of(&err);
			record_ffi_error(&bridge, err);
			status
		}
		Err(payload) => {
			let message = payload
				.downcast_ref::<String>()
				.map(String::as_str)
				.or_else(|| payload.downcast_ref::<&str>().copied())
				.unwrap_or("panic in host callback")
				.to_string();
			record_ffi_error(
				&bridge,
				Error::NativeFailure {
					what: message,
					code: TETHER_ERROR_PANIC,
				},
			);
			TETHER_ERROR_PANIC
		}
	}
}

fn record_ffi_error(bridge: &Bridge, err: Error) {
	debug!(%err, "host callback failed");
	let core = bridge.core();
	let mut slot = core.ffi_error.borrow_mut();
	// the first failure is the one the library reacted to
	if slot.is_none() {
		*slot = Some(err);
	}
}

fn status_of(err: &Error) -> i32 {
	match err {
		Error::NullPointer(_) => TETHER_ERROR_NULL_PTR,
		Error::InvalidUtf8 => TETHER_ERROR_INVALID_UTF8,
		Error::UnknownModule { .. }
		| Error::UnknownMethod { .. }
		| Error::UnknownInterface { .. }
		| Error::UnknownInterfaceMethod { .. }
		| Error::UnknownException { .. }
		| Error::InvalidToken { .. } => TETHER_ERROR_UNKNOWN_NAME,
		Error::NotInitialized | Error::AlreadyInitialized | Error::ShutDown => TETHER_ERROR_STATE,
		_ => TETHER_ERROR_PROTOCOL,
	}
}
