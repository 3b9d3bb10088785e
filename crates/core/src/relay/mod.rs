// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Callback relay.
//!
//! Either side registers functions in its own table and hands out a
//! [`FuncRef`]. The other side invokes them by reference: arguments are pushed
//! before the call, results are on the channel when it returns. A function
//! whose registration is gone is a hard error.

mod args;
mod entry;
mod remote;

use std::sync::Arc;

pub use args::CallbackArgs;
pub use entry::{ClientEntryPoints, ClientObject, ClientRelay};
pub use remote::Remote;
use tether_type::{
	Error, Exception, ForeignRef, FuncRef, InterfaceMethodToken, InterfaceToken, RefId, Side, Value, ValueKind,
};
use tracing::{debug, instrument};

use crate::{
	Bridge,
	bridge::{ClientEntry, ServerEntry},
	registry::NativeFn,
	table::ResourceKind,
};

impl Bridge {
	/// Register a client function. The native side owns the returned
	/// reference once it is pushed to it.
	pub fn register_client_func<F>(&self, function: F) -> FuncRef
	where
		F: Fn(&Bridge) -> Result<(), Exception> + Send + Sync + 'static,
	{
		let reference = self.core().client.borrow_mut().allocate(
			ResourceKind::Function,
			"function",
			ClientEntry::Function(Arc::new(function)),
		);
		debug!(%reference, "registered client function");
		FuncRef(reference)
	}

	/// Register a server function, on behalf of a native module.
	pub fn register_server_func<F>(&self, function: F) -> FuncRef
	where
		F: Fn(&Bridge) -> Result<(), Exception> + Send + Sync + 'static,
	{
		let reference = self.core().server.borrow_mut().allocate(
			ResourceKind::Function,
			"function",
			ServerEntry::Function(Arc::new(function)),
		);
		debug!(%reference, "registered server function");
		FuncRef(reference)
	}

	/// Register a client object implementing `interface`.
	pub fn register_client_object(&self, interface: InterfaceToken, object: Arc<dyn ClientObject>) -> ForeignRef {
		let core = self.core();
		let label = core.registry.borrow().interface_label(interface);
		let label = self.check(label);
		let reference = core.client.borrow_mut().allocate(
			ResourceKind::Object,
			label,
			ClientEntry::Object {
				object,
				interface,
			},
		);
		debug!(%reference, %interface, "registered client object");
		reference
	}

	/// Invoke a function registered on either side.
	///
	/// The function's arguments must already be on the channel. Exceptions
	/// it raises are returned to the caller.
	#[instrument(name = "relay::invoke_callback", level = "debug", skip(self), fields(function = %function))]
	pub fn invoke_callback(&self, function: ForeignRef) -> Result<(), Exception> {
		let core = self.core();
		self.ensure_callable();
		self.expect_kind(function, ResourceKind::Function);

		match function.side {
			Side::Client => self.inner.entry_points.exec_function(self, function.id),
			Side::Server => {
				let native = match core.server.borrow().get(function.id) {
					Some((_, ServerEntry::Function(native))) => Some(native.clone()),
					_ => None,
				};
				let Some(native) = native else {
					self.violation(Error::DanglingCallback {
						reference: function,
					})
				};
				self.run_frame(&native).0
			}
		}
	}

	/// Invoke an interface method on a client object.
	#[instrument(name = "relay::invoke_client_method", level = "debug", skip(self), fields(method = %method, target = %target))]
	pub fn invoke_client_method(&self, method: InterfaceMethodToken, target: ForeignRef) -> Result<(), Exception> {
		let _section = self.core();
		self.ensure_callable();
		if target.side != Side::Client {
			self.violation(Error::ResourceKindMismatch {
				reference: target,
				expected: "client object",
				found: "server resource",
			});
		}
		self.expect_kind(target, ResourceKind::Object);
		self.inner.entry_points.invoke_method(self, method, target.id)
	}

	/// Pop a function or an object reference as an owning proxy.
	pub fn pop_remote(&self) -> Remote {
		match self.pop_value() {
			Value::Function(reference) => Remote::new(self, reference, true),
			Value::Instance(reference) => Remote::new(self, reference, false),
			other => self.violation(Error::ShapeMismatch {
				expected: ValueKind::Function,
				found: other.kind(),
			}),
		}
	}

	/// Pop an optional callback, `None` for an explicit null.
	pub fn pop_optional_remote(&self) -> Option<Remote> {
		if self.pop_if_null() {
			return None;
		}
		Some(self.pop_remote())
	}

	/// The resource behind `reference` must be live and of `expected` kind.
	fn expect_kind(&self, reference: ForeignRef, expected: ResourceKind) {
		match self.resource_kind(reference) {
			Some(kind) if kind == expected => {}
			Some(kind) => self.violation(Error::ResourceKindMismatch {
				reference,
				expected: expected.as_str(),
				found: kind.as_str(),
			}),
			None if expected == ResourceKind::Function => self.violation(Error::DanglingCallback {
				reference,
			}),
			None => self.violation(Error::DeadReference {
				reference,
			}),
		}
	}

	/// The native side dropped its reference to a client resource.
	pub(crate) fn release_client_resource(&self, reference: ForeignRef) {
		let entry_points = self.inner.entry_points.clone();
		let _section = self.core();
		entry_points.release_resource(self, reference.id);
	}

	pub(crate) fn client_function(&self, function: RefId) -> Option<NativeFn> {
		match self.core().client.borrow().get(function) {
			Some((_, ClientEntry::Function(function))) => Some(function.clone()),
			_ => None,
		}
	}

	pub(crate) fn client_object(&self, object: RefId) -> Option<(Arc<dyn ClientObject>, InterfaceToken)> {
		match self.core().client.borrow().get(object) {
			Some((
				_,
				ClientEntry::Object {
					object,
					interface,
				},
			)) => Some((object.clone(), *interface)),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use std::sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	};

	use tether_type::{Exception, ForeignRef, FuncRef, Side};

	use crate::{
		NativeLibrary, Remote,
		testing::{FnModule, session, session_with},
	};

	#[test]
	fn test_client_function_called_with_arguments() {
		let bridge = session();
		let func = bridge.register_client_func(|bridge| {
			let a: i32 = bridge.pop();
			let b: i32 = bridge.pop();
			bridge.push(a - b);
			Ok(())
		});

		bridge.push(2_i32);
		bridge.push(10_i32);
		bridge.invoke_callback(func.0).unwrap();
		assert_eq!(bridge.pop::<i32>(), 8);
	}

	#[test]
	fn test_client_exception_propagates() {
		let bridge = session();
		let func = bridge.register_client_func(|_| Err(Exception::new("client failed")));
		let err = bridge.invoke_callback(func.0).unwrap_err();
		assert_eq!(err.message, "client failed");
	}

	#[test]
	#[should_panic(expected = "callback target client#1 is not live")]
	fn test_dangling_callback_is_violation() {
		let bridge = session();
		let func = bridge.register_client_func(|_| Ok(()));
		bridge.release(func.0);
		let _ = bridge.invoke_callback(func.0);
	}

	#[test]
	fn test_reentrant_callback() {
		// native `run` calls back into the client, which calls native `add` in turn
		let bridge = session_with(NativeLibrary::new().with_module(FnModule::new("Math", |module| {
			module.method("add", |bridge| {
				let a: i64 = bridge.pop();
				let b: i64 = bridge.pop();
				bridge.push(a + b);
				Ok(())
			})?;
			module.method("run", |bridge| {
				let callback = bridge.pop_remote();
				callback.call((20_i64,))?;
				let result: i64 = bridge.pop();
				bridge.push(result * 2);
				Ok(())
			})?;
			Ok(())
		})));

		let math = bridge.resolve_module("Math");
		let add = bridge.resolve_method(math, "add");
		let run = bridge.resolve_method(math, "run");

		let depth_seen = Arc::new(AtomicUsize::new(0));
		let seen = depth_seen.clone();
		let callback = bridge.register_client_func(move |bridge| {
			let x: i64 = bridge.pop();
			seen.store(bridge.call_depth(), Ordering::SeqCst);
			bridge.push(1_i64);
			bridge.push(x);
			bridge.invoke(add);
			Ok(())
		});

		bridge.push(callback);
		bridge.invoke(run);

		assert_eq!(bridge.pop::<i64>(), 42);
		assert_eq!(depth_seen.load(Ordering::SeqCst), 1);
		// the native side dropped its proxy: the registration is gone
		assert!(!bridge.is_live(callback.0));
		assert!(bridge.dump_tables().is_empty());
	}

	#[test]
	fn test_server_function_through_remote() {
		let bridge = session();
		let func = bridge.register_server_func(|bridge| {
			let s: String = bridge.pop();
			bridge.push(s.to_uppercase());
			Ok(())
		});

		bridge.push(FuncRef(func.0));
		let remote: Remote = bridge.pop_remote();
		remote.call(("abc".to_string(),)).unwrap();
		assert_eq!(bridge.pop::<String>(), "ABC");

		drop(remote);
		assert!(!bridge.is_live(func.0));
	}

	#[test]
	#[should_panic(expected = "has kind object, expected function")]
	fn test_object_is_not_callable() {
		let bridge = session();
		let object = bridge.allocate_server_object("Widget", ());
		let _ = bridge.invoke_callback(ForeignRef::new(object.id, Side::Server));
	}
}
