// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tether_type::{Error, Exception, MethodToken};
use tracing::{debug, instrument};

use super::Bridge;
use crate::{ffi::arena::ScratchMark, lifecycle::LifecycleState, registry::NativeFn};

/// One native call on the stack.
///
/// Tracks the call depth, the channel frame and the scratch arena mark.
/// Dropping the frame without
/// [`CallFrame::leave`] (a violation unwinding through it) still restores the
/// depth.
pub(crate) struct CallFrame<'a> {
	bridge: &'a Bridge,
	scratch: ScratchMark,
	left: bool,
}

impl<'a> CallFrame<'a> {
	pub(crate) fn enter(bridge: &'a Bridge) -> Self {
		let core = bridge.core();
		core.channel.borrow_mut().enter_frame();
		core.depth.set(core.depth.get() + 1);
		let scratch = core.scratch.borrow().mark();
		Self {
			bridge,
			scratch,
			left: false,
		}
	}

	/// Close the frame and return the lowest channel depth seen during the call.
	pub(crate) fn leave(mut self) -> usize {
		self.left = true;
		self.bridge.core().channel.borrow_mut().leave_frame()
	}
}

impl Drop for CallFrame<'_> {
	fn drop(&mut self) {
		let core = self.bridge.core();
		if !self.left
			&& let Ok(mut channel) = core.channel.try_borrow_mut()
		{
			channel.leave_frame();
		}

		core.depth.set(core.depth.get().saturating_sub(1));
		if let Ok(mut scratch) = core.scratch.try_borrow_mut() {
			scratch.truncate(self.scratch);
		}
	}
}

/// A client callback on the stack.
pub(crate) struct ClientFrame<'a> {
	bridge: &'a Bridge,
}

impl<'a> ClientFrame<'a> {
	pub(crate) fn enter(bridge: &'a Bridge) -> Self {
		let core = bridge.core();
		core.client_frames.set(core.client_frames.get() + 1);
		Self {
			bridge,
		}
	}
}

impl Drop for ClientFrame<'_> {
	fn drop(&mut self) {
		let core = self.bridge.core();
		core.client_frames.set(core.client_frames.get().saturating_sub(1));
	}
}

impl Bridge {
	/// Invoke a native method.
	///
	/// The arguments must already be on the channel, last-declared first and
	/// the receiver on top. Results are left on the channel in declared order.
	/// An exception raised by the method is a protocol violation; use
	/// [`Bridge::invoke_with_exception_capture`] for methods that may raise.
	#[instrument(name = "bridge::invoke", level = "debug", skip(self), fields(method = %method))]
	pub fn invoke(&self, method: MethodToken) {
		let (result, _) = self.dispatch(method);
		if let Err(exception) = result {
			self.violation(Error::UncaughtException {
				method,
				message: exception.to_string(),
			});
		}
	}

	/// Invoke a native method and capture the exception it raises.
	///
	/// On an exception no results are left: the channel is cut back to the
	/// lowest depth it reached during the call. A method that raises must
	/// have popped all of its arguments first.
	#[instrument(name = "bridge::invoke_capture", level = "debug", skip(self), fields(method = %method))]
	pub fn invoke_with_exception_capture(&self, method: MethodToken) -> Result<(), Exception> {
		let core = self.core();
		let (result, mark) = self.dispatch(method);
		if let Err(exception) = result {
			core.channel.borrow_mut().truncate(mark);
			debug!(%exception, depth = mark, "captured exception");
			return Err(exception);
		}
		Ok(())
	}

	fn dispatch(&self, method: MethodToken) -> (Result<(), Exception>, usize) {
		let core = self.core();
		self.ensure_callable();
		let native = core.registry.borrow().method(method);
		let native = self.check(native);
		self.run_frame(&native)
	}

	/// Run a native function inside a call frame.
	pub(crate) fn run_frame(&self, native: &NativeFn) -> (Result<(), Exception>, usize) {
		let frame = CallFrame::enter(self);
		let result = native(self);
		let mark = frame.leave();
		(result, mark)
	}

	pub(crate) fn ensure_callable(&self) {
		match self.state() {
			LifecycleState::Running | LifecycleState::ShuttingDown => {}
			LifecycleState::Registering => self.violation(Error::NotInitialized),
			LifecycleState::Shutdown => self.violation(Error::ShutDown),
		}
	}
}

#[cfg(test)]
mod tests {
	use std::sync::{Arc, Mutex};

	use tether_type::Exception;

	use crate::{
		NativeLibrary,
		testing::{FnModule, session_with},
	};

	#[test]
	fn test_arguments_pop_in_declaration_order() {
		let seen = Arc::new(Mutex::new(Vec::new()));
		let recorder = seen.clone();
		let bridge = session_with(NativeLibrary::new().with_module(FnModule::new("Order", move |module| {
			let recorder = recorder.clone();
			module.method("record", move |bridge| {
				let a: i32 = bridge.pop();
				let b: String = bridge.pop();
				let c: bool = bridge.pop();
				recorder.lock().unwrap().push(format!("{a} {b} {c}"));
				Ok(())
			})?;
			Ok(())
		})));

		let module = bridge.resolve_module("Order");
		let record = bridge.resolve_method(module, "record");
		bridge.push(true);
		bridge.push("b");
		bridge.push(1_i32);
		bridge.invoke(record);

		assert_eq!(*seen.lock().unwrap(), vec!["1 b true".to_string()]);
		assert_eq!(bridge.channel_depth(), 0);
	}

	#[test]
	fn test_capture_restores_depth() {
		let bridge = session_with(NativeLibrary::new().with_module(FnModule::new("Fail", |module| {
			module.method("fail", |bridge| {
				let _: i32 = bridge.pop();
				bridge.push("partial");
				Err(Exception::new("boom"))
			})?;
			Ok(())
		})));

		let module = bridge.resolve_module("Fail");
		let fail = bridge.resolve_method(module, "fail");
		bridge.push("unrelated");
		bridge.push(7_i32);

		let err = bridge.invoke_with_exception_capture(fail).unwrap_err();
		assert_eq!(err.message, "boom");
		assert_eq!(bridge.channel_depth(), 1);
		assert_eq!(bridge.pop::<String>(), "unrelated");
	}

	#[test]
	#[should_panic(expected = "raised an exception that nobody captures")]
	fn test_uncaptured_exception_is_violation() {
		let bridge = session_with(NativeLibrary::new().with_module(FnModule::new("Fail", |module| {
			module.method("fail", |_| Err(Exception::new("boom")))?;
			Ok(())
		})));
		let module = bridge.resolve_module("Fail");
		let fail = bridge.resolve_method(module, "fail");
		bridge.invoke(fail);
	}

	#[test]
	fn test_depth_restored_after_call() {
		let bridge = session_with(NativeLibrary::new().with_module(FnModule::new("Depth", |module| {
			module.method("depth", |bridge| {
				bridge.push(bridge.call_depth() as u32);
				Ok(())
			})?;
			Ok(())
		})));
		let module = bridge.resolve_module("Depth");
		let depth = bridge.resolve_method(module, "depth");
		bridge.invoke(depth);
		assert_eq!(bridge.pop::<u32>(), 1);
		assert!(!bridge.in_native_call());
	}
}
