// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! The bridge: one value channel, one registry and two resource tables behind
//! a single reentrant critical section.
//!
//! The critical section is held for the whole duration of an invocation,
//! including every nested callback, so a call and everything it triggers runs
//! as one logical stack. `RefCell` borrows of the shared state are never held
//! across user code; closures are cloned out of the tables before they run.

pub(crate) mod invoke;
mod resource;

use std::{
	any::Any,
	cell::{Cell, RefCell},
	process::abort,
	sync::{Arc, Weak},
};

use parking_lot::{Mutex, ReentrantMutex, ReentrantMutexGuard};
use tether_type::{
	Error, Exception, ExceptionToken, FromValue, InterfaceMethodToken, InterfaceToken, MethodToken, ModuleToken,
	Result, Side, Value, ValueKind,
};
use tracing::error;

use crate::{
	channel::Channel,
	config::{BridgeConfig, ViolationPolicy},
	ffi::arena::Scratch,
	lifecycle::{LifecycleState, ShutdownHook},
	registry::{NativeFn, Registry},
	relay::{ClientEntryPoints, ClientObject},
	safety::SafetyArea,
	table::HandleTable,
};

pub(crate) type SharedBuffer = Arc<Mutex<Box<[u8]>>>;

pub(crate) enum ServerEntry {
	Function(NativeFn),
	Object(Arc<dyn Any + Send + Sync>),
	Buffer(SharedBuffer),
}

pub(crate) enum ClientEntry {
	Function(NativeFn),
	Object {
		object: Arc<dyn ClientObject>,
		interface: InterfaceToken,
	},
	Buffer(SharedBuffer),
}

pub(crate) struct Core {
	pub(crate) state: Cell<LifecycleState>,
	pub(crate) channel: RefCell<Channel>,
	pub(crate) registry: RefCell<Registry>,
	pub(crate) client: RefCell<HandleTable<ClientEntry>>,
	pub(crate) server: RefCell<HandleTable<ServerEntry>>,
	pub(crate) safety: RefCell<SafetyArea>,
	/// Native calls currently on the stack.
	pub(crate) depth: Cell<usize>,
	/// Client callbacks currently on the stack.
	pub(crate) client_frames: Cell<usize>,
	/// Set while the tables are being cleared; releases are ignored.
	pub(crate) clearing: Cell<bool>,
	pub(crate) scratch: RefCell<Scratch>,
	/// Exception raised through the C ABI, not yet picked up.
	pub(crate) pending: RefCell<Option<Exception>>,
	/// Error behind the last failed C ABI callback.
	pub(crate) ffi_error: RefCell<Option<Error>>,
	pub(crate) shutdown_hooks: RefCell<Vec<ShutdownHook>>,
}

pub(crate) struct BridgeInner {
	pub(crate) config: BridgeConfig,
	pub(crate) core: ReentrantMutex<Core>,
	pub(crate) entry_points: Arc<dyn ClientEntryPoints>,
	// Declared after `core`: resources owned by a library are destroyed
	// before the library is unloaded.
	#[allow(dead_code)]
	pub(crate) libraries: Vec<libloading::Library>,
}

/// Handle to a bridge. Cheap to clone; all clones share one state.
#[derive(Clone)]
pub struct Bridge {
	pub(crate) inner: Arc<BridgeInner>,
}

/// A bridge handle that does not keep the bridge alive.
#[derive(Clone)]
pub struct WeakBridge {
	inner: Weak<BridgeInner>,
}

impl WeakBridge {
	pub fn upgrade(&self) -> Option<Bridge> {
		self.inner.upgrade().map(|inner| Bridge {
			inner,
		})
	}
}

impl Bridge {
	pub(crate) fn new(
		config: BridgeConfig,
		entry_points: Arc<dyn ClientEntryPoints>,
		libraries: Vec<libloading::Library>,
	) -> Self {
		let core = Core {
			state: Cell::new(LifecycleState::Registering),
			channel: RefCell::new(Channel::new(config.max_channel_depth)),
			registry: RefCell::new(Registry::new()),
			client: RefCell::new(HandleTable::new(Side::Client)),
			server: RefCell::new(HandleTable::new(Side::Server)),
			safety: RefCell::new(SafetyArea::default()),
			depth: Cell::new(0),
			client_frames: Cell::new(0),
			clearing: Cell::new(false),
			scratch: RefCell::new(Scratch::default()),
			pending: RefCell::new(None),
			ffi_error: RefCell::new(None),
			shutdown_hooks: RefCell::new(Vec::new()),
		};

		Self {
			inner: Arc::new(BridgeInner {
				config,
				core: ReentrantMutex::new(core),
				entry_points,
				libraries,
			}),
		}
	}

	/// Enter the critical section. Reentrant on the owning thread.
	pub(crate) fn core(&self) -> ReentrantMutexGuard<'_, Core> {
		self.inner.core.lock()
	}

	pub fn downgrade(&self) -> WeakBridge {
		WeakBridge {
			inner: Arc::downgrade(&self.inner),
		}
	}

	pub fn config(&self) -> &BridgeConfig {
		&self.inner.config
	}

	pub fn state(&self) -> LifecycleState {
		self.core().state.get()
	}

	pub fn is_running(&self) -> bool {
		self.state() == LifecycleState::Running
	}

	/// Whether a native call is in progress on the current stack.
	pub fn in_native_call(&self) -> bool {
		self.core().depth.get() > 0
	}

	pub fn call_depth(&self) -> usize {
		self.core().depth.get()
	}

	/// Report a protocol violation and never return.
	///
	/// The violation is logged, then the process aborts or the thread panics
	/// depending on [`ViolationPolicy`].
	pub fn violation(&self, error: Error) -> ! {
		error!(%error, "protocol violation");
		match self.inner.config.violation_policy {
			ViolationPolicy::Abort => abort(),
			ViolationPolicy::Panic => panic!("protocol violation: {error}"),
		}
	}

	pub(crate) fn check<T>(&self, result: Result<T>) -> T {
		result.unwrap_or_else(|error| self.violation(error))
	}

	pub fn push(&self, value: impl Into<Value>) {
		let result = self.try_push(value);
		self.check(result)
	}

	pub fn try_push(&self, value: impl Into<Value>) -> Result<()> {
		self.core().channel.borrow_mut().push(value.into())
	}

	/// Pop the most recently pushed value as `T`.
	///
	/// An empty channel or a value of another shape is a protocol violation.
	pub fn pop<T: FromValue>(&self) -> T {
		let result = self.try_pop();
		self.check(result)
	}

	pub fn try_pop<T: FromValue>(&self) -> Result<T> {
		self.core().channel.borrow_mut().pop::<T>()
	}

	/// Pop the top value whatever its shape.
	pub fn pop_value(&self) -> Value {
		let core = self.core();
		let value = core.channel.borrow_mut().pop_value();
		drop(core);
		value.unwrap_or_else(|| {
			self.violation(Error::ChannelUnderflow {
				expected: ValueKind::Null,
			})
		})
	}

	/// Pop a null if it is on top of the channel.
	pub fn pop_if_null(&self) -> bool {
		let core = self.core();
		let mut channel = core.channel.borrow_mut();
		if channel.peek_kind() == Some(ValueKind::Null) {
			channel.pop_value();
			true
		} else {
			false
		}
	}

	pub fn peek_kind(&self) -> Option<ValueKind> {
		self.core().channel.borrow().peek_kind()
	}

	pub fn channel_depth(&self) -> usize {
		self.core().channel.borrow().depth()
	}

	pub fn resolve_module(&self, name: &str) -> ModuleToken {
		let result = self.try_resolve_module(name);
		self.check(result)
	}

	pub fn try_resolve_module(&self, name: &str) -> Result<ModuleToken> {
		self.core().registry.borrow().resolve_module(name)
	}

	pub fn resolve_method(&self, module: ModuleToken, name: &str) -> MethodToken {
		let result = self.try_resolve_method(module, name);
		self.check(result)
	}

	pub fn try_resolve_method(&self, module: ModuleToken, name: &str) -> Result<MethodToken> {
		self.core().registry.borrow().resolve_method(module, name)
	}

	pub fn resolve_interface(&self, module: ModuleToken, name: &str) -> InterfaceToken {
		let result = self.core().registry.borrow().resolve_interface(module, name);
		self.check(result)
	}

	pub fn resolve_interface_method(&self, interface: InterfaceToken, name: &str) -> InterfaceMethodToken {
		let result = self.core().registry.borrow().resolve_interface_method(interface, name);
		self.check(result)
	}

	pub fn resolve_exception(&self, module: ModuleToken, name: &str) -> ExceptionToken {
		let result = self.core().registry.borrow().resolve_exception(module, name);
		self.check(result)
	}

	/// Push the module's constants so they pop in declaration order.
	pub fn push_module_constants(&self, module: ModuleToken) {
		let core = self.core();
		let constants = core.registry.borrow().constants(module);
		for value in self.check(constants).into_iter().rev() {
			self.push(value);
		}
	}

	/// `Module.method`, for diagnostics.
	pub fn describe_method(&self, method: MethodToken) -> String {
		self.core().registry.borrow().describe_method(method)
	}

	pub(crate) fn with_registry_mut<R>(&self, f: impl FnOnce(&mut Registry) -> R) -> R {
		let core = self.core();
		let mut registry = core.registry.borrow_mut();
		f(&mut registry)
	}
}

#[cfg(test)]
mod tests {
	use crate::testing::session;

	#[test]
	fn test_push_pop_through_bridge() {
		let bridge = session();
		bridge.push(-1_i64);
		bridge.push("x");
		assert_eq!(bridge.channel_depth(), 2);
		assert_eq!(bridge.pop::<String>(), "x");
		assert_eq!(bridge.pop::<i64>(), -1);
	}

	#[test]
	#[should_panic(expected = "protocol violation")]
	fn test_underflow_is_violation() {
		let bridge = session();
		bridge.pop::<i32>();
	}

	#[test]
	#[should_panic(expected = "shape mismatch")]
	fn test_shape_mismatch_is_violation() {
		let bridge = session();
		bridge.push(1_u8);
		bridge.pop::<i8>();
	}

	#[test]
	fn test_pop_if_null() {
		let bridge = session();
		bridge.push(3_i32);
		bridge.push(None::<i32>);
		assert!(bridge.pop_if_null());
		assert!(!bridge.pop_if_null());
		assert_eq!(bridge.pop::<i32>(), 3);
	}

	#[test]
	#[should_panic(expected = "unknown module")]
	fn test_unknown_module_is_violation() {
		let bridge = session();
		bridge.resolve_module("Nope");
	}

	#[test]
	fn test_try_resolve_reports_unknown() {
		let bridge = session();
		assert!(bridge.try_resolve_module("Nope").is_err());
	}
}
