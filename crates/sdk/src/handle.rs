// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Debug, Formatter},
	sync::{
		Arc,
		atomic::{AtomicBool, Ordering},
	},
};

use tether_core::{Bridge, WeakBridge};
use tether_type::{Exception, ForeignRef, MethodToken, Value};
use tracing::{debug, warn};

use crate::{Class, TokenSet};

/// Owning handle of a native instance of class `C`.
///
/// The instance is disposed exactly once: by [`Handle::dispose`], or when the
/// handle is dropped. Either one while a native call is in flight parks the
/// release in the safety area.
pub struct Handle<C: Class> {
	bridge: WeakBridge,
	reference: ForeignRef,
	tokens: Arc<C::Tokens>,
	disposed: AtomicBool,
}

impl<C: Class> Handle<C> {
	pub fn new(bridge: &Bridge, reference: ForeignRef, tokens: Arc<C::Tokens>) -> Self {
		Self {
			bridge: bridge.downgrade(),
			reference,
			tokens,
			disposed: AtomicBool::new(false),
		}
	}

	/// Invoke a constructor whose arguments are on the channel and take
	/// ownership of the instance it returns.
	pub fn create(bridge: &Bridge, tokens: Arc<C::Tokens>, constructor: MethodToken) -> Result<Self, Exception> {
		bridge.invoke_with_exception_capture(constructor)?;
		let reference: ForeignRef = bridge.pop();
		debug!(class = C::NAME, %reference, "created instance");
		Ok(Self::new(bridge, reference, tokens))
	}

	pub fn reference(&self) -> ForeignRef {
		self.reference
	}

	pub fn tokens(&self) -> &C::Tokens {
		&self.tokens
	}

	pub fn bridge(&self) -> Result<Bridge, Exception> {
		self.bridge.upgrade().ok_or_else(|| Exception::new(format!("{} outlived its bridge", C::NAME)))
	}

	pub fn is_disposed(&self) -> bool {
		self.disposed.load(Ordering::Acquire)
	}

	/// Push the instance and invoke `method`; the arguments must already be
	/// on the channel.
	pub fn call(&self, method: MethodToken) -> Result<(), Exception> {
		let bridge = self.live_bridge()?;
		bridge.push(Value::Instance(self.reference));
		bridge.invoke_with_exception_capture(method)
	}

	/// Like [`Handle::call`], for methods that never raise.
	pub fn invoke(&self, method: MethodToken) -> Result<(), Exception> {
		let bridge = self.live_bridge()?;
		bridge.push(Value::Instance(self.reference));
		bridge.invoke(method);
		Ok(())
	}

	pub fn dispose(&self) -> Result<(), Exception> {
		if self.disposed.swap(true, Ordering::AcqRel) {
			return Ok(());
		}
		let Some(bridge) = self.bridge.upgrade() else {
			return Ok(());
		};
		if !bridge.is_running() {
			return Ok(());
		}

		if bridge.in_native_call() {
			debug!(class = C::NAME, reference = %self.reference, "dispose during a native call");
			bridge.release_from_client(self.reference, Some(self.tokens.dispose()));
			return Ok(());
		}

		debug!(class = C::NAME, reference = %self.reference, "dispose");
		bridge.push(Value::Instance(self.reference));
		bridge.invoke_with_exception_capture(self.tokens.dispose())
	}

	pub(crate) fn live_bridge(&self) -> Result<Bridge, Exception> {
		if self.is_disposed() {
			return Err(Exception::new(format!("{} {} is disposed", C::NAME, self.reference)));
		}
		self.bridge()
	}
}

impl<C: Class> Debug for Handle<C> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Handle")
			.field("class", &C::NAME)
			.field("reference", &self.reference)
			.field("disposed", &self.is_disposed())
			.finish()
	}
}

impl<C: Class> Drop for Handle<C> {
	fn drop(&mut self) {
		if self.disposed.swap(true, Ordering::AcqRel) {
			return;
		}
		let Some(bridge) = self.bridge.upgrade() else {
			return;
		};
		if !bridge.is_running() {
			warn!(class = C::NAME, reference = %self.reference, "handle dropped after bridge shutdown began");
			return;
		}
		bridge.release_from_client(self.reference, Some(self.tokens.dispose()));
	}
}

#[cfg(test)]
mod tests {
	use std::sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	};

	use tether_core::{BridgeConfig, ModuleBuilder, NativeLibrary, NativeModule, ViolationPolicy};
	use tether_type::{FuncRef, MethodToken, Result};

	use super::*;
	use crate::{Disposable, EmitsSignal, HasHandle};

	struct Native {
		disposed: Arc<AtomicUsize>,
	}

	impl NativeModule for Native {
		fn name(&self) -> &str {
			"Thing"
		}

		fn register(&self, module: &mut ModuleBuilder<'_>) -> Result<()> {
			module.method("create", |bridge| {
				let reference = bridge.allocate_server_object("Thing", ());
				bridge.push(reference);
				Ok(())
			})?;
			let disposed = self.disposed.clone();
			module.method("dispose", move |bridge| {
				let reference: ForeignRef = bridge.pop();
				bridge.release(reference);
				disposed.fetch_add(1, Ordering::SeqCst);
				Ok(())
			})?;
			module.method("connect", |bridge| {
				let _: ForeignRef = bridge.pop();
				let _: FuncRef = bridge.pop();
				Err(Exception::new("no signal to connect"))
			})?;
			module.method("call", |bridge| {
				let FuncRef(function) = bridge.pop();
				bridge.invoke_callback(function)
			})?;
			Ok(())
		}
	}

	struct ThingTokens {
		create: MethodToken,
		dispose: MethodToken,
		connect: MethodToken,
		call: MethodToken,
	}

	impl TokenSet for ThingTokens {
		fn resolve(bridge: &Bridge) -> tether_type::Result<Self> {
			let module = bridge.try_resolve_module(Thing::NAME)?;
			Ok(Self {
				create: bridge.try_resolve_method(module, "create")?,
				dispose: bridge.try_resolve_method(module, "dispose")?,
				connect: bridge.try_resolve_method(module, "connect")?,
				call: bridge.try_resolve_method(module, "call")?,
			})
		}

		fn dispose(&self) -> MethodToken {
			self.dispose
		}
	}

	struct Thing {
		handle: Handle<Thing>,
	}

	impl Class for Thing {
		const NAME: &'static str = "Thing";
		type Tokens = ThingTokens;
	}

	impl HasHandle for Thing {
		type Class = Thing;

		fn handle(&self) -> &Handle<Thing> {
			&self.handle
		}
	}

	impl EmitsSignal<()> for Thing {}

	fn setup() -> (Bridge, Arc<ThingTokens>, Arc<AtomicUsize>) {
		let disposed = Arc::new(AtomicUsize::new(0));
		let bridge = Bridge::init(
			BridgeConfig::default().with_violation_policy(ViolationPolicy::Panic),
			NativeLibrary::new().with_module(Native {
				disposed: disposed.clone(),
			}),
		)
		.unwrap();
		let tokens = Arc::new(ThingTokens::resolve(&bridge).unwrap());
		(bridge, tokens, disposed)
	}

	fn create(bridge: &Bridge, tokens: &Arc<ThingTokens>) -> Thing {
		Thing {
			handle: Handle::create(bridge, tokens.clone(), tokens.create).unwrap(),
		}
	}

	#[test]
	fn test_dispose_is_idempotent() {
		let (bridge, tokens, disposed) = setup();
		let thing = create(&bridge, &tokens);
		thing.dispose().unwrap();
		thing.dispose().unwrap();
		assert!(thing.is_disposed());
		drop(thing);
		assert_eq!(disposed.load(Ordering::SeqCst), 1);
		assert!(bridge.dump_tables().is_empty());
	}

	#[test]
	fn test_drop_disposes() {
		let (bridge, tokens, disposed) = setup();
		let thing = create(&bridge, &tokens);
		let reference = thing.reference();
		drop(thing);
		assert_eq!(disposed.load(Ordering::SeqCst), 1);
		assert!(!bridge.is_live(reference));
	}

	#[test]
	fn test_disposed_handle_refuses_calls() {
		let (bridge, tokens, _) = setup();
		let thing = create(&bridge, &tokens);
		thing.dispose().unwrap();
		assert!(thing.handle().call(tokens.create).is_err());
		assert_eq!(bridge.channel_depth(), 0);
	}

	#[test]
	fn test_failed_connect_releases_the_slot() {
		let (bridge, tokens, _) = setup();
		let thing = create(&bridge, &tokens);
		let err = thing.connect(tokens.connect, |()| Ok(())).unwrap_err();
		assert_eq!(err.message, "no signal to connect");
		assert!(bridge.dump_tables().client.is_empty());
		assert_eq!(bridge.channel_depth(), 0);
	}

	#[test]
	fn test_connect_on_disposed_handle_registers_nothing() {
		let (bridge, tokens, _) = setup();
		let thing = create(&bridge, &tokens);
		thing.dispose().unwrap();
		assert!(thing.connect(tokens.connect, |()| Ok(())).is_err());
		assert!(bridge.dump_tables().client.is_empty());
		assert_eq!(bridge.channel_depth(), 0);
	}

	#[test]
	fn test_dispose_during_native_call_is_deferred() {
		let (bridge, tokens, disposed) = setup();
		let thing = create(&bridge, &tokens);
		let reference = thing.reference();
		let func = bridge.register_client_func(move |_| thing.dispose());

		bridge.push(func);
		bridge.invoke(tokens.call);
		assert_eq!(disposed.load(Ordering::SeqCst), 0);
		assert!(bridge.is_live(reference));
		assert_eq!(bridge.deferred_count(), 1);

		bridge.clear_safety_area();
		assert_eq!(disposed.load(Ordering::SeqCst), 1);
		assert!(!bridge.is_live(reference));
		bridge.release(func.0);
	}
}
