// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Capability traits of wrapped native classes

use tether_core::{Bridge, CallbackArgs};
use tether_type::{Exception, ForeignRef, MethodToken, Result};

use crate::Handle;

/// The method tokens of one native class, resolved once per bridge.
pub trait TokenSet: Sized + Send + Sync + 'static {
	fn resolve(bridge: &Bridge) -> Result<Self>;

	/// The method releasing an instance; it pops the instance.
	fn dispose(&self) -> MethodToken;
}

/// A native class exposed to the client.
pub trait Class: 'static {
	/// Name of the native module implementing the class
	const NAME: &'static str;

	type Tokens: TokenSet;
}

/// A wrapper owning a native instance.
pub trait HasHandle {
	type Class: Class;

	fn handle(&self) -> &Handle<Self::Class>;

	fn reference(&self) -> ForeignRef {
		self.handle().reference()
	}

	fn tokens(&self) -> &<Self::Class as Class>::Tokens {
		self.handle().tokens()
	}
}

pub trait Disposable: HasHandle {
	/// Release the native instance now. Disposing twice is a no-op.
	fn dispose(&self) -> std::result::Result<(), Exception> {
		self.handle().dispose()
	}

	fn is_disposed(&self) -> bool {
		self.handle().is_disposed()
	}
}

impl<T: HasHandle> Disposable for T {}

/// A wrapper whose native instance emits a signal with arguments `A`.
pub trait EmitsSignal<A: CallbackArgs + 'static>: HasHandle {
	/// Connect `slot` through the native `connect` method.
	///
	/// `connect` pops the instance, then the slot. The native instance owns
	/// the registration from then on and releases it when it is disposed.
	/// If `connect` raises, the registration is released here.
	fn connect<F>(&self, connect: MethodToken, slot: F) -> std::result::Result<(), Exception>
	where
		F: Fn(A) -> std::result::Result<(), Exception> + Send + Sync + 'static,
	{
		let handle = self.handle();
		let bridge = handle.live_bridge()?;
		let func = bridge.register_client_func(move |bridge| slot(A::pop_args(bridge)));
		bridge.push(func);
		handle.call(connect).inspect_err(|_| {
			if bridge.is_live(func.0) {
				bridge.release_from_client(func.0, None);
			}
		})
	}
}
