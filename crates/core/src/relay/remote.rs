// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Debug, Formatter};

use tether_type::{Exception, ForeignRef, InterfaceMethodToken, Side, Value};
use tracing::trace;

use super::CallbackArgs;
use crate::{Bridge, bridge::WeakBridge};

/// An owning proxy for a resource of the other side.
///
/// Dropping the proxy releases the registration. Proxies of server resources
/// follow the safety area rules; proxies of client resources notify the
/// client's resource-release entry point right away.
pub struct Remote {
	bridge: WeakBridge,
	reference: ForeignRef,
	function: bool,
}

impl Remote {
	pub(crate) fn new(bridge: &Bridge, reference: ForeignRef, function: bool) -> Self {
		Self {
			bridge: bridge.downgrade(),
			reference,
			function,
		}
	}

	pub fn reference(&self) -> ForeignRef {
		self.reference
	}

	pub fn is_function(&self) -> bool {
		self.function
	}

	/// The referenced value, to push it back across the boundary without
	/// giving up ownership.
	pub fn value(&self) -> Value {
		if self.function {
			Value::Function(self.reference)
		} else {
			Value::Instance(self.reference)
		}
	}

	/// Invoke the function with arguments already on the channel.
	pub fn exec(&self) -> Result<(), Exception> {
		let bridge = self.bridge()?;
		bridge.invoke_callback(self.reference)
	}

	/// Push `args` and invoke the function.
	pub fn call<A: CallbackArgs>(&self, args: A) -> Result<(), Exception> {
		let bridge = self.bridge()?;
		args.push_args(&bridge);
		bridge.invoke_callback(self.reference)
	}

	/// Invoke an interface method on the referenced client object.
	pub fn invoke_method(&self, method: InterfaceMethodToken) -> Result<(), Exception> {
		let bridge = self.bridge()?;
		bridge.invoke_client_method(method, self.reference)
	}

	/// Release now instead of at the end of scope.
	pub fn release(self) {}

	fn bridge(&self) -> Result<Bridge, Exception> {
		self.bridge.upgrade().ok_or_else(|| Exception::new("bridge is gone"))
	}
}

impl Debug for Remote {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Remote").field("reference", &self.reference).field("function", &self.function).finish()
	}
}

impl Drop for Remote {
	fn drop(&mut self) {
		let Ok(bridge) = self.bridge() else {
			return;
		};
		if !bridge.accepts_releases() {
			return;
		}

		trace!(reference = %self.reference, "remote dropped");
		match self.reference.side {
			Side::Server => bridge.release_from_client(self.reference, None),
			Side::Client => bridge.release_client_resource(self.reference),
		}
	}
}
