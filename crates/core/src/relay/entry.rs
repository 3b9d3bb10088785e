// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tether_type::{Error, Exception, ForeignRef, InterfaceMethodToken, RefId};
use tracing::debug;

use crate::{Bridge, bridge::invoke::ClientFrame};

/// The four entry points through which the native side reaches the client.
///
/// They are negotiated once at initialization and used for every callback
/// into the client. The bridge holds its critical section while they run.
pub trait ClientEntryPoints: Send + Sync + 'static {
	/// Run the client function `function`; its arguments are on the channel.
	fn exec_function(&self, bridge: &Bridge, function: RefId) -> Result<(), Exception>;

	/// Run interface method `method` on the client object `target`.
	fn invoke_method(&self, bridge: &Bridge, method: InterfaceMethodToken, target: RefId) -> Result<(), Exception>;

	/// The native side dropped its last reference to a client resource.
	fn release_resource(&self, bridge: &Bridge, resource: RefId);

	/// The native side grants permission to release deferred resources.
	fn clear_safety_area(&self, bridge: &Bridge);
}

/// A client object implementing a native-declared interface.
pub trait ClientObject: Send + Sync + 'static {
	/// Pop the method's arguments, push its results.
	fn invoke(&self, bridge: &Bridge, method: InterfaceMethodToken) -> Result<(), Exception>;
}

/// Entry points dispatching into the bridge's own client table.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClientRelay;

impl ClientEntryPoints for ClientRelay {
	fn exec_function(&self, bridge: &Bridge, function: RefId) -> Result<(), Exception> {
		let reference = ForeignRef::client(function.0);
		let Some(callback) = bridge.client_function(function) else {
			bridge.violation(Error::DanglingCallback {
				reference,
			})
		};

		debug!(%reference, "exec client function");
		let _frame = ClientFrame::enter(bridge);
		callback(bridge)
	}

	fn invoke_method(&self, bridge: &Bridge, method: InterfaceMethodToken, target: RefId) -> Result<(), Exception> {
		let reference = ForeignRef::client(target.0);
		let Some((object, interface)) = bridge.client_object(target) else {
			bridge.violation(Error::DeadReference {
				reference,
			})
		};

		let owner = bridge.core().registry.borrow().interface_of(method);
		if bridge.check(owner) != interface {
			bridge.violation(Error::InterfaceMismatch {
				method,
				target: reference,
			});
		}

		debug!(%reference, %method, "invoke client method");
		let _frame = ClientFrame::enter(bridge);
		object.invoke(bridge, method)
	}

	fn release_resource(&self, bridge: &Bridge, resource: RefId) {
		bridge.release(ForeignRef::client(resource.0));
	}

	fn clear_safety_area(&self, bridge: &Bridge) {
		bridge.drain_safety_area(false);
	}
}
