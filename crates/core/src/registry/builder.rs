// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use tether_type::{
	Exception, ExceptionToken, InterfaceMethodToken, InterfaceToken, MethodToken, ModuleToken, Result, Value,
};

use super::Registry;
use crate::Bridge;

/// A native module implemented in Rust.
pub trait NativeModule: Send + Sync + 'static {
	fn name(&self) -> &str;

	/// Register methods, constants, exceptions and interfaces.
	fn register(&self, module: &mut ModuleBuilder<'_>) -> Result<()>;

	/// Called during bridge shutdown, in reverse registration order.
	fn shutdown(&self, _bridge: &Bridge) {}
}

/// Registration surface handed to a module while the bridge initializes.
pub struct ModuleBuilder<'a> {
	registry: &'a mut Registry,
	module: ModuleToken,
}

impl<'a> ModuleBuilder<'a> {
	pub(crate) fn new(registry: &'a mut Registry, module: ModuleToken) -> Self {
		Self {
			registry,
			module,
		}
	}

	pub fn token(&self) -> ModuleToken {
		self.module
	}

	pub fn method<F>(&mut self, name: &str, method: F) -> Result<MethodToken>
	where
		F: Fn(&Bridge) -> std::result::Result<(), Exception> + Send + Sync + 'static,
	{
		self.registry.register_method(self.module, name, Arc::new(method))
	}

	pub fn constant(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
		self.registry.register_constant(self.module, name, value.into())
	}

	pub fn exception(&mut self, name: &str) -> Result<ExceptionToken> {
		self.registry.register_exception(self.module, name)
	}

	pub fn interface(&mut self, name: &str, methods: &[&str]) -> Result<InterfaceToken> {
		self.registry.register_interface(self.module, name, methods)
	}

	pub fn interface_method(&self, interface: InterfaceToken, name: &str) -> Result<InterfaceMethodToken> {
		self.registry.resolve_interface_method(interface, name)
	}
}
