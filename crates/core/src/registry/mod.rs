// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Module, method, interface and exception registry.
//!
//! Everything is registered while the bridge initializes; afterwards the
//! registry is sealed and only answers lookups. Tokens index the registry
//! directly and stay valid until shutdown.

mod builder;

use std::{collections::HashMap, fmt, sync::Arc};

pub use builder::{ModuleBuilder, NativeModule};
use tether_type::{
	Error, Exception, ExceptionToken, InterfaceMethodToken, InterfaceToken, MethodToken, ModuleToken, Result,
	Value,
};
use tracing::debug;

use crate::Bridge;

/// A native method: pops its arguments, pushes its results.
pub type NativeFn = Arc<dyn Fn(&Bridge) -> std::result::Result<(), Exception> + Send + Sync>;

struct ModuleEntry {
	name: String,
	methods: HashMap<String, MethodToken>,
	interfaces: HashMap<String, InterfaceToken>,
	exceptions: HashMap<String, ExceptionToken>,
	constants: Vec<(String, Value)>,
}

struct MethodEntry {
	module: ModuleToken,
	name: String,
	method: NativeFn,
}

struct InterfaceEntry {
	module: ModuleToken,
	name: String,
	methods: HashMap<String, InterfaceMethodToken>,
}

struct InterfaceMethodEntry {
	interface: InterfaceToken,
	name: String,
}

struct ExceptionEntry {
	module: ModuleToken,
	name: String,
}

#[derive(Default)]
pub struct Registry {
	modules: Vec<ModuleEntry>,
	module_names: HashMap<String, ModuleToken>,
	methods: Vec<MethodEntry>,
	interfaces: Vec<InterfaceEntry>,
	interface_methods: Vec<InterfaceMethodEntry>,
	exceptions: Vec<ExceptionEntry>,
	sealed: bool,
}

impl Registry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn register_module(&mut self, name: &str) -> Result<ModuleToken> {
		self.ensure_open()?;
		if self.module_names.contains_key(name) {
			return Err(Error::DuplicateRegistration {
				name: name.to_string(),
			});
		}

		let token = ModuleToken::from_index(self.modules.len());
		self.modules.push(ModuleEntry {
			name: name.to_string(),
			methods: HashMap::new(),
			interfaces: HashMap::new(),
			exceptions: HashMap::new(),
			constants: Vec::new(),
		});
		self.module_names.insert(name.to_string(), token);
		debug!(module = name, %token, "registered module");
		Ok(token)
	}

	pub fn register_method(&mut self, module: ModuleToken, name: &str, method: NativeFn) -> Result<MethodToken> {
		self.ensure_open()?;
		let token = MethodToken::from_index(self.methods.len());
		let entry = self.module_entry_mut(module)?;
		if entry.methods.contains_key(name) {
			return Err(Error::DuplicateRegistration {
				name: format!("{}.{}", entry.name, name),
			});
		}
		entry.methods.insert(name.to_string(), token);
		debug!(module = %entry.name, method = name, %token, "registered method");

		self.methods.push(MethodEntry {
			module,
			name: name.to_string(),
			method,
		});
		Ok(token)
	}

	pub fn register_constant(&mut self, module: ModuleToken, name: &str, value: Value) -> Result<()> {
		self.ensure_open()?;
		let entry = self.module_entry_mut(module)?;
		if entry.constants.iter().any(|(existing, _)| existing == name) {
			return Err(Error::DuplicateRegistration {
				name: format!("{}.{}", entry.name, name),
			});
		}
		entry.constants.push((name.to_string(), value));
		Ok(())
	}

	pub fn register_exception(&mut self, module: ModuleToken, name: &str) -> Result<ExceptionToken> {
		self.ensure_open()?;
		let token = ExceptionToken::from_index(self.exceptions.len());
		let entry = self.module_entry_mut(module)?;
		if entry.exceptions.contains_key(name) {
			return Err(Error::DuplicateRegistration {
				name: format!("{}.{}", entry.name, name),
			});
		}
		entry.exceptions.insert(name.to_string(), token);

		self.exceptions.push(ExceptionEntry {
			module,
			name: name.to_string(),
		});
		Ok(token)
	}

	pub fn register_interface(&mut self, module: ModuleToken, name: &str, methods: &[&str]) -> Result<InterfaceToken> {
		self.ensure_open()?;
		for (i, method) in methods.iter().enumerate() {
			if methods[..i].contains(method) {
				return Err(Error::DuplicateRegistration {
					name: format!("{}.{}", name, method),
				});
			}
		}

		let token = InterfaceToken::from_index(self.interfaces.len());
		let entry = self.module_entry_mut(module)?;
		if entry.interfaces.contains_key(name) {
			return Err(Error::DuplicateRegistration {
				name: format!("{}.{}", entry.name, name),
			});
		}
		entry.interfaces.insert(name.to_string(), token);

		let mut method_tokens = HashMap::with_capacity(methods.len());
		for method in methods {
			let method_token = InterfaceMethodToken::from_index(self.interface_methods.len());
			self.interface_methods.push(InterfaceMethodEntry {
				interface: token,
				name: method.to_string(),
			});
			method_tokens.insert(method.to_string(), method_token);
		}

		self.interfaces.push(InterfaceEntry {
			module,
			name: name.to_string(),
			methods: method_tokens,
		});
		debug!(interface = name, %token, methods = methods.len(), "registered interface");
		Ok(token)
	}

	/// Refuse further registration.
	pub fn seal(&mut self) {
		self.sealed = true;
	}

	pub fn is_sealed(&self) -> bool {
		self.sealed
	}

	pub fn resolve_module(&self, name: &str) -> Result<ModuleToken> {
		self.module_names.get(name).copied().ok_or_else(|| Error::UnknownModule {
			module: name.to_string(),
		})
	}

	pub fn resolve_method(&self, module: ModuleToken, name: &str) -> Result<MethodToken> {
		let entry = self.module_entry(module)?;
		entry.methods.get(name).copied().ok_or_else(|| Error::UnknownMethod {
			module: entry.name.clone(),
			method: name.to_string(),
		})
	}

	pub fn resolve_interface(&self, module: ModuleToken, name: &str) -> Result<InterfaceToken> {
		let entry = self.module_entry(module)?;
		entry.interfaces.get(name).copied().ok_or_else(|| Error::UnknownInterface {
			module: entry.name.clone(),
			interface: name.to_string(),
		})
	}

	pub fn resolve_interface_method(&self, interface: InterfaceToken, name: &str) -> Result<InterfaceMethodToken> {
		let entry = self.interfaces.get(interface.index()).ok_or_else(|| invalid(interface))?;
		entry.methods.get(name).copied().ok_or_else(|| Error::UnknownInterfaceMethod {
			interface,
			method: name.to_string(),
		})
	}

	pub fn resolve_exception(&self, module: ModuleToken, name: &str) -> Result<ExceptionToken> {
		let entry = self.module_entry(module)?;
		entry.exceptions.get(name).copied().ok_or_else(|| Error::UnknownException {
			module: entry.name.clone(),
			exception: name.to_string(),
		})
	}

	pub fn method(&self, token: MethodToken) -> Result<NativeFn> {
		self.methods.get(token.index()).map(|entry| entry.method.clone()).ok_or_else(|| invalid(token))
	}

	/// The interface `method` belongs to.
	pub fn interface_of(&self, method: InterfaceMethodToken) -> Result<InterfaceToken> {
		self.interface_methods.get(method.index()).map(|entry| entry.interface).ok_or_else(|| invalid(method))
	}

	pub fn constants(&self, module: ModuleToken) -> Result<Vec<Value>> {
		Ok(self.module_entry(module)?.constants.iter().map(|(_, value)| value.clone()).collect())
	}

	/// `Module.Interface`, failing for a token this registry never issued.
	pub fn interface_label(&self, token: InterfaceToken) -> Result<String> {
		let entry = self.interfaces.get(token.index()).ok_or_else(|| invalid(token))?;
		Ok(format!("{}.{}", self.module_name(entry.module), entry.name))
	}

	pub fn is_exception(&self, token: ExceptionToken) -> bool {
		token.index() < self.exceptions.len()
	}

	/// `Module.method`, for logs.
	pub fn describe_method(&self, token: MethodToken) -> String {
		match self.methods.get(token.index()) {
			Some(entry) => format!("{}.{}", self.module_name(entry.module), entry.name),
			None => token.to_string(),
		}
	}

	pub fn describe_interface_method(&self, token: InterfaceMethodToken) -> String {
		let Some(method) = self.interface_methods.get(token.index()) else {
			return token.to_string();
		};
		match self.interfaces.get(method.interface.index()) {
			Some(interface) => {
				format!("{}.{}.{}", self.module_name(interface.module), interface.name, method.name)
			}
			None => token.to_string(),
		}
	}

	pub fn describe_exception(&self, token: ExceptionToken) -> String {
		match self.exceptions.get(token.index()) {
			Some(entry) => format!("{}.{}", self.module_name(entry.module), entry.name),
			None => token.to_string(),
		}
	}

	pub fn module_count(&self) -> usize {
		self.modules.len()
	}

	pub fn method_count(&self) -> usize {
		self.methods.len()
	}

	/// Forget everything. Tokens handed out before are invalid afterwards.
	pub fn clear(&mut self) {
		*self = Registry {
			sealed: true,
			..Registry::default()
		};
	}

	fn module_name(&self, module: ModuleToken) -> &str {
		self.modules.get(module.index()).map(|entry| entry.name.as_str()).unwrap_or("?")
	}

	fn module_entry(&self, module: ModuleToken) -> Result<&ModuleEntry> {
		self.modules.get(module.index()).ok_or_else(|| invalid(module))
	}

	fn module_entry_mut(&mut self, module: ModuleToken) -> Result<&mut ModuleEntry> {
		self.modules.get_mut(module.index()).ok_or(Error::ModuleNotRegistered {
			module,
		})
	}

	fn ensure_open(&self) -> Result<()> {
		if self.sealed {
			return Err(Error::AlreadyInitialized);
		}
		Ok(())
	}
}

fn invalid(token: impl fmt::Display) -> Error {
	Error::InvalidToken {
		what: token.to_string(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn noop() -> NativeFn {
		Arc::new(|_| Ok(()))
	}

	#[test]
	fn test_resolve_registered_method() {
		let mut registry = Registry::new();
		let module = registry.register_module("Widget").unwrap();
		let create = registry.register_method(module, "create", noop()).unwrap();
		let dispose = registry.register_method(module, "dispose", noop()).unwrap();

		assert_eq!(registry.resolve_module("Widget").unwrap(), module);
		assert_eq!(registry.resolve_method(module, "create").unwrap(), create);
		assert_eq!(registry.resolve_method(module, "dispose").unwrap(), dispose);
		assert_ne!(create, dispose);
		assert_eq!(registry.describe_method(dispose), "Widget.dispose");
	}

	#[test]
	fn test_unknown_names() {
		let mut registry = Registry::new();
		let module = registry.register_module("Widget").unwrap();

		assert!(matches!(registry.resolve_module("Button"), Err(Error::UnknownModule { .. })));
		assert!(matches!(registry.resolve_method(module, "explode"), Err(Error::UnknownMethod { .. })));
	}

	#[test]
	fn test_same_method_name_in_two_modules() {
		let mut registry = Registry::new();
		let widget = registry.register_module("Widget").unwrap();
		let button = registry.register_module("Button").unwrap();
		let a = registry.register_method(widget, "create", noop()).unwrap();
		let b = registry.register_method(button, "create", noop()).unwrap();
		assert_ne!(a, b);
	}

	#[test]
	fn test_duplicates_rejected() {
		let mut registry = Registry::new();
		let module = registry.register_module("Widget").unwrap();
		registry.register_method(module, "create", noop()).unwrap();

		assert!(matches!(registry.register_module("Widget"), Err(Error::DuplicateRegistration { .. })));
		assert!(matches!(
			registry.register_method(module, "create", noop()),
			Err(Error::DuplicateRegistration { .. })
		));
		assert!(matches!(
			registry.register_interface(module, "Model", &["count", "count"]),
			Err(Error::DuplicateRegistration { .. })
		));
	}

	#[test]
	fn test_sealed_registry_refuses_registration() {
		let mut registry = Registry::new();
		registry.seal();
		assert_eq!(registry.register_module("Widget"), Err(Error::AlreadyInitialized));
	}

	#[test]
	fn test_foreign_token_is_invalid() {
		let registry = Registry::new();
		let token = MethodToken::from_index(3);
		assert!(matches!(registry.method(token), Err(Error::InvalidToken { .. })));
	}

	#[test]
	fn test_interface_methods() {
		let mut registry = Registry::new();
		let module = registry.register_module("Widget").unwrap();
		let model = registry.register_interface(module, "ItemModel", &["count_rows", "row_text"]).unwrap();
		let other = registry.register_interface(module, "Painter", &["paint"]).unwrap();

		let count_rows = registry.resolve_interface_method(model, "count_rows").unwrap();
		let paint = registry.resolve_interface_method(other, "paint").unwrap();
		assert_eq!(registry.interface_of(count_rows).unwrap(), model);
		assert_eq!(registry.interface_of(paint).unwrap(), other);
		assert_eq!(registry.describe_interface_method(count_rows), "Widget.ItemModel.count_rows");
	}

	#[test]
	fn test_constants_keep_declaration_order() {
		let mut registry = Registry::new();
		let module = registry.register_module("Widget").unwrap();
		registry.register_constant(module, "SIZE_MAX", Value::from(16_777_215_i32)).unwrap();
		registry.register_constant(module, "NAME", Value::from("widget")).unwrap();

		assert_eq!(registry.constants(module).unwrap(), vec![Value::from(16_777_215_i32), Value::from("widget")]);
	}

	#[test]
	fn test_clear_invalidates_tokens() {
		let mut registry = Registry::new();
		let module = registry.register_module("Widget").unwrap();
		let create = registry.register_method(module, "create", noop()).unwrap();
		registry.clear();
		assert!(registry.method(create).is_err());
		assert!(registry.resolve_module("Widget").is_err());
	}
}
