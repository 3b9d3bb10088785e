// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use tether_type::Result;
use tracing::{debug, error, warn};

use super::NativeLibrary;
use crate::{
	Bridge,
	config::BridgeConfig,
	dump::TableDump,
	registry::NativeModule,
	relay::{ClientEntryPoints, ClientRelay},
};

/// A client-side module: resolves its tokens once the bridge is up, and
/// releases what it holds before the bridge goes down.
pub trait ClientModule: Send + Sync + 'static {
	fn name(&self) -> &str;

	fn init(&self, bridge: &Bridge) -> Result<()>;

	fn shutdown(&self, _bridge: &Bridge) {}
}

/// Assembles a bridge together with the client modules living on it.
pub struct RuntimeBuilder {
	config: BridgeConfig,
	library: NativeLibrary,
	entry_points: Arc<dyn ClientEntryPoints>,
	client_modules: Vec<Arc<dyn ClientModule>>,
}

impl Default for RuntimeBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl RuntimeBuilder {
	pub fn new() -> Self {
		Self {
			config: BridgeConfig::default(),
			library: NativeLibrary::new(),
			entry_points: Arc::new(ClientRelay),
			client_modules: Vec::new(),
		}
	}

	pub fn config(mut self, config: BridgeConfig) -> Self {
		self.config = config;
		self
	}

	pub fn library(mut self, library: NativeLibrary) -> Self {
		self.library = library;
		self
	}

	pub fn module(mut self, module: impl NativeModule) -> Self {
		self.library = self.library.with_module(module);
		self
	}

	pub fn entry_points(mut self, entry_points: Arc<dyn ClientEntryPoints>) -> Self {
		self.entry_points = entry_points;
		self
	}

	pub fn client_module(mut self, module: impl ClientModule) -> Self {
		self.client_modules.push(Arc::new(module));
		self
	}

	/// Initialize the bridge, then every client module in order.
	///
	/// When a client module fails, the ones already initialized are shut
	/// down in reverse order and the bridge is shut down before the error is
	/// returned.
	pub fn build(self) -> Result<Runtime> {
		let bridge = Bridge::init_with_entry_points(self.config, self.library, self.entry_points)?;

		let mut initialized: Vec<Arc<dyn ClientModule>> = Vec::with_capacity(self.client_modules.len());
		for module in self.client_modules {
			if let Err(err) = module.init(&bridge) {
				error!(module = module.name(), %err, "client module failed to initialize");
				for module in initialized.iter().rev() {
					module.shutdown(&bridge);
				}
				drop(initialized);
				if let Err(shutdown) = bridge.shutdown() {
					warn!(%shutdown, "bridge shutdown after failed initialization");
				}
				return Err(err);
			}
			debug!(module = module.name(), "client module initialized");
			initialized.push(module);
		}

		Ok(Runtime {
			bridge,
			client_modules: initialized,
		})
	}
}

/// A running bridge with its client modules.
pub struct Runtime {
	bridge: Bridge,
	client_modules: Vec<Arc<dyn ClientModule>>,
}

impl Runtime {
	pub fn builder() -> RuntimeBuilder {
		RuntimeBuilder::new()
	}

	pub fn bridge(&self) -> &Bridge {
		&self.bridge
	}

	/// Shut client modules down in reverse order, then the bridge.
	pub fn shutdown(self) -> Result<TableDump> {
		for module in self.client_modules.iter().rev() {
			debug!(module = module.name(), "shutting down client module");
			module.shutdown(&self.bridge);
		}
		drop(self.client_modules);
		self.bridge.shutdown()
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Mutex;

	use tether_type::Error;

	use super::*;
	use crate::{config::ViolationPolicy, testing::FnModule};

	struct Recording {
		name: &'static str,
		fail: bool,
		log: Arc<Mutex<Vec<String>>>,
	}

	impl ClientModule for Recording {
		fn name(&self) -> &str {
			self.name
		}

		fn init(&self, bridge: &Bridge) -> Result<()> {
			if self.fail {
				return Err(Error::Config(format!("{} refused", self.name)));
			}
			bridge.try_resolve_module("Widget")?;
			self.log.lock().unwrap().push(format!("init {}", self.name));
			Ok(())
		}

		fn shutdown(&self, _bridge: &Bridge) {
			self.log.lock().unwrap().push(format!("shutdown {}", self.name));
		}
	}

	fn builder(log: &Arc<Mutex<Vec<String>>>, fail_second: bool) -> RuntimeBuilder {
		Runtime::builder()
			.config(BridgeConfig::default().with_violation_policy(ViolationPolicy::Panic))
			.module(FnModule::new("Widget", |_| Ok(())))
			.client_module(Recording {
				name: "first",
				fail: false,
				log: log.clone(),
			})
			.client_module(Recording {
				name: "second",
				fail: fail_second,
				log: log.clone(),
			})
	}

	#[test]
	fn test_runtime_order() {
		let log = Arc::new(Mutex::new(Vec::new()));
		let runtime = builder(&log, false).build().unwrap();
		assert!(runtime.bridge().is_running());
		runtime.shutdown().unwrap();
		assert_eq!(*log.lock().unwrap(), vec!["init first", "init second", "shutdown second", "shutdown first"]);
	}

	#[test]
	fn test_failed_client_module_unwinds() {
		let log = Arc::new(Mutex::new(Vec::new()));
		let err = builder(&log, true).build().err().unwrap();
		assert_eq!(err, Error::Config("second refused".to_string()));
		assert_eq!(*log.lock().unwrap(), vec!["init first", "shutdown first"]);
	}
}
