// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Initialization and shutdown.
//!
//! `init` negotiates the client entry points, registers every native module
//! in order and seals the registry. `shutdown` drains the safety area, shuts
//! modules down in reverse order and reports what is still live.

mod library;
mod runtime;

use std::sync::Arc;

pub use library::NativeLibrary;
use library::ModuleSource;
pub use runtime::{ClientModule, Runtime, RuntimeBuilder};
use tether_abi::library::LibraryShutdownFFI;
use tether_type::{Error, Result};
use tracing::{error, info, warn};

use crate::{
	Bridge,
	config::BridgeConfig,
	dump::TableDump,
	ffi,
	registry::{ModuleBuilder, NativeModule},
	relay::{ClientEntryPoints, ClientRelay},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
	Registering,
	Running,
	ShuttingDown,
	Shutdown,
}

pub(crate) enum ShutdownHook {
	Native(Arc<dyn NativeModule>),
	Foreign(LibraryShutdownFFI),
}

impl Bridge {
	/// Initialize a bridge whose client side is served by [`ClientRelay`].
	pub fn init(config: BridgeConfig, library: NativeLibrary) -> Result<Bridge> {
		Self::init_with_entry_points(config, library, Arc::new(ClientRelay))
	}

	/// Initialize a bridge with custom client entry points.
	///
	/// Fails once, with [`Error::LibraryInit`], when a module cannot be
	/// registered; the session is unusable afterwards. Modules registered
	/// before the failing one are shut down in reverse order and every
	/// resource they allocated is released.
	pub fn init_with_entry_points(
		config: BridgeConfig,
		library: NativeLibrary,
		entry_points: Arc<dyn ClientEntryPoints>,
	) -> Result<Bridge> {
		config.validate()?;

		let NativeLibrary {
			sources,
			libraries,
		} = library;
		let bridge = Bridge::new(config, entry_points, libraries);

		for source in sources {
			if let Err(err) = bridge.register_source(source) {
				error!(%err, "bridge initialization failed");
				bridge.abandon_init();
				return Err(err);
			}
		}

		let core = bridge.core();
		core.registry.borrow_mut().seal();
		core.state.set(LifecycleState::Running);
		let registry = core.registry.borrow();
		info!(modules = registry.module_count(), methods = registry.method_count(), "bridge initialized");
		drop(registry);
		drop(core);

		Ok(bridge)
	}

	fn register_source(&self, source: ModuleSource) -> Result<()> {
		match source {
			ModuleSource::Native(module) => {
				let name = module.name().to_string();
				let registered = self.with_registry_mut(|registry| {
					let token = registry.register_module(&name)?;
					module.register(&mut ModuleBuilder::new(registry, token))
				});
				registered.map_err(|err| Error::LibraryInit(format!("module '{}': {}", name, err)))?;
				self.core().shutdown_hooks.borrow_mut().push(ShutdownHook::Native(module));
				Ok(())
			}
			ModuleSource::Foreign {
				name,
				init,
				shutdown,
			} => {
				ffi::run_library_init(self, &name, init)?;
				if let Some(shutdown) = shutdown {
					self.core().shutdown_hooks.borrow_mut().push(ShutdownHook::Foreign(shutdown));
				}
				Ok(())
			}
		}
	}

	/// Undo a partial init.
	fn abandon_init(&self) {
		let core = self.core();
		core.state.set(LifecycleState::ShuttingDown);
		self.run_shutdown_hooks();
		self.clear_tables();
		core.channel.borrow_mut().clear();
		core.scratch.borrow_mut().clear();
		core.registry.borrow_mut().clear();
		core.state.set(LifecycleState::Shutdown);
	}

	/// Run the recorded shutdown hooks, last registered first.
	fn run_shutdown_hooks(&self) {
		let hooks = self.core().shutdown_hooks.take();
		for hook in hooks.iter().rev() {
			match hook {
				ShutdownHook::Native(module) => module.shutdown(self),
				ShutdownHook::Foreign(shutdown) => ffi::run_library_shutdown(self, *shutdown),
			}
		}
		self.drain_safety_area(true);
	}

	/// Tear the bridge down.
	///
	/// Drains the safety area, shuts native modules down in reverse
	/// registration order, dumps and clears both tables. Returns the dump
	/// taken before clearing.
	pub fn shutdown(&self) -> Result<TableDump> {
		let core = self.core();
		match core.state.get() {
			LifecycleState::Running => {}
			LifecycleState::Registering => return Err(Error::NotInitialized),
			LifecycleState::ShuttingDown | LifecycleState::Shutdown => return Err(Error::ShutDown),
		}

		info!("bridge shutting down");
		core.state.set(LifecycleState::ShuttingDown);
		self.drain_safety_area(true);

		self.run_shutdown_hooks();

		let dump = self.dump_tables();
		if self.inner.config.dump_tables_on_shutdown {
			match dump.to_json() {
				Ok(json) => info!(tables = %json, "table dump at shutdown"),
				Err(err) => warn!(%err, "failed to serialize table dump"),
			}
		}
		if !dump.is_empty() {
			warn!(client = dump.client.len(), server = dump.server.len(), "resources still live at shutdown");
		}

		self.clear_tables();
		core.channel.borrow_mut().clear();
		core.scratch.borrow_mut().clear();
		core.registry.borrow_mut().clear();
		core.state.set(LifecycleState::Shutdown);
		info!("bridge shut down");

		if self.inner.config.fail_on_leaks && dump.live_count() > 0 {
			return Err(Error::ResourceLeak {
				client: dump.client.len(),
				server: dump.server.len(),
			});
		}
		Ok(dump)
	}
}
