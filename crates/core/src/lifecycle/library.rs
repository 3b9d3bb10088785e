// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! The native side of a bridge: Rust modules, `extern "C"` libraries linked
//! in, and shared libraries loaded at runtime.

use std::{path::Path, sync::Arc};

use libloading::Library;
use tether_abi::{
	constants::TETHER_ABI_VERSION,
	library::{
		LIBRARY_ABI_VERSION_SYMBOL, LIBRARY_INIT_SYMBOL, LIBRARY_SHUTDOWN_SYMBOL, LibraryAbiVersionFFI,
		LibraryInitFFI, LibraryShutdownFFI,
	},
};
use tether_type::{Error, Result};
use tracing::debug;

use crate::registry::NativeModule;

pub(crate) enum ModuleSource {
	Native(Arc<dyn NativeModule>),
	Foreign {
		name: String,
		init: LibraryInitFFI,
		shutdown: Option<LibraryShutdownFFI>,
	},
}

/// Everything a bridge initializes on the native side, in order.
#[derive(Default)]
pub struct NativeLibrary {
	pub(crate) sources: Vec<ModuleSource>,
	pub(crate) libraries: Vec<Library>,
}

impl NativeLibrary {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_module(mut self, module: impl NativeModule) -> Self {
		self.sources.push(ModuleSource::Native(Arc::new(module)));
		self
	}

	pub fn with_shared_module(mut self, module: Arc<dyn NativeModule>) -> Self {
		self.sources.push(ModuleSource::Native(module));
		self
	}

	/// Add a library linked into the process through its C ABI entry points.
	pub fn with_ffi_init(mut self, name: &str, init: LibraryInitFFI, shutdown: Option<LibraryShutdownFFI>) -> Self {
		self.sources.push(ModuleSource::Foreign {
			name: name.to_string(),
			init,
			shutdown,
		});
		self
	}

	/// Load a shared library exporting `tether_library_init`.
	pub fn load(mut self, path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let name = path.display().to_string();

		// SAFETY: loading runs the library's initializers; the library is
		// trusted native code of this bridge.
		let library = unsafe { Library::new(path) }
			.map_err(|err| Error::LibraryInit(format!("failed to load {}: {}", name, err)))?;

		// SAFETY: the symbol type is fixed by the tether ABI.
		if let Ok(version) = unsafe { library.get::<LibraryAbiVersionFFI>(LIBRARY_ABI_VERSION_SYMBOL) } {
			let version = version();
			if version != TETHER_ABI_VERSION {
				return Err(Error::LibraryInit(format!(
					"{} was built for ABI version {}, host speaks {}",
					name, version, TETHER_ABI_VERSION
				)));
			}
		}

		// SAFETY: as above.
		let init = unsafe { library.get::<LibraryInitFFI>(LIBRARY_INIT_SYMBOL) }
			.map(|symbol| *symbol)
			.map_err(|err| Error::LibraryInit(format!("{}: missing tether_library_init: {}", name, err)))?;

		// SAFETY: as above; the shutdown symbol is optional.
		let shutdown =
			unsafe { library.get::<LibraryShutdownFFI>(LIBRARY_SHUTDOWN_SYMBOL) }.ok().map(|symbol| *symbol);

		debug!(library = %name, has_shutdown = shutdown.is_some(), "loaded native library");
		self.sources.push(ModuleSource::Foreign {
			name,
			init,
			shutdown,
		});
		self.libraries.push(library);
		Ok(self)
	}

	pub fn len(&self) -> usize {
		self.sources.len()
	}

	pub fn is_empty(&self) -> bool {
		self.sources.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_missing_library() {
		let err = NativeLibrary::new().load("/nonexistent/libtether_missing.so").err().unwrap();
		assert!(matches!(err, Error::LibraryInit(_)));
	}
}
