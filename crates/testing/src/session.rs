// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use tether_core::{Bridge, BridgeConfig, NativeLibrary, Runtime, ViolationPolicy};
use tether_sub_tracing::TracingBuilder;
use tether_type::Result;

use crate::{
	client::{WidgetClient, WidgetTokens},
	widget::WidgetModule,
};

/// Install a test subscriber once; later calls are no-ops.
pub fn init_tracing() {
	TracingBuilder::for_tests().init();
}

/// The configuration every test bridge uses: violations panic so tests can
/// assert on them.
pub fn test_config() -> BridgeConfig {
	BridgeConfig::default().with_violation_policy(ViolationPolicy::Panic)
}

/// Initialize a bridge over `library`.
pub fn session(library: NativeLibrary) -> Bridge {
	init_tracing();
	match Bridge::init(test_config(), library) {
		Ok(bridge) => bridge,
		Err(err) => panic!("test bridge failed to initialize: {}", err),
	}
}

/// A running widget toolkit with its client wrapper resolved.
pub struct Toolkit {
	runtime: Runtime,
	client: WidgetClient,
}

impl Toolkit {
	pub fn bridge(&self) -> &Bridge {
		self.runtime.bridge()
	}

	pub fn tokens(&self) -> Arc<WidgetTokens> {
		match self.client.tokens() {
			Some(tokens) => tokens,
			None => panic!("widget client is not initialized"),
		}
	}

	pub fn shutdown(self) -> Result<tether_core::TableDump> {
		self.runtime.shutdown()
	}
}

pub fn toolkit() -> Toolkit {
	toolkit_with(NativeLibrary::new())
}

/// A toolkit with `extra` modules initialized before `Widget`.
pub fn toolkit_with(extra: NativeLibrary) -> Toolkit {
	init_tracing();
	let client = WidgetClient::new();
	let runtime = Runtime::builder()
		.config(test_config())
		.library(extra)
		.module(WidgetModule)
		.client_module(client.clone())
		.build();
	match runtime {
		Ok(runtime) => Toolkit {
			runtime,
			client,
		},
		Err(err) => panic!("toolkit failed to start: {}", err),
	}
}
