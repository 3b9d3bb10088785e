// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Tether: a typed value channel, handle tables and a callback relay between
//! a managed client and native libraries.
//!
//! ```ignore
//! use tether::prelude::*;
//!
//! let bridge = Bridge::init(BridgeConfig::default(), NativeLibrary::new().with_module(MyModule))?;
//! let module = bridge.resolve_module("My");
//! let method = bridge.resolve_method(module, "hello");
//! bridge.push("world");
//! bridge.invoke_with_exception_capture(method)?;
//! let greeting: String = bridge.pop();
//! bridge.shutdown()?;
//! ```

pub use tether_abi as abi;
pub use tether_core as core;
pub use tether_core::{
	Bridge, BridgeConfig, Channel, ClientEntryPoints, ClientModule, ClientObject, ClientRelay, LifecycleState,
	ModuleBuilder, NativeLibrary, NativeModule, Remote, Runtime, RuntimeBuilder, TableDump, ViolationPolicy,
	WeakBridge,
};
pub use tether_sdk as sdk;
pub use tether_sub_tracing as sub_tracing;
pub use tether_type::{
	Error, Exception, ExceptionToken, ForeignRef, FuncRef, InterfaceMethodToken, InterfaceToken, MethodToken,
	ModuleToken, Result, Side, Value, ValueKind,
};

pub mod prelude {
	pub use tether_sdk::{
		ChannelStruct, ChannelVariant, Class, Disposable, EmitsSignal, Handle, HasHandle, TokenSet, channel_struct,
	};
	pub use tether_sub_tracing::TracingBuilder;

	pub use crate::{
		Bridge, BridgeConfig, ClientModule, ClientObject, Exception, ForeignRef, FuncRef, ModuleBuilder,
		NativeLibrary, NativeModule, Runtime, Value, ViolationPolicy,
	};
}
