// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Bridge core: value channel, native registry, resource tables, callback
//! relay and the C ABI host side.

mod bridge;
pub mod channel;
pub mod config;
pub mod dump;
mod ffi;
pub mod lifecycle;
pub mod registry;
pub mod relay;
pub mod safety;
pub mod table;

pub use bridge::{Bridge, WeakBridge};
pub use channel::Channel;
pub use config::{BridgeConfig, ViolationPolicy};
pub use dump::TableDump;
pub use lifecycle::{ClientModule, LifecycleState, NativeLibrary, Runtime, RuntimeBuilder};
pub use registry::{ModuleBuilder, NativeFn, NativeModule, Registry};
pub use relay::{CallbackArgs, ClientEntryPoints, ClientObject, ClientRelay, Remote};
pub use safety::{DeferredRelease, SafetyArea};
pub use table::{HandleTable, LiveResource, ReleaseOutcome, ResourceKind};
pub use tether_type;
