// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

pub mod channel;
pub mod log;
pub mod registry;
pub mod relay;
pub mod resource;

use channel::ChannelCallbacks;
use log::LogCallbacks;
use registry::RegistryCallbacks;
use relay::RelayCallbacks;
use resource::ResourceCallbacks;

/// Every host service available to a native library
#[repr(C)]
#[derive(Clone, Copy)]
pub struct HostApiFFI {
	pub channel: ChannelCallbacks,
	pub registry: RegistryCallbacks,
	pub resource: ResourceCallbacks,
	pub relay: RelayCallbacks,
	pub log: LogCallbacks,
}
