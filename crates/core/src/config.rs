// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use serde::{Deserialize, Serialize};
use tether_type::{Error, Result};

/// What the bridge does after logging a protocol violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationPolicy {
	/// Abort the process.
	#[default]
	Abort,
	/// Panic on the calling thread. Used by tests.
	Panic,
}

/// Configuration of a bridge, fixed at initialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
	pub violation_policy: ViolationPolicy,
	/// Maximum number of values pending on the channel.
	pub max_channel_depth: usize,
	/// Move client releases of server resources requested during a native
	/// call into the safety area.
	pub defer_releases_in_calls: bool,
	/// Log the table dump at shutdown.
	pub dump_tables_on_shutdown: bool,
	/// Fail shutdown when resources are still live.
	pub fail_on_leaks: bool,
}

impl Default for BridgeConfig {
	fn default() -> Self {
		Self {
			violation_policy: ViolationPolicy::Abort,
			max_channel_depth: 65_536,
			defer_releases_in_calls: true,
			dump_tables_on_shutdown: true,
			fail_on_leaks: false,
		}
	}
}

impl BridgeConfig {
	pub fn from_json(json: &str) -> Result<Self> {
		let config: BridgeConfig = serde_json::from_str(json)?;
		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> Result<()> {
		if self.max_channel_depth == 0 {
			return Err(Error::Config("max_channel_depth must be greater than zero".to_string()));
		}
		Ok(())
	}

	pub fn with_violation_policy(mut self, policy: ViolationPolicy) -> Self {
		self.violation_policy = policy;
		self
	}

	pub fn with_max_channel_depth(mut self, depth: usize) -> Self {
		self.max_channel_depth = depth;
		self
	}

	pub fn with_defer_releases_in_calls(mut self, defer: bool) -> Self {
		self.defer_releases_in_calls = defer;
		self
	}

	pub fn with_dump_tables_on_shutdown(mut self, dump: bool) -> Self {
		self.dump_tables_on_shutdown = dump;
		self
	}

	pub fn with_fail_on_leaks(mut self, fail: bool) -> Self {
		self.fail_on_leaks = fail;
		self
	}
}
