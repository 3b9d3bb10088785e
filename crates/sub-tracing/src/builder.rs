// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use serde::{Deserialize, Serialize};
use tether_type::{Error, Result};
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt};

/// Output format of the fmt subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
	#[default]
	Compact,
	Pretty,
	Json,
}

/// Builder for the global tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured level when it is set.
#[derive(Debug, Clone)]
pub struct TracingBuilder {
	level: Level,
	format: Format,
	with_target: bool,
	filter: Option<String>,
	test_writer: bool,
}

impl Default for TracingBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl TracingBuilder {
	pub fn new() -> Self {
		Self {
			level: Level::INFO,
			format: Format::Compact,
			with_target: true,
			filter: None,
			test_writer: false,
		}
	}

	/// Preset for tests: debug level, output captured by the test harness
	pub fn for_tests() -> Self {
		Self::new().with_level(Level::DEBUG).with_test_writer(true)
	}

	pub fn with_level(mut self, level: Level) -> Self {
		self.level = level;
		self
	}

	pub fn with_format(mut self, format: Format) -> Self {
		self.format = format;
		self
	}

	pub fn with_target(mut self, with_target: bool) -> Self {
		self.with_target = with_target;
		self
	}

	/// Explicit filter directives, e.g. `tether_core=trace,info`
	pub fn with_filter(mut self, directives: impl Into<String>) -> Self {
		self.filter = Some(directives.into());
		self
	}

	pub fn with_test_writer(mut self, test_writer: bool) -> Self {
		self.test_writer = test_writer;
		self
	}

	pub fn level(&self) -> Level {
		self.level
	}

	pub fn format(&self) -> Format {
		self.format
	}

	pub(crate) fn env_filter(&self) -> Result<EnvFilter> {
		match &self.filter {
			Some(directives) => EnvFilter::try_new(directives).map_err(|err| Error::Config(err.to_string())),
			None => Ok(EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| EnvFilter::new(self.level.as_str().to_lowercase()))),
		}
	}

	/// Install the subscriber globally
	///
	/// Fails when a global subscriber is already installed.
	pub fn try_init(self) -> Result<()> {
		let filter = self.env_filter()?;
		let builder = fmt().with_env_filter(filter).with_target(self.with_target);

		let result = match (self.format, self.test_writer) {
			(Format::Compact, false) => builder.compact().try_init(),
			(Format::Compact, true) => builder.compact().with_test_writer().try_init(),
			(Format::Pretty, false) => builder.pretty().try_init(),
			(Format::Pretty, true) => builder.pretty().with_test_writer().try_init(),
			(Format::Json, false) => builder.json().try_init(),
			(Format::Json, true) => builder.json().with_test_writer().try_init(),
		};
		result.map_err(|err| Error::Config(format!("tracing subscriber: {}", err)))
	}

	/// Install the subscriber, ignoring an already installed one
	pub fn init(self) {
		let _ = self.try_init();
	}
}
