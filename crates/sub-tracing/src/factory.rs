// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tether_type::Result;

use crate::builder::TracingBuilder;

/// Configuration function for the tracing subscriber
pub type TracingConfigurator = Box<dyn FnOnce(TracingBuilder) -> TracingBuilder + Send>;

/// Deferred tracing setup, installed once the host is ready
pub struct TracingFactory {
	configurator: Option<TracingConfigurator>,
}

impl TracingFactory {
	/// Create a new factory with default configuration
	pub fn new() -> Self {
		Self {
			configurator: None,
		}
	}

	/// Create a factory with a custom configurator
	pub fn with_configurator<F>(configurator: F) -> Self
	where
		F: FnOnce(TracingBuilder) -> TracingBuilder + Send + 'static,
	{
		Self {
			configurator: Some(Box::new(configurator)),
		}
	}

	pub fn builder(self) -> TracingBuilder {
		match self.configurator {
			Some(configurator) => configurator(TracingBuilder::new()),
			None => TracingBuilder::default(),
		}
	}

	pub fn install(self) -> Result<()> {
		self.builder().try_init()
	}
}

impl Default for TracingFactory {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use tracing::Level;

	use super::*;
	use crate::Format;

	#[test]
	fn test_configurator_applied() {
		let factory = TracingFactory::with_configurator(|builder| builder.with_level(Level::TRACE).with_format(Format::Json));
		let builder = factory.builder();
		assert_eq!(builder.level(), Level::TRACE);
		assert_eq!(builder.format(), Format::Json);
	}
}
