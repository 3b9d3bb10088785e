// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! `Echo`: hands every value straight back

use tether_core::{ModuleBuilder, NativeModule};
use tether_type::{Exception, Result, Value};

pub struct EchoModule;

impl EchoModule {
	pub const NAME: &'static str = "Echo";
}

impl NativeModule for EchoModule {
	fn name(&self) -> &str {
		Self::NAME
	}

	fn register(&self, module: &mut ModuleBuilder<'_>) -> Result<()> {
		module.constant("INT64_MIN", i64::MIN)?;
		module.constant("INT64_MAX", i64::MAX)?;
		module.constant("EMPTY", "")?;
		module.constant("NOTHING", Value::Null)?;
		let failure = module.exception("EchoFailure")?;

		// pop one value of any shape, push it back
		module.method("echo", |bridge| {
			let value = bridge.pop_value();
			bridge.push(value);
			Ok(())
		})?;

		// pop `count` then `count` values; push them back so they pop in the
		// same order
		module.method("echo_many", |bridge| {
			let count: u32 = bridge.pop();
			let values: Vec<Value> = (0..count).map(|_| bridge.pop_value()).collect();
			for value in values.into_iter().rev() {
				bridge.push(value);
			}
			Ok(())
		})?;

		module.method("depth", |bridge| {
			bridge.push(bridge.channel_depth() as u64);
			Ok(())
		})?;

		// pop a message, raise it
		module.method("fail", move |bridge| {
			let message: String = bridge.pop();
			Err(Exception::of_kind(failure, message))
		})?;

		Ok(())
	}
}
