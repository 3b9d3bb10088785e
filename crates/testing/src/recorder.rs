// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! `Recorder`: keeps a log of what it was called with

use std::sync::Arc;

use parking_lot::Mutex;
use tether_core::{Bridge, ModuleBuilder, NativeModule};
use tether_type::Result;

#[derive(Clone, Default)]
pub struct RecorderModule {
	log: Arc<Mutex<Vec<String>>>,
}

impl RecorderModule {
	pub const NAME: &'static str = "Recorder";

	pub fn new() -> Self {
		Self::default()
	}

	pub fn entries(&self) -> Vec<String> {
		self.log.lock().clone()
	}

	fn push_entry(log: &Mutex<Vec<String>>, entry: String) {
		log.lock().push(entry);
	}
}

impl NativeModule for RecorderModule {
	fn name(&self) -> &str {
		Self::NAME
	}

	fn register(&self, module: &mut ModuleBuilder<'_>) -> Result<()> {
		// record(a: i32, b: string, c: bool)
		let log = self.log.clone();
		module.method("record", move |bridge| {
			let a: i32 = bridge.pop();
			let b: String = bridge.pop();
			let c: bool = bridge.pop();
			Self::push_entry(&log, format!("record {} {} {}", a, b, c));
			Ok(())
		})?;

		// call_back(callback: fn(i64) -> i64, value: i64) -> i64
		let log = self.log.clone();
		module.method("call_back", move |bridge| {
			let callback = bridge.pop_remote();
			let value: i64 = bridge.pop();
			Self::push_entry(&log, format!("call_back enter depth={}", bridge.call_depth()));
			callback.call((value,))?;
			let result: i64 = bridge.pop();
			Self::push_entry(&log, format!("call_back leave result={}", result));
			bridge.push(result);
			Ok(())
		})?;

		// call_optional(callback: fn() or null) -> bool
		module.method("call_optional", |bridge| {
			let called = match bridge.pop_optional_remote() {
				Some(callback) => {
					callback.exec()?;
					true
				}
				None => false,
			};
			bridge.push(called);
			Ok(())
		})?;

		Ok(())
	}

	fn shutdown(&self, _bridge: &Bridge) {
		Self::push_entry(&self.log, "shutdown".to_string());
	}
}
