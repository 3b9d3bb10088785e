// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! The value channel.
//!
//! One untyped LIFO stack carries every argument and every result in both
//! directions. Callers push arguments last-declared first so the callee pops
//! them in declaration order.

use tether_type::{Error, FromValue, Result, Value, ValueKind};
use tracing::trace;

pub struct Channel {
	values: Vec<Value>,
	limit: usize,
	/// Lowest depth observed since each open frame was entered.
	frames: Vec<usize>,
}

impl Channel {
	pub fn new(limit: usize) -> Self {
		Self {
			values: Vec::new(),
			limit,
			frames: Vec::new(),
		}
	}

	pub fn push(&mut self, value: Value) -> Result<()> {
		if self.values.len() >= self.limit {
			return Err(Error::ChannelOverflow {
				limit: self.limit,
			});
		}
		trace!(kind = %value.kind(), depth = self.values.len() + 1, "push");
		self.values.push(value);
		Ok(())
	}

	/// Pop the top value as `T`.
	///
	/// On a shape mismatch the value stays on the channel.
	pub fn pop<T: FromValue>(&mut self) -> Result<T> {
		let Some(value) = self.values.pop() else {
			return Err(Error::ChannelUnderflow {
				expected: T::kind(),
			});
		};

		match T::from_value(value) {
			Ok(result) => {
				self.observe_depth();
				trace!(kind = %T::kind(), depth = self.values.len(), "pop");
				Ok(result)
			}
			Err(value) => {
				let found = value.kind();
				self.values.push(value);
				Err(Error::ShapeMismatch {
					expected: T::kind(),
					found,
				})
			}
		}
	}

	/// Pop the top value whatever its shape.
	pub fn pop_value(&mut self) -> Option<Value> {
		let value = self.values.pop()?;
		self.observe_depth();
		trace!(kind = %value.kind(), depth = self.values.len(), "pop");
		Some(value)
	}

	pub fn peek_kind(&self) -> Option<ValueKind> {
		self.values.last().map(Value::kind)
	}

	pub fn depth(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	/// Start tracking the low-water mark of a native call.
	pub fn enter_frame(&mut self) {
		self.frames.push(self.values.len());
	}

	/// Stop tracking the innermost frame and return its low-water mark.
	///
	/// The mark is folded into the enclosing frame: values the inner call
	/// consumed were consumed by the outer call too.
	pub fn leave_frame(&mut self) -> usize {
		let mark = self.frames.pop().unwrap_or(self.values.len());
		if let Some(parent) = self.frames.last_mut() {
			*parent = (*parent).min(mark);
		}
		mark
	}

	/// Drop every value above `depth`.
	pub fn truncate(&mut self, depth: usize) {
		if depth < self.values.len() {
			trace!(from = self.values.len(), to = depth, "truncate");
			self.values.truncate(depth);
		}
	}

	pub fn clear(&mut self) {
		self.values.clear();
		self.frames.clear();
	}

	fn observe_depth(&mut self) {
		let depth = self.values.len();
		if let Some(mark) = self.frames.last_mut() {
			*mark = (*mark).min(depth);
		}
	}
}
