// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tether_type::{FromValue, Value};

use crate::Bridge;

/// The static marshaling contract of a callback signature.
///
/// The caller pushes the arguments last-first so the callee pops them in
/// declared order.
pub trait CallbackArgs: Sized {
	fn push_args(self, bridge: &Bridge);

	fn pop_args(bridge: &Bridge) -> Self;
}

impl CallbackArgs for () {
	fn push_args(self, _bridge: &Bridge) {}

	fn pop_args(_bridge: &Bridge) -> Self {}
}

impl<A> CallbackArgs for (A,)
where
	A: Into<Value> + FromValue,
{
	fn push_args(self, bridge: &Bridge) {
		bridge.push(self.0);
	}

	fn pop_args(bridge: &Bridge) -> Self {
		(bridge.pop(),)
	}
}

impl<A, B> CallbackArgs for (A, B)
where
	A: Into<Value> + FromValue,
	B: Into<Value> + FromValue,
{
	fn push_args(self, bridge: &Bridge) {
		bridge.push(self.1);
		bridge.push(self.0);
	}

	fn pop_args(bridge: &Bridge) -> Self {
		let a = bridge.pop();
		let b = bridge.pop();
		(a, b)
	}
}

impl<A, B, C> CallbackArgs for (A, B, C)
where
	A: Into<Value> + FromValue,
	B: Into<Value> + FromValue,
	C: Into<Value> + FromValue,
{
	fn push_args(self, bridge: &Bridge) {
		bridge.push(self.2);
		bridge.push(self.1);
		bridge.push(self.0);
	}

	fn pop_args(bridge: &Bridge) -> Self {
		let a = bridge.pop();
		let b = bridge.pop();
		let c = bridge.pop();
		(a, b, c)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::session;

	#[test]
	fn test_pop_in_declared_order() {
		let bridge = session();
		(1_i32, "two".to_string(), false).push_args(&bridge);
		assert_eq!(bridge.pop::<i32>(), 1);
		assert_eq!(bridge.pop::<String>(), "two");
		assert!(!bridge.pop::<bool>());
	}

	#[test]
	fn test_round_trip() {
		let bridge = session();
		(7_u16, Some("x".to_string())).push_args(&bridge);
		let (a, b): (u16, Option<String>) = CallbackArgs::pop_args(&bridge);
		assert_eq!(a, 7);
		assert_eq!(b.as_deref(), Some("x"));
	}
}
