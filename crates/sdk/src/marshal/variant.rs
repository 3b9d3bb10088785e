// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tether_core::Bridge;
use tether_type::Error;

/// A tagged union crossing the channel: the tag, then exactly the fields of
/// that tag.
pub trait ChannelVariant: Sized {
	const NAME: &'static str;

	fn tag(&self) -> i32;

	/// Push the fields of this variant, last field first.
	fn push_fields(self, bridge: &Bridge);

	/// Pop the fields of `tag` in declaration order, `None` for an unknown tag.
	fn pop_fields(tag: i32, bridge: &Bridge) -> Option<Self>;
}

/// The tag is pushed last so it is popped first.
pub fn push_variant<V: ChannelVariant>(bridge: &Bridge, value: V) {
	let tag = value.tag();
	value.push_fields(bridge);
	bridge.push(tag);
}

pub fn pop_variant<V: ChannelVariant>(bridge: &Bridge) -> V {
	let tag: i32 = bridge.pop();
	V::pop_fields(tag, bridge).unwrap_or_else(|| {
		bridge.violation(Error::UnknownVariantTag {
			variant: V::NAME,
			tag,
		})
	})
}
