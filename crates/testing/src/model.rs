// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Values shared by the mock toolkit and its client wrapper

use tether_core::Bridge;
use tether_sdk::{ChannelVariant, channel_struct};

channel_struct! {
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
	pub struct Rect {
		x: i32,
		y: i32,
		width: i32,
		height: i32,
	}
}

channel_struct! {
	#[derive(Debug, Clone, PartialEq, Eq)]
	pub struct Item {
		label: String,
		checked: bool,
	}
}

/// The last thing that happened to a widget
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WidgetEvent {
	#[default]
	None,
	Shown,
	Renamed {
		from: String,
		to: String,
	},
	Resized(i32),
}

impl ChannelVariant for WidgetEvent {
	const NAME: &'static str = "WidgetEvent";

	fn tag(&self) -> i32 {
		match self {
			WidgetEvent::None => 0,
			WidgetEvent::Shown => 1,
			WidgetEvent::Renamed {
				..
			} => 2,
			WidgetEvent::Resized(_) => 3,
		}
	}

	fn push_fields(self, bridge: &Bridge) {
		match self {
			WidgetEvent::None | WidgetEvent::Shown => {}
			WidgetEvent::Renamed {
				from,
				to,
			} => {
				bridge.push(to);
				bridge.push(from);
			}
			WidgetEvent::Resized(width) => bridge.push(width),
		}
	}

	fn pop_fields(tag: i32, bridge: &Bridge) -> Option<Self> {
		Some(match tag {
			0 => WidgetEvent::None,
			1 => WidgetEvent::Shown,
			2 => WidgetEvent::Renamed {
				from: bridge.pop(),
				to: bridge.pop(),
			},
			3 => WidgetEvent::Resized(bridge.pop()),
			_ => return None,
		})
	}
}
