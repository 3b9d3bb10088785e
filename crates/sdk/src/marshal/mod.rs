// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Struct and variant marshaling
//!
//! A struct travels as its fields, pushed last field first so the receiver
//! pops them in declaration order. An array of structs travels as one array
//! per field (columnar), in the same order.

mod variant;

use tether_core::Bridge;
pub use variant::{ChannelVariant, pop_variant, push_variant};

pub trait ChannelStruct: Sized {
	fn push_to(self, bridge: &Bridge);

	fn pop_from(bridge: &Bridge) -> Self;

	fn push_columns(items: Vec<Self>, bridge: &Bridge);

	/// Columns of different lengths are a protocol violation.
	fn pop_columns(bridge: &Bridge) -> Vec<Self>;
}

/// Declare a struct that crosses the channel.
///
/// Every field must be a scalar that can also travel inside an array.
///
/// ```ignore
/// channel_struct! {
/// 	#[derive(Debug, Clone, PartialEq)]
/// 	pub struct Rect {
/// 		x: i32,
/// 		y: i32,
/// 	}
/// }
/// ```
#[macro_export]
macro_rules! channel_struct {
	(
		$(#[$meta:meta])*
		$vis:vis struct $name:ident {
			$($field:ident : $ty:ty),+ $(,)?
		}
	) => {
		$(#[$meta])*
		$vis struct $name {
			$(pub $field: $ty),+
		}

		impl $crate::marshal::ChannelStruct for $name {
			fn push_to(self, bridge: &$crate::tether_core::Bridge) {
				let values: ::std::vec::Vec<$crate::tether_type::Value> =
					::std::vec![$(::std::convert::Into::into(self.$field)),+];
				for value in values.into_iter().rev() {
					bridge.push(value);
				}
			}

			fn pop_from(bridge: &$crate::tether_core::Bridge) -> Self {
				Self {
					$($field: bridge.pop::<$ty>()),+
				}
			}

			fn push_columns(items: ::std::vec::Vec<Self>, bridge: &$crate::tether_core::Bridge) {
				$(let mut $field: ::std::vec::Vec<$ty> = ::std::vec::Vec::with_capacity(items.len());)+
				for item in items {
					$($field.push(item.$field);)+
				}
				let columns: ::std::vec::Vec<$crate::tether_type::Value> =
					::std::vec![$($crate::tether_type::Value::from($field)),+];
				for column in columns.into_iter().rev() {
					bridge.push(column);
				}
			}

			fn pop_columns(bridge: &$crate::tether_core::Bridge) -> ::std::vec::Vec<Self> {
				$(let $field: ::std::vec::Vec<$ty> = bridge.pop();)+
				let lengths = [$($field.len()),+];
				let expected = lengths[0];
				for found in lengths {
					if found != expected {
						bridge.violation($crate::tether_type::Error::ColumnLengthMismatch {
							expected,
							found,
						});
					}
				}

				$(let mut $field = $field.into_iter();)+
				let mut items = ::std::vec::Vec::with_capacity(expected);
				while let ($(Some($field),)+) = ($($field.next(),)+) {
					items.push(Self {
						$($field),+
					});
				}
				items
			}
		}
	};
}
