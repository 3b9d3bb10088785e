// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

//! Opaque registry tokens.
//!
//! A token is handed out once when a name is resolved and is then cached by
//! the caller for the lifetime of the bridge. Tokens carry no arithmetic; the
//! raw value only exists so the C ABI can pass them through.

use std::{
	fmt::{Display, Formatter},
	num::NonZeroU32,
};

macro_rules! define_token {
	($(#[$meta:meta])* $name:ident, $label:literal) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
		pub struct $name(NonZeroU32);

		impl $name {
			/// Rebuild a token from its raw ABI value. Zero is not a token.
			pub fn from_raw(raw: u32) -> Option<Self> {
				NonZeroU32::new(raw).map(Self)
			}

			pub fn raw(self) -> u32 {
				self.0.get()
			}

			#[doc(hidden)]
			pub fn from_index(index: usize) -> Self {
				let raw = u32::try_from(index + 1).unwrap_or(u32::MAX);
				Self(NonZeroU32::new(raw).unwrap_or(NonZeroU32::MAX))
			}

			#[doc(hidden)]
			pub fn index(self) -> usize {
				(self.0.get() - 1) as usize
			}
		}

		impl Display for $name {
			fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
				write!(f, concat!($label, "({})"), self.0)
			}
		}
	};
}

define_token!(
	/// A resolved native module.
	ModuleToken,
	"module"
);

define_token!(
	/// A resolved (module, method) pair.
	MethodToken,
	"method"
);

define_token!(
	/// A resolved interface declared by a native module.
	InterfaceToken,
	"interface"
);

define_token!(
	/// A resolved (interface, method) pair.
	InterfaceMethodToken,
	"interface-method"
);

define_token!(
	/// A resolved exception kind declared by a native module.
	ExceptionToken,
	"exception"
);

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_zero_is_not_a_token() {
		assert!(MethodToken::from_raw(0).is_none());
	}

	#[test]
	fn test_index_round_trip() {
		let token = ModuleToken::from_index(4);
		assert_eq!(token.raw(), 5);
		assert_eq!(token.index(), 4);
		assert_eq!(ModuleToken::from_raw(5), Some(token));
	}
}
