// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// The side of the bridge that allocated a resource.
///
/// Ownership never moves: a reference crossing the boundary keeps the side
/// that created the underlying resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
	Client,
	Server,
}

impl Side {
	pub fn is_client(self) -> bool {
		matches!(self, Side::Client)
	}

	pub fn is_server(self) -> bool {
		matches!(self, Side::Server)
	}

	pub fn opposite(self) -> Side {
		match self {
			Side::Client => Side::Server,
			Side::Server => Side::Client,
		}
	}
}

impl Display for Side {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Side::Client => f.write_str("client"),
			Side::Server => f.write_str("server"),
		}
	}
}

/// Numeric identity of a resource inside one side's table.
///
/// Zero is never allocated; the C ABI uses it as "no resource".
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RefId(pub u32);

impl RefId {
	pub const NONE: RefId = RefId(0);

	pub fn is_none(self) -> bool {
		self.0 == 0
	}
}

impl From<u32> for RefId {
	fn from(value: u32) -> Self {
		RefId(value)
	}
}

impl From<RefId> for u32 {
	fn from(value: RefId) -> Self {
		value.0
	}
}

impl Display for RefId {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		Display::fmt(&self.0, f)
	}
}

/// A reference to a resource living on one side of the bridge.
///
/// The id is only meaningful together with its side: the same numeric id may
/// be live in both tables at once as two unrelated resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ForeignRef {
	pub id: RefId,
	pub side: Side,
}

impl ForeignRef {
	pub const fn new(id: RefId, side: Side) -> Self {
		Self {
			id,
			side,
		}
	}

	pub const fn client(id: u32) -> Self {
		Self::new(RefId(id), Side::Client)
	}

	pub const fn server(id: u32) -> Self {
		Self::new(RefId(id), Side::Server)
	}
}

impl Display for ForeignRef {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}#{}", self.side, self.id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_same_id_on_both_sides_is_distinct() {
		let client = ForeignRef::client(7);
		let server = ForeignRef::server(7);
		assert_ne!(client, server);
		assert_eq!(client.id, server.id);
	}

	#[test]
	fn test_display() {
		assert_eq!(ForeignRef::server(3).to_string(), "server#3");
		assert_eq!(ForeignRef::client(12).to_string(), "client#12");
	}

	#[test]
	fn test_opposite() {
		assert_eq!(Side::Client.opposite(), Side::Server);
		assert_eq!(Side::Server.opposite(), Side::Client);
	}
}
