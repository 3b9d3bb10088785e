// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Resource tables.
//!
//! Each side owns one table mapping ids to lifetime-managed resources. The
//! two tables are never merged: the same numeric id may be live on both sides
//! as two unrelated resources.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tether_type::{ForeignRef, RefId, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
	Object,
	Function,
	Buffer,
}

impl ResourceKind {
	pub fn as_str(self) -> &'static str {
		match self {
			ResourceKind::Object => "object",
			ResourceKind::Function => "function",
			ResourceKind::Buffer => "buffer",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
	Released,
	/// The resource was not live. Reported, never fatal.
	AlreadyReleased,
}

/// One live entry of a table dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveResource {
	pub id: RefId,
	pub kind: ResourceKind,
	pub label: String,
}

struct Slot<T> {
	kind: ResourceKind,
	label: String,
	value: T,
}

pub struct HandleTable<T> {
	side: Side,
	next_id: u32,
	slots: HashMap<RefId, Slot<T>>,
}

impl<T> HandleTable<T> {
	pub fn new(side: Side) -> Self {
		Self {
			side,
			next_id: 1,
			slots: HashMap::new(),
		}
	}

	pub fn side(&self) -> Side {
		self.side
	}

	/// Store `value` under a fresh id.
	///
	/// Ids increase monotonically and wrap around; zero and live ids are
	/// skipped so an id is never handed out twice while live.
	pub fn allocate(&mut self, kind: ResourceKind, label: impl Into<String>, value: T) -> ForeignRef {
		let id = loop {
			let candidate = RefId(self.next_id);
			self.next_id = self.next_id.wrapping_add(1);
			if self.next_id == 0 {
				self.next_id = 1;
			}
			if !self.slots.contains_key(&candidate) {
				break candidate;
			}
		};

		self.slots.insert(
			id,
			Slot {
				kind,
				label: label.into(),
				value,
			},
		);
		ForeignRef::new(id, self.side)
	}

	pub fn get(&self, id: RefId) -> Option<(ResourceKind, &T)> {
		self.slots.get(&id).map(|slot| (slot.kind, &slot.value))
	}

	pub fn kind(&self, id: RefId) -> Option<ResourceKind> {
		self.slots.get(&id).map(|slot| slot.kind)
	}

	/// Remove a live resource and hand it back, `None` if it is not live.
	///
	/// The value is returned so the caller can drop it after giving up its
	/// borrow of the table.
	pub fn release(&mut self, id: RefId) -> Option<T> {
		self.slots.remove(&id).map(|slot| slot.value)
	}

	pub fn is_live(&self, id: RefId) -> bool {
		self.slots.contains_key(&id)
	}

	pub fn len(&self) -> usize {
		self.slots.len()
	}

	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}

	/// Live resources ordered by id.
	pub fn dump(&self) -> Vec<LiveResource> {
		let mut live: Vec<LiveResource> = self
			.slots
			.iter()
			.map(|(id, slot)| LiveResource {
				id: *id,
				kind: slot.kind,
				label: slot.label.clone(),
			})
			.collect();
		live.sort_by_key(|resource| resource.id);
		live
	}

	/// Remove every resource, returning the values to drop.
	pub fn drain(&mut self) -> Vec<T> {
		std::mem::take(&mut self.slots).into_values().map(|slot| slot.value).collect()
	}
}
