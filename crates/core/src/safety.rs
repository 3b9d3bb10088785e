// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! The safety area.
//!
//! Server resources the client wants to release while a native call is in
//! flight are parked here. The native side grants permission to release them
//! through `clear_safety_area`; the client is never forced to.

use tether_type::{ForeignRef, MethodToken};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeferredRelease {
	pub reference: ForeignRef,
	/// Method releasing the resource, `None` to drop it from its table.
	pub dispose: Option<MethodToken>,
}

#[derive(Debug, Default)]
pub struct SafetyArea {
	pending: Vec<DeferredRelease>,
}

impl SafetyArea {
	/// Park a release. A resource is parked at most once.
	pub fn defer(&mut self, release: DeferredRelease) -> bool {
		if self.pending.iter().any(|pending| pending.reference == release.reference) {
			return false;
		}
		self.pending.push(release);
		true
	}

	/// Take every parked release, oldest first.
	pub fn take(&mut self) -> Vec<DeferredRelease> {
		std::mem::take(&mut self.pending)
	}

	pub fn references(&self) -> Vec<ForeignRef> {
		self.pending.iter().map(|pending| pending.reference).collect()
	}

	pub fn len(&self) -> usize {
		self.pending.len()
	}

	pub fn is_empty(&self) -> bool {
		self.pending.is_empty()
	}
}
