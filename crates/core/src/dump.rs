// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use serde::{Deserialize, Serialize};
use tether_type::{ForeignRef, Result};

use crate::table::LiveResource;

/// Snapshot of both resource tables.
///
/// Empty after a correctly disposed session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDump {
	pub client: Vec<LiveResource>,
	pub server: Vec<LiveResource>,
	/// Releases parked in the safety area.
	pub deferred: Vec<ForeignRef>,
}

impl TableDump {
	pub fn is_empty(&self) -> bool {
		self.client.is_empty() && self.server.is_empty() && self.deferred.is_empty()
	}

	pub fn live_count(&self) -> usize {
		self.client.len() + self.server.len()
	}

	pub fn to_json(&self) -> Result<String> {
		Ok(serde_json::to_string(self)?)
	}
}

#[cfg(test)]
mod tests {
	use tether_type::RefId;

	use super::*;
	use crate::table::ResourceKind;

	#[test]
	fn test_json() {
		let dump = TableDump {
			client: vec![],
			server: vec![LiveResource {
				id: RefId(3),
				kind: ResourceKind::Object,
				label: "Widget".to_string(),
			}],
			deferred: vec![],
		};
		assert_eq!(
			dump.to_json().unwrap(),
			r#"{"client":[],"server":[{"id":3,"kind":"object","label":"Widget"}],"deferred":[]}"#
		);
		assert!(!dump.is_empty());
		assert_eq!(dump.live_count(), 1);
	}
}
