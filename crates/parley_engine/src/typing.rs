#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use parley_domain::ConnectionId;

/// Transient record of who is currently composing in a room.
///
/// Entries are added on "start typing" and removed on "stop typing" or
/// disconnect. The engine enforces no TTL; staleness cleanup is the
/// transport layer's responsibility via disconnect events.
#[derive(Debug, Default)]
pub struct TypingSet {
	entries: BTreeMap<ConnectionId, String>,
}

impl TypingSet {
	pub fn set(&mut self, conn: ConnectionId, name: String, is_typing: bool) {
		if is_typing {
			self.entries.insert(conn, name);
		} else {
			self.entries.remove(&conn);
		}
	}

	/// Remove any entry unconditionally. Returns whether one was present.
	pub fn clear(&mut self, conn: &ConnectionId) -> bool {
		self.entries.remove(conn).is_some()
	}

	/// Display names currently typing, for broadcast.
	pub fn names(&self) -> Vec<String> {
		self.entries.values().cloned().collect()
	}

	pub fn contains(&self, conn: &ConnectionId) -> bool {
		self.entries.contains_key(conn)
	}
}
