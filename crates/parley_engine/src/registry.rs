#![forbid(unsafe_code)]

use std::collections::HashMap;

use parley_domain::{ConnectionId, RoomName};
use parley_protocol::Member;
use tracing::debug;

/// Registered identity and location of one live connection.
///
/// A connection appears here only once it has joined a room; "connected but
/// not yet joined" is represented by absence. A connection is in at most
/// one room at a time (single field, never a set).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionEntry {
	pub name: String,
	pub room: RoomName,
}

/// Tracks live connections and their declared identity/room.
///
/// Owned exclusively by the engine; broadcast decisions are made by
/// callers.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
	conns: HashMap<ConnectionId, ConnectionEntry>,
}

impl ConnectionRegistry {
	/// Record identity and room for a connection.
	///
	/// Idempotent per connection: re-joining overwrites. Returns the
	/// previous room when the connection moved, so the caller can run the
	/// old room's leave cleanup.
	pub fn join(&mut self, conn: ConnectionId, name: String, room: RoomName) -> Option<RoomName> {
		let prev = self.conns.insert(conn.clone(), ConnectionEntry { name, room: room.clone() });

		match prev {
			Some(entry) if entry.room != room => {
				debug!(conn = %conn, from = %entry.room, to = %room, "connection moved rooms");
				Some(entry.room)
			}
			_ => None,
		}
	}

	/// Erase a connection, returning its last known entry for downstream
	/// cleanup.
	pub fn remove(&mut self, conn: &ConnectionId) -> Option<ConnectionEntry> {
		self.conns.remove(conn)
	}

	pub fn entry(&self, conn: &ConnectionId) -> Option<&ConnectionEntry> {
		self.conns.get(conn)
	}

	/// Snapshot of the room's current members, sorted by connection id.
	///
	/// A value copy: callers cannot observe later mutations through it.
	pub fn members_of(&self, room: &RoomName) -> Vec<Member> {
		let mut members: Vec<Member> = self
			.conns
			.iter()
			.filter(|(_, entry)| &entry.room == room)
			.map(|(id, entry)| Member {
				id: id.clone(),
				name: entry.name.clone(),
				room: entry.room.clone(),
			})
			.collect();
		members.sort_by(|a, b| a.id.cmp(&b.id));
		members
	}

	/// Snapshot of every registered connection, sorted by connection id.
	pub fn connections(&self) -> Vec<Member> {
		let mut members: Vec<Member> = self
			.conns
			.iter()
			.map(|(id, entry)| Member {
				id: id.clone(),
				name: entry.name.clone(),
				room: entry.room.clone(),
			})
			.collect();
		members.sort_by(|a, b| a.id.cmp(&b.id));
		members
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn conn(id: &str) -> ConnectionId {
		ConnectionId::new(id).unwrap()
	}

	fn room(name: &str) -> RoomName {
		RoomName::new(name).unwrap()
	}

	#[test]
	fn join_is_idempotent_and_overwrites() {
		let mut reg = ConnectionRegistry::default();
		assert_eq!(reg.join(conn("c1"), "alice".into(), room("a")), None);
		assert_eq!(reg.join(conn("c1"), "alicia".into(), room("a")), None);
		assert_eq!(reg.entry(&conn("c1")).unwrap().name, "alicia");
	}

	#[test]
	fn join_reports_previous_room_on_move() {
		let mut reg = ConnectionRegistry::default();
		reg.join(conn("c1"), "alice".into(), room("a"));
		assert_eq!(reg.join(conn("c1"), "alice".into(), room("b")), Some(room("a")));
		assert!(reg.members_of(&room("a")).is_empty());
		assert_eq!(reg.members_of(&room("b")).len(), 1);
	}

	#[test]
	fn remove_returns_last_known_entry() {
		let mut reg = ConnectionRegistry::default();
		reg.join(conn("c1"), "alice".into(), room("a"));
		let entry = reg.remove(&conn("c1")).unwrap();
		assert_eq!(entry.room, room("a"));
		assert!(reg.remove(&conn("c1")).is_none());
	}

	#[test]
	fn members_of_is_a_value_copy() {
		let mut reg = ConnectionRegistry::default();
		reg.join(conn("c2"), "bob".into(), room("a"));
		reg.join(conn("c1"), "alice".into(), room("a"));
		reg.join(conn("c3"), "carol".into(), room("b"));

		let snapshot = reg.members_of(&room("a"));
		assert_eq!(
			snapshot.iter().map(|m| m.id.as_str()).collect::<Vec<_>>(),
			vec!["c1", "c2"]
		);

		reg.remove(&conn("c1"));
		assert_eq!(snapshot.len(), 2);
		assert_eq!(reg.members_of(&room("a")).len(), 1);
	}
}
