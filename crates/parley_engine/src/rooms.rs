#![forbid(unsafe_code)]

use std::collections::HashMap;

use parley_domain::{MessageId, RoomName};
use parley_protocol::{Message, ReactionTable, ReadSet};
use tracing::debug;

use crate::backlog::Backlog;
use crate::typing::TypingSet;

/// Per-room container: backlog, typing presence, and the read/reaction
/// tables keyed by message id.
///
/// The tables only ever hold ids of messages currently in the backlog;
/// eviction purges them, so a stale id is a defined no-op everywhere.
#[derive(Debug)]
pub struct Room {
	pub(crate) backlog: Backlog,
	pub(crate) typing: TypingSet,
	pub(crate) reads: HashMap<MessageId, ReadSet>,
	pub(crate) reactions: HashMap<MessageId, ReactionTable>,
}

impl Room {
	fn new(backlog_capacity: usize) -> Self {
		Self {
			backlog: Backlog::new(backlog_capacity),
			typing: TypingSet::default(),
			reads: HashMap::new(),
			reactions: HashMap::new(),
		}
	}
}

/// Directory of all rooms in the process.
///
/// Rooms are created lazily on first use and live for the process lifetime;
/// there is no idle-room eviction.
#[derive(Debug)]
pub struct RoomDirectory {
	rooms: HashMap<RoomName, Room>,
	backlog_capacity: usize,
}

impl RoomDirectory {
	pub fn new(backlog_capacity: usize) -> Self {
		Self {
			rooms: HashMap::new(),
			backlog_capacity,
		}
	}

	/// Create the room's collections if absent. Idempotent.
	pub fn ensure_room(&mut self, name: &RoomName) -> &mut Room {
		self.rooms
			.entry(name.clone())
			.or_insert_with(|| Room::new(self.backlog_capacity))
	}

	pub fn room(&self, name: &RoomName) -> Option<&Room> {
		self.rooms.get(name)
	}

	pub fn room_mut(&mut self, name: &RoomName) -> Option<&mut Room> {
		self.rooms.get_mut(name)
	}

	/// Push a canonical message onto its room's backlog, seeding the read
	/// set with the sender and an empty reaction table.
	///
	/// Evicts the oldest entry past capacity and purges its read/reaction
	/// entries. Returns the stored message.
	pub fn append_message(&mut self, message: Message) -> Message {
		let room_name = message.room.clone();
		let room = self.ensure_room(&room_name);

		room.reads.insert(message.id, message.read_by.clone());
		room.reactions.insert(message.id, ReactionTable::new());

		if let Some(evicted) = room.backlog.push(message.clone()) {
			room.reads.remove(&evicted.id);
			room.reactions.remove(&evicted.id);
			debug!(room = %room_name, evicted = %evicted.id, "backlog at capacity, evicted oldest message");
		}

		message
	}

	/// Backfill query over a room's backlog. Empty for an unknown room.
	pub fn page(&self, name: &RoomName, skip: usize, limit: usize) -> Vec<Message> {
		match self.rooms.get(name) {
			Some(room) => room.backlog.page(skip, limit),
			None => Vec::new(),
		}
	}
}
