#![forbid(unsafe_code)]

use std::collections::BTreeSet;
use std::time::{SystemTime, UNIX_EPOCH};

use parley_domain::{ConnectionId, CorrelationToken, MessageId, RoomName};
use parley_protocol::{Attachment, Broadcast, ClientEvent, Member, Message, ReactionTable, ServerEvent};
use tracing::debug;

use crate::direct;
use crate::registry::ConnectionRegistry;
use crate::rooms::RoomDirectory;

/// Display name used when a direct message arrives from a connection that
/// never joined a room.
const ANONYMOUS: &str = "Anonymous";

/// Configuration for [`Engine`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
	/// Maximum messages retained per room backlog.
	pub backlog_capacity: usize,

	pub debug_logs: bool,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			backlog_capacity: 100,
			debug_logs: false,
		}
	}
}

/// The room-state synchronization engine.
///
/// Designed for a single-threaded, event-driven host: each operation runs
/// to completion before the next is applied, which makes every operation
/// atomic with respect to every other without internal locking. See
/// [`crate::shared::SharedEngine`] for use on a concurrent runtime.
#[derive(Debug)]
pub struct Engine {
	cfg: EngineConfig,
	registry: ConnectionRegistry,
	rooms: RoomDirectory,
	next_message_id: u64,
}

impl Engine {
	pub fn new(cfg: EngineConfig) -> Self {
		let rooms = RoomDirectory::new(cfg.backlog_capacity);
		Self {
			cfg,
			registry: ConnectionRegistry::default(),
			rooms,
			next_message_id: 0,
		}
	}

	/// Apply one inbound event to completion and return the broadcast
	/// instructions for the transport layer to deliver.
	pub fn apply(&mut self, conn: &ConnectionId, event: ClientEvent) -> Vec<Broadcast> {
		match event {
			ClientEvent::Join { name, room } => self.join(conn, name, room),
			ClientEvent::Send {
				body,
				attachment,
				correlation,
			} => self.send(conn, body, attachment, correlation),
			ClientEvent::Typing { is_typing } => self.set_typing(conn, is_typing),
			ClientEvent::Read { message_id } => self.mark_read(conn, message_id),
			ClientEvent::React { message_id, symbol } => self.toggle_reaction(conn, message_id, &symbol),
			ClientEvent::DirectSend { to, body } => self.direct_send(conn, to, body),
			ClientEvent::Disconnect => self.disconnect(conn),
		}
	}

	/// Register a connection under `name` in `room` and broadcast the new
	/// membership.
	///
	/// A connection already joined elsewhere leaves that room first: the
	/// old room gets its full leave cleanup before the new room's
	/// `user_list` and `user_joined` go out. One room per connection,
	/// always.
	pub fn join(&mut self, conn: &ConnectionId, name: String, room: RoomName) -> Vec<Broadcast> {
		let previous = self.registry.join(conn.clone(), name.clone(), room.clone());
		self.rooms.ensure_room(&room);

		debug!(conn = %conn, room = %room, "connection joined room");

		let mut out = Vec::new();
		if let Some(old_room) = previous {
			out.extend(self.leave_cleanup(conn, &name, &old_room));
		}

		out.push(Broadcast::room(
			room.clone(),
			ServerEvent::UserList {
				users: self.registry.members_of(&room),
			},
		));
		out.push(Broadcast::room(
			room,
			ServerEvent::UserJoined {
				id: conn.clone(),
				name,
			},
		));
		out
	}

	/// Append a message to the sender's current room and broadcast it.
	///
	/// The engine assigns the canonical id and timestamp and seeds the
	/// read set with the sender. The client-chosen correlation token rides
	/// along untouched: every room member, the sender included, receives
	/// exactly one canonical broadcast, and reconciling it against a
	/// provisional local echo is entirely the client's concern.
	///
	/// A send from an unregistered connection is a no-op.
	pub fn send(
		&mut self,
		conn: &ConnectionId,
		body: String,
		attachment: Option<Attachment>,
		correlation: Option<CorrelationToken>,
	) -> Vec<Broadcast> {
		let Some(entry) = self.registry.entry(conn) else {
			return Vec::new();
		};
		let (sender_name, room) = (entry.name.clone(), entry.room.clone());

		let message = Message {
			id: self.next_message_id(),
			room: room.clone(),
			sender: conn.clone(),
			sender_name,
			body,
			attachment,
			correlation,
			timestamp_ms: now_unix_ms(),
			read_by: BTreeSet::from([conn.clone()]),
			reactions: ReactionTable::new(),
		};

		if self.cfg.debug_logs {
			debug!(room = %room, message = %message.id, sender = %conn, "broadcasting message");
		}

		let stored = self.rooms.append_message(message);
		vec![Broadcast::room(room, ServerEvent::ReceiveMessage(stored))]
	}

	/// Update the typing set for the sender's room and broadcast the
	/// current composer names.
	pub fn set_typing(&mut self, conn: &ConnectionId, is_typing: bool) -> Vec<Broadcast> {
		let Some(entry) = self.registry.entry(conn) else {
			return Vec::new();
		};
		let (name, room) = (entry.name.clone(), entry.room.clone());

		let state = self.rooms.ensure_room(&room);
		state.typing.set(conn.clone(), name, is_typing);
		let names = state.typing.names();

		vec![Broadcast::room(room, ServerEvent::TypingUsers { names })]
	}

	/// Record a read receipt and broadcast the updated read-by set.
	///
	/// Silently no-ops when the message was evicted or never existed.
	pub fn mark_read(&mut self, conn: &ConnectionId, message_id: MessageId) -> Vec<Broadcast> {
		let Some(entry) = self.registry.entry(conn) else {
			return Vec::new();
		};
		let room = entry.room.clone();

		let Some(read_by) = self.rooms.room_mut(&room).and_then(|r| r.mark_read(message_id, conn)) else {
			return Vec::new();
		};

		if self.cfg.debug_logs {
			debug!(room = %room, message = %message_id, readers = read_by.len(), "read receipt recorded");
		}

		vec![Broadcast::room(room, ServerEvent::MessageReadUpdate { message_id, read_by })]
	}

	/// Toggle a reaction and broadcast the message's full reaction table.
	pub fn toggle_reaction(&mut self, conn: &ConnectionId, message_id: MessageId, symbol: &str) -> Vec<Broadcast> {
		let Some(entry) = self.registry.entry(conn) else {
			return Vec::new();
		};
		let room = entry.room.clone();

		let Some(reactions) = self
			.rooms
			.room_mut(&room)
			.and_then(|r| r.toggle_reaction(message_id, conn, symbol))
		else {
			return Vec::new();
		};

		vec![Broadcast::room(
			room,
			ServerEvent::MessageReactionUpdate { message_id, reactions },
		)]
	}

	/// Route a direct message: one instruction to the target, one echoed to
	/// the sender. Bypasses every room backlog.
	pub fn direct_send(&mut self, conn: &ConnectionId, to: ConnectionId, body: String) -> Vec<Broadcast> {
		let sender_name = self
			.registry
			.entry(conn)
			.map(|entry| entry.name.clone())
			.unwrap_or_else(|| ANONYMOUS.to_string());

		let id = self.next_message_id();
		direct::route(id, conn.clone(), sender_name, to, body, now_unix_ms())
	}

	/// Deregister a connection and broadcast the departure to its former
	/// room. Unknown connections are a silent no-op.
	pub fn disconnect(&mut self, conn: &ConnectionId) -> Vec<Broadcast> {
		let Some(entry) = self.registry.remove(conn) else {
			return Vec::new();
		};

		debug!(conn = %conn, room = %entry.room, "connection disconnected");

		self.leave_cleanup(conn, &entry.name, &entry.room)
	}

	/// Backfill query: page a room's backlog from the newest end backward.
	/// Independent of live event delivery.
	pub fn page(&self, room: &RoomName, skip: usize, limit: usize) -> Vec<Message> {
		self.rooms.page(room, skip, limit)
	}

	/// Current membership snapshot for a room.
	pub fn members_of(&self, room: &RoomName) -> Vec<Member> {
		self.registry.members_of(room)
	}

	/// Snapshot of every registered connection across all rooms.
	pub fn connections(&self) -> Vec<Member> {
		self.registry.connections()
	}

	/// Departure broadcasts for a room the connection is no longer part of:
	/// `user_left`, the typing set with the connection scrubbed, then the
	/// remaining `user_list`. The registry must already reflect the
	/// departure.
	fn leave_cleanup(&mut self, conn: &ConnectionId, name: &str, room: &RoomName) -> Vec<Broadcast> {
		let mut out = Vec::with_capacity(3);

		out.push(Broadcast::room(
			room.clone(),
			ServerEvent::UserLeft {
				id: conn.clone(),
				name: name.to_string(),
			},
		));

		if let Some(state) = self.rooms.room_mut(room) {
			state.typing.clear(conn);
			out.push(Broadcast::room(
				room.clone(),
				ServerEvent::TypingUsers {
					names: state.typing.names(),
				},
			));
		}

		out.push(Broadcast::room(
			room.clone(),
			ServerEvent::UserList {
				users: self.registry.members_of(room),
			},
		));
		out
	}

	fn next_message_id(&mut self) -> MessageId {
		self.next_message_id += 1;
		MessageId::new(self.next_message_id)
	}
}

/// Current Unix time in milliseconds.
#[inline]
fn now_unix_ms() -> i64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.unwrap_or_default()
		.as_millis() as i64
}
