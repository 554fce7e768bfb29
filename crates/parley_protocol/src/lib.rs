#![forbid(unsafe_code)]

//! Transport-facing payload shapes for the room engine.
//!
//! The transport layer decodes inbound frames into [`ClientEvent`]s, feeds
//! them to the engine one at a time, and delivers the returned
//! [`Broadcast`] instructions. The serde tag of each event is the
//! transport-level event name.

use core::fmt;
use core::str::FromStr;
use std::collections::{BTreeMap, BTreeSet};

use parley_domain::{ConnectionId, CorrelationToken, MessageId, RoomName};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Connections that have read a message.
pub type ReadSet = BTreeSet<ConnectionId>;

/// Reaction symbol -> set of connections holding it.
pub type ReactionTable = BTreeMap<String, ReadSet>;

/// File payload attached to a message (upload handling is external; the
/// engine only carries the reference through).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
	pub url: String,
	pub name: String,
	pub media_type: String,
}

/// One room member as seen in presence snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
	pub id: ConnectionId,
	pub name: String,
	pub room: RoomName,
}

/// A canonical room message as stored in the backlog and broadcast to the
/// room.
///
/// `body`, sender fields, and `timestamp_ms` are immutable after creation;
/// only `read_by` and `reactions` are mutated, and only by the engine's
/// trackers. The correlation token passes through untouched so the
/// originating client can reconcile its optimistic echo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
	pub id: MessageId,
	pub room: RoomName,
	pub sender: ConnectionId,
	/// Display name captured at send time; later renames do not rewrite
	/// history.
	pub sender_name: String,
	pub body: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub attachment: Option<Attachment>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub correlation: Option<CorrelationToken>,
	/// Unix milliseconds, assigned by the engine.
	pub timestamp_ms: i64,
	pub read_by: ReadSet,
	pub reactions: ReactionTable,
}

/// A point-to-point message. Never enters any backlog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectMessage {
	pub id: MessageId,
	pub sender: ConnectionId,
	pub sender_name: String,
	pub to: ConnectionId,
	pub body: String,
	pub timestamp_ms: i64,
	pub is_private: bool,
}

/// Inbound events consumed by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClientEvent {
	/// Declare identity and join a room.
	#[serde(rename = "user_join")]
	Join { name: String, room: RoomName },

	/// Send a message to the sender's current room.
	#[serde(rename = "send_message")]
	Send {
		body: String,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		attachment: Option<Attachment>,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		correlation: Option<CorrelationToken>,
	},

	/// Start or stop composing.
	Typing { is_typing: bool },

	/// Mark a backlog message as read.
	#[serde(rename = "message_read")]
	Read { message_id: MessageId },

	/// Toggle a reaction symbol on a backlog message.
	#[serde(rename = "message_reaction")]
	React { message_id: MessageId, symbol: String },

	/// Send a direct message to another connection.
	#[serde(rename = "private_message")]
	DirectSend { to: ConnectionId, body: String },

	/// The transport session ended.
	Disconnect,
}

/// Outbound events the transport layer delivers to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServerEvent {
	/// Full membership snapshot for a room.
	UserList { users: Vec<Member> },

	UserJoined { id: ConnectionId, name: String },

	UserLeft { id: ConnectionId, name: String },

	/// The canonical broadcast of a submitted message.
	ReceiveMessage(Message),

	/// Display names currently composing in a room.
	TypingUsers { names: Vec<String> },

	MessageReadUpdate { message_id: MessageId, read_by: ReadSet },

	MessageReactionUpdate {
		message_id: MessageId,
		reactions: ReactionTable,
	},

	PrivateMessage(DirectMessage),
}

impl ServerEvent {
	/// The transport-level event name (matches the serde tag).
	pub const fn name(&self) -> &'static str {
		match self {
			Self::UserList { .. } => "user_list",
			Self::UserJoined { .. } => "user_joined",
			Self::UserLeft { .. } => "user_left",
			Self::ReceiveMessage(_) => "receive_message",
			Self::TypingUsers { .. } => "typing_users",
			Self::MessageReadUpdate { .. } => "message_read_update",
			Self::MessageReactionUpdate { .. } => "message_reaction_update",
			Self::PrivateMessage(_) => "private_message",
		}
	}
}

/// Errors for parsing [`Scope`] strings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScopeParseError {
	#[error("empty scope")]
	Empty,
	#[error("invalid scope (expected room:<name>, connection:<id>, or room:<name>:except:<id>): {0}")]
	InvalidFormat(String),
}

/// Recipient scope of one broadcast instruction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
	/// Every connection currently joined to the room.
	Room(RoomName),

	/// A single connection.
	Connection(ConnectionId),

	/// Every room connection except the sender (for transports that
	/// suppress sender echo themselves).
	RoomExceptSender { room: RoomName, sender: ConnectionId },
}

impl Scope {
	const ROOM_PREFIX: &'static str = "room:";
	const CONNECTION_PREFIX: &'static str = "connection:";
	const EXCEPT_SEPARATOR: &'static str = ":except:";

	/// Parse the string form produced by `Display`.
	pub fn parse(s: &str) -> Result<Self, ScopeParseError> {
		let s = s.trim();
		if s.is_empty() {
			return Err(ScopeParseError::Empty);
		}

		if let Some(id) = s.strip_prefix(Self::CONNECTION_PREFIX) {
			let id = ConnectionId::new(id).map_err(|_| ScopeParseError::InvalidFormat(s.to_string()))?;
			return Ok(Self::Connection(id));
		}

		let rest = s
			.strip_prefix(Self::ROOM_PREFIX)
			.ok_or_else(|| ScopeParseError::InvalidFormat(s.to_string()))?;

		// Greedy on the room side, so room names containing ':' survive.
		if let Some((room, sender)) = rest.rsplit_once(Self::EXCEPT_SEPARATOR) {
			let room = RoomName::new(room).map_err(|_| ScopeParseError::InvalidFormat(s.to_string()))?;
			let sender = ConnectionId::new(sender).map_err(|_| ScopeParseError::InvalidFormat(s.to_string()))?;
			return Ok(Self::RoomExceptSender { room, sender });
		}

		let room = RoomName::new(rest).map_err(|_| ScopeParseError::InvalidFormat(s.to_string()))?;
		Ok(Self::Room(room))
	}
}

impl fmt::Display for Scope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Room(room) => write!(f, "{}{room}", Self::ROOM_PREFIX),
			Self::Connection(id) => write!(f, "{}{id}", Self::CONNECTION_PREFIX),
			Self::RoomExceptSender { room, sender } => {
				write!(f, "{}{room}{}{sender}", Self::ROOM_PREFIX, Self::EXCEPT_SEPARATOR)
			}
		}
	}
}

impl FromStr for Scope {
	type Err = ScopeParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Scope::parse(s)
	}
}

/// One delivery instruction returned by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Broadcast {
	pub scope: Scope,
	pub event: ServerEvent,
}

impl Broadcast {
	pub fn room(room: RoomName, event: ServerEvent) -> Self {
		Self {
			scope: Scope::Room(room),
			event,
		}
	}

	pub fn connection(id: ConnectionId, event: ServerEvent) -> Self {
		Self {
			scope: Scope::Connection(id),
			event,
		}
	}

	pub fn room_except(room: RoomName, sender: ConnectionId, event: ServerEvent) -> Self {
		Self {
			scope: Scope::RoomExceptSender { room, sender },
			event,
		}
	}
}
