#![forbid(unsafe_code)]

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors for parsing identifiers from strings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseIdError {
	#[error("empty value")]
	Empty,
	#[error("value exceeds {limit} characters")]
	TooLong { limit: usize },
	#[error("invalid format: {0}")]
	InvalidFormat(String),
}

/// Room name, also used as the transport-level multicast group key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomName(String);

impl RoomName {
	/// Longest accepted room name.
	pub const MAX_LEN: usize = 50;

	/// Create a trimmed, non-empty `RoomName`.
	pub fn new(name: impl Into<String>) -> Result<Self, ParseIdError> {
		let name = name.into();
		let name = name.trim();
		if name.is_empty() {
			return Err(ParseIdError::Empty);
		}
		if name.chars().count() > Self::MAX_LEN {
			return Err(ParseIdError::TooLong { limit: Self::MAX_LEN });
		}
		Ok(Self(name.to_string()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn into_string(self) -> String {
		self.0
	}
}

impl fmt::Display for RoomName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl FromStr for RoomName {
	type Err = ParseIdError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		RoomName::new(s)
	}
}

/// Opaque identifier for one live transport session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
	/// Create a non-empty `ConnectionId`.
	pub fn new(id: impl Into<String>) -> Result<Self, ParseIdError> {
		let id = id.into();
		if id.trim().is_empty() {
			return Err(ParseIdError::Empty);
		}
		Ok(Self(id))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn into_string(self) -> String {
		self.0
	}
}

impl fmt::Display for ConnectionId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl FromStr for ConnectionId {
	type Err = ParseIdError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		ConnectionId::new(s.to_string())
	}
}

/// Server-assigned canonical message identifier.
///
/// Monotonic within one engine process; direct and room messages draw from
/// the same sequence, so ids never collide across the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(u64);

impl MessageId {
	pub const fn new(value: u64) -> Self {
		Self(value)
	}

	pub const fn value(self) -> u64 {
		self.0
	}
}

impl fmt::Display for MessageId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Client-chosen token correlating an optimistic local echo with the
/// server's canonical broadcast of the same message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationToken(String);

impl CorrelationToken {
	/// Create a non-empty token.
	pub fn new(token: impl Into<String>) -> Result<Self, ParseIdError> {
		let token = token.into();
		if token.trim().is_empty() {
			return Err(ParseIdError::Empty);
		}
		Ok(Self(token))
	}

	/// Generate a fresh random token (what a well-behaved client would send).
	pub fn random() -> Self {
		Self(uuid::Uuid::new_v4().to_string())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for CorrelationToken {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl FromStr for CorrelationToken {
	type Err = ParseIdError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		CorrelationToken::new(s.to_string())
	}
}
