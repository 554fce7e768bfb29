#![forbid(unsafe_code)]

use std::collections::VecDeque;

use parley_protocol::Message;

/// Bounded, order-preserving store of a room's recent broadcast messages.
///
/// Insertion order is chronological; once the capacity is exceeded the
/// oldest entry is evicted first-in-first-out. Overflow never rejects the
/// new message.
#[derive(Debug)]
pub struct Backlog {
	messages: VecDeque<Message>,
	capacity: usize,
}

impl Backlog {
	pub fn new(capacity: usize) -> Self {
		Self {
			messages: VecDeque::with_capacity(capacity.min(64)),
			capacity,
		}
	}

	/// Append a message, returning the evicted oldest entry if the backlog
	/// was at capacity.
	pub fn push(&mut self, message: Message) -> Option<Message> {
		self.messages.push_back(message);
		if self.messages.len() > self.capacity {
			self.messages.pop_front()
		} else {
			None
		}
	}

	/// Page from the newest end backward: skip the most recent `skip`
	/// messages, then return up to `limit` older ones in chronological
	/// order.
	pub fn page(&self, skip: usize, limit: usize) -> Vec<Message> {
		let end = self.messages.len().saturating_sub(skip);
		let start = end.saturating_sub(limit);
		self.messages.iter().take(end).skip(start).cloned().collect()
	}

	pub fn len(&self) -> usize {
		self.messages.len()
	}

	pub fn is_empty(&self) -> bool {
		self.messages.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Message> {
		self.messages.iter()
	}
}
