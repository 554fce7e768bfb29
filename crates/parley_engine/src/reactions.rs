#![forbid(unsafe_code)]

use parley_domain::{ConnectionId, MessageId};
use parley_protocol::{ReactionTable, ReadSet};

use crate::rooms::Room;

impl Room {
	/// Flip `conn`'s membership in the set keyed by `symbol` (add if
	/// absent, remove if present) and return the message's full reaction
	/// table for broadcast.
	///
	/// Toggling the same symbol twice restores the prior state. A
	/// connection may hold any number of distinct symbols on one message.
	/// Returns `None` if the message is unknown or already evicted.
	pub fn toggle_reaction(&mut self, message_id: MessageId, conn: &ConnectionId, symbol: &str) -> Option<ReactionTable> {
		let table = self.reactions.get_mut(&message_id)?;

		let holders = table.entry(symbol.to_string()).or_insert_with(ReadSet::new);
		if !holders.insert(conn.clone()) {
			holders.remove(conn);
		}

		// A toggled-off reaction leaves no empty set behind.
		if table.get(symbol).is_some_and(|set| set.is_empty()) {
			table.remove(symbol);
		}

		Some(table.clone())
	}
}
