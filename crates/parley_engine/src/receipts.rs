#![forbid(unsafe_code)]

use parley_domain::{ConnectionId, MessageId};
use parley_protocol::ReadSet;

use crate::rooms::Room;

impl Room {
	/// Add `conn` to the message's read-by set and return the updated set
	/// for broadcast.
	///
	/// Returns `None` if the message is unknown or already evicted; that is
	/// an expected race, not an error.
	///
	/// Consumers comparing the set size against current room membership to
	/// decide "fully read" are using an approximation: membership may have
	/// changed since the set was captured. The engine deliberately does not
	/// correct for that.
	pub fn mark_read(&mut self, message_id: MessageId, conn: &ConnectionId) -> Option<ReadSet> {
		let set = self.reads.get_mut(&message_id)?;
		set.insert(conn.clone());
		Some(set.clone())
	}
}
