#![forbid(unsafe_code)]

use parley_domain::{ConnectionId, MessageId};
use parley_protocol::{Broadcast, DirectMessage, ServerEvent};

/// Build the two delivery instructions for a direct message: one to the
/// target connection, one echoed back to the sender.
///
/// The payload never enters any backlog and carries no acknowledgment
/// protocol; direct messages are fire-and-forget from the engine's
/// perspective. The id comes from the engine's shared monotonic sequence,
/// so it cannot collide with a room message id.
pub fn route(
	id: MessageId,
	sender: ConnectionId,
	sender_name: String,
	to: ConnectionId,
	body: String,
	timestamp_ms: i64,
) -> Vec<Broadcast> {
	let message = DirectMessage {
		id,
		sender: sender.clone(),
		sender_name,
		to: to.clone(),
		body,
		timestamp_ms,
		is_private: true,
	};

	vec![
		Broadcast::connection(to, ServerEvent::PrivateMessage(message.clone())),
		Broadcast::connection(sender, ServerEvent::PrivateMessage(message)),
	]
}
