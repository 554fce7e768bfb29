use std::collections::{BTreeMap, BTreeSet};

use parley_domain::{ConnectionId, CorrelationToken, MessageId, RoomName};
use parley_protocol::{
	Attachment, ClientEvent, DirectMessage, Member, Message, ReactionTable, Scope, ScopeParseError, ServerEvent,
};

fn conn(id: &str) -> ConnectionId {
	ConnectionId::new(id).expect("valid ConnectionId")
}

fn room(name: &str) -> RoomName {
	RoomName::new(name).expect("valid RoomName")
}

fn sample_message() -> Message {
	Message {
		id: MessageId::new(1),
		room: room("lobby"),
		sender: conn("c1"),
		sender_name: "alice".to_string(),
		body: "hi".to_string(),
		attachment: None,
		correlation: Some(CorrelationToken::new("t1").unwrap()),
		timestamp_ms: 1_700_000_000_000,
		read_by: BTreeSet::from([conn("c1")]),
		reactions: BTreeMap::new(),
	}
}

#[test]
fn server_event_tag_matches_name() {
	let events = [
		ServerEvent::UserList { users: Vec::new() },
		ServerEvent::UserJoined {
			id: conn("c1"),
			name: "alice".to_string(),
		},
		ServerEvent::UserLeft {
			id: conn("c1"),
			name: "alice".to_string(),
		},
		ServerEvent::ReceiveMessage(sample_message()),
		ServerEvent::TypingUsers {
			names: vec!["alice".to_string()],
		},
		ServerEvent::MessageReadUpdate {
			message_id: MessageId::new(1),
			read_by: BTreeSet::from([conn("c1")]),
		},
		ServerEvent::MessageReactionUpdate {
			message_id: MessageId::new(1),
			reactions: ReactionTable::new(),
		},
		ServerEvent::PrivateMessage(DirectMessage {
			id: MessageId::new(2),
			sender: conn("c1"),
			sender_name: "alice".to_string(),
			to: conn("c2"),
			body: "psst".to_string(),
			timestamp_ms: 0,
			is_private: true,
		}),
	];

	for event in events {
		let json = serde_json::to_value(&event).expect("serialize");
		assert_eq!(json["event"], event.name(), "tag mismatch for {event:?}");
	}
}

#[test]
fn receive_message_inlines_message_fields() {
	let json = serde_json::to_value(ServerEvent::ReceiveMessage(sample_message())).unwrap();
	assert_eq!(json["event"], "receive_message");
	assert_eq!(json["body"], "hi");
	assert_eq!(json["correlation"], "t1");
	assert_eq!(json["read_by"][0], "c1");
}

#[test]
fn optional_fields_are_omitted_when_absent() {
	let mut msg = sample_message();
	msg.correlation = None;
	let json = serde_json::to_value(ServerEvent::ReceiveMessage(msg)).unwrap();
	assert!(json.get("correlation").is_none());
	assert!(json.get("attachment").is_none());
}

#[test]
fn client_events_roundtrip_with_wire_names() {
	let events = [
		(
			ClientEvent::Join {
				name: "alice".to_string(),
				room: room("lobby"),
			},
			"user_join",
		),
		(
			ClientEvent::Send {
				body: "hi".to_string(),
				attachment: Some(Attachment {
					url: "/uploads/cat.png".to_string(),
					name: "cat.png".to_string(),
					media_type: "image".to_string(),
				}),
				correlation: Some(CorrelationToken::random()),
			},
			"send_message",
		),
		(ClientEvent::Typing { is_typing: true }, "typing"),
		(
			ClientEvent::Read {
				message_id: MessageId::new(3),
			},
			"message_read",
		),
		(
			ClientEvent::React {
				message_id: MessageId::new(3),
				symbol: "👍".to_string(),
			},
			"message_reaction",
		),
		(
			ClientEvent::DirectSend {
				to: conn("c2"),
				body: "psst".to_string(),
			},
			"private_message",
		),
		(ClientEvent::Disconnect, "disconnect"),
	];

	for (event, wire_name) in events {
		let json = serde_json::to_value(&event).expect("serialize");
		assert_eq!(json["event"], wire_name);
		let back: ClientEvent = serde_json::from_value(json).expect("deserialize");
		assert_eq!(back, event);
	}
}

#[test]
fn scope_display_parse_roundtrip() {
	let scopes = [
		Scope::Room(room("lobby")),
		Scope::Connection(conn("c9")),
		Scope::RoomExceptSender {
			room: room("lobby"),
			sender: conn("c9"),
		},
	];

	for scope in scopes {
		let s = scope.to_string();
		assert_eq!(s.parse::<Scope>().unwrap(), scope, "roundtrip failed for {s}");
	}

	assert_eq!(Scope::Room(room("lobby")).to_string(), "room:lobby");
	assert_eq!(Scope::Connection(conn("c9")).to_string(), "connection:c9");
}

#[test]
fn scope_parse_rejects_malformed() {
	assert_eq!(Scope::parse("").unwrap_err(), ScopeParseError::Empty);
	assert!(matches!(Scope::parse("lobby").unwrap_err(), ScopeParseError::InvalidFormat(_)));
	assert!(matches!(Scope::parse("room:").unwrap_err(), ScopeParseError::InvalidFormat(_)));
	assert!(matches!(
		Scope::parse("connection:").unwrap_err(),
		ScopeParseError::InvalidFormat(_)
	));
}
