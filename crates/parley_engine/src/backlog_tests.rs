#![forbid(unsafe_code)]

use std::collections::BTreeSet;

use parley_domain::{ConnectionId, MessageId, RoomName};
use parley_protocol::{Message, ReactionTable};
use proptest::prelude::*;

use crate::backlog::Backlog;

fn msg(id: u64) -> Message {
	let sender = ConnectionId::new("c1").unwrap();
	Message {
		id: MessageId::new(id),
		room: RoomName::new("lobby").unwrap(),
		sender: sender.clone(),
		sender_name: "alice".to_string(),
		body: format!("message {id}"),
		attachment: None,
		correlation: None,
		timestamp_ms: id as i64,
		read_by: BTreeSet::from([sender]),
		reactions: ReactionTable::new(),
	}
}

fn ids(messages: &[Message]) -> Vec<u64> {
	messages.iter().map(|m| m.id.value()).collect()
}

#[test]
fn push_past_capacity_evicts_exactly_the_oldest() {
	let mut backlog = Backlog::new(2);
	assert!(backlog.push(msg(1)).is_none());
	assert!(backlog.push(msg(2)).is_none());

	let evicted = backlog.push(msg(3)).expect("expected eviction at capacity");
	assert_eq!(evicted.id, MessageId::new(1));
	assert_eq!(ids(&backlog.page(0, 10)), vec![2, 3]);
}

#[test]
fn page_returns_newest_window_in_chronological_order() {
	let mut backlog = Backlog::new(10);
	for i in 1..=5 {
		backlog.push(msg(i));
	}

	assert_eq!(ids(&backlog.page(0, 2)), vec![4, 5]);
	assert_eq!(ids(&backlog.page(2, 2)), vec![2, 3]);
	assert_eq!(ids(&backlog.page(4, 2)), vec![1]);
	assert_eq!(ids(&backlog.page(0, 100)), vec![1, 2, 3, 4, 5]);
}

#[test]
fn page_past_the_oldest_is_empty() {
	let mut backlog = Backlog::new(10);
	for i in 1..=3 {
		backlog.push(msg(i));
	}

	assert!(backlog.page(3, 5).is_empty());
	assert!(backlog.page(100, 5).is_empty());
	assert!(Backlog::new(10).page(0, 5).is_empty());
}

proptest! {
	#[test]
	fn length_never_exceeds_capacity(capacity in 1usize..32, count in 0usize..200) {
		let mut backlog = Backlog::new(capacity);
		for i in 0..count {
			backlog.push(msg(i as u64 + 1));
		}

		prop_assert_eq!(backlog.len(), count.min(capacity));

		// Survivors are exactly the newest entries, still in order.
		let got: Vec<u64> = backlog.iter().map(|m| m.id.value()).collect();
		let expected: Vec<u64> = (count.saturating_sub(capacity)..count).map(|i| i as u64 + 1).collect();
		prop_assert_eq!(got, expected);
	}

	#[test]
	fn paging_windows_tile_the_backlog(count in 0usize..60, window in 1usize..10) {
		let mut backlog = Backlog::new(100);
		for i in 0..count {
			backlog.push(msg(i as u64 + 1));
		}

		// Walking backward window by window reproduces the whole backlog.
		let mut collected = Vec::new();
		let mut skip = 0;
		loop {
			let page = backlog.page(skip, window);
			if page.is_empty() {
				break;
			}
			let mut page_ids = ids(&page);
			page_ids.extend(collected);
			collected = page_ids;
			skip += window;
		}

		let expected: Vec<u64> = (1..=count as u64).collect();
		prop_assert_eq!(collected, expected);
	}
}
