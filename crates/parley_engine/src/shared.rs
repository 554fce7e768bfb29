#![forbid(unsafe_code)]

use std::sync::Arc;

use parley_domain::{ConnectionId, RoomName};
use parley_protocol::{Broadcast, ClientEvent, Member, Message};
use tokio::sync::Mutex;

use crate::engine::{Engine, EngineConfig};

/// Cloneable async facade over [`Engine`] for concurrent hosts.
///
/// The engine itself stays synchronous; the mutex serializes events so the
/// one-event-at-a-time property holds on a parallel runtime. Every
/// operation is in-memory and returns as soon as the lock is held, so
/// contention is the only wait.
#[derive(Debug, Clone)]
pub struct SharedEngine {
	inner: Arc<Mutex<Engine>>,
}

impl SharedEngine {
	pub fn new(cfg: EngineConfig) -> Self {
		Self {
			inner: Arc::new(Mutex::new(Engine::new(cfg))),
		}
	}

	/// Apply one inbound event; see [`Engine::apply`].
	pub async fn apply(&self, conn: &ConnectionId, event: ClientEvent) -> Vec<Broadcast> {
		let mut engine = self.inner.lock().await;
		engine.apply(conn, event)
	}

	/// Backfill query; see [`Engine::page`].
	pub async fn page(&self, room: &RoomName, skip: usize, limit: usize) -> Vec<Message> {
		let engine = self.inner.lock().await;
		engine.page(room, skip, limit)
	}

	/// Membership snapshot; see [`Engine::members_of`].
	pub async fn members_of(&self, room: &RoomName) -> Vec<Member> {
		let engine = self.inner.lock().await;
		engine.members_of(room)
	}

	/// All registered connections; see [`Engine::connections`].
	pub async fn connections(&self) -> Vec<Member> {
		let engine = self.inner.lock().await;
		engine.connections()
	}
}
