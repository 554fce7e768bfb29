#![forbid(unsafe_code)]

//! In-memory room-state synchronization and broadcast engine.
//!
//! The engine owns all transient room state for one process: who is
//! connected and where, each room's bounded message backlog, read receipts,
//! reaction tallies, and typing presence. The surrounding transport layer
//! feeds it one [`parley_protocol::ClientEvent`] at a time; each call
//! mutates state to completion and returns the
//! [`parley_protocol::Broadcast`] instructions to deliver. No operation
//! blocks, performs I/O, or fails: unknown targets degrade to an empty
//! instruction set.
//!
//! Durable storage and the request-routing layer are external
//! collaborators; the engine holds process-lifetime state only.

pub mod backlog;
pub mod direct;
pub mod engine;
pub mod reactions;
pub mod receipts;
pub mod registry;
pub mod rooms;
pub mod shared;
pub mod typing;

pub use engine::{Engine, EngineConfig};
pub use registry::ConnectionRegistry;
pub use rooms::RoomDirectory;
pub use shared::SharedEngine;

#[cfg(test)]
mod backlog_tests;
