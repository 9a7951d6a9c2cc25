//! Deterministic simulation of cluster coordination: message ordering, value
//! agreement, an append-only event log with replay, and the external-state mirror.
//!
//! Nothing here touches a network. Every ordering decision is an explicit sort.

pub mod consensus;
pub mod coordinator;
pub mod error;
pub mod event_log;
pub mod mirror;
pub mod replay;
pub mod transport;

pub use consensus::ConsensusStub;
pub use coordinator::Coordinator;
pub use error::ClusterError;
pub use event_log::{ClusterEvent, EventKind, EventLog};
pub use mirror::{DiffEntry, MirrorDiff, MirrorEvent, MirrorState, WorldState};
pub use replay::{ReplayedEvent, replay};
pub use transport::{AppliedMessage, DeterministicTransport, Message, ReplicaState, ReplicaSync};
