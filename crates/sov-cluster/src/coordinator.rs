use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::consensus::ConsensusStub;
use crate::error::ClusterError;
use crate::event_log::{EventKind, EventLog};
use crate::mirror::{MirrorEvent, MirrorState};
use crate::transport::{AppliedMessage, DeterministicTransport, Message, ReplicaSync};

/// Applies plans cluster-wide and records each outcome in its event log.
#[derive(Debug, Clone, Default)]
pub struct Coordinator {
    transport: DeterministicTransport,
    sync: ReplicaSync,
    consensus: ConsensusStub,
    log: EventLog,
}

impl Coordinator {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// `ReplicaSync::apply(Transport::order(plan))`, one `plan_applied` event per message.
    pub fn broadcast_plan(&self, plan: Vec<Message>) -> Vec<AppliedMessage> {
        let applied = self.sync.apply(self.transport.order(plan));
        for entry in &applied {
            self.log.append(
                EventKind::PlanApplied,
                object(json!({
                    "id": entry.message.id,
                    "epoch": entry.message.epoch,
                    "payload": entry.message.payload,
                })),
            );
        }
        applied
    }

    /// Agree on a value among the proposing nodes and commit it to each of them.
    pub fn agree<'a, V, I>(&self, values: I) -> Result<BTreeMap<String, V>, ClusterError>
    where
        I: IntoIterator<Item = (&'a String, &'a V)> + Clone,
        V: Ord + Clone + Serialize + 'a,
    {
        let value = self.consensus.propose(values.clone())?;
        let committed = self
            .consensus
            .commit(values.into_iter().map(|(node, _)| node.clone()), &value);
        let participants: Vec<&String> = committed.keys().collect();
        self.log.append(
            EventKind::ConsensusCommitted,
            object(json!({
                "value": serde_json::to_value(&value)?,
                "participants": participants,
            })),
        );
        Ok(committed)
    }

    /// Fold one external observation into `mirror` and log it.
    pub fn observe(&self, mirror: &mut MirrorState, event: MirrorEvent) {
        let summary = object(json!({
            "domain": event.domain,
            "tick": event.tick,
            "keys": event.payload.len(),
        }));
        mirror.apply(event.domain, event.payload, event.tick);
        self.log.append(EventKind::MirrorApplied, summary);
    }
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
