use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sov_kernel::{Ordered, order_by_key};

/// Inter-node message. Carries the same `(epoch, id)` key as a DAG node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: String,
    #[serde(default)]
    pub epoch: i64,
    #[serde(default)]
    pub payload: Map<String, Value>,
}

impl Message {
    pub fn new(id: impl Into<String>, epoch: i64, payload: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            epoch,
            payload,
        }
    }
}

impl Ordered for Message {
    fn order_key(&self) -> (i64, &str) {
        (self.epoch, &self.id)
    }
}

/// Canonicalizes the order of a message batch with the scheduler's ordering law.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeterministicTransport;

impl DeterministicTransport {
    pub fn order(&self, messages: Vec<Message>) -> Vec<Message> {
        order_by_key(messages)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReplicaState {
    Applied,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppliedMessage {
    #[serde(flatten)]
    pub message: Message,
    pub state: ReplicaState,
}

/// Marks each message applied, preserving order. No replication happens.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplicaSync;

impl ReplicaSync {
    pub fn apply(&self, ordered: Vec<Message>) -> Vec<AppliedMessage> {
        ordered
            .into_iter()
            .map(|message| AppliedMessage {
                message,
                state: ReplicaState::Applied,
            })
            .collect()
    }
}
