use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::IpcError;

/// A message together with the id of the process that sent it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope {
    pub sender: String,
    pub message: Value,
}

/// Named FIFO channels. Sending and receiving never block.
#[derive(Debug, Clone, Default)]
pub struct Mailbox {
    channels: BTreeMap<String, VecDeque<Envelope>>,
}

impl Mailbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send(&mut self, channel: &str, sender: impl Into<String>, message: Value) {
        self.channels
            .entry(channel.to_string())
            .or_default()
            .push_back(Envelope {
                sender: sender.into(),
                message,
            });
    }

    /// Dequeue the oldest pending message on `channel`.
    pub fn recv(&mut self, channel: &str) -> Result<Envelope, IpcError> {
        self.channels
            .get_mut(channel)
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| IpcError::EmptyChannel(channel.to_string()))
    }

    pub fn pending(&self, channel: &str) -> usize {
        self.channels.get(channel).map_or(0, VecDeque::len)
    }

    pub fn is_empty(&self) -> bool {
        self.channels.values().all(VecDeque::is_empty)
    }

    pub fn channels(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(String::as_str)
    }

    /// Pending count per channel, keyed in sorted order.
    pub fn stats(&self) -> BTreeMap<String, usize> {
        self.channels
            .iter()
            .map(|(name, queue)| (name.clone(), queue.len()))
            .collect()
    }
}
