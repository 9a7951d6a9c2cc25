use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Known cluster event kinds, with an escape hatch for caller-defined ones.
///
/// Kinds compare, hash and sort by their string form, so a `Custom` spelling of
/// a known kind is the same kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    PlanApplied,
    ConsensusCommitted,
    MirrorApplied,
    Custom(String),
}

impl EventKind {
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::PlanApplied => "plan_applied",
            EventKind::ConsensusCommitted => "consensus_committed",
            EventKind::MirrorApplied => "mirror_applied",
            EventKind::Custom(kind) => kind,
        }
    }
}

impl PartialEq for EventKind {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for EventKind {}

impl PartialOrd for EventKind {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EventKind {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl Hash for EventKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl From<&str> for EventKind {
    fn from(value: &str) -> Self {
        match value {
            "plan_applied" => EventKind::PlanApplied,
            "consensus_committed" => EventKind::ConsensusCommitted,
            "mirror_applied" => EventKind::MirrorApplied,
            other => EventKind::Custom(other.to_string()),
        }
    }
}

impl From<String> for EventKind {
    fn from(value: String) -> Self {
        EventKind::from(value.as_str())
    }
}

impl From<EventKind> for String {
    fn from(value: EventKind) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClusterEvent {
    /// Assigned at append time, starting at 1.
    pub sequence: u64,
    pub kind: EventKind,
    pub payload: Map<String, Value>,
}

#[derive(Debug, Default)]
struct LogInner {
    events: Vec<ClusterEvent>,
    last_sequence: u64,
}

/// Append-only, monotonically numbered event log.
///
/// Clones share the same log, and sequence assignment happens under one lock,
/// so concurrent appenders never observe a gap or a reused number.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    inner: Arc<Mutex<LogInner>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, LogInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn append(&self, kind: impl Into<EventKind>, payload: Map<String, Value>) -> ClusterEvent {
        let mut guard = self.lock();
        guard.last_sequence += 1;
        let event = ClusterEvent {
            sequence: guard.last_sequence,
            kind: kind.into(),
            payload,
        };
        guard.events.push(event.clone());
        log::debug!("event {} appended: {}", event.sequence, event.kind);
        event
    }

    /// All events in append order.
    pub fn events(&self) -> Vec<ClusterEvent> {
        self.lock().events.clone()
    }

    /// Events with `sequence >= from`.
    pub fn events_from(&self, from: u64) -> Vec<ClusterEvent> {
        self.lock()
            .events
            .iter()
            .filter(|event| event.sequence >= from)
            .cloned()
            .collect()
    }

    pub fn last_sequence(&self) -> u64 {
        self.lock().last_sequence
    }

    pub fn len(&self) -> usize {
        self.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread;

    fn payload(n: i64) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("n".into(), json!(n));
        map
    }

    #[test]
    fn sequences_start_at_one_without_gaps() {
        let log = EventLog::new();
        let first = log.append("boot", payload(0));
        let second = log.append(EventKind::PlanApplied, payload(1));
        assert_eq!((first.sequence, second.sequence), (1, 2));
        assert_eq!(log.last_sequence(), 2);
        let kinds: Vec<String> = log.events().into_iter().map(|e| e.kind.into()).collect();
        assert_eq!(kinds, vec!["boot", "plan_applied"]);
        assert_eq!(log.events_from(2).len(), 1);
    }

    #[test]
    fn kind_strings_round_trip() {
        assert_eq!(EventKind::from("mirror_applied"), EventKind::MirrorApplied);
        assert_eq!(EventKind::from("custom"), EventKind::Custom("custom".into()));
        let event = ClusterEvent {
            sequence: 1,
            kind: EventKind::ConsensusCommitted,
            payload: Map::new(),
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"sequence": 1, "kind": "consensus_committed", "payload": {}})
        );
    }

    #[test]
    fn custom_spelling_of_known_kind_is_the_same_kind() {
        use std::collections::HashSet;

        let spelled = EventKind::Custom("plan_applied".into());
        assert_eq!(spelled, EventKind::PlanApplied);
        let kinds: HashSet<EventKind> = [spelled, EventKind::PlanApplied].into_iter().collect();
        assert_eq!(kinds.len(), 1);
        assert_ne!(EventKind::Custom("other".into()), EventKind::PlanApplied);
        assert!(EventKind::ConsensusCommitted < EventKind::Custom("deploy".into()));
    }

    #[test]
    fn concurrent_appenders_get_distinct_sequences() {
        let log = EventLog::new();
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let log = log.clone();
                thread::spawn(move || {
                    for i in 0..25 {
                        log.append("tick", payload(t * 100 + i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        let sequences: Vec<u64> = log.events().iter().map(|e| e.sequence).collect();
        assert_eq!(sequences, (1..=100).collect::<Vec<_>>());
    }
}
