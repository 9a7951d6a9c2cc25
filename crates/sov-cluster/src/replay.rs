use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::event_log::EventLog;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReplayedEvent {
    pub sequence: u64,
    pub kind: String,
    pub payload: Map<String, Value>,
}

/// Linear projection of the log in sequence order. Reading never mutates the
/// log, so replaying twice yields identical output.
pub fn replay(log: &EventLog) -> Vec<ReplayedEvent> {
    log.events()
        .into_iter()
        .map(|event| ReplayedEvent {
            sequence: event.sequence,
            kind: event.kind.into(),
            payload: event.payload,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_log::EventKind;
    use serde_json::json;

    #[test]
    fn replay_is_idempotent() {
        let log = EventLog::new();
        let mut payload = Map::new();
        payload.insert("node".into(), json!("n1"));
        log.append(EventKind::PlanApplied, payload.clone());
        log.append("custom", Map::new());

        let first = replay(&log);
        let second = replay(&log);
        assert_eq!(first, second);
        assert_eq!(
            first,
            vec![
                ReplayedEvent {
                    sequence: 1,
                    kind: "plan_applied".into(),
                    payload,
                },
                ReplayedEvent {
                    sequence: 2,
                    kind: "custom".into(),
                    payload: Map::new(),
                },
            ]
        );
    }

    #[test]
    fn empty_log_replays_to_nothing() {
        assert!(replay(&EventLog::new()).is_empty());
    }
}
