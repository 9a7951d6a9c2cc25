use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sov_canon::to_canonical_json;

/// Live cluster state keyed by domain, compared against the mirror by [`diff`].
pub type WorldState = BTreeMap<String, Map<String, Value>>;

/// Snapshot of externally observed state, rebuilt purely from replayed events.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MirrorState {
    pub domains: BTreeMap<String, Map<String, Value>>,
    pub tick: u64,
}

/// One timestamped observation of an external domain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MirrorEvent {
    pub tick: u64,
    pub domain: String,
    #[serde(default)]
    pub payload: Map<String, Value>,
}

impl MirrorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole key set of `domain` with `payload`. The tick never moves backwards.
    pub fn apply(&mut self, domain: impl Into<String>, payload: Map<String, Value>, tick: u64) {
        self.domains.insert(domain.into(), payload);
        self.tick = self.tick.max(tick);
    }

    /// Build a fresh state from an unordered event stream.
    pub fn replay<I>(events: I) -> Self
    where
        I: IntoIterator<Item = MirrorEvent>,
    {
        let mut state = Self::new();
        replay_events(&mut state, events);
        state
    }
}

/// Apply `events` in `(tick, domain)` order, whatever order they arrive in.
///
/// Events sharing both tick and domain are further ordered by their canonical
/// payload encoding, so the final state never depends on input order.
pub fn replay_events<I>(state: &mut MirrorState, events: I)
where
    I: IntoIterator<Item = MirrorEvent>,
{
    let mut keyed: Vec<(String, MirrorEvent)> = events
        .into_iter()
        .map(|event| (to_canonical_json(&event.payload).unwrap_or_default(), event))
        .collect();
    keyed.sort_by(|(payload_a, a), (payload_b, b)| {
        (a.tick, &a.domain, payload_a).cmp(&(b.tick, &b.domain, payload_b))
    });
    log::debug!("mirror replay: {} events", keyed.len());
    for (_, event) in keyed {
        state.apply(event.domain, event.payload, event.tick);
    }
}

/// Both sides of one mismatched key. A side missing the key reads as `null`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiffEntry {
    pub mirror: Value,
    pub cluster: Value,
}

/// Sparse diff: only domains and keys whose values differ appear.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct MirrorDiff(pub BTreeMap<String, BTreeMap<String, DiffEntry>>);

impl MirrorDiff {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn get(&self, domain: &str, key: &str) -> Option<&DiffEntry> {
        self.0.get(domain).and_then(|keys| keys.get(key))
    }
}

/// Compare the mirror against live cluster state, key by key.
pub fn diff(mirror: &MirrorState, world: &WorldState) -> MirrorDiff {
    let empty = Map::new();
    let mut out = BTreeMap::new();
    let domains: BTreeSet<&String> =
        mirror.domains.keys().chain(world.keys()).collect();
    for domain in domains {
        let ours = mirror.domains.get(domain).unwrap_or(&empty);
        let theirs = world.get(domain).unwrap_or(&empty);
        let keys: BTreeSet<&String> = ours.keys().chain(theirs.keys()).collect();
        let mut entries = BTreeMap::new();
        for key in keys {
            let left = ours.get(key).cloned().unwrap_or(Value::Null);
            let right = theirs.get(key).cloned().unwrap_or(Value::Null);
            if left != right {
                entries.insert(
                    key.clone(),
                    DiffEntry {
                        mirror: left,
                        cluster: right,
                    },
                );
            }
        }
        if !entries.is_empty() {
            out.insert(domain.clone(), entries);
        }
    }
    if !out.is_empty() {
        log::debug!("mirror drift in {} domains", out.len());
    }
    MirrorDiff(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn event(tick: u64, domain: &str, payload: Value) -> MirrorEvent {
        MirrorEvent {
            tick,
            domain: domain.into(),
            payload: obj(payload),
        }
    }

    fn events() -> Vec<MirrorEvent> {
        vec![
            event(3, "weather", json!({"temp": 21})),
            event(1, "weather", json!({"temp": 15, "wind": 4})),
            event(2, "market", json!({"btc": 100})),
            event(2, "grid", json!({"load": 0.7})),
            event(3, "weather", json!({"temp": 19})),
        ]
    }

    #[test]
    fn apply_replaces_domain_and_keeps_tick_monotonic() {
        let mut state = MirrorState::new();
        state.apply("d", obj(json!({"a": 1, "b": 2})), 5);
        state.apply("d", obj(json!({"c": 3})), 2);
        assert_eq!(state.domains["d"], obj(json!({"c": 3})));
        assert_eq!(state.tick, 5);
    }

    #[test]
    fn replay_is_order_independent() {
        let forward = MirrorState::replay(events());
        let mut reversed_input = events();
        reversed_input.reverse();
        let reversed = MirrorState::replay(reversed_input);
        assert_eq!(forward, reversed);
        assert_eq!(forward, MirrorState::replay(events()));
        assert_eq!(forward.tick, 3);
        assert_eq!(forward.domains.len(), 3);
        // Same tick and domain: larger canonical payload applied last.
        assert_eq!(forward.domains["weather"], obj(json!({"temp": 21})));
    }

    #[test]
    fn diff_is_sparse() {
        let mirror = MirrorState::replay(vec![
            event(1, "weather", json!({"temp": 15, "wind": 4})),
            event(1, "market", json!({"btc": 100})),
        ]);
        let mut world = WorldState::new();
        world.insert("weather".into(), obj(json!({"temp": 17, "wind": 4})));
        world.insert("market".into(), obj(json!({"btc": 100})));
        world.insert("grid".into(), obj(json!({"load": 1})));

        let drift = diff(&mirror, &world);
        assert_eq!(drift.domains().collect::<Vec<_>>(), vec!["grid", "weather"]);
        assert_eq!(
            drift.get("weather", "temp"),
            Some(&DiffEntry {
                mirror: json!(15),
                cluster: json!(17),
            })
        );
        assert!(drift.get("weather", "wind").is_none());
        assert_eq!(
            serde_json::to_value(&drift).unwrap(),
            json!({
                "grid": {"load": {"mirror": null, "cluster": 1}},
                "weather": {"temp": {"mirror": 15, "cluster": 17}}
            })
        );
    }

    #[test]
    fn identical_states_have_no_diff() {
        let mirror = MirrorState::replay(events());
        let world = mirror.domains.clone();
        assert!(diff(&mirror, &world).is_empty());
    }
}
