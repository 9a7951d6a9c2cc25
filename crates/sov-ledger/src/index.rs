use std::collections::BTreeMap;

use serde_json::Value;

use crate::record::LedgerRecord;
use crate::store::LedgerStore;

/// Metadata key that assigns a record to a scenario.
const SCENARIO_KEY: &str = "scenario";

/// Derived lookup cache over a [`LedgerStore`], keyed by node and scenario.
///
/// Never a source of truth. Lookups rebuild only while the cache is empty;
/// records appended after that stay invisible until [`rebuild`](Self::rebuild)
/// is called again.
#[derive(Debug, Clone)]
pub struct LedgerIndex {
    store: LedgerStore,
    by_scenario: BTreeMap<String, Vec<LedgerRecord>>,
    by_node: BTreeMap<String, Vec<LedgerRecord>>,
}

impl LedgerIndex {
    pub fn new(store: LedgerStore) -> Self {
        Self {
            store,
            by_scenario: BTreeMap::new(),
            by_node: BTreeMap::new(),
        }
    }

    pub fn rebuild(&mut self) {
        self.by_scenario.clear();
        self.by_node.clear();
        for record in self.store.records() {
            if let Some(Value::String(scenario)) = record.metadata().get(SCENARIO_KEY) {
                self.by_scenario
                    .entry(scenario.clone())
                    .or_default()
                    .push(record.clone());
            }
            self.by_node
                .entry(record.node_id().to_string())
                .or_default()
                .push(record);
        }
        log::debug!(
            "ledger index rebuilt: {} nodes, {} scenarios",
            self.by_node.len(),
            self.by_scenario.len()
        );
    }

    pub fn is_empty(&self) -> bool {
        self.by_node.is_empty() && self.by_scenario.is_empty()
    }

    fn ensure_built(&mut self) {
        if self.is_empty() {
            self.rebuild();
        }
    }

    pub fn for_node(&mut self, node_id: &str) -> &[LedgerRecord] {
        self.ensure_built();
        self.by_node.get(node_id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn for_scenario(&mut self, scenario: &str) -> &[LedgerRecord] {
        self.ensure_built();
        self.by_scenario.get(scenario).map(Vec::as_slice).unwrap_or_default()
    }
}
