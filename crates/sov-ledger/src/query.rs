use crate::chain::LedgerChain;
use crate::record::{CONSTITUTION_VERSION, LedgerRecord, VIOLATION};
use crate::store::LedgerStore;

/// Read-only questions over a fixed set of records.
#[derive(Debug, Clone, Default)]
pub struct LedgerQuery {
    records: Vec<LedgerRecord>,
}

impl LedgerQuery {
    pub fn new<I>(records: I) -> Self
    where
        I: IntoIterator<Item = LedgerRecord>,
    {
        Self {
            records: records.into_iter().collect(),
        }
    }

    pub fn from_store(store: &LedgerStore) -> Self {
        Self::new(store.records())
    }

    pub fn from_chain(chain: &LedgerChain) -> Self {
        Self::new(chain.records().iter().cloned())
    }

    /// Records in tick order; equal ticks keep their input order.
    fn by_tick<'a>(&'a self, filter: impl Fn(&LedgerRecord) -> bool) -> Vec<&'a LedgerRecord> {
        let mut matched: Vec<&LedgerRecord> =
            self.records.iter().filter(|record| filter(record)).collect();
        matched.sort_by_key(|record| record.tick());
        matched
    }

    /// Latest record of `record_type` with `tick <= at`. Among equal ticks the
    /// one seen last wins.
    pub fn latest_of_type_at(&self, record_type: &str, at: u64) -> Option<&LedgerRecord> {
        self.by_tick(|record| record.record_type() == record_type)
            .into_iter()
            .take_while(|record| record.tick() <= at)
            .last()
    }

    pub fn active_constitution_at(&self, tick: u64) -> Option<&LedgerRecord> {
        self.latest_of_type_at(CONSTITUTION_VERSION, tick)
    }

    /// Every violation recorded against `node_id`, at any tick.
    pub fn violations_for_node(&self, node_id: &str) -> Vec<&LedgerRecord> {
        self.records
            .iter()
            .filter(|record| record.record_type() == VIOLATION && record.node_id() == node_id)
            .collect()
    }

    pub fn of_type(&self, record_type: &str) -> Vec<&LedgerRecord> {
        self.records
            .iter()
            .filter(|record| record.record_type() == record_type)
            .collect()
    }

    /// Records with `from <= tick <= to`, optionally of one type, in tick order.
    pub fn range(&self, from: u64, to: u64, record_type: Option<&str>) -> Vec<&LedgerRecord> {
        self.by_tick(|record| {
            (from..=to).contains(&record.tick())
                && record_type.is_none_or(|wanted| record.record_type() == wanted)
        })
    }
}
