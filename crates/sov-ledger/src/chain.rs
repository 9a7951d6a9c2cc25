use serde::Serialize;
use sov_canon::GENESIS;

use crate::record::LedgerRecord;

/// Outcome of walking a chain's links.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChainReport {
    pub records: usize,
    /// Index of the first record whose `prev_hash` does not match.
    pub first_break: Option<usize>,
    /// Hash of the last record as it reads now. No successor covers the tip,
    /// so callers anchor it by comparing this against a hash kept elsewhere.
    pub tip_hash: Option<String>,
}

impl ChainReport {
    pub fn is_valid(&self) -> bool {
        self.first_break.is_none()
    }
}

/// Ordered, append-only records of one logical stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerChain {
    records: Vec<LedgerRecord>,
}

impl LedgerChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt archived records as-is, without relinking. Use [`validate`](Self::validate)
    /// to check them.
    pub fn from_records(records: Vec<LedgerRecord>) -> Self {
        Self { records }
    }

    /// Link `record` to the current tip and append it.
    ///
    /// On an empty chain the record keeps whatever `prev_hash` it was given.
    pub fn append(&mut self, record: LedgerRecord) -> &LedgerRecord {
        let linked = self.link(&record);
        self.push_linked(linked)
    }

    pub(crate) fn link(&self, record: &LedgerRecord) -> LedgerRecord {
        let prev_hash = match self.records.last() {
            Some(tip) => Some(tip.compute_hash()),
            None => record.prev_hash().map(str::to_owned),
        };
        record.with_prev_hash(prev_hash)
    }

    pub(crate) fn push_linked(&mut self, record: LedgerRecord) -> &LedgerRecord {
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    pub fn records(&self) -> &[LedgerRecord] {
        &self.records
    }

    pub fn tip(&self) -> Option<&LedgerRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True iff every link holds. Never panics or errors on a broken chain.
    ///
    /// Each record is covered by its successor's `prev_hash`, so an edit to the
    /// tip alone still validates. Check [`ChainReport::tip_hash`] for that.
    pub fn validate(&self) -> bool {
        self.verify().is_valid()
    }

    /// Walk the links from the first record and report the first mismatch.
    pub fn verify(&self) -> ChainReport {
        let mut expected: Option<String> = None;
        for (idx, record) in self.records.iter().enumerate() {
            let linked = match &expected {
                None => record.prev_hash().is_none_or(|hash| hash == GENESIS),
                Some(prev) => record.prev_hash() == Some(prev.as_str()),
            };
            if !linked {
                log::warn!("ledger chain broken at record {idx}");
                return ChainReport {
                    records: self.records.len(),
                    first_break: Some(idx),
                    tip_hash: self.tip().map(LedgerRecord::compute_hash),
                };
            }
            expected = Some(record.compute_hash());
        }
        ChainReport {
            records: self.records.len(),
            first_break: None,
            tip_hash: expected,
        }
    }
}
