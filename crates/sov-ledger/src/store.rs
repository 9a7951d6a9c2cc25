use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::chain::{ChainReport, LedgerChain};
use crate::error::LedgerError;
use crate::fs_log::FsChainLog;
use crate::record::LedgerRecord;

/// Named chains, created lazily on first append.
///
/// Clones share state. Appends take the write lock, so appends to one chain
/// are serialized and the hash links stay consistent; reads share the lock.
#[derive(Clone, Default)]
pub struct LedgerStore {
    chains: Arc<RwLock<BTreeMap<String, LedgerChain>>>,
    archive: Option<Arc<FsChainLog>>,
}

impl fmt::Debug for LedgerStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerStore")
            .field("chains", &self.read().len())
            .field("archive", &self.archive)
            .finish()
    }
}

impl LedgerStore {
    /// In-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// File-backed store rooted at `root`, reloading any archived chains.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let archive = FsChainLog::open(root)?;
        let chains = archive.load_all()?;
        log::debug!("ledger store opened with {} chains", chains.len());
        Ok(Self {
            chains: Arc::new(RwLock::new(chains)),
            archive: Some(Arc::new(archive)),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, LedgerChain>> {
        self.chains.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, LedgerChain>> {
        self.chains.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Link and append `record` to `chain_id`, returning the stored record.
    ///
    /// With an archive attached the line is written first; a failed write
    /// leaves the in-memory chain unchanged.
    pub fn append(&self, chain_id: &str, record: LedgerRecord) -> Result<LedgerRecord, LedgerError> {
        validate_chain_id(chain_id)?;
        let mut chains = self.write();
        let linked = match chains.get(chain_id) {
            Some(chain) => chain.link(&record),
            None => LedgerChain::new().link(&record),
        };
        if let Some(archive) = &self.archive {
            archive.append(chain_id, &linked)?;
        }
        let chain = chains.entry(chain_id.to_string()).or_default();
        log::debug!(
            "ledger append {chain_id}#{} type={} tick={}",
            chain.len(),
            linked.record_type(),
            linked.tick()
        );
        Ok(chain.push_linked(linked).clone())
    }

    pub fn get_chain(&self, chain_id: &str) -> Result<LedgerChain, LedgerError> {
        self.read()
            .get(chain_id)
            .cloned()
            .ok_or_else(|| LedgerError::ChainNotFound(chain_id.to_string()))
    }

    pub fn chain_ids(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    /// Every record, chains in id order, each chain in append order.
    pub fn records(&self) -> Vec<LedgerRecord> {
        self.read()
            .values()
            .flat_map(|chain| chain.records().iter().cloned())
            .collect()
    }

    pub fn validate_all(&self) -> BTreeMap<String, ChainReport> {
        self.read()
            .iter()
            .map(|(id, chain)| (id.clone(), chain.verify()))
            .collect()
    }
}

fn validate_chain_id(chain_id: &str) -> Result<(), LedgerError> {
    let valid = !chain_id.is_empty()
        && !chain_id.starts_with('.')
        && chain_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(LedgerError::InvalidChainId(chain_id.to_string()))
    }
}
