use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use sov_canon::to_canonical_json;

use crate::chain::LedgerChain;
use crate::error::{LedgerError, io_error};
use crate::record::LedgerRecord;

const LEDGER_DIR: &str = "ledger";
const CHAIN_EXT: &str = "jsonl";

/// Append-only archive with one file per chain. Each line is the canonical
/// JSON of a record's `canonical_payload()`.
#[derive(Debug)]
pub(crate) struct FsChainLog {
    dir: PathBuf,
}

impl FsChainLog {
    pub(crate) fn open(root: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let dir = root.as_ref().join(LEDGER_DIR);
        fs::create_dir_all(&dir).map_err(|err| io_error(&dir, err))?;
        Ok(Self { dir })
    }

    fn chain_path(&self, chain_id: &str) -> PathBuf {
        self.dir.join(format!("{chain_id}.{CHAIN_EXT}"))
    }

    /// Append one line. A failed write is cut back to the previous length.
    pub(crate) fn append(&self, chain_id: &str, record: &LedgerRecord) -> Result<(), LedgerError> {
        let path = self.chain_path(chain_id);
        let mut line = to_canonical_json(&record.canonical_payload())?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&path)
            .map_err(|err| io_error(&path, err))?;
        let len = file.metadata().map_err(|err| io_error(&path, err))?.len();
        if let Err(err) = file.write_all(line.as_bytes()) {
            if let Err(trunc) = file.set_len(len) {
                log::warn!("could not roll back {}: {trunc}", path.display());
            }
            return Err(io_error(&path, err));
        }
        file.sync_all().map_err(|err| io_error(&path, err))
    }

    /// Reload every archived chain verbatim. Links are not repaired.
    pub(crate) fn load_all(&self) -> Result<BTreeMap<String, LedgerChain>, LedgerError> {
        let mut chains = BTreeMap::new();
        let entries = fs::read_dir(&self.dir).map_err(|err| io_error(&self.dir, err))?;
        for entry in entries {
            let path = entry.map_err(|err| io_error(&self.dir, err))?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(CHAIN_EXT) {
                continue;
            }
            let Some(chain_id) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let records = read_records(&path)?;
            chains.insert(chain_id.to_string(), LedgerChain::from_records(records));
        }
        Ok(chains)
    }
}

/// Parse every complete line. An unterminated final line is a torn write;
/// it is dropped and cut from the file so later appends start on a fresh line.
fn read_records(path: &Path) -> Result<Vec<LedgerRecord>, LedgerError> {
    let text = fs::read_to_string(path).map_err(|err| io_error(path, err))?;
    let mut records = Vec::new();
    let mut offset = 0;
    for (idx, line) in text.split_inclusive('\n').enumerate() {
        if !line.ends_with('\n') {
            log::warn!(
                "dropping torn tail of {} ({} bytes)",
                path.display(),
                line.len()
            );
            truncate(path, offset as u64)?;
            break;
        }
        offset += line.len();
        if line.trim().is_empty() {
            continue;
        }
        let corrupt = |reason: String| LedgerError::Corrupt {
            path: path.to_path_buf(),
            line: idx + 1,
            reason,
        };
        let value = serde_json::from_str(line).map_err(|err| corrupt(err.to_string()))?;
        let record = LedgerRecord::from_value(value).map_err(|err| corrupt(err.to_string()))?;
        records.push(record);
    }
    Ok(records)
}

fn truncate(path: &Path, len: u64) -> Result<(), LedgerError> {
    let file = OpenOptions::new()
        .write(true)
        .open(path)
        .map_err(|err| io_error(path, err))?;
    file.set_len(len).map_err(|err| io_error(path, err))?;
    file.sync_all().map_err(|err| io_error(path, err))
}
