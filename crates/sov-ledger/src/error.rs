use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("malformed ledger record: {0}")]
    MalformedRecord(String),
    #[error("chain '{0}' not found")]
    ChainNotFound(String),
    #[error("invalid chain id '{0}'")]
    InvalidChainId(String),
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("corrupt ledger log {path:?} line {line}: {reason}")]
    Corrupt {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

pub(crate) fn io_error(path: impl Into<PathBuf>, err: io::Error) -> LedgerError {
    LedgerError::Io {
        path: path.into(),
        source: err,
    }
}
