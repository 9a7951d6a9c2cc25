//! Append-only audit ledger: hash-linked records grouped into named chains,
//! with a rebuildable index and read-only queries.

pub mod chain;
pub mod error;
mod fs_log;
pub mod index;
pub mod query;
pub mod record;
pub mod store;

pub use chain::{ChainReport, LedgerChain};
pub use error::LedgerError;
pub use index::LedgerIndex;
pub use query::LedgerQuery;
pub use record::{CONSTITUTION_VERSION, GENESIS_TYPE, LedgerRecord, VIOLATION};
pub use store::LedgerStore;
