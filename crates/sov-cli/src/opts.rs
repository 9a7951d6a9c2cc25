//! Global CLI options and input loading.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::de::DeserializeOwned;
use sov_kernel::KernelConfig;
use sov_ledger::LedgerStore;

/// Options shared by every command. Each can also be set via env vars.
#[derive(Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Ledger store directory (env: SOV_STORE)
    #[arg(long, global = true, env = "SOV_STORE")]
    pub store: Option<PathBuf>,

    /// Kernel config JSON file (env: SOV_CONFIG)
    #[arg(long, global = true, env = "SOV_CONFIG")]
    pub config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,
}

impl GlobalOpts {
    pub fn kernel_config(&self) -> Result<KernelConfig> {
        match &self.config {
            Some(path) => read_json(path),
            None => Ok(KernelConfig::default()),
        }
    }

    pub fn open_store(&self) -> Result<LedgerStore> {
        let dir = self
            .store
            .as_deref()
            .context("no ledger store: pass --store or set SOV_STORE")?;
        LedgerStore::open(dir).with_context(|| format!("open ledger store {}", dir.display()))
    }
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse {}", path.display()))
}
