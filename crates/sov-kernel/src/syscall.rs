use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::{KernelError, SyscallError};

/// Handler invoked with a node's positional and keyword arguments.
pub type SyscallHandler =
    Arc<dyn Fn(&[Value], &Map<String, Value>) -> Result<Value, SyscallError> + Send + Sync>;

/// Name to handler registry owned by a [`Kernel`](crate::Kernel).
#[derive(Clone, Default)]
pub struct SyscallTable {
    handlers: BTreeMap<String, SyscallHandler>,
}

impl fmt::Debug for SyscallTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyscallTable")
            .field("names", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl SyscallTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`. A later registration replaces an earlier one.
    pub fn register<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&[Value], &Map<String, Value>) -> Result<Value, SyscallError> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.handlers.insert(name.clone(), Arc::new(handler)).is_some() {
            log::debug!("syscall '{name}' re-registered");
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Call `name` on behalf of `node`. Handler failures carry both ids.
    pub fn invoke(
        &self,
        node: &str,
        name: &str,
        args: &[Value],
        kwargs: &Map<String, Value>,
    ) -> Result<Value, KernelError> {
        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| KernelError::UnknownSyscall(name.to_string()))?;
        handler(args, kwargs).map_err(|source| KernelError::Syscall {
            node: node.to_string(),
            name: name.to_string(),
            source,
        })
    }
}
