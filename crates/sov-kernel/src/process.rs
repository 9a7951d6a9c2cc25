use serde_json::Value;

use crate::error::KernelError;
use crate::kernel::Kernel;
use crate::node::Node;
use crate::scheduler::DeterministicScheduler;

/// A DAG bundled with its own scheduler, run as one process-like unit.
#[derive(Debug, Clone)]
pub struct DeterministicProcess {
    pid: String,
    dag: Vec<Node>,
    scheduler: DeterministicScheduler,
}

impl DeterministicProcess {
    pub fn new(pid: impl Into<String>, dag: Vec<Node>) -> Self {
        Self {
            pid: pid.into(),
            dag,
            scheduler: DeterministicScheduler::new(),
        }
    }

    pub fn pid(&self) -> &str {
        &self.pid
    }

    /// The process DAG in execution order.
    pub fn schedule(&self) -> Vec<Node> {
        self.scheduler.order(self.dag.clone())
    }

    pub fn plan(&self) -> Vec<String> {
        self.schedule().into_iter().map(|node| node.id).collect()
    }

    pub fn run(&self, kernel: &mut Kernel) -> Result<Vec<Value>, KernelError> {
        log::debug!("process {} submitting {} nodes", self.pid, self.dag.len());
        kernel.run(self.schedule())
    }
}
