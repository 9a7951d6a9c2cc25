use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{KernelError, SyscallError};
use crate::node::{Node, NodeOp};
use crate::resources::{ResourceBudget, ResourceUsage};
use crate::scheduler::DeterministicScheduler;
use crate::syscall::SyscallTable;

/// Capacity of the per-run budget.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BudgetLimits {
    pub cpu: u64,
    pub memory: u64,
}

/// Amount charged against the per-run budget for every dispatched node.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeCost {
    pub cpu: u64,
    pub memory: u64,
}

impl Default for NodeCost {
    fn default() -> Self {
        Self { cpu: 1, memory: 0 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct KernelConfig {
    /// When set, every run is metered against a fresh budget of this size.
    pub budget: Option<BudgetLimits>,
    pub node_cost: NodeCost,
}

/// Ordered log of what the kernel attempted, one `execute:<id>` line per node.
///
/// After a failed run the trace names every node that was dispatched, including
/// the one that failed. It is diagnostic and does not prove success.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionTrace {
    lines: Vec<String>,
}

impl ExecutionTrace {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn record(&mut self, node: &Node) {
        self.lines.push(format!("execute:{}", node.id));
    }
}

pub struct Kernel {
    scheduler: DeterministicScheduler,
    syscalls: SyscallTable,
    trace: ExecutionTrace,
    config: KernelConfig,
    last_usage: Option<ResourceUsage>,
}

impl fmt::Debug for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kernel")
            .field("syscalls", &self.syscalls)
            .field("trace_len", &self.trace.len())
            .field("config", &self.config)
            .finish()
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel {
    pub fn new() -> Self {
        Self::with_config(KernelConfig::default())
    }

    pub fn with_config(config: KernelConfig) -> Self {
        Self {
            scheduler: DeterministicScheduler::new(),
            syscalls: SyscallTable::new(),
            trace: ExecutionTrace::default(),
            config,
            last_usage: None,
        }
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn register_syscall<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&[Value], &Map<String, Value>) -> Result<Value, SyscallError> + Send + Sync + 'static,
    {
        self.syscalls.register(name, handler);
    }

    pub fn syscalls(&self) -> &SyscallTable {
        &self.syscalls
    }

    pub fn trace(&self) -> &ExecutionTrace {
        &self.trace
    }

    /// Weak check: true once anything has been traced.
    pub fn verify(&self) -> bool {
        self.scheduler.verify(self.trace.lines())
    }

    /// Budget usage at the end of the most recent metered run.
    pub fn budget_snapshot(&self) -> Option<ResourceUsage> {
        self.last_usage
    }

    /// Order `dag` and execute each node, returning per-node results in execution order.
    ///
    /// The first failing node aborts the run. Nothing is rolled back: the trace
    /// keeps every line appended so far.
    pub fn run(&mut self, dag: Vec<Node>) -> Result<Vec<Value>, KernelError> {
        let ordered = self.scheduler.order(dag);
        log::debug!("kernel run: {} nodes", ordered.len());

        let mut budget = self
            .config
            .budget
            .map(|limits| ResourceBudget::new(limits.cpu, limits.memory));
        let outcome = self.dispatch(&ordered, budget.as_mut());
        self.last_usage = budget.map(|budget| budget.snapshot());

        match &outcome {
            Ok(results) => log::debug!("kernel run finished: {} results", results.len()),
            Err(err) => log::warn!("kernel run aborted after {} trace lines: {err}", self.trace.len()),
        }
        outcome
    }

    fn dispatch(
        &mut self,
        ordered: &[Node],
        mut budget: Option<&mut ResourceBudget>,
    ) -> Result<Vec<Value>, KernelError> {
        let cost = self.config.node_cost;
        let mut results = Vec::with_capacity(ordered.len());
        for node in ordered {
            self.trace.record(node);
            if let Some(budget) = budget.as_deref_mut() {
                if !budget.consume(cost.cpu, cost.memory) {
                    return Err(KernelError::ResourceExhausted {
                        node: node.id.clone(),
                        cpu: cost.cpu,
                        memory: cost.memory,
                    });
                }
            }
            let result = match &node.op {
                NodeOp::Syscall { name, args, kwargs } => {
                    self.syscalls.invoke(&node.id, name, args, kwargs)?
                }
                NodeOp::Value { value } => value.clone(),
            };
            results.push(result);
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn kernel_with_add() -> Kernel {
        let mut kernel = Kernel::new();
        kernel.register_syscall("add", |args, _| {
            let total: i64 = args.iter().filter_map(Value::as_i64).sum();
            Ok(json!(total))
        });
        kernel
    }

    #[test]
    fn runs_in_epoch_id_order_and_traces_each_node() {
        let mut kernel = kernel_with_add();
        let dag = vec![
            Node::value("b", json!("late")).with_epoch(1),
            Node::syscall("a", "add", vec![json!(2), json!(3)]).with_epoch(1),
            Node::value("z", json!("early")),
        ];
        let results = kernel.run(dag).unwrap();
        assert_eq!(results, vec![json!("early"), json!(5), json!("late")]);
        assert_eq!(
            kernel.trace().lines(),
            &["execute:z", "execute:a", "execute:b"]
        );
        assert!(kernel.verify());
    }

    #[test]
    fn trace_grows_across_runs() {
        let mut kernel = kernel_with_add();
        kernel.run(vec![Node::value("x", json!(1))]).unwrap();
        kernel.run(vec![Node::value("y", json!(2))]).unwrap();
        assert_eq!(kernel.trace().lines(), &["execute:x", "execute:y"]);
    }

    #[test]
    fn unknown_syscall_leaves_partial_trace() {
        let mut kernel = kernel_with_add();
        let dag = vec![
            Node::value("a", json!(1)),
            Node::syscall("b", "missing", vec![]),
            Node::value("c", json!(3)),
        ];
        let err = kernel.run(dag).unwrap_err();
        assert!(matches!(err, KernelError::UnknownSyscall(name) if name == "missing"));
        assert_eq!(kernel.trace().lines(), &["execute:a", "execute:b"]);
    }

    #[test]
    fn failing_handler_reports_the_node() {
        let mut kernel = kernel_with_add();
        kernel.register_syscall("deny", |_, _| Err(SyscallError::Failed("denied".into())));
        let dag = vec![
            Node::syscall("first", "add", vec![json!(1)]),
            Node::syscall("second", "deny", vec![]),
        ];
        let err = kernel.run(dag).unwrap_err();
        assert!(matches!(
            &err,
            KernelError::Syscall { node, name, .. } if node == "second" && name == "deny"
        ));
        assert_eq!(
            err.to_string(),
            "syscall 'deny' failed at node 'second': denied"
        );
        assert_eq!(kernel.trace().lines(), &["execute:first", "execute:second"]);
    }

    #[test]
    fn empty_run_does_not_verify() {
        let mut kernel = Kernel::new();
        assert!(kernel.run(Vec::new()).unwrap().is_empty());
        assert!(!kernel.verify());
    }

    #[test]
    fn metered_run_rejects_once_budget_is_spent() {
        let mut kernel = Kernel::with_config(KernelConfig {
            budget: Some(BudgetLimits { cpu: 2, memory: 0 }),
            node_cost: NodeCost::default(),
        });
        let dag = vec![
            Node::value("a", json!(1)),
            Node::value("b", json!(2)),
            Node::value("c", json!(3)),
        ];
        let err = kernel.run(dag).unwrap_err();
        assert!(matches!(err, KernelError::ResourceExhausted { ref node, .. } if node == "c"));
        assert_eq!(kernel.trace().len(), 3);
        assert_eq!(
            kernel.budget_snapshot(),
            Some(ResourceUsage { cpu: 2, memory: 0 })
        );

        // Each run starts from a fresh budget.
        assert_eq!(kernel.run(vec![Node::value("d", json!(4))]).unwrap(), vec![json!(4)]);
        assert_eq!(
            kernel.budget_snapshot(),
            Some(ResourceUsage { cpu: 1, memory: 0 })
        );
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: KernelConfig = serde_json::from_value(json!({
            "budget": {"cpu": 10, "memory": 64}
        }))
        .unwrap();
        assert_eq!(config.budget, Some(BudgetLimits { cpu: 10, memory: 64 }));
        assert_eq!(config.node_cost, NodeCost { cpu: 1, memory: 0 });
        assert_eq!(Kernel::new().budget_snapshot(), None);
    }
}
