//! Deterministic execution kernel: order a DAG, dispatch it through a syscall table,
//! and record what was attempted in an execution trace.

pub mod builtins;
pub mod error;
pub mod ipc;
pub mod kernel;
pub mod node;
pub mod process;
pub mod resources;
pub mod scheduler;
pub mod syscall;

pub use error::{IpcError, KernelError, SyscallError};
pub use ipc::{Envelope, Mailbox};
pub use kernel::{BudgetLimits, ExecutionTrace, Kernel, KernelConfig, NodeCost};
pub use node::{Node, NodeOp};
pub use process::DeterministicProcess;
pub use resources::{ResourceBudget, ResourceUsage};
pub use scheduler::{DeterministicScheduler, Ordered, order_by_key};
pub use syscall::{SyscallHandler, SyscallTable};
