use thiserror::Error;

#[derive(Debug, Error)]
pub enum KernelError {
    #[error("unknown syscall '{0}'")]
    UnknownSyscall(String),
    #[error("syscall '{name}' failed at node '{node}': {source}")]
    Syscall {
        node: String,
        name: String,
        #[source]
        source: SyscallError,
    },
    #[error("resource budget exhausted at node '{node}' (cpu {cpu}, memory {memory})")]
    ResourceExhausted { node: String, cpu: u64, memory: u64 },
}

/// Failure reported by a syscall handler.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyscallError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("{0}")]
    Failed(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IpcError {
    /// The channel has no pending message. `recv` never waits.
    #[error("channel '{0}' is empty")]
    EmptyChannel(String),
}
